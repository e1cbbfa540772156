//! Encoding validity checks for the signatures and public keys consumed by
//! OP_CHECKSIG. These are byte-level checks only; curve math lives behind
//! [`crate::crypto::Secp256k1Verifier`].

use crate::sighash::is_permitted_sighash_type;

/// Half of the secp256k1 group order, big-endian. A signature's S value
/// must not exceed this ("low S").
const SECP256K1_HALF_ORDER: [u8; 32] = [
    0x7f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0x5d, 0x57, 0x6e, 0x73, 0x57, 0xa4, 0x50, 0x1d, 0xdf, 0xe9, 0x2f, 0x46, 0x68, 0x1b,
    0x20, 0xa0,
];

/// Checks a public key for a valid encoding: 33-byte compressed
/// (`0x02`/`0x03` prefix) or 65-byte uncompressed (`0x04` prefix).
pub fn is_valid_public_key_encoding(public_key: &[u8]) -> bool {
    match public_key.first() {
        Some(&0x02) | Some(&0x03) => public_key.len() == 33,
        Some(&0x04) => public_key.len() == 65,
        _ => false,
    }
}

/// Checks a stack signature for a valid encoding: strict DER (BIP66),
/// low S, and a trailing sighash-type byte from the permitted set.
///
/// The input is the full stack element, DER body plus sighash byte.
pub fn is_valid_signature_encoding(signature: &[u8]) -> bool {
    // Shortest possible: 0x30 len 0x02 0x01 R 0x02 0x01 S sighash
    if signature.len() < 9 || signature.len() > 73 {
        return false;
    }

    if signature[0] != 0x30 || signature[1] as usize != signature.len() - 3 {
        return false;
    }

    let len_r = signature[3] as usize;
    if 5 + len_r >= signature.len() {
        return false;
    }
    let len_s = signature[5 + len_r] as usize;
    if len_r + len_s + 7 != signature.len() {
        return false;
    }

    // R: positive, no redundant leading zero
    if signature[2] != 0x02 || len_r == 0 || signature[4] & 0x80 != 0 {
        return false;
    }
    if len_r > 1 && signature[4] == 0x00 && signature[5] & 0x80 == 0 {
        return false;
    }

    // S: positive, no redundant leading zero
    if signature[len_r + 4] != 0x02 || len_s == 0 || signature[len_r + 6] & 0x80 != 0 {
        return false;
    }
    if len_s > 1 && signature[len_r + 6] == 0x00 && signature[len_r + 7] & 0x80 == 0 {
        return false;
    }

    if !is_low_s(&signature[len_r + 6..len_r + 6 + len_s]) {
        return false;
    }

    is_permitted_sighash_type(signature[signature.len() - 1])
}

/// Splits a stack signature into its DER body and sighash-type byte.
///
/// Callers must have validated the encoding first.
pub fn split_signature(signature: &[u8]) -> (&[u8], u8) {
    (
        &signature[..signature.len() - 1],
        signature[signature.len() - 1],
    )
}

/// Compares a big-endian S value against half the group order.
fn is_low_s(s: &[u8]) -> bool {
    let significant = match s.iter().position(|&b| b != 0) {
        Some(i) => &s[i..],
        None => return false,
    };
    if significant.len() > 32 {
        return false;
    }
    let mut padded = [0u8; 32];
    padded[32 - significant.len()..].copy_from_slice(significant);
    padded <= SECP256K1_HALF_ORDER
}
