//! The Bitcoin Cash signing serialization: the replay-protected,
//! BIP143-style preimage whose double-SHA256 is signed by OP_CHECKSIG.

use crate::bytes::{encode_uint32_le, encode_uint64_le, encode_var_int};
use crate::state::TransactionContext;

/// Sign all outputs.
pub const SIGHASH_ALL: u8 = 0x01;
/// Sign no outputs.
pub const SIGHASH_NONE: u8 = 0x02;
/// Sign only the output matching this input's index.
pub const SIGHASH_SINGLE: u8 = 0x03;
/// The Bitcoin Cash replay-protection flag. Required on every signature.
pub const SIGHASH_FORKID: u8 = 0x40;
/// Sign only this input, allowing others to be added.
pub const SIGHASH_ANYONECANPAY: u8 = 0x80;

const BASE_TYPE_MASK: u8 = 0x1f;
const ZERO_HASH: [u8; 32] = [0u8; 32];

/// Whether a sighash-type byte is permitted on a Bitcoin Cash signature:
/// ALL, NONE, or SINGLE, always with FORKID, optionally with
/// ANYONECANPAY.
pub fn is_permitted_sighash_type(sighash_type: u8) -> bool {
    matches!(sighash_type, 0x41 | 0x42 | 0x43 | 0xc1 | 0xc2 | 0xc3)
}

/// Assembles the signing-serialization preimage for one input.
///
/// `script_code` is the raw covered script (the bytes after the most
/// recent OP_CODESEPARATOR); its VarInt length prefix is written here.
/// The flags of `sighash_type` select which precomputed hashes are
/// included and which are replaced by zero bytes.
pub fn signing_serialization(
    context: &TransactionContext,
    script_code: &[u8],
    sighash_type: u8,
) -> Vec<u8> {
    let base_type = sighash_type & BASE_TYPE_MASK;
    let anyone_can_pay = sighash_type & SIGHASH_ANYONECANPAY != 0;

    let outpoints_hash = if anyone_can_pay {
        &ZERO_HASH
    } else {
        &context.transaction_outpoints_hash
    };
    let sequence_numbers_hash =
        if anyone_can_pay || base_type == SIGHASH_NONE || base_type == SIGHASH_SINGLE {
            &ZERO_HASH
        } else {
            &context.transaction_sequence_numbers_hash
        };
    let outputs_hash = match base_type {
        SIGHASH_NONE => &ZERO_HASH,
        SIGHASH_SINGLE => &context.corresponding_output_hash,
        _ => &context.transaction_outputs_hash,
    };

    let mut preimage = Vec::with_capacity(156 + script_code.len() + 9);
    preimage.extend_from_slice(&encode_uint32_le(context.version));
    preimage.extend_from_slice(outpoints_hash);
    preimage.extend_from_slice(sequence_numbers_hash);
    preimage.extend_from_slice(&context.outpoint_transaction_hash);
    preimage.extend_from_slice(&encode_uint32_le(context.outpoint_index));
    preimage.extend_from_slice(&encode_var_int(script_code.len() as u64));
    preimage.extend_from_slice(script_code);
    preimage.extend_from_slice(&encode_uint64_le(context.outpoint_value));
    preimage.extend_from_slice(&encode_uint32_le(context.sequence_number));
    preimage.extend_from_slice(outputs_hash);
    preimage.extend_from_slice(&encode_uint32_le(context.locktime));
    preimage.extend_from_slice(&encode_uint32_le(sighash_type as u32));
    preimage
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> TransactionContext {
        TransactionContext {
            block_height: 0,
            block_time: 0,
            version: 2,
            locktime: 0x0004_0302,
            transaction_outpoints_hash: [0x11; 32],
            transaction_outputs_hash: [0x22; 32],
            transaction_sequence_numbers_hash: [0x33; 32],
            corresponding_output_hash: [0x44; 32],
            outpoint_transaction_hash: [0x55; 32],
            outpoint_index: 3,
            outpoint_value: 5000,
            sequence_number: 0xffff_ffff,
        }
    }

    #[test]
    fn permitted_sighash_types() {
        assert!(is_permitted_sighash_type(0x41));
        assert!(is_permitted_sighash_type(0xc3));
        assert!(!is_permitted_sighash_type(0x01));
        assert!(!is_permitted_sighash_type(0x40));
        assert!(!is_permitted_sighash_type(0x81));
    }

    #[test]
    fn preimage_layout_all() {
        let script_code = [0xac];
        let preimage = signing_serialization(&context(), &script_code, 0x41);

        // 4 + 32 + 32 + 32 + 4 + (1 + 1) + 8 + 4 + 32 + 4 + 4
        assert_eq!(preimage.len(), 158);
        assert_eq!(&preimage[0..4], &[2, 0, 0, 0]);
        assert_eq!(&preimage[4..36], &[0x11; 32]);
        assert_eq!(&preimage[36..68], &[0x33; 32]);
        assert_eq!(&preimage[68..100], &[0x55; 32]);
        assert_eq!(&preimage[100..104], &[3, 0, 0, 0]);
        assert_eq!(&preimage[104..106], &[0x01, 0xac]);
        assert_eq!(&preimage[106..114], &[0x88, 0x13, 0, 0, 0, 0, 0, 0]);
        assert_eq!(&preimage[114..118], &[0xff; 4]);
        assert_eq!(&preimage[118..150], &[0x22; 32]);
        assert_eq!(&preimage[150..154], &[0x02, 0x03, 0x04, 0x00]);
        assert_eq!(&preimage[154..158], &[0x41, 0, 0, 0]);
    }

    #[test]
    fn none_zeroes_sequences_and_outputs() {
        let preimage = signing_serialization(&context(), &[0xac], 0x42);
        assert_eq!(&preimage[36..68], &[0x00; 32]);
        assert_eq!(&preimage[118..150], &[0x00; 32]);
        // outpoints hash still present
        assert_eq!(&preimage[4..36], &[0x11; 32]);
    }

    #[test]
    fn single_uses_corresponding_output() {
        let preimage = signing_serialization(&context(), &[0xac], 0x43);
        assert_eq!(&preimage[36..68], &[0x00; 32]);
        assert_eq!(&preimage[118..150], &[0x44; 32]);
    }

    #[test]
    fn anyone_can_pay_zeroes_outpoints() {
        let preimage = signing_serialization(&context(), &[0xac], 0xc1);
        assert_eq!(&preimage[4..36], &[0x00; 32]);
        assert_eq!(&preimage[36..68], &[0x00; 32]);
        assert_eq!(&preimage[118..150], &[0x22; 32]);
    }

    #[test]
    fn script_code_gets_var_int_prefix() {
        let script_code = vec![0xab; 300];
        let preimage = signing_serialization(&context(), &script_code, 0x41);
        // 0xfd prefix + u16 length
        assert_eq!(&preimage[104..107], &[0xfd, 0x2c, 0x01]);
        assert_eq!(&preimage[107..407], &script_code[..]);
    }
}
