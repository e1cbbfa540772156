use std::fmt::Write;

use crate::error::HexError;

/// Decode a hexadecimal string into a byte vector.
///
/// Accepts both uppercase and lowercase hex digits. Does not accept
/// a `0x` prefix — callers must strip it if present.
///
/// # Errors
///
/// Returns [`HexError::OddLength`] if the string has an odd number of
/// characters, or [`HexError::InvalidCharacter`] for non-hex characters.
pub fn decode_hex(hex: &str) -> Result<Vec<u8>, HexError> {
    if hex.len() % 2 != 0 {
        return Err(HexError::OddLength);
    }

    let mut bytes = Vec::with_capacity(hex.len() / 2);

    for i in (0..hex.len()).step_by(2) {
        let pair = hex.get(i..i + 2).ok_or(HexError::InvalidCharacter)?;
        let byte = u8::from_str_radix(pair, 16).map_err(|_| HexError::InvalidCharacter)?;
        bytes.push(byte);
    }

    Ok(bytes)
}

/// Encode a byte slice as a lowercase hex string, two characters per byte.
pub fn encode_hex(bytes: &[u8]) -> String {
    let mut hex = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        // write! to a String cannot fail
        let _ = write!(hex, "{byte:02x}");
    }
    hex
}
