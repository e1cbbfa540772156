//! The "Script Number" codec: signed integers serialized as minimally
//! encoded little-endian byte arrays, sign bit in the high bit of the most
//! significant byte. The empty array is zero.

use crate::error::ScriptNumError;

/// Parse a minimally encoded Script Number.
///
/// Accepts at most 4 bytes, so every parsed value fits in
/// `±(2^31 − 1)`.
///
/// # Errors
///
/// [`ScriptNumError::OutOfRange`] for encodings longer than 4 bytes, and
/// [`ScriptNumError::RequiresMinimal`] for trailing `0x00`/`0x80` padding
/// that is not carrying a sign bit.
pub fn parse_script_num(bytes: &[u8]) -> Result<i64, ScriptNumError> {
    if bytes.is_empty() {
        return Ok(0);
    }
    if bytes.len() > 4 {
        return Err(ScriptNumError::OutOfRange);
    }

    let top = bytes[bytes.len() - 1];
    let non_minimal =
        top & 0x7f == 0 && (bytes.len() <= 1 || bytes[bytes.len() - 2] & 0x80 == 0);
    if non_minimal {
        return Err(ScriptNumError::RequiresMinimal);
    }

    let mut magnitude = 0i64;
    for (i, byte) in bytes.iter().enumerate() {
        magnitude |= (*byte as i64) << (8 * i);
    }

    if top & 0x80 != 0 {
        let sign_bit = 0x80i64 << (8 * (bytes.len() - 1));
        Ok(-(magnitude & !sign_bit))
    } else {
        Ok(magnitude)
    }
}

/// Encode an integer as a minimal Script Number.
///
/// Zero encodes as the empty array. `parse_script_num(encode_script_num(n))`
/// returns `n` for every `n` with `|n| ≤ 2^31 − 1`.
pub fn encode_script_num(value: i64) -> Vec<u8> {
    if value == 0 {
        return vec![];
    }

    let negative = value < 0;
    let mut magnitude = value.unsigned_abs();
    let mut result = Vec::new();

    while magnitude > 0 {
        result.push((magnitude & 0xff) as u8);
        magnitude >>= 8;
    }

    // If the most significant byte has bit 0x80 set, an extra byte carries
    // the sign bit.
    if result.last().map_or(false, |&b| b & 0x80 != 0) {
        result.push(if negative { 0x80 } else { 0x00 });
    } else if negative {
        let len = result.len();
        result[len - 1] |= 0x80;
    }

    result
}

/// Determines whether a stack element is "true" under Script semantics.
///
/// False is any representation of zero: the empty vector, or all `0x00`
/// bytes where the last byte may instead be `0x80` (negative zero).
/// Everything else is true.
pub fn is_true(bytes: &[u8]) -> bool {
    if bytes.is_empty() {
        return false;
    }
    for byte in &bytes[..bytes.len() - 1] {
        if *byte != 0x00 {
            return true;
        }
    }
    let last = bytes[bytes.len() - 1];
    last != 0x00 && last != 0x80
}
