use crate::error::TruncatedInput;

/// Encode a `u16` as 2 little-endian bytes.
pub fn encode_uint16_le(value: u16) -> [u8; 2] {
    value.to_le_bytes()
}

/// Encode a `u32` as 4 little-endian bytes.
pub fn encode_uint32_le(value: u32) -> [u8; 4] {
    value.to_le_bytes()
}

/// Encode a `u64` as 8 little-endian bytes.
pub fn encode_uint64_le(value: u64) -> [u8; 8] {
    value.to_le_bytes()
}

/// Read a little-endian `u16` starting at `offset`.
pub fn decode_uint16_le(bytes: &[u8], offset: usize) -> Result<u16, TruncatedInput> {
    let slice = bytes
        .get(offset..offset + 2)
        .ok_or(TruncatedInput)?;
    Ok(u16::from_le_bytes([slice[0], slice[1]]))
}

/// Read a little-endian `u32` starting at `offset`.
pub fn decode_uint32_le(bytes: &[u8], offset: usize) -> Result<u32, TruncatedInput> {
    let slice = bytes
        .get(offset..offset + 4)
        .ok_or(TruncatedInput)?;
    Ok(u32::from_le_bytes([slice[0], slice[1], slice[2], slice[3]]))
}

/// Read a little-endian `u64` starting at `offset`.
pub fn decode_uint64_le(bytes: &[u8], offset: usize) -> Result<u64, TruncatedInput> {
    let slice = bytes
        .get(offset..offset + 8)
        .ok_or(TruncatedInput)?;
    let mut buf = [0u8; 8];
    buf.copy_from_slice(slice);
    Ok(u64::from_le_bytes(buf))
}

/// Encode a value as a Bitcoin VarInt.
///
/// One byte up to `0xfc`; otherwise a `0xfd`/`0xfe`/`0xff` prefix followed
/// by the value as a little-endian u16/u32/u64.
pub fn encode_var_int(value: u64) -> Vec<u8> {
    match value {
        0..=0xfc => vec![value as u8],
        0xfd..=0xffff => {
            let mut out = vec![0xfd];
            out.extend_from_slice(&encode_uint16_le(value as u16));
            out
        }
        0x1_0000..=0xffff_ffff => {
            let mut out = vec![0xfe];
            out.extend_from_slice(&encode_uint32_le(value as u32));
            out
        }
        _ => {
            let mut out = vec![0xff];
            out.extend_from_slice(&encode_uint64_le(value));
            out
        }
    }
}

/// Decode a Bitcoin VarInt starting at `offset`.
///
/// Returns the decoded value and the offset of the first byte after it.
pub fn decode_var_int(bytes: &[u8], offset: usize) -> Result<(u64, usize), TruncatedInput> {
    let prefix = *bytes.get(offset).ok_or(TruncatedInput)?;
    match prefix {
        0xfd => Ok((decode_uint16_le(bytes, offset + 1)? as u64, offset + 3)),
        0xfe => Ok((decode_uint32_le(bytes, offset + 1)? as u64, offset + 5)),
        0xff => Ok((decode_uint64_le(bytes, offset + 1)?, offset + 9)),
        byte => Ok((byte as u64, offset + 1)),
    }
}
