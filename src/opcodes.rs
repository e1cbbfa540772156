//! Byte values for the opcodes this engine implements, per the published
//! Bitcoin Cash opcode table.

/// Push an empty array onto the stack.
pub const OP_0: u8 = 0x00;
/// First of the constant-length pushes: push the next byte onto the stack.
pub const OP_DATA_1: u8 = 0x01;
/// Push the next 20 bytes onto the stack (the P2SH hash push).
pub const OP_DATA_20: u8 = 0x14;
/// Last of the constant-length pushes: push the next 75 bytes.
pub const OP_DATA_75: u8 = 0x4b;
/// Push data with a 1-byte length prefix.
pub const OP_PUSHDATA1: u8 = 0x4c;
/// Push data with a 2-byte little-endian length prefix.
pub const OP_PUSHDATA2: u8 = 0x4d;
/// Push data with a 4-byte little-endian length prefix.
pub const OP_PUSHDATA4: u8 = 0x4e;
/// Push the Script Number -1 onto the stack.
pub const OP_1NEGATE: u8 = 0x4f;
/// Push the Script Number 1 onto the stack.
pub const OP_1: u8 = 0x51;
/// Push the Script Number 16 onto the stack.
pub const OP_16: u8 = 0x60;
/// Pop the top element; fail the script unless it is truthy.
pub const OP_VERIFY: u8 = 0x69;
/// Duplicate the top element of the stack.
pub const OP_DUP: u8 = 0x76;
/// Pop two elements; push 1 if byte-identical, else 0.
pub const OP_EQUAL: u8 = 0x87;
/// OP_EQUAL followed by OP_VERIFY.
pub const OP_EQUALVERIFY: u8 = 0x88;
/// Pop the top element; push its HASH160 (RIPEMD-160 of SHA-256).
pub const OP_HASH160: u8 = 0xa9;
/// Restrict the script bytes covered by later signature checks.
pub const OP_CODESEPARATOR: u8 = 0xab;
/// Pop a public key and signature; push whether the signature is valid.
pub const OP_CHECKSIG: u8 = 0xac;
