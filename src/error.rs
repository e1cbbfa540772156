use thiserror::Error;

/// The consensus cap on the byte length of a single stack element.
pub const MAXIMUM_PUSH_LENGTH: usize = 520;

/// All error conditions a script can halt with during execution.
///
/// These are carried as data inside the program state rather than returned
/// through `Result`: the first error latches, and every later instruction of
/// the pass is skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ScriptError {
    /// An operation required more stack elements than were present.
    #[error("stack underflow: not enough elements on the stack")]
    EmptyStack,

    /// A push instruction extends beyond the end of the script.
    #[error("malformed push: instruction extends past the end of the script")]
    MalformedPush,

    /// A push used a longer encoding than the shortest one available.
    #[error("non-minimal push: a shorter push encoding was available")]
    NonMinimalPush,

    /// A push exceeds the 520-byte stack element limit.
    #[error("push exceeds the maximum stack element size of 520 bytes")]
    ExceedsMaximumPush,

    /// The byte at the instruction pointer is not a recognized opcode.
    #[error("unknown opcode: 0x{0:02x}")]
    UnknownOpcode(u8),

    /// OP_VERIFY or OP_EQUALVERIFY consumed a false value.
    #[error("verify failed: top stack element is false")]
    FailedVerify,

    /// OP_RETURN was encountered. The script is provably unspendable.
    #[error("OP_RETURN encountered: script is unspendable")]
    CalledReturn,

    /// OP_CHECKSIG consumed a public key that is neither a 33-byte
    /// compressed key nor a 65-byte uncompressed key.
    #[error("invalid public key encoding")]
    InvalidPublicKeyEncoding,

    /// OP_CHECKSIG consumed a signature that is not strict DER with a low
    /// S value and a permitted sighash-type byte.
    #[error("invalid signature encoding")]
    InvalidSignatureEncoding,
}

/// A hex string could not be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HexError {
    /// Hex strings encode two characters per byte.
    #[error("hex string has an odd number of characters")]
    OddLength,
    /// A character outside `[0-9a-fA-F]` was encountered.
    #[error("invalid hex character")]
    InvalidCharacter,
}

/// A fixed-width integer or VarInt read ran past the end of its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unexpected end of input while decoding")]
pub struct TruncatedInput;

/// A byte array could not be read as a Script Number.
///
/// These are returned as values by the numeric codec; opcodes that consume
/// numbers decide which [`ScriptError`] they surface as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ScriptNumError {
    /// The encoding is longer than the 4-byte parse limit.
    #[error("script number is out of range")]
    OutOfRange,
    /// The encoding carries padding bytes a minimal encoding would omit.
    #[error("script number requires minimal encoding")]
    RequiresMinimal,
}
