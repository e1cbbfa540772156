//! Program-state facets and the concrete state used by the Bitcoin Cash
//! instruction set.
//!
//! The runtime and the operators are generic over small capability traits
//! rather than one monolithic state type, so the same plumbing drives both
//! the consensus instruction set and purpose-built sets (the test suite
//! runs a toy integer-stack VM through the identical runtime). Each
//! operator demands only the facets it consumes.

use crate::error::ScriptError;

/// The minimum a state must carry for the dispatch loop to run: an
/// instruction pointer and the script it indexes into.
///
/// `ip` is a byte index. Between instructions `0 <= ip <= script.len()`;
/// the canonical `before` hook advances it by one so operator bodies see
/// the byte *after* their own opcode.
pub trait MinimumState {
    /// Current byte index into the script.
    fn ip(&self) -> usize;
    /// Mutable access to the instruction pointer.
    fn ip_mut(&mut self) -> &mut usize;
    /// The script being executed. Immutable for the duration of a pass.
    fn script(&self) -> &[u8];
}

/// A state with an execution stack.
///
/// The item type is chosen by the instruction set: byte vectors for the
/// consensus VM, but nothing stops a set from stacking plain integers.
pub trait StackState {
    /// The element type of the stack.
    type Item;
    /// The stack, bottom first.
    fn stack(&self) -> &[Self::Item];
    /// Mutable access to the stack.
    fn stack_mut(&mut self) -> &mut Vec<Self::Item>;
}

/// A state that can halt with a tagged error.
///
/// The error type is per instruction set; sets that extend the common
/// opcodes use an error type convertible from [`ScriptError`]. The first
/// error latches: implementations must ignore later `set_error` calls.
pub trait ErrorState {
    /// The instruction set's error type.
    type Error;
    /// The latched error, if any.
    fn error(&self) -> Option<&Self::Error>;
    /// Latches `error` unless one is already set.
    fn set_error(&mut self, error: Self::Error);
}

/// A state tracking the most recent OP_CODESEPARATOR.
pub trait CodeSeparatorState {
    /// The ip immediately after the most recent OP_CODESEPARATOR, or
    /// `None` if none has executed this pass. The signing-serialization
    /// script code starts at this index.
    fn last_code_separator(&self) -> Option<usize>;
    /// Records the position of an OP_CODESEPARATOR.
    fn set_last_code_separator(&mut self, ip: usize);
}

/// A state carrying the per-input transaction context OP_CHECKSIG signs.
pub trait TransactionState {
    /// The read-only external context.
    fn context(&self) -> &TransactionContext;
}

/// The per-input external state of an authentication program.
///
/// All fields are fixed before execution begins and read-only during it.
/// The three `transaction_*` hashes are precomputed once per transaction;
/// `corresponding_output_hash` is per-input (zero bytes when the input has
/// no matching output).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionContext {
    pub block_height: u32,
    pub block_time: u32,
    pub version: u32,
    pub locktime: u32,
    pub transaction_outpoints_hash: [u8; 32],
    pub transaction_outputs_hash: [u8; 32],
    pub transaction_sequence_numbers_hash: [u8; 32],
    pub corresponding_output_hash: [u8; 32],
    pub outpoint_transaction_hash: [u8; 32],
    pub outpoint_index: u32,
    pub outpoint_value: u64,
    pub sequence_number: u32,
}

/// The program state of the Bitcoin Cash instruction set.
///
/// `Clone` is a deep copy: the runtime's `step`/`evaluate`/`debug` clone
/// before mutating, so a caller's state is never observably modified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommonProgramState {
    pub ip: usize,
    pub script: Vec<u8>,
    pub stack: Vec<Vec<u8>>,
    pub error: Option<ScriptError>,
    pub last_code_separator: Option<usize>,
    pub context: TransactionContext,
}

impl CommonProgramState {
    /// Creates the state for one evaluation pass.
    ///
    /// `ip` and the code-separator mark start fresh; only the stack is
    /// carried between the passes of a composed program.
    pub fn new(script: Vec<u8>, stack: Vec<Vec<u8>>, context: TransactionContext) -> Self {
        Self {
            ip: 0,
            script,
            stack,
            error: None,
            last_code_separator: None,
            context,
        }
    }

    /// The script bytes covered by a signature: everything after the most
    /// recent OP_CODESEPARATOR, or the whole script if none has run.
    pub fn script_code(&self) -> &[u8] {
        let begin = self.last_code_separator.unwrap_or(0).min(self.script.len());
        &self.script[begin..]
    }
}

impl MinimumState for CommonProgramState {
    fn ip(&self) -> usize {
        self.ip
    }
    fn ip_mut(&mut self) -> &mut usize {
        &mut self.ip
    }
    fn script(&self) -> &[u8] {
        &self.script
    }
}

impl StackState for CommonProgramState {
    type Item = Vec<u8>;
    fn stack(&self) -> &[Vec<u8>] {
        &self.stack
    }
    fn stack_mut(&mut self) -> &mut Vec<Vec<u8>> {
        &mut self.stack
    }
}

impl ErrorState for CommonProgramState {
    type Error = ScriptError;
    fn error(&self) -> Option<&ScriptError> {
        self.error.as_ref()
    }
    fn set_error(&mut self, error: ScriptError) {
        self.error.get_or_insert(error);
    }
}

impl CodeSeparatorState for CommonProgramState {
    fn last_code_separator(&self) -> Option<usize> {
        self.last_code_separator
    }
    fn set_last_code_separator(&mut self, ip: usize) {
        self.last_code_separator = Some(ip);
    }
}

impl TransactionState for CommonProgramState {
    fn context(&self) -> &TransactionContext {
        &self.context
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with(script: Vec<u8>) -> CommonProgramState {
        CommonProgramState::new(script, vec![], TransactionContext::default())
    }

    #[test]
    fn new_resets_execution_fields() {
        let state = CommonProgramState::new(
            vec![0x51],
            vec![vec![0xaa]],
            TransactionContext::default(),
        );
        assert_eq!(state.ip, 0);
        assert_eq!(state.error, None);
        assert_eq!(state.last_code_separator, None);
        assert_eq!(state.stack, vec![vec![0xaa]]);
    }

    #[test]
    fn error_latches() {
        let mut state = state_with(vec![]);
        state.set_error(ScriptError::EmptyStack);
        state.set_error(ScriptError::FailedVerify);
        assert_eq!(state.error, Some(ScriptError::EmptyStack));
    }

    #[test]
    fn script_code_without_separator_is_whole_script() {
        let state = state_with(vec![0x51, 0x52, 0x53]);
        assert_eq!(state.script_code(), &[0x51, 0x52, 0x53]);
    }

    #[test]
    fn script_code_after_separator() {
        let mut state = state_with(vec![0x51, 0xab, 0x52, 0x53]);
        // OP_CODESEPARATOR at index 1; the operator records the ip just
        // past the opcode.
        state.set_last_code_separator(2);
        assert_eq!(state.script_code(), &[0x52, 0x53]);
    }

    #[test]
    fn clone_is_deep() {
        let original = CommonProgramState::new(
            vec![0x00, 0x01],
            vec![vec![0xaa, 0xbb]],
            TransactionContext::default(),
        );
        let mut copy = original.clone();
        copy.script[0] = 0xff;
        copy.stack[0][0] = 0xff;
        copy.context.transaction_outputs_hash[0] = 0xff;
        assert_eq!(original.script, vec![0x00, 0x01]);
        assert_eq!(original.stack, vec![vec![0xaa, 0xbb]]);
        assert_eq!(original.context.transaction_outputs_hash, [0u8; 32]);
    }
}
