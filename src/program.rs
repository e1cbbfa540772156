//! Top-level program composition: unlocking script, then locking script,
//! then — for P2SH outputs — the spender-supplied redeem script.
//!
//! The three passes share only the stack contents; the instruction
//! pointer, code-separator mark, and script reset for each pass.

use crate::num::is_true;
use crate::opcodes;
use crate::state::{CommonProgramState, TransactionContext};
use crate::tx::{Output, Transaction};
use crate::vm::{InstructionSet, Step};

/// Banner opening the unlocking-script pass of a trace.
pub const UNLOCKING_BANNER: &str = "Begin unlocking script evaluation.";
/// Banner opening the locking-script pass of a trace.
pub const LOCKING_BANNER: &str = "Begin locking script evaluation.";
/// Banner opening the redeem-script pass of a trace.
pub const P2SH_BANNER: &str = "Begin P2SH script evaluation.";
/// Synthetic step reported when a P2SH unlocking script contains
/// non-push instructions.
pub const P2SH_PUSH_ONLY_ERROR: &str = "P2SH error: unlockingScript must be push-only.";
/// Synthetic step reported when a P2SH unlocking script leaves nothing to
/// use as the redeem script.
pub const P2SH_EMPTY_STACK_ERROR: &str =
    "P2SH error: unlockingScript must not leave an empty stack.";

/// Everything needed to decide whether an input may spend an output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticationProgram {
    pub unlocking_script: Vec<u8>,
    pub locking_script: Vec<u8>,
    pub context: TransactionContext,
}

impl AuthenticationProgram {
    pub fn new(
        unlocking_script: Vec<u8>,
        locking_script: Vec<u8>,
        context: TransactionContext,
    ) -> Self {
        Self {
            unlocking_script,
            locking_script,
            context,
        }
    }

    /// Builds the program validating `transaction`'s input at
    /// `input_index` against the output it spends. Returns `None` if the
    /// index does not name an input.
    pub fn from_transaction(
        transaction: &Transaction,
        input_index: usize,
        source_output: &Output,
        block_height: u32,
        block_time: u32,
    ) -> Option<Self> {
        let context =
            transaction.context_for_input(input_index, source_output, block_height, block_time)?;
        Some(Self {
            unlocking_script: transaction.inputs[input_index].unlocking_script.clone(),
            locking_script: source_output.locking_script.clone(),
            context,
        })
    }
}

/// Whether `locking_script` is the Pay-to-Script-Hash template:
/// `OP_HASH160 <20 bytes> OP_EQUAL`, exactly 23 bytes.
pub fn is_p2sh(locking_script: &[u8]) -> bool {
    locking_script.len() == 23
        && locking_script[0] == opcodes::OP_HASH160
        && locking_script[1] == opcodes::OP_DATA_20
        && locking_script[22] == opcodes::OP_EQUAL
}

/// Whether every top-level instruction of `script` is a push.
///
/// The script is re-scanned at instruction granularity: push payload
/// bytes are skipped rather than tested as opcodes. A truncated push makes
/// the script non-push-only.
pub fn is_push_only(script: &[u8]) -> bool {
    let mut ip = 0;
    while ip < script.len() {
        let opcode = script[ip];
        ip += 1;
        if opcode > opcodes::OP_16 {
            return false;
        }
        let data_length = match opcode {
            opcodes::OP_DATA_1..=opcodes::OP_DATA_75 => opcode as usize,
            opcodes::OP_PUSHDATA1 => match script.get(ip) {
                Some(&length) => {
                    ip += 1;
                    length as usize
                }
                None => return false,
            },
            opcodes::OP_PUSHDATA2 => match script.get(ip..ip + 2) {
                Some(bytes) => {
                    ip += 2;
                    u16::from_le_bytes([bytes[0], bytes[1]]) as usize
                }
                None => return false,
            },
            opcodes::OP_PUSHDATA4 => match script.get(ip..ip + 4) {
                Some(bytes) => {
                    ip += 4;
                    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize
                }
                None => return false,
            },
            _ => 0,
        };
        if data_length > script.len() - ip {
            return false;
        }
        ip += data_length;
    }
    true
}

fn pass_state(
    script: &[u8],
    stack: Vec<Vec<u8>>,
    context: &TransactionContext,
) -> CommonProgramState {
    CommonProgramState::new(script.to_vec(), stack, context.clone())
}

fn synthetic_step(description: &str, state: CommonProgramState) -> Step<CommonProgramState> {
    Step {
        asm: String::new(),
        description: description.to_string(),
        state,
    }
}

/// Debugs a complete authentication program, concatenating the traces of
/// every pass.
///
/// The unlocking script runs on an empty stack; an error there ends the
/// trace. The locking script runs on the resulting stack. When the
/// locking script is the P2SH template, the unlocking script must be
/// push-only and must leave a non-empty stack — violations append a
/// synthetic error step — and the popped top element then runs as the
/// redeem script.
pub fn debug_program(
    instruction_set: &InstructionSet<CommonProgramState>,
    program: &AuthenticationProgram,
) -> Vec<Step<CommonProgramState>> {
    let unlock_state = pass_state(&program.unlocking_script, vec![], &program.context);
    let mut steps = instruction_set.debug(&unlock_state, UNLOCKING_BANNER);

    let unlocked = match steps.last() {
        Some(step) => step.state.clone(),
        None => return steps,
    };
    if unlocked.error.is_some() {
        return steps;
    }

    let lock_state = pass_state(&program.locking_script, unlocked.stack.clone(), &program.context);
    steps.extend(instruction_set.debug(&lock_state, LOCKING_BANNER));

    if is_p2sh(&program.locking_script) {
        let resting = match steps.last() {
            Some(step) => step.state.clone(),
            None => return steps,
        };
        if !is_push_only(&program.unlocking_script) {
            steps.push(synthetic_step(P2SH_PUSH_ONLY_ERROR, resting));
            return steps;
        }
        let mut redeem_stack = unlocked.stack.clone();
        let redeem_script = match redeem_stack.pop() {
            Some(script) => script,
            None => {
                steps.push(synthetic_step(P2SH_EMPTY_STACK_ERROR, resting));
                return steps;
            }
        };
        let p2sh_state = CommonProgramState::new(redeem_script, redeem_stack, program.context.clone());
        steps.extend(instruction_set.debug(&p2sh_state, P2SH_BANNER));
    }

    steps
}

/// Runs the passes without recording a trace. Returns the final pass's
/// state, plus the synthetic P2SH gate failure if one applied.
fn evaluate_passes(
    instruction_set: &InstructionSet<CommonProgramState>,
    program: &AuthenticationProgram,
) -> (CommonProgramState, Option<&'static str>) {
    let unlocked =
        instruction_set.evaluate(&pass_state(&program.unlocking_script, vec![], &program.context));
    if unlocked.error.is_some() {
        return (unlocked, None);
    }

    let locked = instruction_set.evaluate(&pass_state(
        &program.locking_script,
        unlocked.stack.clone(),
        &program.context,
    ));

    if is_p2sh(&program.locking_script) {
        if !is_push_only(&program.unlocking_script) {
            return (locked, Some(P2SH_PUSH_ONLY_ERROR));
        }
        let mut redeem_stack = unlocked.stack;
        let redeem_script = match redeem_stack.pop() {
            Some(script) => script,
            None => return (locked, Some(P2SH_EMPTY_STACK_ERROR)),
        };
        let redeemed = instruction_set.evaluate(&CommonProgramState::new(
            redeem_script,
            redeem_stack,
            program.context.clone(),
        ));
        return (redeemed, None);
    }

    (locked, None)
}

/// The traceless acceptance path: the state the final pass ends in.
///
/// A P2SH gate violation returns the locking-pass state; use
/// [`verify_program`] for the authorization decision.
pub fn evaluate_program(
    instruction_set: &InstructionSet<CommonProgramState>,
    program: &AuthenticationProgram,
) -> CommonProgramState {
    evaluate_passes(instruction_set, program).0
}

/// Whether the program authorizes spending: no gate violation, no error
/// in the final pass, and a truthy top stack element.
pub fn verify_program(
    instruction_set: &InstructionSet<CommonProgramState>,
    program: &AuthenticationProgram,
) -> bool {
    let (state, gate_failure) = evaluate_passes(instruction_set, program);
    gate_failure.is_none()
        && state.error.is_none()
        && state.stack.last().map(|top| is_true(top)).unwrap_or(false)
}
