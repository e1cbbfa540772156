//! The common operators and the Bitcoin Cash instruction set.
//!
//! Every operator is generic over the state facets it consumes, so
//! instruction sets that share those facets can reuse them wholesale.
//! [`common_instruction_set`] wires the full consensus subset over any
//! crypto providers; [`standard_instruction_set`] picks the bundled ones.

use std::sync::Arc;

use crate::crypto::{Ripemd160, Secp256k1Verifier, Sha256};
use crate::crypto::{StandardRipemd160, StandardSha256};
use crate::error::{ScriptError, MAXIMUM_PUSH_LENGTH};
use crate::hex::encode_hex;
use crate::num::{encode_script_num, is_true};
use crate::opcodes;
use crate::sig::{is_valid_public_key_encoding, is_valid_signature_encoding, split_signature};
use crate::sighash::signing_serialization;
use crate::state::{
    CodeSeparatorState, CommonProgramState, ErrorState, MinimumState, StackState,
    TransactionState,
};
use crate::vm::{InstructionSet, Operator, Rendering};

// ── Hooks ────────────────────────────────────────────────────────────────

/// The canonical `before` hook: consume the opcode byte, so operator
/// bodies observe the ip just past their own opcode.
pub fn next_instruction<S: MinimumState>(mut state: S) -> S {
    *state.ip_mut() += 1;
    state
}

/// The canonical `clone` hook: a deep copy via `Clone`.
pub fn clone_state<S: Clone>(state: &S) -> S {
    state.clone()
}

/// The canonical loop predicate: run until an error latches or the
/// instruction pointer leaves the script.
pub fn common_continue<S: MinimumState + ErrorState>(state: &S) -> bool {
    state.error().is_none() && state.ip() < state.script().len()
}

/// Latches `error` and returns the state.
fn fail<S: ErrorState>(mut state: S, error: ScriptError) -> S
where
    S::Error: From<ScriptError>,
{
    state.set_error(error.into());
    state
}

/// The opcode byte the current instruction was dispatched on: the script
/// byte just behind the instruction pointer. Operators that have not moved
/// `ip` themselves may use this to discover their own opcode.
fn current_opcode<S: MinimumState>(state: &S) -> Option<u8> {
    state
        .ip()
        .checked_sub(1)
        .and_then(|index| state.script().get(index))
        .copied()
}

// ── Fallback ─────────────────────────────────────────────────────────────

fn undefined_asm<S: MinimumState>(state: &S) -> String {
    match current_opcode(state) {
        Some(opcode) => format!("0x{opcode:02x}"),
        None => "0x??".to_string(),
    }
}

/// The fallback operator: latches [`ScriptError::UnknownOpcode`].
pub fn undefined_operator<S>() -> Operator<S>
where
    S: MinimumState + ErrorState + 'static,
    S::Error: From<ScriptError>,
{
    Operator::new(
        Rendering::Dynamic(undefined_asm),
        Rendering::fixed("Error: this opcode is not recognized."),
        |state: S| {
            let opcode = current_opcode(&state).unwrap_or(0);
            fail(state, ScriptError::UnknownOpcode(opcode))
        },
    )
}

// ── Push operators ───────────────────────────────────────────────────────

fn pushed_data<S: StackState<Item = Vec<u8>> + ErrorState>(state: &S) -> Option<&[u8]> {
    match state.error() {
        None => state.stack().last().map(Vec::as_slice),
        Some(_) => None,
    }
}

fn push_asm<S: StackState<Item = Vec<u8>> + ErrorState>(state: &S) -> String {
    match pushed_data(state) {
        Some(data) => format!("OP_DATA_{} 0x{}", data.len(), encode_hex(data)),
        None => "OP_DATA".to_string(),
    }
}

fn push_description<S: StackState<Item = Vec<u8>> + ErrorState>(state: &S) -> String {
    match pushed_data(state) {
        Some(data) => format!("Push 0x{} onto the stack.", encode_hex(data)),
        None => "Push failed.".to_string(),
    }
}

fn variable_push_asm<S: StackState<Item = Vec<u8>> + ErrorState>(
    state: &S,
    name: &str,
) -> String {
    match pushed_data(state) {
        Some(data) => format!("{name} 0x{}", encode_hex(data)),
        None => name.to_string(),
    }
}

fn pushdata1_asm<S: StackState<Item = Vec<u8>> + ErrorState>(state: &S) -> String {
    variable_push_asm(state, "OP_PUSHDATA1")
}

fn pushdata2_asm<S: StackState<Item = Vec<u8>> + ErrorState>(state: &S) -> String {
    variable_push_asm(state, "OP_PUSHDATA2")
}

fn pushdata4_asm<S: StackState<Item = Vec<u8>> + ErrorState>(state: &S) -> String {
    variable_push_asm(state, "OP_PUSHDATA4")
}

/// The constant-length pushes, `OP_DATA_1` through `OP_DATA_75`. The
/// opcode byte is the data length.
pub fn op_push_bytes<S>() -> Operator<S>
where
    S: MinimumState + StackState<Item = Vec<u8>> + ErrorState + 'static,
    S::Error: From<ScriptError>,
{
    Operator::new(
        Rendering::Dynamic(push_asm),
        Rendering::Dynamic(push_description),
        |mut state: S| {
            let length = match current_opcode(&state) {
                Some(opcode) => opcode as usize,
                None => return fail(state, ScriptError::MalformedPush),
            };
            let start = state.ip();
            if start + length > state.script().len() {
                return fail(state, ScriptError::MalformedPush);
            }
            let data = state.script()[start..start + length].to_vec();
            state.stack_mut().push(data);
            *state.ip_mut() = start + length;
            state
        },
    )
}

fn variable_push_operation<S>(width: usize, minimum: usize) -> impl Fn(S) -> S + Send + Sync + 'static
where
    S: MinimumState + StackState<Item = Vec<u8>> + ErrorState + 'static,
    S::Error: From<ScriptError>,
{
    move |mut state: S| {
        let start = state.ip();
        let script_len = state.script().len();
        if start + width > script_len {
            return fail(state, ScriptError::MalformedPush);
        }
        let script = state.script();
        let length = match width {
            1 => script[start] as usize,
            2 => u16::from_le_bytes([script[start], script[start + 1]]) as usize,
            _ => u32::from_le_bytes([
                script[start],
                script[start + 1],
                script[start + 2],
                script[start + 3],
            ]) as usize,
        };
        if length > script_len - start - width {
            return fail(state, ScriptError::MalformedPush);
        }
        if length < minimum {
            return fail(state, ScriptError::NonMinimalPush);
        }
        if length > MAXIMUM_PUSH_LENGTH {
            return fail(state, ScriptError::ExceedsMaximumPush);
        }
        let data = state.script()[start + width..start + width + length].to_vec();
        state.stack_mut().push(data);
        *state.ip_mut() = start + width + length;
        state
    }
}

/// OP_PUSHDATA1: 1-byte length prefix, minimum length 76.
pub fn op_push_data_1<S>() -> Operator<S>
where
    S: MinimumState + StackState<Item = Vec<u8>> + ErrorState + 'static,
    S::Error: From<ScriptError>,
{
    Operator::new(
        Rendering::Dynamic(pushdata1_asm),
        Rendering::Dynamic(push_description),
        variable_push_operation(1, 76),
    )
}

/// OP_PUSHDATA2: 2-byte length prefix, minimum length 256.
pub fn op_push_data_2<S>() -> Operator<S>
where
    S: MinimumState + StackState<Item = Vec<u8>> + ErrorState + 'static,
    S::Error: From<ScriptError>,
{
    Operator::new(
        Rendering::Dynamic(pushdata2_asm),
        Rendering::Dynamic(push_description),
        variable_push_operation(2, 256),
    )
}

/// OP_PUSHDATA4: 4-byte length prefix, minimum length 65536.
///
/// The minimum exceeds the 520-byte element cap, so this push can never
/// succeed; it exists to reject it with a precise error.
pub fn op_push_data_4<S>() -> Operator<S>
where
    S: MinimumState + StackState<Item = Vec<u8>> + ErrorState + 'static,
    S::Error: From<ScriptError>,
{
    Operator::new(
        Rendering::Dynamic(pushdata4_asm),
        Rendering::Dynamic(push_description),
        variable_push_operation(4, 65536),
    )
}

/// An OP_N constant: pushes the Script Number `value`.
pub fn op_push_number<S>(name: &'static str, value: i64) -> Operator<S>
where
    S: StackState<Item = Vec<u8>> + 'static,
{
    Operator::new(
        Rendering::fixed(name),
        Rendering::fixed(format!("Push the Script Number {value} onto the stack.")),
        move |mut state: S| {
            state.stack_mut().push(encode_script_num(value));
            state
        },
    )
}

// ── Stack, comparison, and flow operators ────────────────────────────────

fn verify_transition<S>(mut state: S) -> S
where
    S: StackState<Item = Vec<u8>> + ErrorState,
    S::Error: From<ScriptError>,
{
    match state.stack_mut().pop() {
        None => fail(state, ScriptError::EmptyStack),
        Some(top) if is_true(&top) => state,
        Some(_) => fail(state, ScriptError::FailedVerify),
    }
}

fn equal_transition<S>(mut state: S) -> S
where
    S: StackState<Item = Vec<u8>> + ErrorState,
    S::Error: From<ScriptError>,
{
    let b = state.stack_mut().pop();
    let a = state.stack_mut().pop();
    match (a, b) {
        (Some(a), Some(b)) => {
            let result = encode_script_num((a == b) as i64);
            state.stack_mut().push(result);
            state
        }
        _ => fail(state, ScriptError::EmptyStack),
    }
}

/// OP_DUP: push a copy of the top element.
pub fn op_dup<S>() -> Operator<S>
where
    S: StackState<Item = Vec<u8>> + ErrorState + 'static,
    S::Error: From<ScriptError>,
{
    Operator::new(
        Rendering::fixed("OP_DUP"),
        Rendering::fixed("Duplicate the top element of the stack."),
        |mut state: S| {
            let top = state.stack().last().cloned();
            match top {
                Some(top) => {
                    state.stack_mut().push(top);
                    state
                }
                None => fail(state, ScriptError::EmptyStack),
            }
        },
    )
}

/// OP_VERIFY: pop the top element and fail the script unless it is truthy.
pub fn op_verify<S>() -> Operator<S>
where
    S: StackState<Item = Vec<u8>> + ErrorState + 'static,
    S::Error: From<ScriptError>,
{
    Operator::new(
        Rendering::fixed("OP_VERIFY"),
        Rendering::fixed("Pop the top element and fail the script unless it is truthy."),
        verify_transition,
    )
}

/// OP_EQUAL: pop two elements, push 1 if byte-identical, 0 otherwise.
pub fn op_equal<S>() -> Operator<S>
where
    S: StackState<Item = Vec<u8>> + ErrorState + 'static,
    S::Error: From<ScriptError>,
{
    Operator::new(
        Rendering::fixed("OP_EQUAL"),
        Rendering::fixed("Pop two elements and push whether they are byte-identical."),
        equal_transition,
    )
}

/// OP_EQUALVERIFY: OP_EQUAL followed by OP_VERIFY, composed semantically.
pub fn op_equal_verify<S>() -> Operator<S>
where
    S: StackState<Item = Vec<u8>> + ErrorState + 'static,
    S::Error: From<ScriptError>,
{
    Operator::new(
        Rendering::fixed("OP_EQUALVERIFY"),
        Rendering::fixed("Pop two elements and fail the script unless they are byte-identical."),
        |state: S| {
            let state = equal_transition(state);
            if state.error().is_some() {
                return state;
            }
            verify_transition(state)
        },
    )
}

// ── Crypto operators ─────────────────────────────────────────────────────

/// OP_HASH160: pop the top element, push its RIPEMD-160 of SHA-256.
pub fn op_hash160<S>(sha256: Arc<dyn Sha256>, ripemd160: Arc<dyn Ripemd160>) -> Operator<S>
where
    S: StackState<Item = Vec<u8>> + ErrorState + 'static,
    S::Error: From<ScriptError>,
{
    Operator::new(
        Rendering::fixed("OP_HASH160"),
        Rendering::fixed("Pop the top element and push its RIPEMD-160 of SHA-256."),
        move |mut state: S| match state.stack_mut().pop() {
            Some(top) => {
                let digest = ripemd160.hash(&sha256.hash(&top));
                state.stack_mut().push(digest.to_vec());
                state
            }
            None => fail(state, ScriptError::EmptyStack),
        },
    )
}

/// OP_CODESEPARATOR: restrict the script bytes covered by later signature
/// checks to those after this instruction.
pub fn op_code_separator<S>() -> Operator<S>
where
    S: MinimumState + CodeSeparatorState + 'static,
{
    Operator::new(
        Rendering::fixed("OP_CODESEPARATOR"),
        Rendering::fixed("Mark this position; later signature checks cover only the bytes after it."),
        |mut state: S| {
            let ip = state.ip();
            state.set_last_code_separator(ip);
            state
        },
    )
}

/// OP_CHECKSIG: pop a public key and a signature, push whether the
/// signature signs this transaction's signing serialization.
pub fn op_check_sig<S>(
    sha256: Arc<dyn Sha256>,
    secp256k1: Arc<dyn Secp256k1Verifier>,
) -> Operator<S>
where
    S: MinimumState
        + StackState<Item = Vec<u8>>
        + ErrorState
        + CodeSeparatorState
        + TransactionState
        + 'static,
    S::Error: From<ScriptError>,
{
    Operator::new(
        Rendering::fixed("OP_CHECKSIG"),
        Rendering::fixed(
            "Pop a public key and a signature; push whether the signature signs this transaction.",
        ),
        move |mut state: S| {
            let public_key = match state.stack_mut().pop() {
                Some(key) => key,
                None => return fail(state, ScriptError::EmptyStack),
            };
            let signature = match state.stack_mut().pop() {
                Some(sig) => sig,
                None => return fail(state, ScriptError::EmptyStack),
            };
            if !is_valid_public_key_encoding(&public_key) {
                return fail(state, ScriptError::InvalidPublicKeyEncoding);
            }
            if !is_valid_signature_encoding(&signature) {
                return fail(state, ScriptError::InvalidSignatureEncoding);
            }

            let (der, sighash_type) = split_signature(&signature);
            let begin = state
                .last_code_separator()
                .unwrap_or(0)
                .min(state.script().len());
            let script_code = state.script()[begin..].to_vec();
            let preimage = signing_serialization(state.context(), &script_code, sighash_type);
            let digest = sha256.hash(&sha256.hash(&preimage));

            let valid = secp256k1.verify_signature_der_low_s(der, &public_key, &digest);
            state.stack_mut().push(encode_script_num(valid as i64));
            state
        },
    )
}

// ── Instruction set assembly ─────────────────────────────────────────────

const NUMBER_OPCODE_NAMES: [&str; 16] = [
    "OP_1", "OP_2", "OP_3", "OP_4", "OP_5", "OP_6", "OP_7", "OP_8", "OP_9", "OP_10", "OP_11",
    "OP_12", "OP_13", "OP_14", "OP_15", "OP_16",
];

/// Assembles the Bitcoin Cash instruction set over the given crypto
/// providers.
pub fn common_instruction_set(
    sha256: Arc<dyn Sha256>,
    ripemd160: Arc<dyn Ripemd160>,
    secp256k1: Arc<dyn Secp256k1Verifier>,
) -> InstructionSet<CommonProgramState> {
    let mut set = InstructionSet::new(
        next_instruction,
        clone_state,
        common_continue,
        undefined_operator(),
    );

    set.define(opcodes::OP_0, op_push_number("OP_0", 0));
    set.define(opcodes::OP_1NEGATE, op_push_number("OP_1NEGATE", -1));
    for (index, name) in NUMBER_OPCODE_NAMES.iter().enumerate() {
        set.define(
            opcodes::OP_1 + index as u8,
            op_push_number(name, index as i64 + 1),
        );
    }

    for opcode in opcodes::OP_DATA_1..=opcodes::OP_DATA_75 {
        set.define(opcode, op_push_bytes());
    }
    set.define(opcodes::OP_PUSHDATA1, op_push_data_1());
    set.define(opcodes::OP_PUSHDATA2, op_push_data_2());
    set.define(opcodes::OP_PUSHDATA4, op_push_data_4());

    set.define(opcodes::OP_VERIFY, op_verify());
    set.define(opcodes::OP_DUP, op_dup());
    set.define(opcodes::OP_EQUAL, op_equal());
    set.define(opcodes::OP_EQUALVERIFY, op_equal_verify());
    set.define(
        opcodes::OP_HASH160,
        op_hash160(Arc::clone(&sha256), ripemd160),
    );
    set.define(opcodes::OP_CODESEPARATOR, op_code_separator());
    set.define(opcodes::OP_CHECKSIG, op_check_sig(sha256, secp256k1));

    set
}

/// [`common_instruction_set`] over the bundled providers.
///
/// Signature verification is real when the `secp256k1` feature is enabled
/// and a stub that accepts every well-encoded signature otherwise.
pub fn standard_instruction_set() -> InstructionSet<CommonProgramState> {
    #[cfg(feature = "secp256k1")]
    let verifier: Arc<dyn Secp256k1Verifier> = Arc::new(crate::crypto::StandardSecp256k1);
    #[cfg(not(feature = "secp256k1"))]
    let verifier: Arc<dyn Secp256k1Verifier> = Arc::new(crate::crypto::StubSecp256k1);

    common_instruction_set(
        Arc::new(StandardSha256),
        Arc::new(StandardRipemd160),
        verifier,
    )
}
