//! The runtime is instruction-set-generic: these tests drive it with a
//! toy counter VM (integer stack, five opcodes) and then check the
//! clone/step/debug laws against the consensus instruction set.

use bch_script_vm::error::ScriptError;
use bch_script_vm::ops::standard_instruction_set;
use bch_script_vm::state::{CommonProgramState, MinimumState, TransactionContext};
use bch_script_vm::vm::{InstructionSet, Operator, Rendering};

// ---------------------------------------------------------------------------
// A toy VM: integer stack, no errors, five opcodes
// ---------------------------------------------------------------------------

const OP_ZERO: u8 = 0;
const OP_INC: u8 = 1;
const OP_DEC: u8 = 2;
const OP_ADD: u8 = 3;
const OP_MARK: u8 = 171;

#[derive(Debug, Clone, PartialEq, Eq)]
struct CounterState {
    ip: usize,
    script: Vec<u8>,
    stack: Vec<i64>,
}

impl CounterState {
    fn new(script: Vec<u8>) -> Self {
        Self {
            ip: 0,
            script,
            stack: vec![],
        }
    }
}

impl MinimumState for CounterState {
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

fn counter_op(
    name: &'static str,
    operation: impl Fn(CounterState) -> CounterState + Send + Sync + 'static,
) -> Operator<CounterState> {
    Operator::new(Rendering::fixed(name), Rendering::fixed(name), operation)
}

fn counter_instruction_set() -> InstructionSet<CounterState> {
    let mut set = InstructionSet::new(
        |mut state: CounterState| {
            state.ip += 1;
            state
        },
        CounterState::clone,
        |state: &CounterState| state.ip < state.script.len(),
        counter_op("??", |state| state),
    );
    set.define(
        OP_ZERO,
        counter_op("ZERO", |mut state| {
            state.stack.push(0);
            state
        }),
    );
    set.define(
        OP_INC,
        counter_op("INC", |mut state| {
            if let Some(top) = state.stack.last_mut() {
                *top += 1;
            }
            state
        }),
    );
    set.define(
        OP_DEC,
        counter_op("DEC", |mut state| {
            if let Some(top) = state.stack.last_mut() {
                *top -= 1;
            }
            state
        }),
    );
    set.define(
        OP_ADD,
        counter_op("ADD", |mut state| {
            if let (Some(b), Some(a)) = (state.stack.pop(), state.stack.pop()) {
                state.stack.push(a + b);
            }
            state
        }),
    );
    set.define(OP_MARK, counter_op("MARK", |state| state));
    set
}

#[test]
fn counter_vm_evaluates() {
    let set = counter_instruction_set();
    let state = CounterState::new(vec![0, 1, 1, 171, 0, 2, 3]);
    let result = set.evaluate(&state);
    assert_eq!(result.ip, 7);
    assert_eq!(result.stack, vec![1]);
}

#[test]
fn counter_vm_debug_trace() {
    let set = counter_instruction_set();
    let state = CounterState::new(vec![0, 1, 1, 171, 0, 2, 3]);
    let steps = set.debug(&state, "Begin script evaluation.");

    assert_eq!(steps.len(), 8);
    assert_eq!(steps[0].description, "Begin script evaluation.");
    let stacks: Vec<Vec<i64>> = steps.iter().map(|step| step.state.stack.clone()).collect();
    assert_eq!(
        stacks,
        vec![
            vec![],
            vec![0],
            vec![1],
            vec![2],
            vec![2],
            vec![2, 0],
            vec![2, -1],
            vec![1],
        ]
    );
    assert_eq!(steps[4].asm, "MARK");
    assert_eq!(steps[7].state.ip, 7);
}

#[test]
fn counter_vm_single_steps() {
    let set = counter_instruction_set();
    let state = CounterState::new(vec![0, 1]);
    let one = set.step(&state);
    assert_eq!(one.stack, vec![0]);
    assert_eq!(one.ip, 1);
    let two = set.step(&one);
    assert_eq!(two.stack, vec![1]);
    // the inputs are untouched
    assert_eq!(state.stack, Vec::<i64>::new());
    assert_eq!(one.stack, vec![0]);
}

// ---------------------------------------------------------------------------
// VM laws, driven through the consensus instruction set
// ---------------------------------------------------------------------------

fn common_state(script: Vec<u8>) -> CommonProgramState {
    CommonProgramState::new(script, vec![], TransactionContext::default())
}

#[test]
fn step_equals_step_mutate_of_clone() {
    let set = standard_instruction_set();
    let state = common_state(vec![0x51, 0x51, 0x87]);
    let stepped = set.step(&state);
    let mutated = set.step_mutate(state.clone());
    assert_eq!(stepped, mutated);
}

#[test]
fn step_and_evaluate_leave_the_original_untouched() {
    let set = standard_instruction_set();
    let state = common_state(vec![0x51, 0x51, 0x87]);
    let pristine = state.clone();

    let _ = set.step(&state);
    assert_eq!(state, pristine);
    let _ = set.evaluate(&state);
    assert_eq!(state, pristine);
    let _ = set.debug(&state, "Begin script evaluation.");
    assert_eq!(state, pristine);
}

#[test]
fn evaluate_matches_final_debug_state() {
    let set = standard_instruction_set();
    for script in [
        vec![],
        vec![0x51, 0x51, 0x87],
        vec![0x76],
        vec![0x4c, 0x02, 0xaa, 0xbb],
        vec![0x03, 0xaa, 0xbb, 0xcc],
    ] {
        let state = common_state(script);
        let evaluated = set.evaluate(&state);
        let steps = set.debug(&state, "Begin script evaluation.");
        assert_eq!(evaluated, steps.last().unwrap().state);
    }
}

#[test]
fn errors_latch_and_freeze_the_state() {
    let set = standard_instruction_set();
    let state = common_state(vec![0x76, 0x51, 0x51]);

    let failed = set.step(&state);
    assert_eq!(failed.error, Some(ScriptError::EmptyStack));

    // every further step is a no-op
    let frozen = set.step(&failed);
    assert_eq!(frozen, failed);
    let frozen_again = set.step_mutate(frozen.clone());
    assert_eq!(frozen_again, failed);
}

#[test]
fn debug_renders_push_and_opcode_asm() {
    let set = standard_instruction_set();
    let state = common_state(vec![0x51, 0x02, 0xaa, 0xbb, 0x76]);
    let steps = set.debug(&state, "Begin script evaluation.");

    assert_eq!(steps.len(), 4);
    assert_eq!(steps[0].asm, "");
    assert_eq!(steps[1].asm, "OP_1");
    assert_eq!(steps[2].asm, "OP_DATA_2 0xaabb");
    assert_eq!(steps[2].description, "Push 0xaabb onto the stack.");
    assert_eq!(steps[3].asm, "OP_DUP");
}

#[test]
fn debug_renders_unknown_opcodes_as_bytes() {
    let set = standard_instruction_set();
    let state = common_state(vec![0x6a]);
    let steps = set.debug(&state, "Begin script evaluation.");
    assert_eq!(steps.len(), 2);
    assert_eq!(steps[1].asm, "0x6a");
    assert_eq!(steps[1].state.error, Some(ScriptError::UnknownOpcode(0x6a)));
}

#[test]
fn clone_isolation_for_scripts_stacks_and_hashes() {
    let mut context = TransactionContext::default();
    context.transaction_outpoints_hash = [0x11; 32];
    let original = CommonProgramState::new(vec![0x51, 0x52], vec![vec![0xaa]], context);

    let mut copy = original.clone();
    copy.script[0] = 0x00;
    copy.stack[0][0] = 0x00;
    copy.stack.push(vec![0xff]);
    copy.context.transaction_outpoints_hash[0] = 0xff;
    copy.context.corresponding_output_hash[31] = 0xff;

    assert_eq!(original.script, vec![0x51, 0x52]);
    assert_eq!(original.stack, vec![vec![0xaa]]);
    assert_eq!(original.context.transaction_outpoints_hash, [0x11; 32]);
    assert_eq!(original.context.corresponding_output_hash, [0x00; 32]);
}
