//! The instruction-set-generic dispatch loop.
//!
//! An [`InstructionSet`] bundles a 256-entry operator table with three
//! hooks: `before` (runs ahead of every instruction and canonically
//! advances `ip` past the opcode byte), `clone_state` (deep copy), and
//! `continues` (the loop predicate). The runtime itself never fails —
//! every failure is data inside the state, and a halted state steps to
//! itself.

use std::sync::Arc;

use crate::state::MinimumState;

/// How an operator renders itself for a debug trace: either a fixed
/// string, or a function of the post-instruction state.
pub enum Rendering<S> {
    /// A constant rendering.
    Static(String),
    /// A rendering computed from the state the operator produced.
    Dynamic(fn(&S) -> String),
}

impl<S> Rendering<S> {
    /// A constant rendering, from anything string-like.
    pub fn fixed(text: impl Into<String>) -> Self {
        Rendering::Static(text.into())
    }

    /// Evaluates the rendering against a state.
    pub fn render(&self, state: &S) -> String {
        match self {
            Rendering::Static(text) => text.clone(),
            Rendering::Dynamic(render) => render(state),
        }
    }
}

impl<S> Clone for Rendering<S> {
    fn clone(&self) -> Self {
        match self {
            Rendering::Static(text) => Rendering::Static(text.clone()),
            Rendering::Dynamic(render) => Rendering::Dynamic(*render),
        }
    }
}

/// A single instruction: its trace renderings and its state transition.
pub struct Operator<S> {
    /// The assembly rendering of the instruction.
    pub asm: Rendering<S>,
    /// A human-readable account of what the instruction did.
    pub description: Rendering<S>,
    operation: Arc<dyn Fn(S) -> S + Send + Sync>,
}

impl<S> Operator<S> {
    /// Builds an operator from its renderings and state transition.
    pub fn new(
        asm: Rendering<S>,
        description: Rendering<S>,
        operation: impl Fn(S) -> S + Send + Sync + 'static,
    ) -> Self {
        Self {
            asm,
            description,
            operation: Arc::new(operation),
        }
    }
}

impl<S> Clone for Operator<S> {
    fn clone(&self) -> Self {
        Self {
            asm: self.asm.clone(),
            description: self.description.clone(),
            operation: Arc::clone(&self.operation),
        }
    }
}

/// One entry of a debug trace: a snapshot of the state after an
/// instruction, tagged with that instruction's renderings. The first entry
/// of a trace is synthetic (a banner with the initial state).
#[derive(Debug, Clone)]
pub struct Step<S> {
    pub asm: String,
    pub description: String,
    pub state: S,
}

/// A complete instruction set: hooks plus the opcode dispatch table.
///
/// The table holds all 256 entries, pre-filled with the `undefined`
/// fallback operator and overwritten per known opcode, so dispatch is a
/// single index.
pub struct InstructionSet<S> {
    operators: Vec<Operator<S>>,
    undefined: Operator<S>,
    before: fn(S) -> S,
    clone_state: fn(&S) -> S,
    continues: fn(&S) -> bool,
}

impl<S: MinimumState> InstructionSet<S> {
    /// Creates an instruction set where every opcode dispatches to
    /// `undefined`. Known opcodes are then added with [`define`].
    ///
    /// [`define`]: InstructionSet::define
    pub fn new(
        before: fn(S) -> S,
        clone_state: fn(&S) -> S,
        continues: fn(&S) -> bool,
        undefined: Operator<S>,
    ) -> Self {
        Self {
            operators: vec![undefined.clone(); 256],
            undefined,
            before,
            clone_state,
            continues,
        }
    }

    /// Installs `operator` for `opcode`, replacing the previous entry.
    pub fn define(&mut self, opcode: u8, operator: Operator<S>) -> &mut Self {
        self.operators[opcode as usize] = operator;
        self
    }

    /// The operator the current state dispatches to: the table entry for
    /// the byte at `ip - 1` (the byte `before` just consumed). Out-of-range
    /// reads fall back to the undefined operator.
    fn operator(&self, state: &S) -> &Operator<S> {
        state
            .ip()
            .checked_sub(1)
            .and_then(|index| state.script().get(index))
            .map(|&opcode| &self.operators[opcode as usize])
            .unwrap_or(&self.undefined)
    }

    /// Advances the state by one instruction, in place.
    ///
    /// Applies `before`, then dispatches on the consumed opcode byte. A
    /// halted state (the loop predicate is false) is returned unchanged,
    /// so an error latched by one instruction is final.
    pub fn step_mutate(&self, state: S) -> S {
        if !(self.continues)(&state) {
            return state;
        }
        let state = (self.before)(state);
        let operator = self.operator(&state);
        (operator.operation)(state)
    }

    /// Advances a copy of the state by one instruction.
    ///
    /// Equivalent to `step_mutate(clone(state))`; the caller's state is
    /// untouched.
    pub fn step(&self, state: &S) -> S {
        self.step_mutate((self.clone_state)(state))
    }

    /// Runs a copy of the state to completion and returns the final state.
    pub fn evaluate(&self, state: &S) -> S {
        let mut current = (self.clone_state)(state);
        while (self.continues)(&current) {
            current = self.step_mutate(current);
        }
        current
    }

    /// Runs a copy of the state to completion, recording every
    /// intermediate state.
    ///
    /// The trace opens with a synthetic step carrying `initial_description`
    /// and the untouched initial state; each subsequent entry snapshots the
    /// state after one instruction, with the instruction's renderings
    /// evaluated against that post-instruction state. The final entry's
    /// state equals what [`evaluate`] returns.
    ///
    /// [`evaluate`]: InstructionSet::evaluate
    pub fn debug(&self, state: &S, initial_description: &str) -> Vec<Step<S>> {
        let mut steps = vec![Step {
            asm: String::new(),
            description: initial_description.to_string(),
            state: (self.clone_state)(state),
        }];

        let mut current = (self.clone_state)(state);
        while (self.continues)(&current) {
            let entered = (self.before)(current);
            let operator = self.operator(&entered);
            let next = (operator.operation)(entered);
            steps.push(Step {
                asm: operator.asm.render(&next),
                description: operator.description.render(&next),
                state: (self.clone_state)(&next),
            });
            current = next;
        }

        steps
    }
}

/// The default banner for a single-script debug trace.
pub const DEFAULT_DEBUG_BANNER: &str = "Begin script evaluation.";
