//! Outcome types for a single dispatch step and for a whole call into the
//! step loop. Grounded on the `ExecuteState`/`ProgramState` split in
//! `fuel-vm/src/state.rs` and `fuel-vm/src/interpreter/executors/state.rs`:
//! one small enum per instruction, one richer enum per call.

use crate::error::Fault;

/// Result of dispatching a single instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecuteState {
    /// Keep stepping.
    Proceed,
    /// `HALT` was executed.
    Halted,
    /// `RET` popped an empty return stack: the call into the step loop ends
    /// here, normally (this is how a word returns control to its caller).
    Returned,
}

impl Default for ExecuteState {
    fn default() -> Self {
        Self::Proceed
    }
}

/// Result of a whole call into [`crate::Interpreter::run`] (one or more
/// dispatch steps, ending in halt, an empty-stack return, or an unhandled
/// fault). A cycle-budget trip is not a separate outcome here: it surfaces
/// as `Fault::MaxCycles`, vectored to `$irqerr` the same as any other fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramState {
    /// The program voluntarily returned (outermost `RET`) without halting.
    Returned,
    /// `HALT` executed.
    Halted,
}

/// Outcome of running the machine, parameterized the way a host embedder
/// observes it: either it kept running to one of the above end states, or a
/// fault escaped with nowhere left to vector to.
pub type RunResult = Result<ProgramState, Fault>;
