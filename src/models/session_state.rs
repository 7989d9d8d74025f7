use crate::execution::{Completion, ExecutionStrategy};
use std::fmt;

/// Whether a computation is in flight.
///
/// At most one computation runs per session: a trigger is only accepted in
/// [`ExecutionState::Idle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionState {
    #[default]
    Idle,
    Busy,
}

impl ExecutionState {
    pub fn is_busy(&self) -> bool {
        matches!(self, ExecutionState::Busy)
    }
}

impl fmt::Display for ExecutionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionState::Idle => f.write_str("idle"),
            ExecutionState::Busy => f.write_str("busy"),
        }
    }
}

/// State of one page session.
///
/// Owned by the UI context through [`StateManager`](crate::state::StateManager);
/// background code never sees it. Mutations go through
/// [`StateManager::update()`](crate::state::StateManager::update) so change
/// events are emitted.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionState {
    // Runtime state
    pub execution_state: ExecutionState,
    pub active_strategy: Option<ExecutionStrategy>,
    pub active_input: Option<u32>,

    // Presentation
    pub status_text: String,
    pub progress: u8,

    // Results
    pub last_completion: Option<Completion>,
    pub completed_count: usize,
}

impl SessionState {
    /// Mark a computation as dispatched
    pub fn begin(&mut self, strategy: ExecutionStrategy, input: u32) {
        self.execution_state = ExecutionState::Busy;
        self.active_strategy = Some(strategy);
        self.active_input = Some(input);
        self.progress = 0;
    }

    /// Apply a finished computation and return to idle
    pub fn complete(&mut self, completion: Completion) {
        self.execution_state = ExecutionState::Idle;
        self.active_strategy = None;
        self.active_input = None;
        self.progress = 100;
        self.completed_count += 1;
        self.last_completion = Some(completion);
    }

    /// Return to idle without a result (dispatch failed)
    pub fn abort(&mut self) {
        self.execution_state = ExecutionState::Idle;
        self.active_strategy = None;
        self.active_input = None;
        self.progress = 0;
    }

    /// Result of the most recent computation, if any
    pub fn last_result(&self) -> Option<u64> {
        self.last_completion.as_ref().map(|c| c.result)
    }
}
