// State management module
//
// This module provides the StateManager which owns a session's SessionState and
// emits change events. It lives on the UI context and is mutated only there, so
// it needs no lock; background work reaches it only through hand-backs.

use crate::execution::{Completion, ExecutionStrategy};
use crate::models::{ExecutionState, SessionState};
use tokio::sync::broadcast;

/// Change events emitted when session state is modified
///
/// The session renders these onto its presenter, and any number of observers
/// can subscribe to them (logging, tests).
#[derive(Clone, Debug, PartialEq)]
pub enum StateChange {
    /// Idle/Busy gate toggled
    ExecutionStateChanged {
        state: ExecutionState,
    },

    /// A computation was dispatched
    ComputationStarted {
        strategy: ExecutionStrategy,
        input: u32,
    },

    /// Background progress, in percent
    ProgressUpdated {
        percent: u8,
    },

    /// Output text changed
    StatusChanged {
        text: String,
    },

    /// A result was handed back and applied
    ComputationFinished {
        completion: Completion,
    },

    /// Input was refused before dispatch
    InputRejected {
        reason: String,
    },
}

/// Session state holder with event emission
///
/// - Owns [`SessionState`] directly; `&mut self` is the only write path
/// - Detects state changes and emits [`StateChange`] events
/// - Supports subscribing to state changes via tokio broadcast channels
///
/// # Usage
///
/// - [`read()`](Self::read) for reading state
/// - [`update()`](Self::update) for mutations with automatic event emission
/// - [`subscribe()`](Self::subscribe) for listening to state changes
pub struct StateManager {
    state: SessionState,

    /// Broadcast channel for emitting state change events
    state_tx: broadcast::Sender<StateChange>,
}

impl StateManager {
    /// Create a new StateManager with default state
    ///
    /// # Returns
    /// A new StateManager with a broadcast channel buffer of 256 events
    pub fn new() -> Self {
        let (state_tx, _) = broadcast::channel(256);
        Self {
            state: SessionState::default(),
            state_tx,
        }
    }

    /// Get a copy of the current state
    pub fn snapshot(&self) -> SessionState {
        self.state.clone()
    }

    /// Execute a function with read access to the state
    ///
    /// # Example
    /// ```ignore
    /// let busy = state_manager.read(|state| state.execution_state.is_busy());
    /// ```
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&SessionState) -> R,
    {
        f(&self.state)
    }

    /// Update the state and emit change events
    ///
    /// 1. Captures the old state
    /// 2. Applies the update function
    /// 3. Detects what changed
    /// 4. Emits appropriate events
    ///
    /// # Returns
    /// The StateChange events that were emitted, in emission order
    pub fn update<F>(&mut self, update_fn: F) -> Vec<StateChange>
    where
        F: FnOnce(&mut SessionState),
    {
        let old_state = self.state.clone();

        update_fn(&mut self.state);

        let changes = Self::detect_changes(&old_state, &self.state);

        for change in &changes {
            // Ignore send errors - it's OK if no one is listening
            let _ = self.state_tx.send(change.clone());
        }

        changes
    }

    /// Subscribe to state change events
    ///
    /// Returns a receiver that will get notified of all future state changes.
    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.state_tx.subscribe()
    }

    fn detect_changes(old: &SessionState, new: &SessionState) -> Vec<StateChange> {
        let mut changes = Vec::new();

        if old.execution_state != new.execution_state {
            changes.push(StateChange::ExecutionStateChanged {
                state: new.execution_state,
            });

            if new.execution_state.is_busy() {
                if let (Some(strategy), Some(input)) = (new.active_strategy, new.active_input) {
                    changes.push(StateChange::ComputationStarted { strategy, input });
                }
            }
        }

        if old.progress != new.progress {
            changes.push(StateChange::ProgressUpdated {
                percent: new.progress,
            });
        }

        if old.status_text != new.status_text {
            changes.push(StateChange::StatusChanged {
                text: new.status_text.clone(),
            });
        }

        if old.completed_count != new.completed_count {
            if let Some(ref completion) = new.last_completion {
                changes.push(StateChange::ComputationFinished {
                    completion: completion.clone(),
                });
            }
        }

        changes
    }

    // Convenience methods for common state updates

    /// Dispatch bookkeeping: Busy, progress reset, start message
    pub fn begin_computation(
        &mut self,
        strategy: ExecutionStrategy,
        input: u32,
    ) -> Vec<StateChange> {
        self.update(|state| {
            state.begin(strategy, input);
            state.status_text = crate::execution::started_text(input);
        })
    }

    /// Apply a handed-back result and return to Idle
    pub fn finish_computation(&mut self, completion: Completion) -> Vec<StateChange> {
        let status = completion.status_text();
        self.update(|state| {
            state.complete(completion);
            state.status_text = status;
        })
    }

    /// Return to Idle without a result
    pub fn abort_computation(&mut self, status: String) -> Vec<StateChange> {
        self.update(|state| {
            state.abort();
            state.status_text = status;
        })
    }

    /// Record background progress
    pub fn update_progress(&mut self, percent: u8) -> Vec<StateChange> {
        self.update(|state| {
            state.progress = percent.min(100);
        })
    }

    /// Record a refused input; state is otherwise untouched
    pub fn reject_input(&mut self, reason: String) -> Vec<StateChange> {
        let event = StateChange::InputRejected { reason };
        let _ = self.state_tx.send(event.clone());
        vec![event]
    }
}

impl Default for StateManager {
    fn default() -> Self {
        Self::new()
    }
}
