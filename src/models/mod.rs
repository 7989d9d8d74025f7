//! Data models for LongCalc.
//!
//! - [`SessionState`]: state of one page session (execution state, status, last result)
//! - [`ExecutionState`]: the Idle/Busy gate that keeps one computation in flight
//! - [`UserConfig`] / [`Settings`]: user preferences loaded from `LongCalc Settings.yaml`
//!
//! `SessionState` is owned by the UI context through
//! [`StateManager`](crate::state::StateManager); it is never shared with
//! background threads.

pub mod config;
pub mod session_state;

pub use config::{Settings, UserConfig};
pub use session_state::{ExecutionState, SessionState};
