// LongCalc - runs a deliberately slow computation three different ways
//
// This is the library crate containing the compute kernel, the execution
// strategies and the session that ties them to the UI.
// The binary crate (main.rs) provides the GUI entry point.

pub mod config;
pub mod execution;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
pub mod session;
pub mod state;
pub mod ui;

// Re-export commonly used types for convenience
pub use config::ConfigManager;
pub use execution::{Completion, ExecutionStrategy};
pub use metrics::Metrics;
pub use models::{ExecutionState, SessionState, Settings, UserConfig};
pub use session::{Presenter, Session, SessionOptions, TriggerError};
pub use state::{StateChange, StateManager};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
