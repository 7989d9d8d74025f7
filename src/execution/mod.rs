//! Execution strategies and the plumbing that moves results back to the UI context.
//!
//! - [`ExecutionStrategy`]: where the Compute Kernel runs (inline, worker thread, managed task)
//! - [`Completion`]: the value a finished computation hands back
//! - [`hand_back`]: the serialized FIFO queue the UI context drains
//! - [`task_runner`]: the managed background-task primitive
//!
//! The dispatch itself lives in [`crate::session::Session::trigger`], which owns
//! the state the hand-backs mutate.

pub mod hand_back;
pub mod task_runner;

pub use hand_back::{HandBack, NoWakeup, UiHandle, UiQueue, Wakeup};
pub use task_runner::{ProgressSink, TaskError, TaskHandle, TaskRunner};

use std::fmt;
use std::time::Duration;

/// Name given to threads spawned by [`ExecutionStrategy::WorkerThread`]
pub const WORKER_THREAD_NAME: &str = "longcalc-worker";

/// How a computation is run relative to the UI context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExecutionStrategy {
    /// Runs on the calling (UI) context and blocks it until done
    Inline,

    /// Runs on a dedicated thread that explicitly posts its result back
    WorkerThread,

    /// Runs through [`TaskRunner`], which posts the completion automatically
    BackgroundTask,
}

impl ExecutionStrategy {
    pub const ALL: [ExecutionStrategy; 3] = [
        ExecutionStrategy::Inline,
        ExecutionStrategy::WorkerThread,
        ExecutionStrategy::BackgroundTask,
    ];

    /// Whether the UI context is blocked while the kernel runs
    pub fn blocks_ui(&self) -> bool {
        matches!(self, ExecutionStrategy::Inline)
    }

    /// Button caption
    pub fn label(&self) -> &'static str {
        match self {
            ExecutionStrategy::Inline => "Compute on UI thread",
            ExecutionStrategy::WorkerThread => "Compute on worker thread",
            ExecutionStrategy::BackgroundTask => "Compute in background task",
        }
    }
}

impl fmt::Display for ExecutionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExecutionStrategy::Inline => "inline",
            ExecutionStrategy::WorkerThread => "worker-thread",
            ExecutionStrategy::BackgroundTask => "background-task",
        };
        f.write_str(name)
    }
}

/// Outcome of one computation, consumed once by the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub strategy: ExecutionStrategy,
    pub input: u32,
    pub result: u64,
    pub elapsed: Duration,
}

impl Completion {
    /// Elapsed time in whole seconds (truncated)
    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed.as_secs()
    }

    /// Text shown in the output area once the result is back
    pub fn status_text(&self) -> String {
        match self.strategy {
            ExecutionStrategy::Inline => format!("Result computed: {}", self.result),
            ExecutionStrategy::WorkerThread => format!(
                "Result computed: {}\nElapsed: {} secs",
                self.result,
                self.elapsed_secs()
            ),
            ExecutionStrategy::BackgroundTask => {
                format!("Result computed in background task: {}", self.result)
            }
        }
    }
}

/// Text shown in the output area when a computation is dispatched
pub fn started_text(input: u32) -> String {
    format!("Computation for {} started ...", input)
}
