//! Page-scoped session owned by the UI context.
//!
//! A [`Session`] is created when the page is entered and dropped when it is
//! left. It owns the [`StateManager`], the presenter and the receiving end of
//! the hand-back queue, so everything that touches UI state runs on the one
//! context that owns it. Background work only ever holds a
//! [`UiHandle<Session<P>>`](crate::execution::UiHandle).
//!
//! # State machine
//!
//! ```text
//! Idle --trigger--> Busy --kernel done--> hand-back queued --applied--> Idle
//! ```
//!
//! A trigger while `Busy` is refused with [`TriggerError::Busy`].

use crate::execution::{
    Completion, ExecutionStrategy, NoWakeup, TaskError, TaskHandle, TaskRunner, UiHandle,
    UiQueue, WORKER_THREAD_NAME, Wakeup,
};
use crate::metrics::Metrics;
use crate::models::{ExecutionState, SessionState, Settings};
use crate::services::{
    InputCollector, InputError, cube_by_counting, cube_by_counting_with_progress,
};
use crate::state::{StateChange, StateManager};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::broadcast;

/// Side effects the session asks of the UI.
///
/// No logic lives behind this trait; implementations only write to widgets.
#[cfg_attr(test, mockall::automock)]
pub trait Presenter {
    /// Enable or disable every trigger control
    fn set_triggers_enabled(&mut self, enabled: bool);

    /// Replace the output area text
    fn show_status(&mut self, text: &str);

    /// Show a short-lived notification
    fn show_notification(&mut self, message: &str);

    /// Update the progress indicator (0..=100)
    fn show_progress(&mut self, percent: u8);
}

/// Why a trigger did not start a computation
#[derive(Error, Debug)]
pub enum TriggerError {
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InputError),

    #[error("a computation is already in flight")]
    Busy,

    #[error("failed to start worker thread: {0}")]
    WorkerSpawn(#[from] std::io::Error),
}

/// Session options taken from [`Settings`]
#[derive(Debug, Clone, Copy)]
pub struct SessionOptions {
    pub max_input: u32,
    pub report_progress: bool,
}

impl From<&Settings> for SessionOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            max_input: settings.effective_max_input(),
            report_progress: settings.report_progress,
        }
    }
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self::from(&Settings::default())
    }
}

/// One page's worth of UI-context state and the dispatch logic around it
pub struct Session<P: Presenter + 'static> {
    presenter: P,
    state: StateManager,
    queue: UiQueue<Session<P>>,
    runner: TaskRunner,
    collector: InputCollector,
    report_progress: bool,
    metrics: Arc<Metrics>,
    in_flight_task: Option<TaskHandle>,
}

impl<P: Presenter + 'static> Session<P> {
    /// Create a session for a freshly entered page.
    ///
    /// Triggers start enabled and the state is Idle. Background tasks run on
    /// `tokio_handle`.
    pub fn new(
        presenter: P,
        options: SessionOptions,
        tokio_handle: tokio::runtime::Handle,
        metrics: Arc<Metrics>,
    ) -> Self {
        let mut session = Self {
            presenter,
            state: StateManager::new(),
            queue: UiQueue::new(Arc::new(NoWakeup), Arc::clone(&metrics)),
            runner: TaskRunner::new(tokio_handle),
            collector: InputCollector::new(options.max_input),
            report_progress: options.report_progress,
            metrics,
            in_flight_task: None,
        };
        session.presenter.set_triggers_enabled(true);
        session.presenter.show_progress(0);
        tracing::debug!("Session created (max input {})", session.collector.max_input());
        session
    }

    /// Install the hook that tells the owning event loop to drain hand-backs
    pub fn set_wakeup(&mut self, wakeup: Arc<dyn Wakeup>) {
        self.queue.set_wakeup(wakeup);
    }

    /// Handle for posting work onto this session's UI context
    pub fn ui_handle(&self) -> UiHandle<Self> {
        self.queue.handle()
    }

    pub fn execution_state(&self) -> ExecutionState {
        self.state.read(|s| s.execution_state)
    }

    /// Copy of the current session state
    pub fn state(&self) -> SessionState {
        self.state.snapshot()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.state.subscribe()
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    /// Task handle of the current background-task computation, if any
    pub fn in_flight_task(&self) -> Option<&TaskHandle> {
        self.in_flight_task.as_ref()
    }

    /// Handle a click on the trigger for `strategy`.
    ///
    /// Validates `raw_input`, switches to Busy and dispatches. For
    /// [`ExecutionStrategy::Inline`] the result is applied before this
    /// returns; otherwise it arrives later as a hand-back.
    pub fn trigger(
        &mut self,
        raw_input: &str,
        strategy: ExecutionStrategy,
    ) -> Result<(), TriggerError> {
        if self.execution_state().is_busy() {
            tracing::warn!(
                "Trigger for {} ignored - a computation is already in flight",
                strategy
            );
            self.metrics.record_busy_rejection();
            return Err(TriggerError::Busy);
        }

        let input = match self.collector.parse(raw_input) {
            Ok(input) => input,
            Err(e) => {
                tracing::warn!("Rejected input {:?}: {}", raw_input, e);
                self.metrics.record_input_rejected();
                let changes = self.state.reject_input(e.to_string());
                self.render(&changes);
                return Err(e.into());
            }
        };

        tracing::info!("Starting {} computation for {}", strategy, input);
        self.metrics.record_started(strategy);

        let changes = self.state.begin_computation(strategy, input);
        self.render(&changes);

        if let Err(e) = self.dispatch(strategy, input) {
            tracing::error!("Failed to dispatch {} computation: {}", strategy, e);
            let changes = self
                .state
                .abort_computation(format!("Computation could not start: {}", e));
            self.render(&changes);
            return Err(e);
        }

        Ok(())
    }

    fn dispatch(&mut self, strategy: ExecutionStrategy, input: u32) -> Result<(), TriggerError> {
        match strategy {
            ExecutionStrategy::Inline => {
                // Blocks the UI context for the whole computation
                let start = Instant::now();
                let result = cube_by_counting(input);
                self.finish(Completion {
                    strategy,
                    input,
                    result,
                    elapsed: start.elapsed(),
                });
            }

            ExecutionStrategy::WorkerThread => {
                let ui = self.ui_handle();
                let report_progress = self.report_progress;

                std::thread::Builder::new()
                    .name(WORKER_THREAD_NAME.to_string())
                    .spawn(move || {
                        let start = Instant::now();
                        let result = if report_progress {
                            cube_by_counting_with_progress(input, |percent| {
                                ui.post(move |session: &mut Session<P>| {
                                    session.apply_progress(percent)
                                });
                            })
                        } else {
                            cube_by_counting(input)
                        };
                        let elapsed = start.elapsed();

                        // Explicit hand-back: the result is applied on the UI context
                        ui.post(move |session: &mut Session<P>| {
                            session.finish(Completion {
                                strategy,
                                input,
                                result,
                                elapsed,
                            })
                        });
                    })?;
            }

            ExecutionStrategy::BackgroundTask => {
                let report_progress = self.report_progress;

                let handle = self.runner.submit_with_recovery(
                    self.ui_handle(),
                    move |sink| {
                        let start = Instant::now();
                        let result = if report_progress {
                            cube_by_counting_with_progress(input, |percent| sink.publish(percent))
                        } else {
                            cube_by_counting(input)
                        };
                        (result, start.elapsed())
                    },
                    |session: &mut Session<P>, percent| session.apply_progress(percent),
                    move |session: &mut Session<P>, (result, elapsed)| {
                        session.finish(Completion {
                            strategy,
                            input,
                            result,
                            elapsed,
                        })
                    },
                    |session: &mut Session<P>, error| session.fail(error),
                );

                tracing::debug!("Computation for {} submitted as task {}", input, handle.id());
                self.in_flight_task = Some(handle);
            }
        }

        Ok(())
    }

    fn apply_progress(&mut self, percent: u8) {
        if !self.execution_state().is_busy() {
            tracing::debug!("Dropping progress {}% - no computation in flight", percent);
            return;
        }
        let changes = self.state.update_progress(percent);
        self.render(&changes);
    }

    fn finish(&mut self, completion: Completion) {
        if !self.execution_state().is_busy() {
            tracing::warn!("Ignoring completion for {} - session is idle", completion.input);
            return;
        }

        tracing::info!(
            "{} computation for {} finished: {} ({:?})",
            completion.strategy,
            completion.input,
            completion.result,
            completion.elapsed
        );

        self.metrics.record_completed(completion.elapsed);
        self.in_flight_task = None;

        let changes = self.state.finish_computation(completion);
        self.render(&changes);
    }

    /// Return to Idle after a background task died without a result
    fn fail(&mut self, error: TaskError) {
        if !self.execution_state().is_busy() {
            tracing::warn!("Ignoring failure of an idle session: {}", error);
            return;
        }

        tracing::error!("Computation failed: {}", error);
        self.in_flight_task = None;

        let changes = self
            .state
            .abort_computation(format!("Computation failed: {}", error));
        self.render(&changes);
    }

    /// Apply state changes to the presenter
    fn render(&mut self, changes: &[StateChange]) {
        for change in changes {
            match change {
                StateChange::ExecutionStateChanged { state } => {
                    self.presenter.set_triggers_enabled(!state.is_busy());
                }
                StateChange::ProgressUpdated { percent } => {
                    self.presenter.show_progress(*percent);
                }
                StateChange::StatusChanged { text } => {
                    self.presenter.show_status(text);
                }
                StateChange::InputRejected { reason } => {
                    self.presenter.show_notification(reason);
                }
                StateChange::ComputationStarted { .. }
                | StateChange::ComputationFinished { .. } => {}
            }
        }
    }

    /// Run every hand-back queued so far, in order.
    ///
    /// Returns how many ran. Never blocks.
    pub fn process_hand_backs(&mut self) -> usize {
        let mut processed = 0;
        while let Some(hand_back) = self.queue.try_next() {
            hand_back(self);
            self.metrics.record_hand_back_processed();
            processed += 1;
        }
        if processed > 0 {
            tracing::trace!("Processed {} hand-backs", processed);
        }
        processed
    }

    /// Block until one hand-back arrives (then run it and anything queued behind it).
    ///
    /// Returns `false` on timeout. For headless event loops; must not be
    /// called from inside an async context.
    pub fn wait_for_hand_back(&mut self, timeout: Duration) -> bool {
        let runtime = self.runner.tokio_handle().clone();
        match self.queue.next_blocking(&runtime, timeout) {
            Some(hand_back) => {
                hand_back(self);
                self.metrics.record_hand_back_processed();
                self.process_hand_backs();
                true
            }
            None => false,
        }
    }

    /// Pump hand-backs until the session is Idle or `timeout` elapses.
    ///
    /// Returns whether the session reached Idle.
    pub fn run_until_idle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            self.process_hand_backs();
            if !self.execution_state().is_busy() {
                return true;
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return false;
            }
            self.wait_for_hand_back(remaining);
        }
    }
}

impl<P: Presenter + 'static> Drop for Session<P> {
    fn drop(&mut self) {
        if self.execution_state().is_busy() {
            tracing::warn!(
                "Session closed while a computation is in flight - its result will be dropped"
            );
        }
    }
}
