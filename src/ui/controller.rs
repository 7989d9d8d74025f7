// GUI Controller - wires the Slint window to the computation session
//
// This module contains:
// - SlintPresenter: the Presenter that writes session output to MainWindow
// - GuiController: owns the window and the Session, and routes button clicks
//   and hand-back drains into it
//
// Everything here runs on the Slint event loop thread. The Session lives in an
// Rc<RefCell<_>> because only that thread ever touches it.

use crate::execution::ExecutionStrategy;
use crate::metrics::Metrics;
use crate::models::Settings;
use crate::session::{Presenter, Session, SessionOptions};
use crate::ui::bridge::EventLoopBridge;
use anyhow::{Context, Result};
use slint::{ComponentHandle, Timer, TimerMode};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

// Include the generated Slint code
slint::include_modules!();

/// Convert a 0..=100 percentage to the 0.0..=1.0 range ProgressIndicator expects
fn progress_fraction(percent: u8) -> f32 {
    f32::from(percent.min(100)) / 100.0
}

/// [`Presenter`] backed by the Slint main window
pub struct SlintPresenter {
    ui_weak: slint::Weak<MainWindow>,

    /// Hides the notification banner; restarting it extends the current banner
    notification_timer: Timer,
    notification_duration: Duration,
}

impl SlintPresenter {
    pub fn new(ui: &MainWindow, notification_duration: Duration) -> Self {
        Self {
            ui_weak: ui.as_weak(),
            notification_timer: Timer::default(),
            notification_duration,
        }
    }
}

impl Presenter for SlintPresenter {
    fn set_triggers_enabled(&mut self, enabled: bool) {
        if let Some(ui) = self.ui_weak.upgrade() {
            ui.set_busy(!enabled);
        }
    }

    fn show_status(&mut self, text: &str) {
        if let Some(ui) = self.ui_weak.upgrade() {
            ui.set_output_text(text.into());
        }
    }

    fn show_notification(&mut self, message: &str) {
        let Some(ui) = self.ui_weak.upgrade() else {
            return;
        };

        ui.set_notification_text(message.into());
        ui.set_show_notification(true);

        let ui_weak = self.ui_weak.clone();
        self.notification_timer.start(
            TimerMode::SingleShot,
            self.notification_duration,
            move || {
                if let Some(ui) = ui_weak.upgrade() {
                    ui.set_show_notification(false);
                }
            },
        );
    }

    fn show_progress(&mut self, percent: u8) {
        if let Some(ui) = self.ui_weak.upgrade() {
            ui.set_progress(progress_fraction(percent));
        }
    }
}

/// GUI Controller that owns the window and its computation session
///
/// # Example
/// ```ignore
/// let runtime = tokio::runtime::Runtime::new()?;
/// let metrics = Arc::new(Metrics::new());
/// let settings = Settings::default();
///
/// let controller = GuiController::new(&settings, runtime.handle().clone(), metrics)?;
/// controller.run()?;  // Blocks until window is closed
/// ```
pub struct GuiController {
    /// The Slint UI window
    ui: MainWindow,

    /// Page session; shared with the callbacks registered on `ui`
    session: Rc<RefCell<Session<SlintPresenter>>>,
}

impl GuiController {
    /// Create the window and a fresh session for it
    ///
    /// # Arguments
    /// * `settings` - Loaded user settings (input limits, progress, notification timing)
    /// * `tokio_handle` - Runtime that background tasks are submitted to
    /// * `metrics` - Shared counters, summarized by the caller on shutdown
    pub fn new(
        settings: &Settings,
        tokio_handle: tokio::runtime::Handle,
        metrics: Arc<Metrics>,
    ) -> Result<Self> {
        let ui = MainWindow::new().context("Failed to create Slint UI")?;

        ui.set_inline_label(ExecutionStrategy::Inline.label().into());
        ui.set_worker_label(ExecutionStrategy::WorkerThread.label().into());
        ui.set_task_label(ExecutionStrategy::BackgroundTask.label().into());
        ui.set_input_text(settings.default_input.as_str().into());

        let presenter =
            SlintPresenter::new(&ui, Duration::from_millis(settings.notification_ms));
        let mut session = Session::new(
            presenter,
            SessionOptions::from(settings),
            tokio_handle,
            metrics,
        );

        let bridge = EventLoopBridge::new(&ui, |ui: &MainWindow| ui.invoke_drain_hand_backs());
        session.set_wakeup(Arc::new(bridge));

        let session = Rc::new(RefCell::new(session));

        Self::setup_callbacks(&ui, &session);

        tracing::info!("GUI controller initialized");

        Ok(Self { ui, session })
    }

    /// Run the GUI (blocks until window is closed)
    pub fn run(self) -> Result<(), slint::PlatformError> {
        tracing::info!("Starting GUI event loop");
        let result = self.ui.run();

        // Apply whatever already arrived so the final state is logged correctly
        let drained = self.session.borrow_mut().process_hand_backs();
        if drained > 0 {
            tracing::debug!("Drained {} hand-backs after the event loop stopped", drained);
        }

        result
    }

    /// Set up Slint UI callbacks
    fn setup_callbacks(ui: &MainWindow, session: &Rc<RefCell<Session<SlintPresenter>>>) {
        Self::connect_trigger(ui, session, ExecutionStrategy::Inline);
        Self::connect_trigger(ui, session, ExecutionStrategy::WorkerThread);
        Self::connect_trigger(ui, session, ExecutionStrategy::BackgroundTask);

        let session_clone = Rc::clone(session);
        let ui_weak = ui.as_weak();
        ui.on_drain_hand_backs(move || match session_clone.try_borrow_mut() {
            Ok(mut session) => {
                session.process_hand_backs();
            }
            Err(_) => {
                // Still borrowed by a callback further up the stack; retry on the next turn
                tracing::debug!("Session busy, deferring hand-back drain");
                let ui_weak = ui_weak.clone();
                Timer::single_shot(Duration::from_millis(1), move || {
                    if let Some(ui) = ui_weak.upgrade() {
                        ui.invoke_drain_hand_backs();
                    }
                });
            }
        });

        let session_clone = Rc::clone(session);
        ui.window().on_close_requested(move || {
            let busy = session_clone
                .try_borrow()
                .map(|s| s.execution_state().is_busy())
                .unwrap_or(false);

            if busy {
                tracing::warn!("Close requested while a computation is running - closing anyway");
            } else {
                tracing::info!("Close requested - allowing window to close");
            }

            slint::CloseRequestResponse::HideWindow
        });

        tracing::debug!("UI callbacks configured");
    }

    fn connect_trigger(
        ui: &MainWindow,
        session: &Rc<RefCell<Session<SlintPresenter>>>,
        strategy: ExecutionStrategy,
    ) {
        let session = Rc::clone(session);
        let ui_weak = ui.as_weak();

        let on_click = move || {
            let Some(ui) = ui_weak.upgrade() else {
                return;
            };
            let raw_input = ui.get_input_text();
            tracing::debug!("{} trigger clicked with input {:?}", strategy, raw_input.as_str());

            // Errors are already shown to the user by the session
            if let Err(e) = session.borrow_mut().trigger(raw_input.as_str(), strategy) {
                tracing::debug!("{} trigger did not start: {}", strategy, e);
            }
        };

        match strategy {
            ExecutionStrategy::Inline => ui.on_compute_inline(on_click),
            ExecutionStrategy::WorkerThread => ui.on_compute_worker_thread(on_click),
            ExecutionStrategy::BackgroundTask => ui.on_compute_background_task(on_click),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_fraction() {
        assert_eq!(progress_fraction(0), 0.0);
        assert_eq!(progress_fraction(50), 0.5);
        assert_eq!(progress_fraction(100), 1.0);
        assert_eq!(progress_fraction(250), 1.0);
    }
}
