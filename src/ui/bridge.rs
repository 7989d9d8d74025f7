// EventLoopBridge - wakes the Slint event loop when hand-backs are queued
//
// Background threads post hand-backs to the session's queue. Slint's event loop
// does not watch that queue, so after each post the bridge schedules a drain
// callback on the event loop thread via `upgrade_in_event_loop`. Several posts
// in a row coalesce into a single scheduled drain.

use crate::execution::Wakeup;
use slint::{ComponentHandle, Weak};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// [`Wakeup`] implementation for a Slint component
///
/// # Example
/// ```ignore
/// let ui = MainWindow::new()?;
/// let bridge = EventLoopBridge::new(&ui, |ui: &MainWindow| ui.invoke_drain_hand_backs());
/// session.set_wakeup(Arc::new(bridge));
/// ```
pub struct EventLoopBridge<T: ComponentHandle> {
    /// Weak reference to the UI component to prevent circular references
    ui_weak: Weak<T>,

    /// Runs on the event loop thread and drains the hand-back queue
    drain: fn(&T),

    /// Set while a drain is scheduled but has not started yet
    drain_pending: Arc<AtomicBool>,
}

impl<T: ComponentHandle + 'static> EventLoopBridge<T> {
    /// Create a bridge for `ui` that calls `drain` on the event loop thread
    pub fn new(ui: &T, drain: fn(&T)) -> Self {
        Self {
            ui_weak: ui.as_weak(),
            drain,
            drain_pending: Arc::new(AtomicBool::new(false)),
        }
    }

    fn schedule_drain(&self) {
        if self.drain_pending.swap(true, Ordering::AcqRel) {
            // A drain is already queued and will pick this hand-back up
            return;
        }

        let drain = self.drain;
        let pending = Arc::clone(&self.drain_pending);

        let result = self.ui_weak.upgrade_in_event_loop(move |ui| {
            // Reset before draining so posts racing with this drain schedule another
            pending.store(false, Ordering::Release);
            drain(&ui);
        });

        if let Err(e) = result {
            tracing::warn!("Failed to queue hand-back drain to event loop: {:?}", e);
            self.drain_pending.store(false, Ordering::Release);
        }
    }
}

impl<T: ComponentHandle + 'static> Wakeup for EventLoopBridge<T> {
    fn wake(&self) {
        self.schedule_drain();
    }
}
