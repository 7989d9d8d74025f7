// Performance metrics module
//
// Provides lightweight metrics tracking for computations and hand-backs

use crate::execution::ExecutionStrategy;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Application-wide counters
///
/// Uses atomic operations so background threads can record without locks.
/// Logged on shutdown.
#[derive(Debug)]
pub struct Metrics {
    /// Computations dispatched inline
    pub inline_started: AtomicUsize,

    /// Computations dispatched to a worker thread
    pub worker_thread_started: AtomicUsize,

    /// Computations dispatched to the task runner
    pub background_task_started: AtomicUsize,

    /// Computations whose result reached the UI context
    pub computations_completed: AtomicUsize,

    /// Triggers refused because the input was invalid
    pub inputs_rejected: AtomicUsize,

    /// Triggers refused because a computation was already in flight
    pub busy_rejections: AtomicUsize,

    /// Total kernel time in milliseconds
    pub total_compute_time_ms: AtomicU64,

    /// Hand-backs enqueued by any thread
    pub hand_backs_posted: AtomicU64,

    /// Hand-backs executed on the UI context
    pub hand_backs_processed: AtomicU64,

    /// Application start time
    start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            inline_started: AtomicUsize::new(0),
            worker_thread_started: AtomicUsize::new(0),
            background_task_started: AtomicUsize::new(0),
            computations_completed: AtomicUsize::new(0),
            inputs_rejected: AtomicUsize::new(0),
            busy_rejections: AtomicUsize::new(0),
            total_compute_time_ms: AtomicU64::new(0),
            hand_backs_posted: AtomicU64::new(0),
            hand_backs_processed: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record a dispatched computation
    pub fn record_started(&self, strategy: ExecutionStrategy) {
        let counter = match strategy {
            ExecutionStrategy::Inline => &self.inline_started,
            ExecutionStrategy::WorkerThread => &self.worker_thread_started,
            ExecutionStrategy::BackgroundTask => &self.background_task_started,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a result applied on the UI context
    pub fn record_completed(&self, elapsed: Duration) {
        self.computations_completed.fetch_add(1, Ordering::Relaxed);
        self.total_compute_time_ms
            .fetch_add(elapsed.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn record_input_rejected(&self) {
        self.inputs_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_busy_rejection(&self) {
        self.busy_rejections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_hand_back_posted(&self) {
        self.hand_backs_posted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_hand_back_processed(&self) {
        self.hand_backs_processed.fetch_add(1, Ordering::Relaxed);
    }

    /// Computations dispatched with any strategy
    pub fn total_started(&self) -> usize {
        self.inline_started.load(Ordering::Relaxed)
            + self.worker_thread_started.load(Ordering::Relaxed)
            + self.background_task_started.load(Ordering::Relaxed)
    }

    /// Get total uptime
    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Average kernel time per completed computation in milliseconds
    pub fn avg_compute_time_ms(&self) -> f64 {
        let total = self.total_compute_time_ms.load(Ordering::Relaxed);
        let count = self.computations_completed.load(Ordering::Relaxed);
        if count > 0 {
            total as f64 / count as f64
        } else {
            0.0
        }
    }

    /// Log metrics summary
    pub fn log_summary(&self) {
        tracing::info!("=== Performance Metrics Summary ===");
        tracing::info!("Uptime: {:.2}s", self.uptime().as_secs_f64());
        tracing::info!(
            "Computations: {} inline, {} worker thread, {} background task, {} completed",
            self.inline_started.load(Ordering::Relaxed),
            self.worker_thread_started.load(Ordering::Relaxed),
            self.background_task_started.load(Ordering::Relaxed),
            self.computations_completed.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Total compute time: {:.2}s (avg: {:.2}ms per computation)",
            self.total_compute_time_ms.load(Ordering::Relaxed) as f64 / 1000.0,
            self.avg_compute_time_ms()
        );
        tracing::info!(
            "Rejected triggers: {} invalid input, {} while busy",
            self.inputs_rejected.load(Ordering::Relaxed),
            self.busy_rejections.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Hand-backs: {} posted, {} processed",
            self.hand_backs_posted.load(Ordering::Relaxed),
            self.hand_backs_processed.load(Ordering::Relaxed)
        );
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
