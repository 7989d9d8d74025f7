// Hand-back queue - moves work from background threads onto the UI context
//
// Background code never touches UI-owned state. It posts a closure instead, and
// the context that owns the queue runs those closures one at a time, in the
// order they were posted.

use crate::metrics::Metrics;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// A unit of work to run on the UI context against its owned state `C`
pub type HandBack<C> = Box<dyn FnOnce(&mut C) + Send>;

/// Notifies the owning event loop that hand-backs are waiting to be drained.
///
/// Called from whichever thread posted the hand-back, after it was enqueued.
pub trait Wakeup: Send + Sync + 'static {
    fn wake(&self);
}

/// Wakeup for event loops that poll the queue themselves (tests, headless runs)
#[derive(Debug, Default, Clone, Copy)]
pub struct NoWakeup;

impl Wakeup for NoWakeup {
    fn wake(&self) {}
}

/// Receiving half of the hand-back queue, owned by the UI context.
///
/// Hand-backs are delivered strictly FIFO.
pub struct UiQueue<C> {
    rx: mpsc::UnboundedReceiver<HandBack<C>>,
    handle: UiHandle<C>,
}

impl<C: 'static> UiQueue<C> {
    /// Create a queue whose posts trigger `wakeup`
    pub fn new(wakeup: Arc<dyn Wakeup>, metrics: Arc<Metrics>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            rx,
            handle: UiHandle {
                tx,
                wakeup,
                metrics,
            },
        }
    }

    /// Cloneable sending half for background code
    pub fn handle(&self) -> UiHandle<C> {
        self.handle.clone()
    }

    /// Replace the wakeup used by handles created from now on
    pub fn set_wakeup(&mut self, wakeup: Arc<dyn Wakeup>) {
        self.handle.wakeup = wakeup;
    }

    /// Take the next waiting hand-back without blocking
    pub fn try_next(&mut self) -> Option<HandBack<C>> {
        self.rx.try_recv().ok()
    }

    /// Block the calling thread until a hand-back arrives or `timeout` elapses.
    ///
    /// Must not be called from inside an async context.
    pub fn next_blocking(
        &mut self,
        runtime: &tokio::runtime::Handle,
        timeout: Duration,
    ) -> Option<HandBack<C>> {
        // The timer must be created inside the runtime, so build it in the async block
        runtime
            .block_on(async { tokio::time::timeout(timeout, self.rx.recv()).await })
            .ok()
            .flatten()
    }
}

/// Sending half of the hand-back queue.
///
/// Cheap to clone and safe to move to any thread.
pub struct UiHandle<C> {
    tx: mpsc::UnboundedSender<HandBack<C>>,
    wakeup: Arc<dyn Wakeup>,
    metrics: Arc<Metrics>,
}

// Manual Clone implementation to avoid requiring C: Clone
impl<C> Clone for UiHandle<C> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            wakeup: Arc::clone(&self.wakeup),
            metrics: Arc::clone(&self.metrics),
        }
    }
}

impl<C: 'static> UiHandle<C> {
    /// Enqueue `f` to run on the UI context.
    ///
    /// Returns `false` if the owning context is gone; the hand-back is dropped.
    pub fn post<F>(&self, f: F) -> bool
    where
        F: FnOnce(&mut C) + Send + 'static,
    {
        match self.tx.send(Box::new(f)) {
            Ok(()) => {
                self.metrics.record_hand_back_posted();
                self.wakeup.wake();
                true
            }
            Err(_) => {
                tracing::warn!("Failed to post hand-back - UI context has been torn down");
                false
            }
        }
    }

    /// Whether the owning context still accepts hand-backs
    pub fn is_open(&self) -> bool {
        !self.tx.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn queue() -> UiQueue<Vec<u32>> {
        UiQueue::new(Arc::new(NoWakeup), Arc::new(Metrics::new()))
    }

    #[test]
    fn test_fifo_order() {
        let mut queue = queue();
        let handle = queue.handle();

        for i in 0..5 {
            assert!(handle.post(move |v: &mut Vec<u32>| v.push(i)));
        }

        let mut seen = Vec::new();
        while let Some(job) = queue.try_next() {
            job(&mut seen);
        }
        assert_eq!(seen, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_post_from_other_thread() {
        let mut queue = queue();
        let handle = queue.handle();

        std::thread::spawn(move || {
            handle.post(|v: &mut Vec<u32>| v.push(42));
        })
        .join()
        .unwrap();

        let mut seen = Vec::new();
        let job = queue.try_next().expect("hand-back should be queued");
        job(&mut seen);
        assert_eq!(seen, vec![42]);
        assert!(queue.try_next().is_none());
    }

    #[test]
    fn test_post_after_teardown() {
        let queue = queue();
        let handle = queue.handle();
        drop(queue);

        assert!(!handle.is_open());
        assert!(!handle.post(|_v: &mut Vec<u32>| {}));
    }

    #[test]
    fn test_wakeup_called_per_post() {
        struct Counting(AtomicUsize);
        impl Wakeup for Counting {
            fn wake(&self) {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }

        let counter = Arc::new(Counting(AtomicUsize::new(0)));
        let metrics = Arc::new(Metrics::new());
        let queue: UiQueue<()> = UiQueue::new(counter.clone(), metrics.clone());
        let handle = queue.handle();

        handle.post(|_| {});
        handle.post(|_| {});

        assert_eq!(counter.0.load(Ordering::SeqCst), 2);
        assert_eq!(metrics.hand_backs_posted.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn test_next_blocking_times_out() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let mut queue = queue();

        let start = std::time::Instant::now();
        assert!(
            queue
                .next_blocking(rt.handle(), Duration::from_millis(20))
                .is_none()
        );
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn test_next_blocking_receives() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let mut queue = queue();
        let handle = queue.handle();

        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(10));
            handle.post(|v: &mut Vec<u32>| v.push(7));
        });

        let job = queue
            .next_blocking(rt.handle(), Duration::from_secs(5))
            .expect("hand-back should arrive");
        let mut seen = Vec::new();
        job(&mut seen);
        assert_eq!(seen, vec![7]);
    }

    #[test]
    fn test_next_blocking_from_thread_without_runtime() {
        let rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .unwrap();
        let runtime = rt.handle().clone();
        let mut queue = queue();
        queue.handle().post(|v: &mut Vec<u32>| v.push(1));

        let seen = std::thread::spawn(move || {
            assert!(tokio::runtime::Handle::try_current().is_err());

            let mut seen = Vec::new();
            let job = queue
                .next_blocking(&runtime, Duration::from_secs(5))
                .expect("queued hand-back should be returned");
            job(&mut seen);

            // Empty queue: the timer still runs on the runtime's clock
            assert!(queue.next_blocking(&runtime, Duration::from_millis(10)).is_none());
            seen
        })
        .join()
        .unwrap();

        assert_eq!(seen, vec![1]);
    }
}
