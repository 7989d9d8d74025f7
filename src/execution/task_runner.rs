// TaskRunner - managed background tasks with an automatic UI continuation
//
// `submit()` runs blocking work on the tokio blocking pool and, once it returns,
// posts the completion continuation onto the UI hand-back queue. Callers never
// touch threads or the queue themselves.

use super::hand_back::UiHandle;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tokio::task::JoinHandle;

/// Errors observable through a [`TaskHandle`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    #[error("background task {0} panicked")]
    Panicked(u64),

    #[error("background task {0} was cancelled by runtime shutdown")]
    Cancelled(u64),
}

/// Lets background work publish progress continuations to the UI context
pub struct ProgressSink<C> {
    ui: UiHandle<C>,
    on_progress: Arc<dyn Fn(&mut C, u8) + Send + Sync>,
}

impl<C: 'static> ProgressSink<C> {
    /// Post a progress update; it runs on the UI context after everything
    /// already queued
    pub fn publish(&self, percent: u8) {
        let on_progress = Arc::clone(&self.on_progress);
        self.ui.post(move |ctx: &mut C| on_progress(ctx, percent));
    }
}

/// Handle to a submitted task.
///
/// Dropping the handle does not stop the task.
#[derive(Debug)]
pub struct TaskHandle {
    id: u64,
    join: JoinHandle<Result<(), TaskError>>,
}

impl TaskHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// True once the work has returned and its continuation was posted
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Wait until the work has returned and its continuation was posted
    pub async fn wait(self) -> Result<(), TaskError> {
        match self.join.await {
            Ok(result) => result,
            Err(e) if e.is_panic() => Err(TaskError::Panicked(self.id)),
            Err(_) => Err(TaskError::Cancelled(self.id)),
        }
    }
}

/// Runs submitted work off the UI context and hands the result back to it
#[derive(Debug)]
pub struct TaskRunner {
    tokio_handle: tokio::runtime::Handle,
    next_id: AtomicU64,
}

impl TaskRunner {
    pub fn new(tokio_handle: tokio::runtime::Handle) -> Self {
        Self {
            tokio_handle,
            next_id: AtomicU64::new(1),
        }
    }

    /// Handle to the runtime the tasks run on
    pub fn tokio_handle(&self) -> &tokio::runtime::Handle {
        &self.tokio_handle
    }

    /// Submit `work` for background execution.
    ///
    /// `work` runs on a blocking-pool thread and receives a [`ProgressSink`]
    /// that forwards to `on_progress`. When it returns, `on_complete` is posted
    /// to `ui` with the value. If `work` panics, nothing is posted.
    pub fn submit<C, T, W, P, F>(
        &self,
        ui: UiHandle<C>,
        work: W,
        on_progress: P,
        on_complete: F,
    ) -> TaskHandle
    where
        C: 'static,
        T: Send + 'static,
        W: FnOnce(ProgressSink<C>) -> T + Send + 'static,
        P: Fn(&mut C, u8) + Send + Sync + 'static,
        F: FnOnce(&mut C, T) + Send + 'static,
    {
        self.submit_with_recovery(ui, work, on_progress, on_complete, |_: &mut C, _| {})
    }

    /// Like [`submit`](Self::submit), but posts `on_failure` instead of
    /// `on_complete` when `work` panics or is cancelled.
    ///
    /// Exactly one of the two continuations is posted per task.
    pub fn submit_with_recovery<C, T, W, P, F, R>(
        &self,
        ui: UiHandle<C>,
        work: W,
        on_progress: P,
        on_complete: F,
        on_failure: R,
    ) -> TaskHandle
    where
        C: 'static,
        T: Send + 'static,
        W: FnOnce(ProgressSink<C>) -> T + Send + 'static,
        P: Fn(&mut C, u8) + Send + Sync + 'static,
        F: FnOnce(&mut C, T) + Send + 'static,
        R: FnOnce(&mut C, TaskError) + Send + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let sink = ProgressSink {
            ui: ui.clone(),
            on_progress: Arc::new(on_progress),
        };

        tracing::debug!("Submitting background task {}", id);

        let join = self.tokio_handle.spawn(async move {
            let error = match tokio::task::spawn_blocking(move || work(sink)).await {
                Ok(value) => {
                    tracing::debug!("Background task {} finished, posting continuation", id);
                    ui.post(move |ctx: &mut C| on_complete(ctx, value));
                    return Ok(());
                }
                Err(e) if e.is_panic() => {
                    tracing::error!("Background task {} panicked: {}", id, e);
                    TaskError::Panicked(id)
                }
                Err(e) => {
                    tracing::warn!("Background task {} did not complete: {}", id, e);
                    TaskError::Cancelled(id)
                }
            };

            let posted_error = error.clone();
            ui.post(move |ctx: &mut C| on_failure(ctx, posted_error));
            Err(error)
        });

        TaskHandle { id, join }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::hand_back::{NoWakeup, UiQueue};
    use crate::metrics::Metrics;
    use std::time::Duration;

    #[derive(Default)]
    struct Ctx {
        progress: Vec<u8>,
        result: Option<u64>,
    }

    fn setup() -> (tokio::runtime::Runtime, UiQueue<Ctx>) {
        let rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .unwrap();
        let queue = UiQueue::new(Arc::new(NoWakeup), Arc::new(Metrics::new()));
        (rt, queue)
    }

    #[test]
    fn test_submit_posts_continuation() {
        let (rt, mut queue) = setup();
        let runner = TaskRunner::new(rt.handle().clone());

        let handle = runner.submit(
            queue.handle(),
            |_sink| 6u64 * 7,
            |_ctx: &mut Ctx, _p| {},
            |ctx: &mut Ctx, value| ctx.result = Some(value),
        );
        assert_eq!(handle.id(), 1);

        let mut ctx = Ctx::default();
        let job = queue
            .next_blocking(rt.handle(), Duration::from_secs(5))
            .expect("continuation should be posted");
        job(&mut ctx);

        assert_eq!(ctx.result, Some(42));
        assert_eq!(rt.block_on(handle.wait()), Ok(()));
    }

    #[test]
    fn test_progress_precedes_completion() {
        let (rt, mut queue) = setup();
        let runner = TaskRunner::new(rt.handle().clone());

        runner.submit(
            queue.handle(),
            |sink| {
                sink.publish(0);
                sink.publish(50);
                sink.publish(100);
                1u64
            },
            |ctx: &mut Ctx, p| ctx.progress.push(p),
            |ctx: &mut Ctx, value| ctx.result = Some(value),
        );

        let mut ctx = Ctx::default();
        while ctx.result.is_none() {
            let job = queue
                .next_blocking(rt.handle(), Duration::from_secs(5))
                .expect("hand-back should arrive");
            job(&mut ctx);
        }

        assert_eq!(ctx.progress, vec![0, 50, 100]);
    }

    #[test]
    fn test_ids_increase() {
        let (rt, queue) = setup();
        let runner = TaskRunner::new(rt.handle().clone());

        let a = runner.submit(
            queue.handle(),
            |_| (),
            |_: &mut Ctx, _| {},
            |_: &mut Ctx, _| {},
        );
        let b = runner.submit(
            queue.handle(),
            |_| (),
            |_: &mut Ctx, _| {},
            |_: &mut Ctx, _| {},
        );

        assert_eq!(a.id(), 1);
        assert_eq!(b.id(), 2);
    }

    #[test]
    fn test_panicking_work_posts_nothing() {
        let (rt, mut queue) = setup();
        let runner = TaskRunner::new(rt.handle().clone());

        let handle = runner.submit(
            queue.handle(),
            |_sink| -> u64 { panic!("boom") },
            |_: &mut Ctx, _| {},
            |ctx: &mut Ctx, value| ctx.result = Some(value),
        );

        let id = handle.id();
        assert_eq!(rt.block_on(handle.wait()), Err(TaskError::Panicked(id)));
        assert!(queue.try_next().is_none());
    }

    #[test]
    fn test_panicking_work_posts_recovery() {
        let (rt, mut queue) = setup();
        let runner = TaskRunner::new(rt.handle().clone());

        let handle = runner.submit_with_recovery(
            queue.handle(),
            |_sink| -> u64 { panic!("boom") },
            |_: &mut Ctx, _| {},
            |ctx: &mut Ctx, value| ctx.result = Some(value),
            |ctx: &mut Ctx, err| {
                assert!(matches!(err, TaskError::Panicked(_)));
                ctx.progress.push(0);
            },
        );

        let mut ctx = Ctx::default();
        let job = queue
            .next_blocking(rt.handle(), Duration::from_secs(5))
            .expect("failure continuation should be posted");
        job(&mut ctx);

        assert_eq!(ctx.result, None);
        assert_eq!(ctx.progress, vec![0]);
        assert!(queue.try_next().is_none());
        assert!(rt.block_on(handle.wait()).is_err());
    }

    #[test]
    fn test_wait_with_tokio_test() {
        let (rt, queue) = setup();
        let runner = TaskRunner::new(rt.handle().clone());

        let handle = runner.submit(
            queue.handle(),
            |_| 5u64,
            |_: &mut Ctx, _| {},
            |_: &mut Ctx, _| {},
        );

        // The join handle can be awaited from a different runtime
        assert_eq!(tokio_test::block_on(handle.wait()), Ok(()));
    }
}
