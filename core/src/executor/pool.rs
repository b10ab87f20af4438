use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, warn};

/// Bounded worker pool shared by the executors.
///
/// Concurrency is gated by a semaphore: every spawned job waits for a permit
/// before running, so at most `max_workers` jobs make progress at a time and
/// a saturated pool applies backpressure instead of growing an unbounded
/// queue. Shutdown is explicit via [`terminate`]: close to new work, wait a
/// bounded grace period for in-flight jobs, then cancel the stragglers
/// through the shared token.
///
/// [`terminate`]: WorkerPool::terminate
pub struct WorkerPool {
    semaphore: Arc<Semaphore>,
    tracker: TaskTracker,
    cancel: CancellationToken,
    grace: Duration,
}

impl WorkerPool {
    pub fn new(max_workers: usize, grace: Duration) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(max_workers.max(1))),
            tracker: TaskTracker::new(),
            cancel: CancellationToken::new(),
            grace,
        }
    }

    /// Dispatches a job. Returns `None` from the handle when the job was
    /// cancelled (or the pool shut down) before it could finish.
    pub fn spawn<F, T>(&self, job: F) -> JoinHandle<Option<T>>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let semaphore = self.semaphore.clone();
        let cancel = self.cancel.clone();

        self.tracker.spawn(async move {
            let _permit = match semaphore.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => return None, // pool torn down before the job ran
            };

            tokio::select! {
                _ = cancel.cancelled() => None,
                out = job => Some(out),
            }
        })
    }

    /// Dispatches a job without consuming a worker permit. For batch
    /// bookkeeping that waits on the units themselves: metering it through
    /// the semaphore would let it starve the very jobs it waits for on a
    /// saturated pool. Still tracked and still cancellable.
    pub fn spawn_unmetered<F, T>(&self, job: F) -> JoinHandle<Option<T>>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let cancel = self.cancel.clone();

        self.tracker.spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => None,
                out = job => Some(out),
            }
        })
    }

    /// Token observed by collecting calls; fires on forced shutdown.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Orderly shutdown: stop accepting work, give in-flight jobs a grace
    /// period, then force-cancel whatever is still running. A force-cancelled
    /// command's status may be left non-terminal.
    pub async fn terminate(&self) {
        self.tracker.close();

        if timeout(self.grace, self.tracker.wait()).await.is_err() {
            warn!(grace_secs = self.grace.as_secs(), "grace period elapsed; cancelling remaining work");
            self.cancel.cancel();
            let _ = timeout(Duration::from_secs(1), self.tracker.wait()).await;
        } else {
            debug!("worker pool drained cleanly");
        }

        self.semaphore.close();
    }
}
