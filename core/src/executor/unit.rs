use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::sync::Notify;
use tracing::debug;

use crate::progress::{ProgressCommand, ProgressStatus, WeightedProgressListener};

/// Status description recorded when a command fails during execution. The
/// underlying cause is logged, not surfaced to pollers.
pub const INTERNAL_ERROR: &str = "Internal error";

/// Callback to run once every unit of a batch has finished.
pub type PostProcess = Box<dyn FnOnce() + Send + 'static>;

/// Completion barrier shared by all execution units of one batch.
///
/// Counted down exactly once per unit; the wrapped post-process waits on it,
/// which is the only ordering guarantee between a batch and its post-process.
#[derive(Debug)]
pub struct Gate {
    remaining: AtomicUsize,
    notify: Notify,
}

impl Gate {
    pub fn new(count: usize) -> Self {
        Self {
            remaining: AtomicUsize::new(count),
            notify: Notify::new(),
        }
    }

    pub fn count_down(&self) {
        if self.remaining.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.notify.notify_waiters();
        }
    }

    pub fn remaining(&self) -> usize {
        self.remaining.load(Ordering::Acquire)
    }

    /// Resolves once the count reaches zero.
    pub async fn wait(&self) {
        loop {
            let notified = self.notify.notified();
            if self.remaining.load(Ordering::Acquire) == 0 {
                return;
            }
            notified.await;
        }
    }
}

/// Counts its gate down exactly once, when dropped. Owned by the unit, so
/// accounting holds on every exit path: clean return, command error, panic,
/// or the run future being dropped by a forced shutdown before it finished.
#[derive(Debug)]
struct CountdownGuard {
    gate: Arc<Gate>,
}

impl Drop for CountdownGuard {
    fn drop(&mut self) {
        self.gate.count_down();
    }
}

/// One command bound to its own status, listener and the batch gate.
/// Built once by [`UnitFactory::produce`], executed exactly once.
pub struct ExecutionUnit {
    command: Box<dyn ProgressCommand>,
    status: Arc<ProgressStatus>,
    guard: CountdownGuard,
}

impl ExecutionUnit {
    /// Handle to this unit's status, valid before, during and after the run.
    pub fn status(&self) -> Arc<ProgressStatus> {
        self.status.clone()
    }

    /// Executes the command, feeding its progress into this unit's status.
    ///
    /// Any error out of the command collapses into the fixed
    /// [`INTERNAL_ERROR`] status; it never propagates to sibling units. The
    /// gate is counted down when the unit (moved into this future) drops.
    pub async fn run(self) -> Arc<ProgressStatus> {
        let ExecutionUnit {
            command,
            status,
            guard,
        } = self;
        let _guard = guard;

        let mut listener = WeightedProgressListener::new(status.clone());
        let outcome = AssertUnwindSafe(command.execute(&mut listener))
            .catch_unwind()
            .await;
        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(cause)) => {
                debug!(%cause, "command failed; recording internal error");
                status.set_error(INTERNAL_ERROR);
            }
            // a panicking command still yields a terminal status
            Err(_panic) => {
                debug!("command panicked; recording internal error");
                status.set_error(INTERNAL_ERROR);
            }
        }

        status
    }
}

/// A batch of execution units plus the wrapped post-process that must run
/// after all of them.
pub struct GroupedUnits {
    pub units: Vec<ExecutionUnit>,
    pub post: BoxFuture<'static, ()>,
}

/// Binds each command of a batch to a fresh status and ties the whole batch
/// to one shared gate.
#[derive(Debug, Default)]
pub struct UnitFactory;

impl UnitFactory {
    pub fn produce(
        &self,
        commands: Vec<Box<dyn ProgressCommand>>,
        post_process: Option<PostProcess>,
    ) -> GroupedUnits {
        let gate = Arc::new(Gate::new(commands.len()));

        let units = commands
            .into_iter()
            .map(|command| ExecutionUnit {
                command,
                status: Arc::new(ProgressStatus::new()),
                guard: CountdownGuard { gate: gate.clone() },
            })
            .collect();

        let post = async move {
            gate.wait().await;
            if let Some(post_process) = post_process {
                post_process();
            }
        }
        .boxed();

        GroupedUnits { units, post }
    }
}
