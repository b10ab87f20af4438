//! Concurrent execution of progress-reporting command batches.
//!
//! Both executors share the same pipeline; they differ only in how the
//! caller observes results:
//!
//! ```text
//! Vec<Box<dyn ProgressCommand>>
//!   ↓
//! UnitFactory::produce()
//!   ↓
//! GroupedUnits { units sharing one Gate, wrapped post-process }
//!   ↓
//! WorkerPool (semaphore-bounded tokio tasks)
//!   ↓
//! CompletionExecutor → block, Vec<ProgressSnapshot> in completion order
//! CacheExecutor      → return Vec<id> immediately, poll get_status(id)
//! ```
//!
//! The post-process waits on the gate and therefore strictly happens-after
//! every unit of its batch; nothing else orders sibling units.

mod cache;
mod completion;
mod evict;
mod id_gen;
mod pool;
mod unit;

pub use cache::CacheExecutor;
pub use completion::CompletionExecutor;
pub use evict::{EvictionStrategy, SimpleEvictionStrategy};
pub use id_gen::{IdGenerator, UuidIdGenerator};
pub use pool::WorkerPool;
pub use unit::{ExecutionUnit, Gate, GroupedUnits, PostProcess, UnitFactory, INTERNAL_ERROR};

use crate::progress::ProgressCommand;

/// Common surface of the two executors.
///
/// `Handle` is what `start_command` yields per submitted command: a final
/// [`crate::progress::ProgressSnapshot`] for the blocking executor, an opaque
/// id for the cache executor.
#[async_trait::async_trait]
pub trait ProgressExecutor: Send + Sync {
    type Handle: Send;

    /// Submits a batch for execution, with an optional post-process that
    /// runs exactly once after every command of the batch has finished,
    /// successfully or not.
    async fn start_command(
        &self,
        commands: Vec<Box<dyn ProgressCommand>>,
        post_process: Option<PostProcess>,
    ) -> Vec<Self::Handle>;

    /// Orderly shutdown of the underlying worker pool: stop accepting work,
    /// wait a bounded grace period, then force-cancel stragglers.
    async fn terminate(&self);
}
