//! Progress reporting: status records, listener contracts and the
//! stage-weighted listener that maps per-command progress events onto a
//! single 0–100% figure.
//!
//! A command describes its work as a sequence of *stages*, each declared with
//! the share of the total budget it consumes. Within a stage the command
//! reports raw `current / total` counts and the listener translates them into
//! a cumulative percent on the command's [`ProgressStatus`].

mod count;
mod listener;
mod status;

pub use count::{CountingReader, CountingWriter};
pub use listener::WeightedProgressListener;
pub use status::{ProgressSnapshot, ProgressStatus, Status};

use crate::error::ProgressError;

/// Receiver of raw progress counts from a running operation.
pub trait ProgressListener: Send {
    /// Reports that `current` of an estimated `total` units are done.
    /// `current` should never decrease within a stage; the listener does not
    /// enforce this.
    fn in_progress(&mut self, total: i64, current: i64) -> Result<(), ProgressError>;
}

/// A listener that additionally tracks a group of weighted stages which is
/// collectively seen as one process.
pub trait DetailedProgressListener: ProgressListener {
    /// Declares a new stage taking up `weight` percentage points of the
    /// total budget. The weights of all stages must not sum past 100.
    fn progress_started(&mut self, description: &str, weight: u8) -> Result<(), ProgressError>;

    /// Declares the whole process finished, successfully or not.
    fn ended(&mut self, success: bool, message: &str);
}

/// A long-running operation that reports its progress while executing.
///
/// Implementations must call [`DetailedProgressListener::progress_started`]
/// at least once before any `in_progress` call. Errors returned from
/// `execute` are treated generically by the engine: the command's status is
/// set to a fixed internal-error state and the cause is logged, not surfaced.
#[async_trait::async_trait]
pub trait ProgressCommand: Send + Sync {
    async fn execute(&self, listener: &mut dyn DetailedProgressListener) -> anyhow::Result<()>;
}
