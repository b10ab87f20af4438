//! opflow-core — concurrent execution of progress-reporting commands.
//!
//! The engine runs a batch of long-running operations on a bounded worker
//! pool, folds each operation's stage-scoped progress events into a single
//! weighted 0–100% status, and exposes that status either synchronously
//! (block until the whole batch finishes) or asynchronously (get opaque ids
//! back immediately, poll an id-addressable cache later).
//!
//! ```no_run
//! use opflow_core::executor::{CacheExecutor, ProgressExecutor};
//! use opflow_core::progress::{DetailedProgressListener, ProgressCommand};
//! use opflow_core::EngineConfig;
//!
//! struct Copy;
//!
//! #[async_trait::async_trait]
//! impl ProgressCommand for Copy {
//!     async fn execute(
//!         &self,
//!         listener: &mut dyn DetailedProgressListener,
//!     ) -> anyhow::Result<()> {
//!         listener.progress_started("copying", 100)?;
//!         listener.in_progress(2, 1)?;
//!         listener.in_progress(2, 2)?;
//!         listener.ended(true, "copied");
//!         Ok(())
//!     }
//! }
//!
//! # async fn run() -> anyhow::Result<()> {
//! let executor = CacheExecutor::new(&EngineConfig::load_default()?);
//! let ids = executor.start_command(vec![Box::new(Copy)], None).await;
//! let snapshot = executor.get_status(&ids[0]).await?;
//! println!("{}% {}", snapshot.percent, snapshot.description());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod executor;
pub mod progress;

pub use config::EngineConfig;
pub use error::{ErrorCode, ProgressError};
