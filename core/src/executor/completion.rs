use futures::stream::FuturesUnordered;
use futures::StreamExt;
use tracing::{debug, error};

use crate::config::EngineConfig;
use crate::progress::{ProgressCommand, ProgressSnapshot};

use super::pool::WorkerPool;
use super::unit::{PostProcess, UnitFactory};
use super::ProgressExecutor;

/// Executor that blocks the caller until every command of the batch (and the
/// post-process gate) has finished.
///
/// Results arrive in **completion order**, not submission order: index `i`
/// of the returned list does not correspond to command `i`.
pub struct CompletionExecutor {
    pool: WorkerPool,
    factory: UnitFactory,
}

impl CompletionExecutor {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            pool: WorkerPool::new(config.workers, config.shutdown_grace()),
            factory: UnitFactory,
        }
    }
}

impl Default for CompletionExecutor {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

#[async_trait::async_trait]
impl ProgressExecutor for CompletionExecutor {
    type Handle = ProgressSnapshot;

    async fn start_command(
        &self,
        commands: Vec<Box<dyn ProgressCommand>>,
        post_process: Option<PostProcess>,
    ) -> Vec<ProgressSnapshot> {
        let batch = self.factory.produce(commands, post_process);
        let expected = batch.units.len();

        let mut pending: FuturesUnordered<_> = batch
            .units
            .into_iter()
            .map(|unit| self.pool.spawn(unit.run()))
            .collect();
        // must not hold a permit while waiting: on a saturated pool it
        // would starve the units its gate depends on
        self.pool.spawn_unmetered(batch.post);

        let cancel = self.pool.cancel_token();
        let mut results = Vec::with_capacity(expected);

        while results.len() < expected {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!(collected = results.len(), expected, "collection cancelled; returning partial results");
                    break;
                }
                joined = pending.next() => match joined {
                    Some(Ok(Some(status))) => results.push(status.snapshot()),
                    // force-cancelled before it could produce a status
                    Some(Ok(None)) => {}
                    Some(Err(join_err)) => {
                        error!(error = %join_err, "worker task failed to join");
                    }
                    None => break,
                },
            }
        }

        results
    }

    async fn terminate(&self) {
        self.pool.terminate().await;
    }
}
