use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::error::ProgressError;
use crate::progress::{ProgressCommand, ProgressSnapshot, ProgressStatus};

use super::evict::{EvictionStrategy, SimpleEvictionStrategy};
use super::id_gen::{IdGenerator, UuidIdGenerator};
use super::pool::WorkerPool;
use super::unit::{PostProcess, UnitFactory};
use super::ProgressExecutor;

struct CacheEntry {
    inserted_at: DateTime<Utc>,
    status: Arc<ProgressStatus>,
}

/// Executor that returns immediately, handing back one opaque id per command.
///
/// Statuses stay queryable by id from an in-memory cache that is swept on a
/// best-effort basis: a sweep runs only when the entry count exceeds the
/// configured threshold, and the threshold is a soft hint, never a hard cap —
/// the cache can exceed it indefinitely while nothing is evictable.
pub struct CacheExecutor {
    pool: WorkerPool,
    factory: UnitFactory,
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
    sweep_threshold: usize,
    strategy: Box<dyn EvictionStrategy>,
    ids: Box<dyn IdGenerator>,
}

impl CacheExecutor {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            pool: WorkerPool::new(config.workers, config.shutdown_grace()),
            factory: UnitFactory,
            entries: Arc::new(RwLock::new(HashMap::new())),
            sweep_threshold: config.cache.sweep_threshold,
            strategy: Box::new(SimpleEvictionStrategy::with_minutes(
                config.cache.evict_after_minutes,
            )),
            ids: Box::new(UuidIdGenerator),
        }
    }

    pub fn with_eviction_strategy(mut self, strategy: Box<dyn EvictionStrategy>) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_id_generator(mut self, ids: Box<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    /// Live snapshot of the status registered under `id`.
    pub async fn get_status(&self, id: &str) -> Result<ProgressSnapshot, ProgressError> {
        let entries = self.entries.read().await;
        entries
            .get(id)
            .map(|entry| entry.status.snapshot())
            .ok_or_else(|| ProgressError::UnknownId(id.to_string()))
    }

    /// Number of cached entries, in flight and finished alike.
    pub async fn cached(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Registers a status under a fresh id, regenerating on collision.
    /// Insert-if-absent runs under the write lock, so exactly one status ever
    /// lives under a given id.
    async fn register(&self, status: Arc<ProgressStatus>) -> String {
        let mut entries = self.entries.write().await;
        loop {
            let id = self.ids.generate();
            if entries.contains_key(&id) {
                debug!(%id, "id collision; regenerating");
                continue;
            }
            entries.insert(
                id.clone(),
                CacheEntry {
                    inserted_at: Utc::now(),
                    status,
                },
            );
            return id;
        }
    }

    /// Best-effort sweep of done-and-stale entries. Weak guarantees only:
    /// concurrent insertions are unaffected and a racing double-removal is a
    /// no-op.
    async fn sweep(&self) {
        if self.entries.read().await.len() <= self.sweep_threshold {
            return;
        }

        info!("sweeping progress cache");
        let mut entries = self.entries.write().await;
        entries.retain(|id, entry| {
            let evict =
                entry.status.is_done() && self.strategy.evict(entry.inserted_at, &entry.status);
            if evict {
                debug!(%id, "evicting finished progress status");
            }
            !evict
        });
    }
}

#[async_trait::async_trait]
impl ProgressExecutor for CacheExecutor {
    type Handle = String;

    /// Ids come back in **submission order** and are resolvable through
    /// [`CacheExecutor::get_status`] before this call returns.
    async fn start_command(
        &self,
        commands: Vec<Box<dyn ProgressCommand>>,
        post_process: Option<PostProcess>,
    ) -> Vec<String> {
        self.sweep().await;

        let batch = self.factory.produce(commands, post_process);
        let mut ids = Vec::with_capacity(batch.units.len());

        for unit in batch.units {
            // entry goes in before dispatch so the id is valid the moment
            // the caller sees it
            let id = self.register(unit.status()).await;
            self.pool.spawn(unit.run());
            ids.push(id);
        }
        // unmetered: the gate it waits on only opens once the units, which
        // do take permits, get to run
        self.pool.spawn_unmetered(batch.post);

        ids
    }

    async fn terminate(&self) {
        self.pool.terminate().await;
    }
}
