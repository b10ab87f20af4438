use chrono::{DateTime, Duration, Utc};

use crate::progress::ProgressStatus;

/// Decides whether a finished cache entry should be removed during a sweep.
///
/// The sweep only consults the strategy for entries whose status is already
/// done; entries still in flight are never eligible regardless of age.
pub trait EvictionStrategy: Send + Sync {
    fn evict(&self, inserted_at: DateTime<Utc>, status: &ProgressStatus) -> bool;
}

/// Age-based policy: evict once the entry has sat in the cache for at least
/// the configured window (inclusive boundary).
pub struct SimpleEvictionStrategy {
    evict_after: Duration,
}

impl SimpleEvictionStrategy {
    pub fn new(evict_after: Duration) -> Self {
        Self { evict_after }
    }

    pub fn with_minutes(minutes: i64) -> Self {
        Self::new(Duration::minutes(minutes))
    }
}

impl Default for SimpleEvictionStrategy {
    fn default() -> Self {
        Self::with_minutes(20)
    }
}

impl EvictionStrategy for SimpleEvictionStrategy {
    fn evict(&self, inserted_at: DateTime<Utc>, _status: &ProgressStatus) -> bool {
        Utc::now() - inserted_at >= self.evict_after
    }
}
