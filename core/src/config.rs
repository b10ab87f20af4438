use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Engine configuration.
///
/// Loaded from `opflow.toml` in the working directory when present, with
/// environment-variable overrides applied last. Every field carries a
/// default, so an empty file and a missing file behave identically.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Maximum concurrently running commands. Defaults to the available
    /// hardware parallelism.
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Seconds `terminate()` waits for in-flight commands before forcing
    /// cancellation.
    #[serde(default = "default_shutdown_grace_secs")]
    pub shutdown_grace_secs: u64,

    #[serde(default)]
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Entry count above which `start_command` attempts an eviction sweep.
    /// A soft hint, not a cap: the cache may exceed it indefinitely while
    /// nothing is evictable.
    #[serde(default = "default_sweep_threshold")]
    pub sweep_threshold: usize,

    /// Minutes a finished entry must age before the default eviction policy
    /// removes it.
    #[serde(default = "default_evict_after_minutes")]
    pub evict_after_minutes: i64,
}

fn default_workers() -> usize {
    num_cpus::get().max(1)
}

fn default_shutdown_grace_secs() -> u64 {
    10
}

fn default_sweep_threshold() -> usize {
    200
}

fn default_evict_after_minutes() -> i64 {
    20
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            shutdown_grace_secs: default_shutdown_grace_secs(),
            cache: CacheConfig::default(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            sweep_threshold: default_sweep_threshold(),
            evict_after_minutes: default_evict_after_minutes(),
        }
    }
}

impl EngineConfig {
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let mut cfg: EngineConfig = toml::from_str(&raw)?;
        cfg.apply_env_overrides();
        Ok(cfg)
    }

    /// `./opflow.toml` when present, built-in defaults otherwise.
    pub fn load_default() -> anyhow::Result<Self> {
        let local = Path::new("opflow.toml");
        let mut cfg = if local.exists() {
            let raw = std::fs::read_to_string(local)?;
            toml::from_str::<EngineConfig>(&raw)?
        } else {
            EngineConfig::default()
        };
        cfg.apply_env_overrides();
        Ok(cfg)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("OPFLOW_WORKERS") {
            if let Ok(workers) = v.trim().parse::<usize>() {
                if workers > 0 {
                    self.workers = workers;
                }
            }
        }
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::{Mutex, PoisonError};

    use super::*;

    // process-wide env var, so tests that set or observe OPFLOW_WORKERS
    // serialize through this
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn defaults_are_sane() {
        let cfg = EngineConfig::default();
        assert!(cfg.workers >= 1);
        assert_eq!(cfg.shutdown_grace_secs, 10);
        assert_eq!(cfg.cache.sweep_threshold, 200);
        assert_eq!(cfg.cache.evict_after_minutes, 20);
    }

    #[test]
    fn partial_file_keeps_defaults_for_the_rest() {
        let _env = ENV_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "workers = 3\n\n[cache]\nsweep_threshold = 5").unwrap();

        let cfg = EngineConfig::from_file(file.path()).unwrap();
        assert_eq!(cfg.workers, 3);
        assert_eq!(cfg.cache.sweep_threshold, 5);
        assert_eq!(cfg.cache.evict_after_minutes, 20);
    }

    #[test]
    fn env_override_beats_the_file_and_ignores_zero() {
        let _env = ENV_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "workers = 3").unwrap();

        std::env::set_var("OPFLOW_WORKERS", "7");
        let overridden = EngineConfig::from_file(file.path()).unwrap();

        std::env::set_var("OPFLOW_WORKERS", "0");
        let zero = EngineConfig::from_file(file.path()).unwrap();

        std::env::set_var("OPFLOW_WORKERS", "many");
        let garbage = EngineConfig::from_file(file.path()).unwrap();

        std::env::remove_var("OPFLOW_WORKERS");
        let unset = EngineConfig::from_file(file.path()).unwrap();

        assert_eq!(overridden.workers, 7);
        assert_eq!(zero.workers, 3);
        assert_eq!(garbage.workers, 3);
        assert_eq!(unset.workers, 3);
    }

    #[test]
    fn empty_file_equals_defaults() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let cfg = EngineConfig::from_file(file.path()).unwrap();
        assert_eq!(cfg.shutdown_grace_secs, EngineConfig::default().shutdown_grace_secs);
    }
}
