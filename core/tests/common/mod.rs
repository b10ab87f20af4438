#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use opflow_core::progress::{DetailedProgressListener, ProgressCommand};

/// Installs a test-writer subscriber so engine logs show up under
/// `cargo test -- --nocapture`. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "debug".into()),
        )
        .with_test_writer()
        .try_init();
}

/// Command that reports one full stage and finishes with the given message.
pub struct Labeled {
    pub message: &'static str,
    pub delay: Duration,
}

impl Labeled {
    pub fn new(message: &'static str, delay: Duration) -> Self {
        Self { message, delay }
    }
}

#[async_trait::async_trait]
impl ProgressCommand for Labeled {
    async fn execute(&self, listener: &mut dyn DetailedProgressListener) -> anyhow::Result<()> {
        listener.progress_started(self.message, 100)?;
        tokio::time::sleep(self.delay).await;
        listener.in_progress(1, 1)?;
        listener.ended(true, self.message);
        Ok(())
    }
}

/// Command that bumps a shared counter right before finishing, so a
/// post-process can observe how many siblings completed before it ran.
pub struct Counted {
    pub counter: Arc<AtomicUsize>,
}

#[async_trait::async_trait]
impl ProgressCommand for Counted {
    async fn execute(&self, listener: &mut dyn DetailedProgressListener) -> anyhow::Result<()> {
        listener.progress_started("counted work", 100)?;
        tokio::time::sleep(Duration::from_millis(10)).await;
        self.counter.fetch_add(1, Ordering::SeqCst);
        listener.ended(true, "counted");
        Ok(())
    }
}

/// Command that fails mid-flight; also bumps the counter so completion
/// accounting covers the failure path.
pub struct FailsCounted {
    pub counter: Arc<AtomicUsize>,
}

#[async_trait::async_trait]
impl ProgressCommand for FailsCounted {
    async fn execute(&self, listener: &mut dyn DetailedProgressListener) -> anyhow::Result<()> {
        listener.progress_started("doomed work", 50)?;
        self.counter.fetch_add(1, Ordering::SeqCst);
        anyhow::bail!("simulated command failure")
    }
}

/// Command that dies by panic instead of returning an error.
pub struct PanicsMidway;

#[async_trait::async_trait]
impl ProgressCommand for PanicsMidway {
    async fn execute(&self, listener: &mut dyn DetailedProgressListener) -> anyhow::Result<()> {
        listener.progress_started("unstable work", 100)?;
        panic!("simulated command panic");
    }
}

/// Command that never finishes on its own.
pub struct Eternal;

#[async_trait::async_trait]
impl ProgressCommand for Eternal {
    async fn execute(&self, listener: &mut dyn DetailedProgressListener) -> anyhow::Result<()> {
        listener.progress_started("stuck", 100)?;
        tokio::time::sleep(Duration::from_secs(3600)).await;
        listener.ended(true, "unreachable");
        Ok(())
    }
}
