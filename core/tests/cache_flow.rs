mod common;

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;

use common::{init_tracing, Counted, Labeled};
use opflow_core::executor::{CacheExecutor, ProgressExecutor};
use opflow_core::progress::ProgressCommand;
use opflow_core::{EngineConfig, ErrorCode, ProgressError};

fn executor() -> CacheExecutor {
    init_tracing();
    let mut cfg = EngineConfig::default();
    cfg.workers = 4;
    CacheExecutor::new(&cfg)
}

#[tokio::test]
async fn issues_distinct_immediately_resolvable_ids() {
    let executor = executor();
    let commands: Vec<Box<dyn ProgressCommand>> = (0..5)
        .map(|_| Box::new(Labeled::new("busy", Duration::from_millis(200))) as Box<dyn ProgressCommand>)
        .collect();

    let ids = executor.start_command(commands, None).await;

    assert_eq!(ids.len(), 5);
    let distinct: HashSet<_> = ids.iter().collect();
    assert_eq!(distinct.len(), 5);

    // resolvable right away, before the commands have finished
    for id in &ids {
        executor.get_status(id).await.unwrap();
    }
}

#[tokio::test]
async fn unknown_id_is_a_not_found_error() {
    let executor = executor();
    let err = executor.get_status("no-such-id").await.unwrap_err();
    assert!(matches!(err, ProgressError::UnknownId(_)));
    assert_eq!(err.error_code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn ids_map_to_commands_in_submission_order() {
    let executor = executor();
    let commands: Vec<Box<dyn ProgressCommand>> = vec![
        Box::new(Labeled::new("first", Duration::from_millis(5))),
        Box::new(Labeled::new("second", Duration::from_millis(5))),
        Box::new(Labeled::new("third", Duration::from_millis(5))),
    ];

    let ids = executor.start_command(commands, None).await;

    for (id, expected) in ids.iter().zip(["first", "second", "third"]) {
        // status mutation happens on the worker; poll until terminal
        let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
        while !executor.get_status(id).await.unwrap().is_done {
            assert!(
                tokio::time::Instant::now() < deadline,
                "command '{expected}' never finished"
            );
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        let snap = executor.get_status(id).await.unwrap();
        assert_eq!(snap.description(), expected);
        assert_eq!(snap.percent, 100);
    }
}

#[tokio::test]
async fn post_process_runs_after_the_whole_batch() {
    let counter = Arc::new(AtomicUsize::new(0));
    let (seen_tx, seen_rx) = tokio::sync::oneshot::channel();

    let commands: Vec<Box<dyn ProgressCommand>> = (0..3)
        .map(|_| {
            Box::new(Counted {
                counter: counter.clone(),
            }) as Box<dyn ProgressCommand>
        })
        .collect();

    // one worker: the post-process waits on the batch without holding the
    // permit the commands need
    init_tracing();
    let mut cfg = EngineConfig::default();
    cfg.workers = 1;
    let executor = CacheExecutor::new(&cfg);

    let observed = counter.clone();
    executor
        .start_command(
            commands,
            Some(Box::new(move || {
                let _ = seen_tx.send(observed.load(Ordering::SeqCst));
            })),
        )
        .await;

    let seen = tokio::time::timeout(Duration::from_secs(2), seen_rx)
        .await
        .expect("post-process did not run")
        .unwrap();
    assert_eq!(seen, 3);
}

#[tokio::test]
async fn start_command_returns_before_commands_finish() {
    let executor = executor();
    let commands: Vec<Box<dyn ProgressCommand>> =
        vec![Box::new(Labeled::new("slow", Duration::from_secs(5)))];

    let started = tokio::time::Instant::now();
    let ids = executor.start_command(commands, None).await;
    assert!(started.elapsed() < Duration::from_secs(1));

    let snap = executor.get_status(&ids[0]).await.unwrap();
    assert!(!snap.is_done);
}
