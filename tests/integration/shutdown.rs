//! Graceful shutdown integration tests.
//!
//! Tests that verify the scheduler gracefully handles shutdown by
//! letting running jobs finish, refusing new work, and leaving queued
//! jobs pending.

use crate::common::{TIMEOUT, client, gated_scheduler, wait_for_status};
use jobgate::testing::{InstantExecutor, RecordingHandler};
use jobgate::{Event, EventBus, JobStatus, Scheduler, SchedulerError, SchedulerState};
use std::sync::Arc;
use std::time::Duration;

/// Test: Shutdown waits for running jobs and they complete normally.
#[tokio::test]
async fn test_shutdown_waits_for_running_jobs() {
    let (handle, gate) = gated_scheduler(2);

    let a = handle.try_schedule(client(), "a").await.unwrap();
    let b = handle.try_schedule(client(), "b").await.unwrap();
    gate.wait_started(2, TIMEOUT).await;

    let shutdown = {
        let handle = handle.clone();
        tokio::spawn(async move { handle.shutdown().await })
    };

    // Give the shutdown task a chance to start; it must still be waiting
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!shutdown.is_finished());
    assert_eq!(handle.state().await, SchedulerState::Stopping);

    gate.open();
    tokio::time::timeout(TIMEOUT, shutdown)
        .await
        .expect("shutdown should finish once jobs are released")
        .unwrap();

    assert_eq!(handle.state().await, SchedulerState::Stopped);
    assert_eq!(gate.finished(), 2);
    assert_eq!(handle.get_job(&a.id()).unwrap().status(), JobStatus::Completed);
    assert_eq!(handle.get_job(&b.id()).unwrap().status(), JobStatus::Completed);
    assert_eq!(handle.capacity().unwrap().current, 0);
}

/// Test: Submissions during and after shutdown are refused.
#[tokio::test]
async fn test_submissions_refused_once_shutdown_begins() {
    let (handle, gate) = gated_scheduler(2);

    handle.try_schedule(client(), "running").await.unwrap();
    gate.wait_started(1, TIMEOUT).await;

    let shutdown = {
        let handle = handle.clone();
        tokio::spawn(async move { handle.shutdown().await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;

    // A slot is free, but the scheduler is stopping
    let during = handle.try_schedule(client(), "late").await;
    assert!(matches!(during, Err(SchedulerError::ShuttingDown)));

    gate.open();
    shutdown.await.unwrap();

    let after = handle.try_schedule(client(), "later").await;
    assert!(matches!(after, Err(SchedulerError::ShuttingDown)));
    assert_eq!(handle.jobs().unwrap().len(), 1);
}

/// Test: Jobs still queued when shutdown begins are never started.
///
/// On a single-threaded runtime the workers are not polled until the test
/// yields, so both ids are still in the queue when shutdown is signalled.
#[tokio::test(flavor = "current_thread")]
async fn test_queued_jobs_stay_pending() {
    let handle = Scheduler::new(InstantExecutor)
        .with_max_concurrency(2)
        .start();

    let a = handle.try_schedule(client(), "a").await.unwrap();
    let b = handle.try_schedule(client(), "b").await.unwrap();
    handle.shutdown().await;

    assert_eq!(handle.get_job(&a.id()).unwrap().status(), JobStatus::Pending);
    assert_eq!(handle.get_job(&b.id()).unwrap().status(), JobStatus::Pending);
    assert_eq!(handle.queued(), 2);
    assert_eq!(handle.capacity().unwrap().current, 2);
}

/// Test: Shutdown can be called repeatedly and concurrently.
#[tokio::test]
async fn test_shutdown_idempotent() {
    let handle = Scheduler::new(InstantExecutor).start();

    let first = handle.clone();
    let second = handle.clone();
    tokio::join!(first.shutdown(), second.shutdown());
    assert_eq!(handle.state().await, SchedulerState::Stopped);

    tokio::time::timeout(Duration::from_secs(1), handle.shutdown())
        .await
        .expect("repeated shutdown should return immediately");
    assert!(!handle.is_running().await);
}

/// Test: Every worker reports that it stopped, and the token fires.
#[tokio::test]
async fn test_workers_report_stop() {
    let recorder = Arc::new(RecordingHandler::new());
    let event_bus = EventBus::new();
    event_bus.register(recorder.clone()).await;

    let handle = Scheduler::new(InstantExecutor)
        .with_max_concurrency(3)
        .with_event_bus(event_bus)
        .start();
    let token = handle.shutdown_token();

    let job = handle.try_schedule(client(), "x").await.unwrap();
    wait_for_status(&handle, &job.id(), JobStatus::Completed, TIMEOUT).await;

    assert!(!token.is_cancelled());
    handle.shutdown().await;
    assert!(token.is_cancelled());

    assert_eq!(
        recorder
            .count(|e| matches!(e, Event::WorkerStopped { .. }))
            .await,
        3
    );
}
