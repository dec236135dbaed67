//! Job lifecycle integration tests.
//!
//! Tests that jobs move Pending -> Running -> Completed/Failed, that
//! timestamps only move forward, and that executor failures or panics
//! release the job's slot.

use crate::common::{TIMEOUT, client, gated_scheduler, wait_for_capacity, wait_for_status};
use jobgate::testing::{FailingExecutor, PanickingExecutor, RecordingHandler};
use jobgate::{Event, EventBus, JobState, JobStatus, Scheduler};
use std::sync::Arc;

/// Test: A job passes through every status with non-decreasing timestamps.
#[tokio::test]
async fn test_status_progression() {
    let (handle, gate) = gated_scheduler(1);

    let submitted = handle.try_schedule(client(), "payload").await.unwrap();
    assert_eq!(submitted.status(), JobStatus::Pending);
    assert_eq!(submitted.created_at(), submitted.updated_at());

    let running = wait_for_status(&handle, &submitted.id(), JobStatus::Running, TIMEOUT).await;
    assert!(running.updated_at() >= submitted.updated_at());
    assert_eq!(running.created_at(), submitted.created_at());
    assert!(running.result().is_none());

    gate.release(1);
    let completed =
        wait_for_status(&handle, &submitted.id(), JobStatus::Completed, TIMEOUT).await;
    assert!(completed.updated_at() >= running.updated_at());
    assert_eq!(completed.created_at(), submitted.created_at());
    assert_eq!(completed.data(), "payload");
    assert_eq!(completed.client_id(), submitted.client_id());
    assert_eq!(completed.result().unwrap()["processed_data"], "payload");
    assert!(completed.error().is_none());

    handle.shutdown().await;
}

/// Test: No more than `max_concurrency` jobs run at the same time.
#[tokio::test]
async fn test_running_jobs_bounded_by_pool() {
    let (handle, gate) = gated_scheduler(2);

    let a = handle.try_schedule(client(), "a").await.unwrap();
    let b = handle.try_schedule(client(), "b").await.unwrap();
    gate.wait_started(2, TIMEOUT).await;

    wait_for_status(&handle, &a.id(), JobStatus::Running, TIMEOUT).await;
    wait_for_status(&handle, &b.id(), JobStatus::Running, TIMEOUT).await;
    let running = handle
        .jobs()
        .unwrap()
        .iter()
        .filter(|j| j.status() == JobStatus::Running)
        .count();
    assert_eq!(running, 2);
    assert_eq!(handle.worker_count(), 2);

    gate.open();
    wait_for_capacity(&handle, 0, TIMEOUT).await;
    handle.shutdown().await;
}

/// Test: An executor error marks the job failed and frees the slot.
#[tokio::test]
async fn test_failed_job_releases_slot() {
    let handle = Scheduler::new(FailingExecutor::new("disk on fire"))
        .with_max_concurrency(1)
        .start();

    let job = handle.try_schedule(client(), "doomed").await.unwrap();
    let failed = wait_for_status(&handle, &job.id(), JobStatus::Failed, TIMEOUT).await;

    assert!(failed.error().unwrap().contains("disk on fire"));
    assert!(failed.result().is_none());
    assert!(matches!(failed.state(), JobState::Failed { .. }));

    wait_for_capacity(&handle, 0, TIMEOUT).await;
    handle.try_schedule(client(), "next").await.unwrap();

    handle.shutdown().await;
}

/// Test: A panicking executor fails the job without losing the worker.
#[tokio::test]
async fn test_panicking_job_does_not_kill_worker() {
    let handle = Scheduler::new(PanickingExecutor)
        .with_max_concurrency(1)
        .start();

    let first = handle.try_schedule(client(), "boom").await.unwrap();
    let failed = wait_for_status(&handle, &first.id(), JobStatus::Failed, TIMEOUT).await;
    assert!(failed.error().unwrap().contains("executor blew up"));
    wait_for_capacity(&handle, 0, TIMEOUT).await;

    // The single worker must still be alive to pick up the second job
    let second = handle.try_schedule(client(), "boom again").await.unwrap();
    wait_for_status(&handle, &second.id(), JobStatus::Failed, TIMEOUT).await;
    wait_for_capacity(&handle, 0, TIMEOUT).await;

    handle.shutdown().await;
}

/// Test: Mixed outcomes are reported through the event bus.
#[tokio::test]
async fn test_outcome_events() {
    let recorder = Arc::new(RecordingHandler::new());
    let event_bus = EventBus::new();
    event_bus.register(recorder.clone()).await;

    let gate = Arc::new(jobgate::testing::GatedExecutor::new());
    let handle = Scheduler::with_executor(gate.clone())
        .with_max_concurrency(2)
        .with_event_bus(event_bus)
        .start();
    gate.open();

    let ok = handle.try_schedule(client(), "fine").await.unwrap();
    let bad = handle.try_schedule(client(), "fail").await.unwrap();
    wait_for_status(&handle, &ok.id(), JobStatus::Completed, TIMEOUT).await;
    wait_for_status(&handle, &bad.id(), JobStatus::Failed, TIMEOUT).await;
    handle.shutdown().await;

    let events = recorder.events().await;
    assert!(events.iter().any(
        |e| matches!(e, Event::JobCompleted { job_id, .. } if *job_id == ok.id())
    ));
    assert!(events.iter().any(
        |e| matches!(e, Event::JobFailed { job_id, .. } if *job_id == bad.id())
    ));
    assert_eq!(
        events
            .iter()
            .filter(|e| matches!(e, Event::JobStarted { .. }))
            .count(),
        2
    );
}
