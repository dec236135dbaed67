//! Admission control integration tests.
//!
//! Tests that the capacity gate never admits more than the configured
//! number of jobs, even under concurrent submission, and that slots are
//! returned once jobs finish.

use crate::common::{TIMEOUT, client, gated_scheduler, wait_for_capacity, wait_for_status};
use jobgate::testing::{InstantExecutor, RecordingHandler};
use jobgate::{Event, EventBus, JobStatus, Scheduler, SchedulerError, StorageError};
use std::sync::Arc;

/// Test: With a limit of 3, the fourth submission is refused and not stored.
#[tokio::test]
async fn test_fourth_submission_rejected() {
    let (handle, gate) = gated_scheduler(3);

    for i in 0..3 {
        handle
            .try_schedule(client(), format!("job-{}", i))
            .await
            .unwrap();
    }

    let result = handle.try_schedule(client(), "job-3").await;
    match result {
        Err(SchedulerError::Storage(StorageError::CapacityExceeded { current, max })) => {
            assert_eq!(current, 3);
            assert_eq!(max, 3);
        }
        other => panic!("expected capacity rejection, got {:?}", other.map(|j| j.id())),
    }

    // Rejected attempts leave no record behind
    assert_eq!(handle.jobs().unwrap().len(), 3);
    assert_eq!(handle.capacity().unwrap().current, 3);

    gate.open();
    handle.shutdown().await;
}

/// Test: Concurrent submissions admit exactly `max_concurrency` jobs.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_submissions_respect_limit() {
    let (handle, gate) = gated_scheduler(3);

    let mut tasks = Vec::new();
    for i in 0..50 {
        let handle = handle.clone();
        tasks.push(tokio::spawn(async move {
            handle.try_schedule(client(), format!("job-{}", i)).await
        }));
    }

    let mut accepted = 0;
    let mut rejected = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(_) => accepted += 1,
            Err(e) => {
                assert!(e.is_rejection(), "unexpected error: {}", e);
                rejected += 1;
            }
        }
    }

    assert_eq!(accepted, 3);
    assert_eq!(rejected, 47);
    assert_eq!(handle.jobs().unwrap().len(), 3);

    gate.open();
    wait_for_capacity(&handle, 0, TIMEOUT).await;
    handle.shutdown().await;
}

/// Test: Finishing a job frees its slot for a new submission.
#[tokio::test]
async fn test_slot_reused_after_completion() {
    let (handle, gate) = gated_scheduler(1);

    let first = handle.try_schedule(client(), "first").await.unwrap();
    assert!(handle.try_schedule(client(), "blocked").await.is_err());

    gate.release(1);
    wait_for_status(&handle, &first.id(), JobStatus::Completed, TIMEOUT).await;
    wait_for_capacity(&handle, 0, TIMEOUT).await;

    let second = handle.try_schedule(client(), "second").await.unwrap();
    assert_ne!(first.id(), second.id());

    gate.open();
    handle.shutdown().await;
}

/// Test: The counter returns to zero after repeated fill-and-drain cycles.
#[tokio::test]
async fn test_counter_returns_to_zero_after_cycles() {
    let handle = Scheduler::new(InstantExecutor)
        .with_max_concurrency(2)
        .start();

    for cycle in 0..5 {
        let mut ids = Vec::new();
        for i in 0..2 {
            let job = handle
                .try_schedule(client(), format!("cycle-{}-{}", cycle, i))
                .await
                .unwrap();
            ids.push(job.id());
        }
        for id in &ids {
            wait_for_status(&handle, id, JobStatus::Completed, TIMEOUT).await;
        }
        wait_for_capacity(&handle, 0, TIMEOUT).await;
    }

    assert_eq!(handle.jobs().unwrap().len(), 10);
    assert_eq!(handle.capacity().unwrap().available(), 2);

    handle.shutdown().await;
}

/// Test: Accepted and rejected submissions are reported as events.
#[tokio::test]
async fn test_admission_decisions_emit_events() {
    let recorder = Arc::new(RecordingHandler::new());
    let event_bus = EventBus::new();
    event_bus.register(recorder.clone()).await;

    let gate = Arc::new(jobgate::testing::GatedExecutor::new());
    let handle = Scheduler::with_executor(gate.clone())
        .with_max_concurrency(1)
        .with_event_bus(event_bus)
        .start();

    let rejected_client = client();
    handle.try_schedule(client(), "ok").await.unwrap();
    handle
        .try_schedule(rejected_client, "too many")
        .await
        .unwrap_err();

    assert_eq!(
        recorder
            .count(|e| matches!(e, Event::JobAccepted { .. }))
            .await,
        1
    );
    let rejections: Vec<_> = recorder
        .events()
        .await
        .into_iter()
        .filter_map(|e| match e {
            Event::JobRejected {
                client_id, reason, ..
            } => Some((client_id, reason)),
            _ => None,
        })
        .collect();
    assert_eq!(rejections.len(), 1);
    assert_eq!(rejections[0].0, rejected_client);
    assert!(rejections[0].1.contains("capacity"));

    gate.open();
    handle.shutdown().await;
}
