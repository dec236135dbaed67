//! Testing utilities for users of the jobgate library.
//!
//! This module provides executors and handlers with predictable behavior:
//!
//! - [`InstantExecutor`]: succeeds immediately, echoing the payload
//! - [`FailingExecutor`]: always fails with a fixed message
//! - [`PanickingExecutor`]: panics inside `execute`
//! - [`GatedExecutor`]: blocks every job until the test releases it
//! - [`RecordingHandler`]: captures emitted events

use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, Semaphore};

use crate::core::executor::{ExecutionError, JobExecutor};
use crate::core::job::Job;
use crate::events::{Event, EventHandler};

/// Executor that completes immediately.
pub struct InstantExecutor;

#[async_trait]
impl JobExecutor for InstantExecutor {
    async fn execute(&self, job: &Job) -> Result<Value, ExecutionError> {
        Ok(json!({ "processed_data": job.data() }))
    }

    fn name(&self) -> &str {
        "instant"
    }
}

/// Executor that always fails.
pub struct FailingExecutor {
    message: String,
}

impl FailingExecutor {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl JobExecutor for FailingExecutor {
    async fn execute(&self, _job: &Job) -> Result<Value, ExecutionError> {
        Err(ExecutionError::Failed(self.message.clone()))
    }

    fn name(&self) -> &str {
        "failing"
    }
}

/// Executor that panics.
pub struct PanickingExecutor;

#[async_trait]
impl JobExecutor for PanickingExecutor {
    async fn execute(&self, job: &Job) -> Result<Value, ExecutionError> {
        panic!("executor blew up on {}", job.id());
    }

    fn name(&self) -> &str {
        "panicking"
    }
}

/// Executor whose jobs block until released.
///
/// Each call to [`GatedExecutor::release`] lets one more job finish;
/// [`GatedExecutor::open`] lets every current and future job through.
/// Jobs whose payload is `"fail"` finish with an error once released.
///
/// # Example
///
/// ```ignore
/// let gate = Arc::new(GatedExecutor::new());
/// // ... schedule jobs ...
/// gate.wait_started(3, Duration::from_secs(1)).await;
/// gate.release(1);
/// ```
pub struct GatedExecutor {
    gate: Semaphore,
    started: AtomicUsize,
    finished: AtomicUsize,
}

impl GatedExecutor {
    pub fn new() -> Self {
        Self {
            gate: Semaphore::new(0),
            started: AtomicUsize::new(0),
            finished: AtomicUsize::new(0),
        }
    }

    /// Let `n` blocked (or future) jobs finish.
    pub fn release(&self, n: usize) {
        self.gate.add_permits(n);
    }

    /// Let every job through from now on.
    pub fn open(&self) {
        self.gate.close();
    }

    /// Number of jobs that entered `execute`.
    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    /// Number of jobs that returned from `execute`.
    pub fn finished(&self) -> usize {
        self.finished.load(Ordering::SeqCst)
    }

    /// Poll until at least `n` jobs have started.
    ///
    /// # Panics
    ///
    /// Panics if the timeout elapses first.
    pub async fn wait_started(&self, n: usize, timeout: Duration) {
        let start = tokio::time::Instant::now();
        while self.started() < n {
            if start.elapsed() > timeout {
                panic!(
                    "Timeout waiting for {} job(s) to start, {} started",
                    n,
                    self.started()
                );
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }
}

impl Default for GatedExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl JobExecutor for GatedExecutor {
    async fn execute(&self, job: &Job) -> Result<Value, ExecutionError> {
        self.started.fetch_add(1, Ordering::SeqCst);
        if let Ok(permit) = self.gate.acquire().await {
            permit.forget();
        }
        self.finished.fetch_add(1, Ordering::SeqCst);

        if job.data() == "fail" {
            return Err(ExecutionError::Failed("requested failure".to_string()));
        }
        Ok(json!({ "processed_data": job.data() }))
    }

    fn name(&self) -> &str {
        "gated"
    }
}

/// Event handler that records every event it receives.
pub struct RecordingHandler {
    events: Mutex<Vec<Event>>,
}

impl RecordingHandler {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
        }
    }

    pub async fn events(&self) -> Vec<Event> {
        self.events.lock().await.clone()
    }

    /// Count events matching a predicate.
    pub async fn count(&self, predicate: impl Fn(&Event) -> bool) -> usize {
        self.events.lock().await.iter().filter(|e| predicate(e)).count()
    }
}

impl Default for RecordingHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventHandler for RecordingHandler {
    async fn handle(&self, event: &Event) {
        self.events.lock().await.push(event.clone());
    }
}
