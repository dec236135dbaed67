//! Worker loop.
//!
//! Each worker pulls job identifiers from the dispatch queue and runs them
//! one at a time. Shutdown is observed only while waiting for the next id;
//! a job that has started always runs to completion.

use serde_json::Value;
use std::any::Any;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

use super::dispatch::DispatchReceiver;
use crate::core::executor::{ExecutionError, JobExecutor};
use crate::core::job::{Job, JobState};
use crate::core::types::JobId;
use crate::events::{Event, EventBus};
use crate::storage::JobStore;

pub(crate) struct Worker {
    pub(crate) id: usize,
    pub(crate) store: Arc<JobStore>,
    pub(crate) queue: DispatchReceiver,
    pub(crate) executor: Arc<dyn JobExecutor>,
    pub(crate) event_bus: Arc<EventBus>,
    pub(crate) shutdown: CancellationToken,
}

impl Worker {
    /// Run until shutdown is signalled or the queue closes.
    pub(crate) async fn run(self) {
        tracing::debug!(worker = self.id, "Worker started");

        loop {
            let job_id = tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => break,
                next = self.queue.recv() => match next {
                    Some(id) => id,
                    None => break,
                },
            };
            self.process(job_id).await;
        }

        tracing::debug!(worker = self.id, "Worker stopped");
        self.event_bus.emit(Event::worker_stopped(self.id)).await;
    }

    async fn process(&self, job_id: JobId) {
        let job = match self.store.begin(&job_id) {
            Ok(Some(job)) => job,
            Ok(None) => {
                tracing::debug!(worker = self.id, job_id = %job_id, "Dropping unresolvable job id");
                return;
            }
            Err(e) => {
                tracing::error!(worker = self.id, job_id = %job_id, error = %e, "Failed to start job");
                return;
            }
        };

        tracing::info!(worker = self.id, job_id = %job_id, executor = self.executor.name(), "Job started");
        self.event_bus
            .emit(Event::job_started(job_id, self.id))
            .await;

        let start = Instant::now();
        let outcome = self.execute(job).await;
        let duration = start.elapsed();

        let finished = match self.store.finish(&job_id, outcome) {
            Ok(Some(job)) => job,
            Ok(None) => return,
            Err(e) => {
                tracing::error!(worker = self.id, job_id = %job_id, error = %e, "Failed to record job outcome");
                return;
            }
        };

        match finished.state() {
            JobState::Failed { error } => {
                tracing::warn!(worker = self.id, job_id = %job_id, error = %error, "Job failed after {:?}", duration);
                self.event_bus
                    .emit(Event::job_failed(job_id, self.id, error.clone(), duration))
                    .await;
            }
            _ => {
                tracing::info!(worker = self.id, job_id = %job_id, "Job completed in {:?}", duration);
                self.event_bus
                    .emit(Event::job_completed(job_id, self.id, duration))
                    .await;
            }
        }
    }

    /// Run the executor on its own task so a panic becomes a failed job
    /// instead of killing the worker with a slot still held.
    async fn execute(&self, job: Job) -> Result<Value, ExecutionError> {
        let executor = Arc::clone(&self.executor);
        let handle = tokio::spawn(async move { executor.execute(&job).await });

        match handle.await {
            Ok(outcome) => outcome,
            Err(e) if e.is_panic() => Err(ExecutionError::Panicked(panic_message(e.into_panic()))),
            Err(e) => Err(ExecutionError::Failed(e.to_string())),
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
