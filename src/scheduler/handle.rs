//! Scheduler handle for submitting and inspecting jobs.
//!
//! This module provides the `SchedulerHandle` type: the admission
//! controller, read paths, and the lifecycle controller in one cloneable value.

use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::core::job::{Job, JobStatus};
use crate::core::types::{ClientId, JobId};
use crate::events::{Event, EventBus};
use crate::storage::{Capacity, JobStore};

use super::dispatch::DispatchQueue;
use super::types::{SchedulerError, SchedulerState};

pub(crate) struct Shared {
    pub(crate) store: Arc<JobStore>,
    pub(crate) queue: DispatchQueue,
    pub(crate) event_bus: Arc<EventBus>,
    pub(crate) shutdown: CancellationToken,
    pub(crate) state: RwLock<SchedulerState>,
    pub(crate) workers: Mutex<Vec<JoinHandle<()>>>,
    pub(crate) worker_count: usize,
}

/// Handle for controlling the scheduler.
#[derive(Clone)]
pub struct SchedulerHandle {
    pub(crate) shared: Arc<Shared>,
}

impl SchedulerHandle {
    /// Admit a job if capacity allows.
    ///
    /// On success the job is stored as `Pending` and its id is queued for
    /// the worker pool. On refusal nothing is stored.
    pub async fn try_schedule(
        &self,
        client_id: ClientId,
        data: impl Into<String>,
    ) -> Result<Job, SchedulerError> {
        if self.shared.shutdown.is_cancelled() {
            self.shared
                .event_bus
                .emit(Event::job_rejected(client_id, "scheduler is shutting down"))
                .await;
            return Err(SchedulerError::ShuttingDown);
        }

        let queue = &self.shared.queue;
        match self
            .shared
            .store
            .try_admit(client_id, data, |id| queue.enqueue(id))
        {
            Ok(job) => {
                tracing::info!(job_id = %job.id(), client_id = %client_id, "Job accepted");
                self.shared
                    .event_bus
                    .emit(Event::job_accepted(job.id(), client_id))
                    .await;
                Ok(job)
            }
            Err(e) => {
                tracing::warn!(client_id = %client_id, reason = %e, "Job rejected");
                self.shared
                    .event_bus
                    .emit(Event::job_rejected(client_id, e.to_string()))
                    .await;
                Err(e.into())
            }
        }
    }

    /// Get a copy of a job.
    pub fn get_job(&self, id: &JobId) -> Result<Job, SchedulerError> {
        Ok(self.shared.store.get_job(id)?)
    }

    /// Parse an identifier, then look the job up.
    ///
    /// A malformed identifier fails before the store is touched.
    pub fn find_job(&self, raw_id: &str) -> Result<Job, SchedulerError> {
        let id = JobId::from_string(raw_id)?;
        self.get_job(&id)
    }

    /// Snapshot of the capacity gate.
    pub fn capacity(&self) -> Result<Capacity, SchedulerError> {
        Ok(self.shared.store.capacity()?)
    }

    /// Copies of every job, oldest first.
    pub fn jobs(&self) -> Result<Vec<Job>, SchedulerError> {
        Ok(self.shared.store.snapshot()?)
    }

    /// Identifiers waiting in the dispatch queue.
    pub fn queued(&self) -> usize {
        self.shared.queue.len()
    }

    /// Size of the worker pool.
    pub fn worker_count(&self) -> usize {
        self.shared.worker_count
    }

    /// Stop the worker pool.
    ///
    /// Signals every worker, then waits until all of them have exited.
    /// Jobs already running finish first; jobs still queued stay `Pending`.
    /// New submissions are refused from the moment this is called.
    /// Calling it again after completion returns immediately.
    pub async fn shutdown(&self) {
        {
            let mut state = self.shared.state.write().await;
            if *state == SchedulerState::Stopped {
                return;
            }
            *state = SchedulerState::Stopping;
        }

        self.shared.shutdown.cancel();

        // Held for the whole drain so concurrent callers also wait.
        let mut workers = self.shared.workers.lock().await;
        let count = workers.len();
        if count > 0 {
            tracing::info!("Graceful shutdown: waiting for {} worker(s) to exit", count);
        }
        for handle in workers.drain(..) {
            if let Err(e) = handle.await {
                tracing::warn!(error = %e, "Worker terminated abnormally");
            }
        }
        drop(workers);

        *self.shared.state.write().await = SchedulerState::Stopped;
        let pending = self
            .shared
            .store
            .count_by_status(JobStatus::Pending)
            .unwrap_or_default();
        tracing::info!(pending, queued = self.queued(), "Scheduler stopped");
    }

    /// Get the current scheduler state.
    pub async fn state(&self) -> SchedulerState {
        *self.shared.state.read().await
    }

    /// Check if the scheduler is running.
    pub async fn is_running(&self) -> bool {
        *self.shared.state.read().await == SchedulerState::Running
    }

    /// A token cancelled when shutdown begins.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shared.shutdown.child_token()
    }
}
