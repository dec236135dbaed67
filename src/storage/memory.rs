//! In-memory job store.
//!
//! Single source of truth for job state. Callers only ever receive clones
//! of records; mutation happens exclusively through the methods below.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::RwLock;

use super::{Capacity, StorageError};
use crate::core::executor::ExecutionError;
use crate::core::job::{Job, JobStatus};
use crate::core::types::{ClientId, JobId};

/// State guarded by the store lock.
#[derive(Default)]
struct Inner {
    jobs: HashMap<JobId, Job>,
    /// Number of jobs in `Pending` or `Running`.
    scheduled: usize,
}

/// Concurrency-safe job map plus the admission counter.
///
/// Data is not persisted across restarts.
pub struct JobStore {
    inner: RwLock<Inner>,
    max_concurrency: usize,
}

impl JobStore {
    /// Create an empty store admitting at most `max_concurrency` scheduled jobs.
    pub fn new(max_concurrency: usize) -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            max_concurrency,
        }
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Admit a new job if capacity allows.
    ///
    /// The capacity check, the `enqueue` hand-off and the insertion happen
    /// under one write lock. If `enqueue` fails nothing is inserted and the
    /// counter is left untouched. `enqueue` must not block.
    pub fn try_admit<F>(
        &self,
        client_id: ClientId,
        data: impl Into<String>,
        enqueue: F,
    ) -> Result<Job, StorageError>
    where
        F: FnOnce(JobId) -> Result<(), StorageError>,
    {
        let mut inner = self.inner.write().map_err(|_| StorageError::LockPoisoned)?;
        let capacity = Capacity {
            current: inner.scheduled,
            max: self.max_concurrency,
        };
        if capacity.is_full() {
            return Err(StorageError::CapacityExceeded {
                current: capacity.current,
                max: capacity.max,
            });
        }

        let job = Job::new(client_id, data);
        enqueue(job.id())?;

        inner.jobs.insert(job.id(), job.clone());
        inner.scheduled += 1;
        Ok(job)
    }

    /// Get a copy of a job by ID.
    pub fn get_job(&self, id: &JobId) -> Result<Job, StorageError> {
        let inner = self.inner.read().map_err(|_| StorageError::LockPoisoned)?;
        inner
            .jobs
            .get(id)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(id.to_string()))
    }

    /// Snapshot of the capacity gate.
    pub fn capacity(&self) -> Result<Capacity, StorageError> {
        let inner = self.inner.read().map_err(|_| StorageError::LockPoisoned)?;
        Ok(Capacity {
            current: inner.scheduled,
            max: self.max_concurrency,
        })
    }

    /// Copies of every job, oldest first.
    pub fn snapshot(&self) -> Result<Vec<Job>, StorageError> {
        let inner = self.inner.read().map_err(|_| StorageError::LockPoisoned)?;
        let mut jobs: Vec<_> = inner.jobs.values().cloned().collect();
        jobs.sort_by_key(|j| j.created_at());
        Ok(jobs)
    }

    /// Count jobs by status.
    pub fn count_by_status(&self, status: JobStatus) -> Result<usize, StorageError> {
        let inner = self.inner.read().map_err(|_| StorageError::LockPoisoned)?;
        Ok(inner.jobs.values().filter(|j| j.status() == status).count())
    }

    /// Total number of stored jobs.
    pub fn len(&self) -> Result<usize, StorageError> {
        let inner = self.inner.read().map_err(|_| StorageError::LockPoisoned)?;
        Ok(inner.jobs.len())
    }

    pub fn is_empty(&self) -> Result<bool, StorageError> {
        Ok(self.len()? == 0)
    }

    /// Move a job from `Pending` to `Running`.
    ///
    /// Returns `None` when the id does not resolve to a pending job; the
    /// counter is never touched on that path.
    pub fn begin(&self, id: &JobId) -> Result<Option<Job>, StorageError> {
        let mut inner = self.inner.write().map_err(|_| StorageError::LockPoisoned)?;
        let Some(job) = inner.jobs.get_mut(id) else {
            return Ok(None);
        };
        match job.mark_running() {
            Ok(()) => Ok(Some(job.clone())),
            Err(e) => {
                tracing::warn!(job_id = %id, error = %e, "Refusing to start job");
                Ok(None)
            }
        }
    }

    /// Record the outcome of a running job and release its capacity slot.
    ///
    /// The counter is decremented only if the job actually left `Running`,
    /// so a repeated or stray call cannot release a slot twice.
    pub fn finish(
        &self,
        id: &JobId,
        outcome: Result<Value, ExecutionError>,
    ) -> Result<Option<Job>, StorageError> {
        let mut inner = self.inner.write().map_err(|_| StorageError::LockPoisoned)?;
        let Some(job) = inner.jobs.get_mut(id) else {
            return Ok(None);
        };
        let transition = match outcome {
            Ok(result) => job.mark_completed(result),
            Err(e) => job.mark_failed(e.to_string()),
        };
        if let Err(e) = transition {
            tracing::warn!(job_id = %id, error = %e, "Ignoring outcome for job");
            return Ok(None);
        }
        let finished = job.clone();
        inner.scheduled = inner.scheduled.saturating_sub(1);
        Ok(Some(finished))
    }
}
