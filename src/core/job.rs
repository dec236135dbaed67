//! Job record and its lifecycle state machine.
//!
//! A job moves strictly `Pending -> Running -> {Completed, Failed}`. The success
//! payload and the failure description live inside the terminal state itself,
//! so a record can never carry both (or carry one in the wrong state).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

use super::types::{ClientId, JobId};

/// Error returned when a status transition is not allowed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid transition for job {job_id}: {from} -> {to}")]
pub struct TransitionError {
    pub job_id: JobId,
    pub from: JobStatus,
    pub to: JobStatus,
}

/// Payload-free status tag of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Admitted and waiting in the dispatch queue.
    Pending,
    /// Picked up by a worker.
    Running,
    /// Finished successfully.
    Completed,
    /// Finished with an execution error.
    Failed,
}

impl JobStatus {
    /// Whether a job in this status counts against the capacity gate.
    pub fn is_scheduled(self) -> bool {
        matches!(self, JobStatus::Pending | JobStatus::Running)
    }

    /// Whether this status is final.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state of a job, carrying the outcome once terminal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum JobState {
    Pending,
    Running,
    Completed { result: Value },
    Failed { error: String },
}

impl JobState {
    /// The status tag of this state.
    pub fn status(&self) -> JobStatus {
        match self {
            JobState::Pending => JobStatus::Pending,
            JobState::Running => JobStatus::Running,
            JobState::Completed { .. } => JobStatus::Completed,
            JobState::Failed { .. } => JobStatus::Failed,
        }
    }
}

/// A unit of work tracked from admission to completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    id: JobId,
    client_id: ClientId,
    data: String,
    #[serde(flatten)]
    state: JobState,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Job {
    /// Create a new pending job with a fresh identifier.
    pub fn new(client_id: ClientId, data: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: JobId::new(),
            client_id,
            data: data.into(),
            state: JobState::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn client_id(&self) -> ClientId {
        self.client_id
    }

    /// The opaque payload supplied by the client.
    pub fn data(&self) -> &str {
        &self.data
    }

    pub fn state(&self) -> &JobState {
        &self.state
    }

    pub fn status(&self) -> JobStatus {
        self.state.status()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// The success payload, present only once completed.
    pub fn result(&self) -> Option<&Value> {
        match &self.state {
            JobState::Completed { result } => Some(result),
            _ => None,
        }
    }

    /// The failure description, present only once failed.
    pub fn error(&self) -> Option<&str> {
        match &self.state {
            JobState::Failed { error } => Some(error),
            _ => None,
        }
    }

    /// Transition `Pending -> Running`.
    pub fn mark_running(&mut self) -> Result<(), TransitionError> {
        self.transition(JobStatus::Pending, JobState::Running)
    }

    /// Transition `Running -> Completed`, storing the result.
    pub fn mark_completed(&mut self, result: Value) -> Result<(), TransitionError> {
        self.transition(JobStatus::Running, JobState::Completed { result })
    }

    /// Transition `Running -> Failed`, storing the error description.
    pub fn mark_failed(&mut self, error: impl Into<String>) -> Result<(), TransitionError> {
        self.transition(
            JobStatus::Running,
            JobState::Failed {
                error: error.into(),
            },
        )
    }

    fn transition(&mut self, expected: JobStatus, next: JobState) -> Result<(), TransitionError> {
        let from = self.status();
        if from != expected {
            return Err(TransitionError {
                job_id: self.id,
                from,
                to: next.status(),
            });
        }
        self.state = next;
        // Wall clocks can step backwards; updated_at must not.
        self.updated_at = Utc::now().max(self.updated_at);
        Ok(())
    }
}
