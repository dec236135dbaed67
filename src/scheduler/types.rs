//! Scheduler type definitions.
//!
//! This module contains error types and state enums for the scheduler.

use thiserror::Error;

use crate::core::types::InvalidIdError;
use crate::storage::StorageError;

/// Errors that can occur in the scheduler.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Storage or admission error.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The scheduler no longer accepts work.
    #[error("scheduler is shutting down")]
    ShuttingDown,

    /// A malformed identifier was supplied.
    #[error(transparent)]
    InvalidId(#[from] InvalidIdError),
}

impl SchedulerError {
    /// Whether this error is an admission refusal rather than a fault.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            SchedulerError::ShuttingDown
                | SchedulerError::Storage(StorageError::CapacityExceeded { .. })
        )
    }
}

/// State of the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Workers are consuming the dispatch queue.
    Running,
    /// Shutdown was requested; in-flight jobs are draining.
    Stopping,
    /// Every worker has exited.
    Stopped,
}

impl SchedulerState {
    pub fn as_str(self) -> &'static str {
        match self {
            SchedulerState::Running => "running",
            SchedulerState::Stopping => "stopping",
            SchedulerState::Stopped => "stopped",
        }
    }
}
