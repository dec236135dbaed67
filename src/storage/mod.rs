//! Job storage and admission control.
//!
//! The job map and the "currently scheduled" counter share a single
//! read/write lock: reads (lookups, capacity) run concurrently with each
//! other, while admission and status transitions take the write side.

mod memory;

pub use memory::JobStore;

use serde::Serialize;
use thiserror::Error;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The requested job was not found.
    #[error("job not found: {0}")]
    NotFound(String),

    /// Admission denied because the scheduled-count is at its maximum.
    #[error("job queue at capacity ({current}/{max})")]
    CapacityExceeded { current: usize, max: usize },

    /// The dispatch queue refused the job identifier.
    #[error("dispatch queue unavailable: {0}")]
    QueueUnavailable(String),

    /// Storage lock was poisoned.
    #[error("storage lock poisoned")]
    LockPoisoned,
}

/// Point-in-time view of the capacity gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Capacity {
    /// Jobs currently `Pending` or `Running`.
    pub current: usize,
    /// Configured maximum concurrency.
    pub max: usize,
}

impl Capacity {
    /// Remaining admission slots.
    pub fn available(&self) -> usize {
        self.max.saturating_sub(self.current)
    }

    pub fn is_full(&self) -> bool {
        self.current >= self.max
    }
}
