//! Lifecycle events and event handling.
//!
//! The scheduler emits an event for every admission decision and status
//! transition, enabling observability into job execution without polling.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::core::types::{ClientId, JobId};

/// Lifecycle events emitted by the scheduler.
#[derive(Debug, Clone)]
pub enum Event {
    /// A job was admitted and queued.
    JobAccepted {
        job_id: JobId,
        client_id: ClientId,
        timestamp: Instant,
    },

    /// An admission attempt was refused. Rejected attempts are never stored.
    JobRejected {
        client_id: ClientId,
        reason: String,
        timestamp: Instant,
    },

    /// A worker picked up a job.
    JobStarted {
        job_id: JobId,
        worker: usize,
        timestamp: Instant,
    },

    /// A job finished successfully.
    JobCompleted {
        job_id: JobId,
        worker: usize,
        duration: Duration,
        timestamp: Instant,
    },

    /// A job finished with an execution error.
    JobFailed {
        job_id: JobId,
        worker: usize,
        error: String,
        duration: Duration,
        timestamp: Instant,
    },

    /// A worker loop exited after observing shutdown.
    WorkerStopped { worker: usize, timestamp: Instant },
}

impl Event {
    /// Get the timestamp of the event.
    pub fn timestamp(&self) -> Instant {
        match self {
            Event::JobAccepted { timestamp, .. } => *timestamp,
            Event::JobRejected { timestamp, .. } => *timestamp,
            Event::JobStarted { timestamp, .. } => *timestamp,
            Event::JobCompleted { timestamp, .. } => *timestamp,
            Event::JobFailed { timestamp, .. } => *timestamp,
            Event::WorkerStopped { timestamp, .. } => *timestamp,
        }
    }

    /// The job this event concerns, if any.
    pub fn job_id(&self) -> Option<JobId> {
        match self {
            Event::JobAccepted { job_id, .. }
            | Event::JobStarted { job_id, .. }
            | Event::JobCompleted { job_id, .. }
            | Event::JobFailed { job_id, .. } => Some(*job_id),
            Event::JobRejected { .. } | Event::WorkerStopped { .. } => None,
        }
    }

    /// Create a JobAccepted event.
    pub fn job_accepted(job_id: JobId, client_id: ClientId) -> Self {
        Event::JobAccepted {
            job_id,
            client_id,
            timestamp: Instant::now(),
        }
    }

    /// Create a JobRejected event.
    pub fn job_rejected(client_id: ClientId, reason: impl Into<String>) -> Self {
        Event::JobRejected {
            client_id,
            reason: reason.into(),
            timestamp: Instant::now(),
        }
    }

    /// Create a JobStarted event.
    pub fn job_started(job_id: JobId, worker: usize) -> Self {
        Event::JobStarted {
            job_id,
            worker,
            timestamp: Instant::now(),
        }
    }

    /// Create a JobCompleted event.
    pub fn job_completed(job_id: JobId, worker: usize, duration: Duration) -> Self {
        Event::JobCompleted {
            job_id,
            worker,
            duration,
            timestamp: Instant::now(),
        }
    }

    /// Create a JobFailed event.
    pub fn job_failed(job_id: JobId, worker: usize, error: String, duration: Duration) -> Self {
        Event::JobFailed {
            job_id,
            worker,
            error,
            duration,
            timestamp: Instant::now(),
        }
    }

    /// Create a WorkerStopped event.
    pub fn worker_stopped(worker: usize) -> Self {
        Event::WorkerStopped {
            worker,
            timestamp: Instant::now(),
        }
    }
}

/// Handler for receiving lifecycle events.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Handle an event.
    async fn handle(&self, event: &Event);
}

/// Event bus for distributing events to registered handlers.
pub struct EventBus {
    handlers: RwLock<Vec<Arc<dyn EventHandler>>>,
}

impl EventBus {
    /// Create a new event bus with no handlers.
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(Vec::new()),
        }
    }

    /// Register an event handler.
    pub async fn register(&self, handler: Arc<dyn EventHandler>) {
        let mut handlers = self.handlers.write().await;
        handlers.push(handler);
    }

    /// Emit an event to all registered handlers.
    pub async fn emit(&self, event: Event) {
        let handlers = self.handlers.read().await;
        for handler in handlers.iter() {
            handler.handle(&event).await;
        }
    }

    /// Get the number of registered handlers.
    pub async fn handler_count(&self) -> usize {
        self.handlers.read().await.len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
