//! Scheduler engine implementation.
//!
//! The scheduler is responsible for:
//! - Admitting jobs against a fixed concurrency limit
//! - Running admitted jobs on a fixed pool of workers
//! - Graceful shutdown that drains in-flight jobs
//! - Event emission

use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tokio_util::sync::CancellationToken;

use crate::config::ServerConfig;
use crate::core::executor::{JobExecutor, SimulatedExecutor};
use crate::events::EventBus;
use crate::storage::JobStore;

use super::dispatch::{DEFAULT_QUEUE_CAPACITY, DispatchQueue, MAX_QUEUE_CAPACITY};
use super::handle::{SchedulerHandle, Shared};
use super::types::SchedulerState;
use super::worker::Worker;

/// Default maximum number of concurrently scheduled jobs.
pub const DEFAULT_MAX_CONCURRENCY: usize = 3;

/// Builder for the job engine.
pub struct Scheduler {
    /// Job body run by every worker.
    executor: Arc<dyn JobExecutor>,
    /// Event bus for emitting events.
    event_bus: Arc<EventBus>,
    /// Admission limit and worker pool size.
    max_concurrency: usize,
    /// Dispatch queue buffer.
    queue_capacity: usize,
}

impl Scheduler {
    /// Create a new scheduler running jobs with the given executor.
    pub fn new(executor: impl JobExecutor + 'static) -> Self {
        Self::with_executor(Arc::new(executor))
    }

    /// Create a new scheduler with a shared executor (for testing).
    pub fn with_executor(executor: Arc<dyn JobExecutor>) -> Self {
        Self {
            executor,
            event_bus: Arc::new(EventBus::new()),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }

    /// Create a scheduler from server configuration, using the simulated executor.
    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(SimulatedExecutor::new(config.job_duration()))
            .with_max_concurrency(config.max_concurrency)
            .with_queue_capacity(config.queue_capacity)
    }

    /// Set the event bus.
    pub fn with_event_bus(mut self, event_bus: EventBus) -> Self {
        self.event_bus = Arc::new(event_bus);
        self
    }

    /// Set the maximum concurrency (admission limit and worker count).
    pub fn with_max_concurrency(mut self, max: usize) -> Self {
        self.max_concurrency = max.max(1);
        self
    }

    /// Set the dispatch queue buffer size.
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Effective queue capacity: never below the admission limit, so
    /// admission can't be refused by a full queue while the gate has room,
    /// and never above what a tokio channel can hold.
    pub fn queue_capacity(&self) -> usize {
        self.queue_capacity
            .max(self.max_concurrency)
            .min(MAX_QUEUE_CAPACITY)
    }

    /// Spawn the worker pool and return a handle for controlling it.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(self) -> SchedulerHandle {
        let queue_capacity = self.queue_capacity();
        if queue_capacity != self.queue_capacity {
            tracing::warn!(
                requested = self.queue_capacity,
                effective = queue_capacity,
                "Queue capacity adjusted to the supported range"
            );
        }

        let store = Arc::new(JobStore::new(self.max_concurrency));
        let queue = DispatchQueue::new(queue_capacity);
        let shutdown = CancellationToken::new();

        let workers = (0..self.max_concurrency)
            .map(|id| {
                let worker = Worker {
                    id,
                    store: Arc::clone(&store),
                    queue: queue.receiver(),
                    executor: Arc::clone(&self.executor),
                    event_bus: Arc::clone(&self.event_bus),
                    shutdown: shutdown.clone(),
                };
                tokio::spawn(worker.run())
            })
            .collect();

        tracing::info!(
            workers = self.max_concurrency,
            queue_capacity = queue.capacity(),
            executor = self.executor.name(),
            "Scheduler started"
        );

        SchedulerHandle {
            shared: Arc::new(Shared {
                store,
                queue,
                event_bus: self.event_bus,
                shutdown,
                state: RwLock::new(SchedulerState::Running),
                workers: Mutex::new(workers),
                worker_count: self.max_concurrency,
            }),
        }
    }
}
