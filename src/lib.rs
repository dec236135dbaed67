//! jobgate - a bounded-concurrency job execution engine.
//!
//! Jobs are admitted through a capacity gate, queued, and executed by a
//! fixed-size worker pool. An HTTP gateway exposes submission and lookup.

pub mod api;
pub mod config;
pub mod core;
pub mod events;
pub mod scheduler;
pub mod shutdown;
pub mod storage;
pub mod testing;

pub use config::{ConfigError, ServerConfig, YamlLoader};
pub use core::executor::{ExecutionError, JobExecutor, SimulatedExecutor};
pub use core::job::{Job, JobState, JobStatus, TransitionError};
pub use core::types::{ClientId, InvalidIdError, JobId};
pub use events::{Event, EventBus, EventHandler};
pub use scheduler::{Scheduler, SchedulerError, SchedulerHandle, SchedulerState};
pub use storage::{Capacity, JobStore, StorageError};
