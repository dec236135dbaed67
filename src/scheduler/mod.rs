//! Scheduler engine for job execution.
//!
//! This module wires admission control, the dispatch queue, and the
//! fixed-size worker pool together, and owns graceful shutdown.

mod dispatch;
mod engine;
mod handle;
mod types;
mod worker;

pub use dispatch::{DEFAULT_QUEUE_CAPACITY, MAX_QUEUE_CAPACITY};
pub use engine::{DEFAULT_MAX_CONCURRENCY, Scheduler};
pub use handle::SchedulerHandle;
pub use types::{SchedulerError, SchedulerState};
