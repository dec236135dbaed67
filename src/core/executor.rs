//! Job execution trait and error types.
//!
//! The `JobExecutor` trait is the body every worker runs for an admitted job.
//! Implement this trait to plug real work into the engine.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Value, json};
use std::time::Duration;
use thiserror::Error;

use super::job::Job;

/// Errors that can occur while executing a job.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// Job execution failed with a message.
    #[error("execution failed: {0}")]
    Failed(String),

    /// The executor panicked.
    #[error("executor panicked: {0}")]
    Panicked(String),

    /// Generic error wrapper.
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// The work performed for an admitted job.
///
/// Execution is opaque to the scheduler: a worker awaits `execute` to
/// completion and is not interrupted by shutdown.
///
/// # Example
///
/// ```ignore
/// use jobgate::{ExecutionError, Job, JobExecutor};
/// use async_trait::async_trait;
/// use serde_json::{Value, json};
///
/// struct Uppercase;
///
/// #[async_trait]
/// impl JobExecutor for Uppercase {
///     async fn execute(&self, job: &Job) -> Result<Value, ExecutionError> {
///         Ok(json!({ "upper": job.data().to_uppercase() }))
///     }
/// }
/// ```
#[async_trait]
pub trait JobExecutor: Send + Sync {
    /// Run the job, returning an opaque success payload.
    async fn execute(&self, job: &Job) -> Result<Value, ExecutionError>;

    /// Name used in logs.
    fn name(&self) -> &str {
        "executor"
    }
}

/// Default execution time of the simulated executor.
pub const DEFAULT_JOB_DURATION: Duration = Duration::from_secs(10);

/// Executor that simulates work by sleeping, then echoes the payload back.
#[derive(Debug, Clone)]
pub struct SimulatedExecutor {
    duration: Duration,
}

impl SimulatedExecutor {
    /// Create a simulated executor that takes `duration` per job.
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }
}

impl Default for SimulatedExecutor {
    fn default() -> Self {
        Self::new(DEFAULT_JOB_DURATION)
    }
}

#[async_trait]
impl JobExecutor for SimulatedExecutor {
    async fn execute(&self, job: &Job) -> Result<Value, ExecutionError> {
        tokio::time::sleep(self.duration).await;
        Ok(json!({
            "processed_data": job.data(),
            "timestamp": Utc::now(),
        }))
    }

    fn name(&self) -> &str {
        "simulated"
    }
}
