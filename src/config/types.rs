//! Configuration type definitions.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::error::ConfigError;
use crate::scheduler::{DEFAULT_MAX_CONCURRENCY, DEFAULT_QUEUE_CAPACITY, MAX_QUEUE_CAPACITY};

/// Server configuration (jobgate.yaml).
///
/// Every field is optional in the file; missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Host to bind the HTTP gateway to.
    pub host: String,
    /// Port to bind the HTTP gateway to.
    pub port: u16,
    /// Maximum concurrently scheduled jobs; also the worker pool size.
    pub max_concurrency: usize,
    /// Dispatch queue buffer size.
    pub queue_capacity: usize,
    /// Duration of the simulated job body, in milliseconds.
    pub job_duration_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            job_duration_ms: 10_000,
        }
    }
}

impl ServerConfig {
    /// Simulated job duration.
    pub fn job_duration(&self) -> Duration {
        Duration::from_millis(self.job_duration_ms)
    }

    /// Check that the values can run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::InvalidConfig("host cannot be empty".into()));
        }

        if self.max_concurrency == 0 {
            return Err(ConfigError::InvalidConfig(
                "max_concurrency cannot be zero".into(),
            ));
        }

        // The gate bounds queued ids at max_concurrency, so a smaller queue
        // could refuse admissions the gate allows.
        if self.queue_capacity < self.max_concurrency {
            return Err(ConfigError::InvalidConfig(format!(
                "queue_capacity ({}) must be at least max_concurrency ({})",
                self.queue_capacity, self.max_concurrency
            )));
        }

        if self.queue_capacity > MAX_QUEUE_CAPACITY {
            return Err(ConfigError::InvalidConfig(format!(
                "queue_capacity ({}) exceeds the maximum of {}",
                self.queue_capacity, MAX_QUEUE_CAPACITY
            )));
        }

        Ok(())
    }
}
