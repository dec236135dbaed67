//! API request and response types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::job::Job;
use crate::core::types::JobId;
use crate::scheduler::SchedulerState;
use crate::storage::Capacity;

/// Body of `POST /schedule`.
///
/// Only `client_id` is required; a missing `data` is an empty payload.
#[derive(Debug, Deserialize)]
pub struct ScheduleRequest {
    pub client_id: String,
    #[serde(default)]
    pub data: String,
}

/// Response to `POST /schedule`, both for acceptance and rejection.
#[derive(Debug, Serialize)]
pub struct ScheduleResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<JobId>,
    pub status: &'static str,
    pub message: String,
}

impl ScheduleResponse {
    pub fn accepted(job_id: JobId) -> Self {
        Self {
            job_id: Some(job_id),
            status: "accepted",
            message: "Job scheduled successfully".to_string(),
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            job_id: None,
            status: "rejected",
            message: message.into(),
        }
    }
}

/// Response to `GET /capacity`.
#[derive(Debug, Serialize)]
pub struct CapacityResponse {
    pub current: usize,
    pub max: usize,
    pub available: usize,
}

impl From<Capacity> for CapacityResponse {
    fn from(capacity: Capacity) -> Self {
        Self {
            current: capacity.current,
            max: capacity.max,
            available: capacity.available(),
        }
    }
}

/// Health check response.
///
/// Includes every job record, so its size grows with the job map.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub timestamp: DateTime<Utc>,
    pub state: &'static str,
    pub queued: usize,
    pub jobs: Vec<Job>,
    pub capacity: Capacity,
}

impl HealthResponse {
    pub fn new(state: SchedulerState, queued: usize, jobs: Vec<Job>, capacity: Capacity) -> Self {
        Self {
            status: "healthy",
            version: env!("CARGO_PKG_VERSION"),
            timestamp: Utc::now(),
            state: state.as_str(),
            queued,
            jobs,
            capacity,
        }
    }
}
