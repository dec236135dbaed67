//! API request handlers.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};

use crate::core::job::Job;
use crate::core::types::ClientId;
use crate::scheduler::SchedulerHandle;

use super::errors::ApiError;
use super::responses::{CapacityResponse, HealthResponse, ScheduleRequest, ScheduleResponse};

/// Shared application state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub handle: SchedulerHandle,
}

/// Submit a job.
pub async fn schedule_job(
    State(state): State<ApiState>,
    payload: Result<Json<ScheduleRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ScheduleResponse>), ApiError> {
    let Json(request) = payload?;
    let client_id = ClientId::from_string(&request.client_id)
        .map_err(|_| ApiError::BadRequest("Invalid client_id format".to_string()))?;

    let job = state.handle.try_schedule(client_id, request.data).await?;
    Ok((StatusCode::ACCEPTED, Json(ScheduleResponse::accepted(job.id()))))
}

/// Get a specific job.
pub async fn get_job(
    State(state): State<ApiState>,
    Path(job_id): Path<String>,
) -> Result<Json<Job>, ApiError> {
    let job = state.handle.find_job(&job_id)?;
    Ok(Json(job))
}

/// Current capacity of the admission gate.
pub async fn get_capacity(
    State(state): State<ApiState>,
) -> Result<Json<CapacityResponse>, ApiError> {
    let capacity = state.handle.capacity()?;
    Ok(Json(CapacityResponse::from(capacity)))
}

/// Health check endpoint.
pub async fn health(State(state): State<ApiState>) -> Result<Json<HealthResponse>, ApiError> {
    let capacity = state.handle.capacity()?;
    let jobs = state.handle.jobs()?;
    Ok(Json(HealthResponse::new(
        state.handle.state().await,
        state.handle.queued(),
        jobs,
        capacity,
    )))
}
