//! HTTP gateway for the job engine.
//!
//! Provides REST endpoints for scheduling jobs, looking them up, and
//! inspecting capacity.

mod errors;
mod handlers;
mod responses;

pub use errors::{ApiError, ErrorResponse};
pub use handlers::ApiState;
pub use responses::*;

use axum::{
    Router,
    routing::{get, post},
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::scheduler::SchedulerHandle;

/// Configuration for the API server.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to.
    pub host: String,
    /// Port to bind to.
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

impl ApiConfig {
    /// Create a new API config with custom host and port.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// The `host:port` string to bind.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl From<&ServerConfig> for ApiConfig {
    fn from(config: &ServerConfig) -> Self {
        Self::new(config.host.clone(), config.port)
    }
}

/// Build the API router with all endpoints.
pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/schedule", post(handlers::schedule_job))
        .route("/jobs/{id}", get(handlers::get_job))
        .route("/capacity", get(handlers::get_capacity))
        .route("/health", get(handlers::health))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Create the API state from a running scheduler.
pub fn create_api_state(handle: SchedulerHandle) -> ApiState {
    ApiState { handle }
}

/// Start the API server.
///
/// Spawns the server and returns the bound address and a handle to the
/// task. The server stops accepting connections once `shutdown` is
/// cancelled and exits after in-flight requests finish.
pub async fn start_server(
    config: ApiConfig,
    state: ApiState,
    shutdown: CancellationToken,
) -> std::io::Result<(SocketAddr, JoinHandle<()>)> {
    let router = build_router(state);

    let listener = TcpListener::bind(config.bind_addr()).await?;
    let addr = listener.local_addr()?;
    tracing::info!("API server listening on http://{}", addr);

    let handle = tokio::spawn(async move {
        let result = axum::serve(listener, router)
            .with_graceful_shutdown(async move { shutdown.cancelled().await })
            .await;
        if let Err(e) = result {
            tracing::error!("API server error: {}", e);
        }
    });

    Ok((addr, handle))
}
