//! Health check handlers
//!
//! Provides health and readiness endpoints for monitoring and
//! orchestration.

use axum::{extract::State, Json};
use passgate_core::RelyingParty;
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::state::SharedRelyingParty;

/// Health check response
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    #[schema(value_type = String)]
    pub status: &'static str,
    /// Server version from Cargo.toml
    #[schema(value_type = String)]
    pub version: &'static str,
    /// Service name
    #[schema(value_type = String)]
    pub service: &'static str,
    /// Registered users
    pub users: usize,
    /// Registered credentials
    pub credentials: usize,
    /// Outstanding registration challenges
    pub pending_registrations: usize,
    /// Outstanding authentication challenges
    pub pending_authentications: usize,
}

/// GET /health - Health check endpoint
///
/// Returns service status, version, and store/challenge statistics.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses((status = 200, description = "Service status and statistics", body = HealthResponse))
)]
pub async fn health(State(rp): State<SharedRelyingParty>) -> Result<Json<HealthResponse>, ApiError> {
    let store = rp.store_stats().await?;
    let pending = rp.challenge_stats();

    Ok(Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        service: "passgate-server",
        users: store.users,
        credentials: store.credentials,
        pending_registrations: pending.registrations,
        pending_authentications: pending.authentications,
    }))
}

/// Readiness response for orchestration probes
#[derive(Serialize, ToSchema)]
pub struct ReadyResponse {
    /// Whether the service is ready to accept traffic
    pub ready: bool,
}

/// GET /ready - readiness probe
///
/// Unlike /health, this is a simple yes/no check.
#[utoipa::path(
    get,
    path = "/ready",
    tag = "Health",
    responses((status = 200, description = "Service is ready", body = ReadyResponse))
)]
pub async fn ready() -> Json<ReadyResponse> {
    Json(ReadyResponse { ready: true })
}
