//! Liveness endpoint.

use axum::extract::State;
use axum::{Json, Router, routing::get};
use serde::Serialize;

use crate::error::ApiError;
use crate::state::AppState;

const SERVICE_NAME: &str = "ironwriter-journal";

/// Body of GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    /// Always `ironwriter-journal`.
    pub service: &'static str,
    pub version: &'static str,
    /// Moments in the live session, setup moment included.
    pub moments: usize,
}

/// GET /health
///
/// Fails with 500 if the session lock is poisoned.
async fn health_check(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    let moments = state.timeline()?.history().len();
    Ok(Json(HealthResponse {
        status: "ok",
        service: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
        moments,
    }))
}

/// Returns the health check router.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
