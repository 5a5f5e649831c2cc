//! Health check handler.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use tracing::warn;

use crate::dto::response::{ApiResponse, HealthResponse};
use crate::state::AppState;

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<ApiResponse<HealthResponse>>) {
    let store = match state.store.health_check().await {
        Ok(healthy) => healthy,
        Err(e) => {
            warn!(backend = state.store.backend(), error = %e, "Store health check failed");
            false
        }
    };
    let uploads = state.uploads.health_check().await;
    let healthy = store && uploads;

    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    let body = HealthResponse {
        status: if healthy { "ok" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        backend: state.store.backend().to_string(),
        store,
        uploads,
    };

    (status, Json(ApiResponse::ok(body)))
}
