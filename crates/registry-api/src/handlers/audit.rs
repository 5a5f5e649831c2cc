//! Audit log handler.

use axum::Json;
use axum::extract::State;

use registry_entity::audit::AuditEntry;

use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/audit
pub async fn list_audit(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<Vec<AuditEntry>>>, ApiError> {
    let entries = state.audit_service.list(&auth).await?;
    Ok(Json(ApiResponse::ok(entries)))
}
