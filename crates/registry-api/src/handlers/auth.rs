//! Auth handlers: login and current identity.

use axum::Json;
use axum::extract::State;

use crate::dto::request::LoginRequest;
use crate::dto::response::{ApiResponse, LoginResponse, MeResponse};
use crate::error::{ApiError, ValidatedJson};
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    let result = state
        .auth_service
        .login(&req.username, &req.password)
        .await?;

    Ok(Json(ApiResponse::ok(LoginResponse {
        token: result.token,
        expires_at: result.expires_at,
        user: result.user.into(),
    })))
}

/// GET /api/auth/me
pub async fn me(auth: AuthUser) -> Json<ApiResponse<MeResponse>> {
    Json(ApiResponse::ok(MeResponse::from(auth.context())))
}
