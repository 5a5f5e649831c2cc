//! Account management handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use registry_entity::user::UserRole;

use crate::dto::request::RegisterUserRequest;
use crate::dto::response::{ApiResponse, MessageResponse, UserResponse};
use crate::error::{ApiError, ValidatedJson};
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/users
pub async fn list_users(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<Vec<UserResponse>>>, ApiError> {
    let users = state.user_service.list(&auth).await?;
    Ok(Json(ApiResponse::ok(
        users.into_iter().map(UserResponse::from).collect(),
    )))
}

/// POST /api/users
pub async fn register_user(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<RegisterUserRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponse>>), ApiError> {
    let role = req.role.unwrap_or(UserRole::Viewer);
    let user = state
        .user_service
        .register(&auth, &req.username, &req.password, role)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(user.into()))))
}

/// DELETE /api/users/{username}
pub async fn delete_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(username): Path<String>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.user_service.delete(&auth, &username).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new(format!(
        "User '{username}' deleted"
    )))))
}
