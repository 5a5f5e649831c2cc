//! Media upload handlers.

use axum::Json;
use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, Path, Request, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tower::ServiceExt;
use tower_http::services::ServeFile;

use registry_core::error::AppError;
use registry_entity::upload::UploadInfo;

use crate::dto::response::{ApiResponse, MessageResponse, UploadResponse};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::payload_too_large(format!("Upload exceeds the size limit: {}", e.body_text()))
    } else {
        AppError::validation(format!("Multipart error: {}", e.body_text()))
    }
}

/// GET /api/uploads
pub async fn list_uploads(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<Vec<UploadInfo>>>, ApiError> {
    let uploads = state.upload_service.list(&auth).await?;
    Ok(Json(ApiResponse::ok(uploads)))
}

/// POST /api/uploads (multipart field `file`)
pub async fn upload_file(
    State(state): State<AppState>,
    auth: AuthUser,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<UploadResponse>>), ApiError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field
            .file_name()
            .map(str::to_string)
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| AppError::validation("No file selected"))?;
        let data = field.bytes().await.map_err(multipart_error)?;

        let filename = state
            .upload_service
            .upload(&auth, &file_name, &data)
            .await?;
        return Ok((
            StatusCode::CREATED,
            Json(ApiResponse::ok(UploadResponse { filename })),
        ));
    }

    Err(AppError::validation("Missing multipart field 'file'").into())
}

/// GET /api/uploads/{filename}
///
/// Served through `ServeFile`, so Range and conditional requests work for
/// audio and video playback.
pub async fn serve_upload(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(filename): Path<String>,
    request: Request,
) -> Result<Response, ApiError> {
    let path = state.upload_service.path_of(&auth, &filename).await?;
    let response = ServeFile::new(path)
        .oneshot(request)
        .await
        .map_err(|e| AppError::storage(format!("Failed to serve '{filename}': {e}")))?;
    Ok(response.into_response())
}

/// DELETE /api/uploads/{filename}
pub async fn delete_upload(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(filename): Path<String>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.upload_service.delete(&auth, &filename).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new(format!(
        "File '{filename}' deleted"
    )))))
}
