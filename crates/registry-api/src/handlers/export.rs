//! Export handlers: render, history, re-download.

use axum::Json;
use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::Response;
use bytes::Bytes;
use serde_json::Value;

use registry_core::error::AppError;
use registry_core::traits::Record;
use registry_entity::export::ExportRecord;

use crate::dto::request::ExportQuery;
use crate::dto::response::ApiResponse;
use crate::error::{ApiError, ApiJson};
use crate::extractors::AuthUser;
use crate::state::AppState;

fn into_records(body: Vec<Value>) -> Result<Vec<Record>, AppError> {
    body.into_iter()
        .enumerate()
        .map(|(i, value)| match value {
            Value::Object(map) => Ok(map),
            _ => Err(AppError::validation(format!(
                "Item {i} of the export body is not a JSON object"
            ))),
        })
        .collect()
}

fn attachment(data: Bytes, content_type: &str, filename: &str) -> Result<Response, ApiError> {
    let safe_name = filename.replace(['"', '\\'], "_");
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{safe_name}\""),
        )
        .header(header::CONTENT_LENGTH, data.len())
        .body(Body::from(data))
        .map_err(|e| AppError::internal(format!("Response build failed: {e}")).into())
}

/// POST /api/exports/excel
pub async fn export_excel(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ExportQuery>,
    ApiJson(body): ApiJson<Vec<Value>>,
) -> Result<Response, ApiError> {
    let file = state
        .export_service
        .export_excel(&auth, into_records(body)?, query.name.as_deref())
        .await?;
    attachment(file.bytes.clone(), file.content_type(), &file.file_name)
}

/// POST /api/exports/word
pub async fn export_word(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ExportQuery>,
    ApiJson(body): ApiJson<Vec<Value>>,
) -> Result<Response, ApiError> {
    let file = state
        .export_service
        .export_word(
            &auth,
            into_records(body)?,
            query.name.as_deref(),
            query.media.unwrap_or(true),
        )
        .await?;
    attachment(file.bytes.clone(), file.content_type(), &file.file_name)
}

/// GET /api/exports
pub async fn export_history(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<Vec<ExportRecord>>>, ApiError> {
    let history = state.export_service.history(&auth).await?;
    Ok(Json(ApiResponse::ok(history)))
}

/// GET /api/exports/{filename}
pub async fn download_export(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(filename): Path<String>,
) -> Result<Response, ApiError> {
    let (data, content_type) = state.export_service.download(&auth, &filename).await?;
    attachment(data, &content_type, &filename)
}
