//! Document CRUD handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde_json::Value;

use registry_core::error::AppError;
use registry_core::traits::Record;
use registry_entity::document::Document;

use crate::dto::response::{ApiResponse, MessageResponse};
use crate::error::{ApiError, ApiJson};
use crate::extractors::AuthUser;
use crate::state::AppState;

fn into_record(body: Value) -> Result<Record, AppError> {
    match body {
        Value::Object(map) => Ok(map),
        _ => Err(AppError::validation("Document body must be a JSON object")),
    }
}

/// GET /api/documents
pub async fn list_documents(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<Vec<Document>>>, ApiError> {
    let documents = state.document_service.list(&auth).await?;
    Ok(Json(ApiResponse::ok(documents)))
}

/// POST /api/documents
pub async fn add_document(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(body): ApiJson<Value>,
) -> Result<(StatusCode, Json<ApiResponse<Document>>), ApiError> {
    let document = state
        .document_service
        .add(&auth, into_record(body)?)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(document))))
}

/// GET /api/documents/{id}
pub async fn get_document(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Document>>, ApiError> {
    let document = state.document_service.get(&auth, &id).await?;
    Ok(Json(ApiResponse::ok(document)))
}

/// PUT /api/documents/{id}
pub async fn update_document(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<Value>,
) -> Result<Json<ApiResponse<Document>>, ApiError> {
    let document = state
        .document_service
        .update(&auth, &id, into_record(body)?)
        .await?;
    Ok(Json(ApiResponse::ok(document)))
}

/// DELETE /api/documents/{id}
pub async fn delete_document(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.document_service.delete(&auth, &id).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new(format!(
        "Document '{id}' deleted"
    )))))
}
