//! Route definitions for the registry HTTP API.
//!
//! All routes are organized by domain and mounted under `/api`.
//! The router receives `AppState` and passes it to all handlers via Axum's `State` extractor.

use std::time::Duration;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
///
/// Bodies above `storage.max_upload_size_bytes` are rejected with 413
/// before any handler runs.
pub fn build_router(state: AppState) -> Router {
    let max_body = usize::try_from(state.config.storage.max_upload_size_bytes).unwrap_or(usize::MAX);
    let timeout = Duration::from_secs(state.config.server.request_timeout_seconds);
    let cors = middleware::cors::build_cors_layer(&state.config.server.cors);

    let api_routes = Router::new()
        .merge(auth_routes())
        .merge(user_routes())
        .merge(document_routes())
        .merge(upload_routes())
        .merge(export_routes())
        .merge(audit_routes())
        .merge(health_routes());

    Router::new()
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(max_body))
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// Auth endpoints: login, me
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/me", get(handlers::auth::me))
}

/// Account management
fn user_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/users",
            get(handlers::user::list_users).post(handlers::user::register_user),
        )
        .route(
            "/users/{username}",
            axum::routing::delete(handlers::user::delete_user),
        )
}

/// Document CRUD
fn document_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/documents",
            get(handlers::document::list_documents).post(handlers::document::add_document),
        )
        .route(
            "/documents/{id}",
            get(handlers::document::get_document)
                .put(handlers::document::update_document)
                .delete(handlers::document::delete_document),
        )
}

/// Media uploads
fn upload_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/uploads",
            get(handlers::upload::list_uploads).post(handlers::upload::upload_file),
        )
        .route(
            "/uploads/{filename}",
            get(handlers::upload::serve_upload).delete(handlers::upload::delete_upload),
        )
}

/// Excel/Word exports and their history
fn export_routes() -> Router<AppState> {
    Router::new()
        .route("/exports", get(handlers::export::export_history))
        .route("/exports/excel", post(handlers::export::export_excel))
        .route("/exports/word", post(handlers::export::export_word))
        .route("/exports/{filename}", get(handlers::export::download_export))
}

/// Audit log
fn audit_routes() -> Router<AppState> {
    Router::new().route("/audit", get(handlers::audit::list_audit))
}

/// Health
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
