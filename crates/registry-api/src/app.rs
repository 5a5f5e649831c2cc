//! Application builder: wires repositories, services and the router into
//! a running server.

use std::sync::Arc;

use axum::Router;
use tracing::{error, info};

use registry_auth::{JwtDecoder, JwtEncoder, PasswordHasher, PasswordValidator, RbacEnforcer};
use registry_core::config::AppConfig;
use registry_core::error::AppError;
use registry_core::traits::RecordStore;
use registry_database::open_store;
use registry_database::repositories::{
    AuditLogRepository, DocumentRepository, ExportRepository, UserRepository,
};
use registry_service::{
    AuditService, AuthService, DocumentService, ExportService, UploadService, UserService,
};
use registry_storage::{LocalDirectory, UploadStore};

use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    build_router(state)
}

/// Wire every repository and service on top of an opened record store.
///
/// Seeds the configured bootstrap administrator when no accounts exist.
pub async fn build_state(
    config: AppConfig,
    store: Arc<dyn RecordStore>,
) -> Result<AppState, AppError> {
    let uploads = Arc::new(UploadStore::open(config.storage.uploads_path()).await?);
    let exports_dir = LocalDirectory::open(config.storage.exports_path()).await?;

    let user_repo = Arc::new(UserRepository::new(Arc::clone(&store)));
    let document_repo = Arc::new(DocumentRepository::new(Arc::clone(&store)));
    let audit_repo = Arc::new(AuditLogRepository::new(
        Arc::clone(&store),
        config.audit.max_entries,
    ));
    let export_repo = Arc::new(ExportRepository::new(Arc::clone(&store)));

    let password_hasher = Arc::new(PasswordHasher::new());
    let password_validator = Arc::new(PasswordValidator::new(&config.auth));
    let jwt_encoder = Arc::new(JwtEncoder::new(&config.auth));
    let jwt_decoder = Arc::new(JwtDecoder::new(&config.auth));
    let rbac_enforcer = Arc::new(RbacEnforcer::new());

    let audit_service = Arc::new(AuditService::new(
        Arc::clone(&audit_repo),
        Arc::clone(&rbac_enforcer),
    ));
    let auth_service = Arc::new(AuthService::new(
        Arc::clone(&user_repo),
        Arc::clone(&password_hasher),
        jwt_encoder,
        jwt_decoder,
        Arc::clone(&audit_service),
    ));
    let user_service = Arc::new(UserService::new(
        user_repo,
        password_hasher,
        password_validator,
        Arc::clone(&rbac_enforcer),
        Arc::clone(&audit_service),
    ));
    let document_service = Arc::new(DocumentService::new(
        document_repo,
        Arc::clone(&rbac_enforcer),
        Arc::clone(&audit_service),
    ));
    let upload_service = Arc::new(UploadService::new(
        Arc::clone(&uploads),
        Arc::clone(&rbac_enforcer),
        Arc::clone(&audit_service),
    ));
    let export_service = Arc::new(ExportService::new(
        export_repo,
        Arc::clone(&uploads),
        exports_dir,
        Arc::clone(&audit_service),
        rbac_enforcer,
        config.export.clone(),
    ));

    if user_service
        .ensure_bootstrap_admin(config.auth.bootstrap_admin.as_ref())
        .await?
    {
        info!("Seeded bootstrap administrator");
    }

    Ok(AppState {
        config: Arc::new(config),
        store,
        uploads,
        auth_service,
        user_service,
        document_service,
        upload_service,
        export_service,
        audit_service,
    })
}

/// Runs the registry server until Ctrl-C or SIGTERM, then closes the store.
pub async fn run_server(config: AppConfig) -> Result<(), AppError> {
    info!(
        "Starting archive registry v{} (backend: {})",
        env!("CARGO_PKG_VERSION"),
        config.database.backend
    );

    create_data_directories(&config).await?;

    let store = open_store(&config).await?;
    info!(backend = store.backend(), "Record store opened");

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let served = serve(config, Arc::clone(&store), &addr).await;

    store.close().await;
    info!("Record store closed");
    served
}

async fn serve(config: AppConfig, store: Arc<dyn RecordStore>, addr: &str) -> Result<(), AppError> {
    let state = build_state(config, store).await?;
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;
    info!("Archive registry listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    info!("Server stopped");
    Ok(())
}

async fn create_data_directories(config: &AppConfig) -> Result<(), AppError> {
    let dirs = [
        config.storage.records_path(),
        config.storage.uploads_path(),
        config.storage.exports_path(),
    ];

    for dir in &dirs {
        tokio::fs::create_dir_all(dir).await.map_err(|e| {
            AppError::storage(format!("Failed to create dir '{}': {}", dir.display(), e))
        })?;
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
