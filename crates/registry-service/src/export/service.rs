//! Export orchestration: render, persist, record history.

use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use tracing::{info, warn};

use registry_auth::rbac::RbacEnforcer;
use registry_core::config::ExportConfig;
use registry_core::error::AppError;
use registry_core::traits::Record;
use registry_database::repositories::ExportRepository;
use registry_entity::export::{ExportKind, ExportRecord};
use registry_storage::uploads::{guess_mime, is_image};
use registry_storage::{LocalDirectory, UploadStore, sanitize_filename};

use super::spreadsheet::to_spreadsheet;
use super::word::{MediaBundle, MediaFile, WordOptions, media_name, to_formatted_document};
use crate::audit::AuditService;
use crate::context::RequestContext;

/// A rendered export ready to be sent to the client.
#[derive(Debug, Clone)]
pub struct ExportedFile {
    /// Name the file was saved under in the exports directory.
    pub file_name: String,
    /// Output format.
    pub kind: ExportKind,
    /// File contents.
    pub bytes: Bytes,
}

impl ExportedFile {
    /// MIME type of the contents.
    pub fn content_type(&self) -> &'static str {
        self.kind.content_type()
    }
}

/// Produces Excel and Word exports from document snapshots.
#[derive(Debug, Clone)]
pub struct ExportService {
    export_repo: Arc<ExportRepository>,
    uploads: Arc<UploadStore>,
    exports_dir: LocalDirectory,
    audit: Arc<AuditService>,
    rbac: Arc<RbacEnforcer>,
    config: ExportConfig,
}

/// Output filename for an export: the requested name (or a timestamped
/// default) sanitized, with the format's extension appended when missing.
pub fn normalize_name(requested: Option<&str>, kind: ExportKind) -> String {
    let base = requested
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("export_{}", Utc::now().format("%Y%m%d_%H%M%S")));

    let name = sanitize_filename(&base);
    let suffix = format!(".{}", kind.extension());
    if name.to_ascii_lowercase().ends_with(&suffix) {
        name
    } else {
        format!("{name}{suffix}")
    }
}

fn kind_of(filename: &str) -> Option<ExportKind> {
    let lower = filename.to_ascii_lowercase();
    [ExportKind::Excel, ExportKind::Word]
        .into_iter()
        .find(|k| lower.ends_with(&format!(".{}", k.extension())))
}

async fn render<F>(job: F) -> Result<Vec<u8>, AppError>
where
    F: FnOnce() -> Result<Vec<u8>, AppError> + Send + 'static,
{
    tokio::task::spawn_blocking(job)
        .await
        .map_err(|e| AppError::internal(format!("Export task failed: {e}")))?
}

impl ExportService {
    /// Creates a new export service.
    pub fn new(
        export_repo: Arc<ExportRepository>,
        uploads: Arc<UploadStore>,
        exports_dir: LocalDirectory,
        audit: Arc<AuditService>,
        rbac: Arc<RbacEnforcer>,
        config: ExportConfig,
    ) -> Self {
        Self {
            export_repo,
            uploads,
            exports_dir,
            audit,
            rbac,
            config,
        }
    }

    /// Render `records` as a spreadsheet.
    pub async fn export_excel(
        &self,
        ctx: &RequestContext,
        records: Vec<Record>,
        name: Option<&str>,
    ) -> Result<ExportedFile, AppError> {
        let records = Arc::new(records);
        let input = records.clone();
        let bytes = render(move || to_spreadsheet(&input)).await?;
        self.finish(ctx, ExportKind::Excel, name, records, bytes).await
    }

    /// Render `records` as a Word document, optionally followed by the
    /// media each record references.
    pub async fn export_word(
        &self,
        ctx: &RequestContext,
        records: Vec<Record>,
        name: Option<&str>,
        include_media: bool,
    ) -> Result<ExportedFile, AppError> {
        let media = if include_media {
            self.collect_media(&records).await
        } else {
            MediaBundle::new()
        };
        let options = WordOptions {
            title: self.config.title.clone(),
            image_width_inches: self.config.image_width_inches,
            include_media,
        };

        let records = Arc::new(records);
        let input = records.clone();
        let bytes = render(move || to_formatted_document(&input, &media, &options)).await?;
        self.finish(ctx, ExportKind::Word, name, records, bytes).await
    }

    /// Export history, oldest first. Requires the modify role.
    pub async fn history(&self, ctx: &RequestContext) -> Result<Vec<ExportRecord>, AppError> {
        self.rbac.require_modify(ctx.role, "read the export history")?;
        self.export_repo.find_all().await
    }

    /// Contents and MIME type of a previously written export.
    pub async fn download(
        &self,
        _ctx: &RequestContext,
        filename: &str,
    ) -> Result<(Bytes, String), AppError> {
        let data = self.exports_dir.read(filename).await?;
        let mime = kind_of(filename)
            .map(|k| k.content_type().to_string())
            .unwrap_or_else(|| guess_mime(filename));
        Ok((data, mime))
    }

    async fn collect_media(&self, records: &[Record]) -> MediaBundle {
        let mut media = MediaBundle::new();
        for name in records.iter().filter_map(media_name) {
            if media.contains_key(name) || !self.uploads.contains(name).await {
                continue;
            }
            let file = if is_image(name) {
                match self.uploads.fetch(name).await {
                    Ok((data, _)) => MediaFile::Image(data),
                    Err(e) => {
                        warn!(name = %name, error = %e, "Could not read upload for export");
                        MediaFile::Image(Bytes::new())
                    }
                }
            } else {
                MediaFile::Other
            };
            media.insert(name.to_string(), file);
        }
        media
    }

    async fn finish(
        &self,
        ctx: &RequestContext,
        kind: ExportKind,
        name: Option<&str>,
        records: Arc<Vec<Record>>,
        bytes: Vec<u8>,
    ) -> Result<ExportedFile, AppError> {
        let file_name = normalize_name(name, kind);
        self.exports_dir.write(&file_name, &bytes).await?;

        let count = records.len();
        let snapshot = self
            .config
            .include_snapshot
            .then(|| Arc::try_unwrap(records).unwrap_or_else(|shared| (*shared).clone()));
        let entry = ExportRecord::new(&file_name, kind, &ctx.username, count, snapshot);
        self.export_repo.append(&entry).await?;

        self.audit
            .record(
                &ctx.username,
                kind.audit_action(),
                format!("{kind} export: {file_name} ({count} documents)"),
            )
            .await;
        info!(actor = %ctx.username, kind = %kind, name = %file_name, documents = count, "Export written");

        Ok(ExportedFile {
            file_name,
            kind,
            bytes: Bytes::from(bytes),
        })
    }
}
