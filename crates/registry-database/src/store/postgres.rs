//! PostgreSQL record store.
//!
//! Users, audit entries and export history map onto typed columns.
//! Documents are schemaless, so their table holds the id next to the JSON
//! body. Anything that cannot be mapped in either direction is moved to
//! `quarantined_records` rather than dropped.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use sqlx::{FromRow, PgConnection};
use tracing::{debug, warn};

use registry_core::config::DatabaseConfig;
use registry_core::error::{AppError, ErrorKind};
use registry_core::result::AppResult;
use registry_core::traits::{Collection, Record, RecordStore};
use registry_entity::audit::AuditEntry;
use registry_entity::export::ExportRecord;
use registry_entity::user::User;

use crate::connection::DatabasePool;
use crate::migration::run_migrations;

/// Relational record store.
///
/// A save replaces the table contents inside a single transaction; rows
/// keep the order of the saved slice through their `position`.
#[derive(Debug, Clone)]
pub struct PgRecordStore {
    db: DatabasePool,
}

#[derive(Debug, FromRow, Serialize)]
struct UserRow {
    position: i64,
    username: String,
    password_hash: String,
    role: String,
    created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, FromRow, Serialize)]
struct DocumentRow {
    position: i64,
    body: String,
}

#[derive(Debug, FromRow, Serialize)]
struct AuditRow {
    position: i64,
    id: String,
    actor: String,
    action: String,
    details: String,
    timestamp: DateTime<Utc>,
}

#[derive(Debug, FromRow, Serialize)]
struct ExportRow {
    position: i64,
    id: String,
    filename: String,
    kind: String,
    actor: String,
    timestamp: DateTime<Utc>,
    document_count: i64,
    snapshot: Option<String>,
}

/// A stored row turned back into a record, or the reason it could not be.
type Decoded = Result<Record, String>;

impl PgRecordStore {
    /// Connect and apply pending migrations.
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        let db = DatabasePool::connect(config).await?;
        run_migrations(db.pool()).await?;
        Ok(Self { db })
    }

    /// Wrap an already-migrated pool.
    pub fn new(db: DatabasePool) -> Self {
        Self { db }
    }

    async fn fetch<R>(&self, sql: &str) -> AppResult<Vec<R>>
    where
        R: for<'r> FromRow<'r, sqlx::postgres::PgRow> + Send + Unpin,
    {
        sqlx::query_as::<_, R>(sql)
            .fetch_all(self.db.pool())
            .await
            .map_err(|e| db_error("Failed to load collection", e))
    }

    /// Move a row that cannot be read into `quarantined_records`.
    async fn quarantine_row(
        &self,
        collection: Collection,
        position: i64,
        body: String,
        reason: String,
    ) -> AppResult<()> {
        warn!(
            collection = %collection,
            position,
            reason = %reason,
            "Undecodable row moved to quarantine"
        );
        let sql = format!(
            "WITH moved AS (DELETE FROM {} WHERE position = $1 RETURNING position) \
             INSERT INTO quarantined_records (collection, body, reason) \
             SELECT $2, $3, $4 FROM moved",
            table(collection)
        );
        sqlx::query(&sql)
            .bind(position)
            .bind(collection.name())
            .bind(body)
            .bind(reason)
            .execute(self.db.pool())
            .await
            .map_err(|e| db_error("Failed to quarantine row", e))?;
        Ok(())
    }

    /// Collect decoded rows, quarantining the ones that failed.
    async fn settle(
        &self,
        collection: Collection,
        rows: Vec<(i64, String, Decoded)>,
    ) -> AppResult<Vec<Record>> {
        let mut records = Vec::with_capacity(rows.len());
        for (position, raw, decoded) in rows {
            match decoded {
                Ok(record) => records.push(record),
                Err(reason) => self.quarantine_row(collection, position, raw, reason).await?,
            }
        }
        debug!(collection = %collection, count = records.len(), "Collection loaded");
        Ok(records)
    }
}

/// Table backing a collection.
fn table(collection: Collection) -> &'static str {
    match collection {
        Collection::Users => "users",
        Collection::Documents => "documents",
        Collection::AuditLog => "audit_log",
        Collection::Exports => "exports",
    }
}

fn db_error(message: &str, e: sqlx::Error) -> AppError {
    AppError::with_source(ErrorKind::Database, message.to_string(), e)
}

/// Serde name of a unit enum variant (`"editor"`, `"Excel"`).
fn variant_name<T: Serialize>(value: &T) -> AppResult<String> {
    match serde_json::to_value(value)? {
        Value::String(name) => Ok(name),
        other => Err(AppError::internal(format!(
            "Expected a string variant, found {other}"
        ))),
    }
}

fn parse_variant<T: DeserializeOwned>(name: &str) -> Result<T, String> {
    serde_json::from_value(Value::String(name.to_string())).map_err(|e| e.to_string())
}

fn decode<T: DeserializeOwned>(record: &Record) -> Result<T, serde_json::Error> {
    serde_json::from_value(Value::Object(record.clone()))
}

fn to_record<T: Serialize>(item: &T) -> Decoded {
    match serde_json::to_value(item) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(format!("serialized to a non-object value: {other}")),
        Err(e) => Err(e.to_string()),
    }
}

/// Column values of a row as JSON, kept when the row is quarantined.
fn raw_row<T: Serialize>(row: &T) -> String {
    serde_json::to_string(row).unwrap_or_default()
}

fn user_record(row: &UserRow) -> Decoded {
    to_record(&User {
        username: row.username.clone(),
        password_hash: row.password_hash.clone(),
        role: parse_variant(&row.role)?,
        created_at: row.created_at,
    })
}

fn document_record(row: &DocumentRow) -> Decoded {
    match serde_json::from_str::<Value>(&row.body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err("document body is not a JSON object".to_string()),
        Err(e) => Err(e.to_string()),
    }
}

fn audit_record(row: &AuditRow) -> Decoded {
    to_record(&AuditEntry {
        id: row.id.clone(),
        actor: row.actor.clone(),
        action: row.action.clone(),
        details: row.details.clone(),
        timestamp: row.timestamp,
    })
}

fn export_record(row: &ExportRow) -> Decoded {
    let snapshot = match &row.snapshot {
        Some(raw) => Some(serde_json::from_str::<Vec<Record>>(raw).map_err(|e| e.to_string())?),
        None => None,
    };
    to_record(&ExportRecord {
        id: row.id.clone(),
        output_file_name: row.filename.clone(),
        kind: parse_variant(&row.kind)?,
        actor: row.actor.clone(),
        timestamp: row.timestamp,
        document_count: usize::try_from(row.document_count).unwrap_or_default(),
        snapshot,
    })
}

/// Insert one record into its typed table.
///
/// Returns `Ok(false)` when the record does not fit the table; the caller
/// quarantines it.
async fn insert(
    conn: &mut PgConnection,
    collection: Collection,
    position: i64,
    record: &Record,
) -> AppResult<bool> {
    let result = match collection {
        Collection::Users => {
            let Ok(user) = decode::<User>(record) else {
                return Ok(false);
            };
            sqlx::query(
                "INSERT INTO users (position, username, password_hash, role, created_at) \
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(position)
            .bind(&user.username)
            .bind(&user.password_hash)
            .bind(variant_name(&user.role)?)
            .bind(user.created_at)
            .execute(&mut *conn)
            .await
        }
        Collection::Documents => {
            let id = record.get("id").and_then(Value::as_str);
            sqlx::query("INSERT INTO documents (position, id, body) VALUES ($1, $2, $3::json)")
                .bind(position)
                .bind(id)
                .bind(serde_json::to_string(record)?)
                .execute(&mut *conn)
                .await
        }
        Collection::AuditLog => {
            let Ok(entry) = decode::<AuditEntry>(record) else {
                return Ok(false);
            };
            sqlx::query(
                "INSERT INTO audit_log (position, id, actor, action, details, timestamp) \
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(position)
            .bind(&entry.id)
            .bind(&entry.actor)
            .bind(&entry.action)
            .bind(&entry.details)
            .bind(entry.timestamp)
            .execute(&mut *conn)
            .await
        }
        Collection::Exports => {
            let Ok(export) = decode::<ExportRecord>(record) else {
                return Ok(false);
            };
            let snapshot = export
                .snapshot
                .as_ref()
                .map(serde_json::to_string)
                .transpose()?;
            sqlx::query(
                "INSERT INTO exports \
                 (position, id, filename, kind, actor, timestamp, document_count, snapshot) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8::json)",
            )
            .bind(position)
            .bind(&export.id)
            .bind(&export.output_file_name)
            .bind(variant_name(&export.kind)?)
            .bind(&export.actor)
            .bind(export.timestamp)
            .bind(i64::try_from(export.document_count).unwrap_or(i64::MAX))
            .bind(snapshot)
            .execute(&mut *conn)
            .await
        }
    };
    result.map_err(|e| db_error("Failed to insert record", e))?;
    Ok(true)
}

#[async_trait]
impl RecordStore for PgRecordStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn load(&self, collection: Collection) -> AppResult<Vec<Record>> {
        let rows: Vec<(i64, String, Decoded)> = match collection {
            Collection::Users => self
                .fetch::<UserRow>(
                    "SELECT position, username, password_hash, role, created_at \
                     FROM users ORDER BY position",
                )
                .await?
                .into_iter()
                .map(|row| (row.position, raw_row(&row), user_record(&row)))
                .collect(),
            Collection::Documents => self
                .fetch::<DocumentRow>(
                    "SELECT position, body::text AS body FROM documents ORDER BY position",
                )
                .await?
                .into_iter()
                .map(|row| {
                    let decoded = document_record(&row);
                    (row.position, row.body, decoded)
                })
                .collect(),
            Collection::AuditLog => self
                .fetch::<AuditRow>(
                    "SELECT position, id, actor, action, details, timestamp \
                     FROM audit_log ORDER BY position",
                )
                .await?
                .into_iter()
                .map(|row| (row.position, raw_row(&row), audit_record(&row)))
                .collect(),
            Collection::Exports => self
                .fetch::<ExportRow>(
                    "SELECT position, id, filename, kind, actor, timestamp, document_count, \
                     snapshot::text AS snapshot FROM exports ORDER BY position",
                )
                .await?
                .into_iter()
                .map(|row| (row.position, raw_row(&row), export_record(&row)))
                .collect(),
        };
        self.settle(collection, rows).await
    }

    async fn save(&self, collection: Collection, records: &[Record]) -> AppResult<()> {
        let table = table(collection);
        let mut tx = self
            .db
            .pool()
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;

        sqlx::query(&format!("DELETE FROM {table}"))
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("Failed to clear collection", e))?;

        let mut position: i64 = 0;
        for record in records {
            if insert(&mut *tx, collection, position, record).await? {
                position += 1;
                continue;
            }
            warn!(collection = %collection, "Record does not fit its table, quarantined");
            sqlx::query(
                "INSERT INTO quarantined_records (collection, body, reason) VALUES ($1, $2, $3)",
            )
            .bind(collection.name())
            .bind(serde_json::to_string(record)?)
            .bind("record does not match the table columns")
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("Failed to quarantine record", e))?;
        }

        // Dropping an uncommitted transaction rolls it back.
        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit collection", e))?;

        debug!(collection = %collection, count = position, "Collection saved");
        Ok(())
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.db.ping().await
    }

    async fn close(&self) {
        self.db.close().await;
    }
}
