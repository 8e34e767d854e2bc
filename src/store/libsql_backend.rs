//! libSQL backend — implements the durable slot and the submission record
//! store. Supports local file and in-memory databases.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use libsql::{Connection, Database as LibSqlDatabase, params};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::DatabaseError;
use crate::profile::ProfileData;
use crate::store::migrations;
use crate::store::traits::{CreateOutcome, KeyValueSlot, RecordStore, SubmittedRecord};

/// libSQL database backend.
///
/// Stores a single connection that is reused for all operations.
/// `libsql::Connection` is `Send + Sync` and safe for concurrent async use.
pub struct LibSqlBackend {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
}

impl LibSqlBackend {
    /// Open (or create) a local database file and run migrations.
    pub async fn new_local(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::Pool(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| DatabaseError::Pool(format!("Failed to open libSQL database: {e}")))?;

        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Pool(format!("Failed to create connection: {e}")))?;

        let backend = Self {
            db: Arc::new(db),
            conn,
        };
        backend.init_schema().await?;
        info!(path = %path.display(), "Database opened");
        Ok(backend)
    }

    /// Create an in-memory database (for tests).
    pub async fn new_memory() -> Result<Self, DatabaseError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| {
                DatabaseError::Pool(format!("Failed to create in-memory database: {e}"))
            })?;

        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Pool(format!("Failed to create connection: {e}")))?;

        let backend = Self {
            db: Arc::new(db),
            conn,
        };
        backend.init_schema().await?;
        Ok(backend)
    }

    /// Run all pending schema migrations.
    pub async fn init_schema(&self) -> Result<(), DatabaseError> {
        migrations::run_migrations(self.conn()).await
    }

    fn conn(&self) -> &Connection {
        &self.conn
    }
}

// ── Helper functions ────────────────────────────────────────────────

/// Parse an RFC 3339 or SQLite datetime string into DateTime<Utc>.
fn parse_datetime(s: &str) -> DateTime<Utc> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return dt.with_timezone(&Utc);
    }
    if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return ndt.and_utc();
    }
    DateTime::<Utc>::MIN_UTC
}

/// Map a `SELECT id, payload, created_at` row to a record.
fn row_to_record(row: &libsql::Row) -> Result<SubmittedRecord, DatabaseError> {
    let id_str: String = row
        .get(0)
        .map_err(|e| DatabaseError::Query(format!("row parse: {e}")))?;
    let payload: String = row
        .get(1)
        .map_err(|e| DatabaseError::Query(format!("row parse: {e}")))?;
    let created_str: String = row
        .get(2)
        .map_err(|e| DatabaseError::Query(format!("row parse: {e}")))?;

    let id = Uuid::parse_str(&id_str)
        .map_err(|e| DatabaseError::Query(format!("invalid submission id {id_str}: {e}")))?;
    let profile: ProfileData = serde_json::from_str(&payload)
        .map_err(|e| DatabaseError::Serialization(format!("submission payload: {e}")))?;

    Ok(SubmittedRecord {
        id,
        created_at: parse_datetime(&created_str),
        profile,
    })
}

// ── Trait implementations ───────────────────────────────────────────

#[async_trait]
impl KeyValueSlot for LibSqlBackend {
    async fn get_slot(&self, key: &str) -> Result<Option<Vec<u8>>, DatabaseError> {
        let conn = self.conn();
        let mut rows = conn
            .query("SELECT value FROM kv_slots WHERE key = ?1", params![key])
            .await
            .map_err(|e| DatabaseError::Query(format!("get_slot: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => {
                let value: Vec<u8> = row
                    .get(0)
                    .map_err(|e| DatabaseError::Query(format!("get_slot row: {e}")))?;
                Ok(Some(value))
            }
            Ok(None) => Ok(None),
            Err(e) => Err(DatabaseError::Query(format!("get_slot: {e}"))),
        }
    }

    async fn set_slot(&self, key: &str, value: &[u8]) -> Result<(), DatabaseError> {
        let conn = self.conn();
        let now = Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO kv_slots (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT (key) DO UPDATE SET value = ?2, updated_at = ?3",
            params![key, value.to_vec(), now],
        )
        .await
        .map_err(|e| DatabaseError::Query(format!("set_slot: {e}")))?;

        debug!(key = key, bytes = value.len(), "Slot written");
        Ok(())
    }
}

#[async_trait]
impl RecordStore for LibSqlBackend {
    async fn create_unique(&self, profile: &ProfileData) -> Result<CreateOutcome, DatabaseError> {
        let record = SubmittedRecord::new(profile.clone());
        let payload = serde_json::to_string(&record.profile)
            .map_err(|e| DatabaseError::Serialization(e.to_string()))?;

        // One statement: the uniqueness check and the insert cannot interleave
        // with another submission for the same email.
        let conn = self.conn();
        let inserted = conn
            .execute(
                "INSERT INTO submissions (id, email, first_name, last_name, payload, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT (email) DO NOTHING",
                params![
                    record.id.to_string(),
                    record.profile.email.as_str(),
                    record.profile.first_name.as_str(),
                    record.profile.last_name.as_str(),
                    payload,
                    record.created_at.to_rfc3339(),
                ],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("create_unique: {e}")))?;

        if inserted == 0 {
            debug!(email = %record.profile.email, "Submission already exists for email");
            return Ok(CreateOutcome::Conflict);
        }

        debug!(id = %record.id, "Submission inserted into DB");
        Ok(CreateOutcome::Created(record))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<SubmittedRecord>, DatabaseError> {
        let conn = self.conn();
        let mut rows = conn
            .query(
                "SELECT id, payload, created_at FROM submissions WHERE email = ?1",
                params![email],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("find_by_email: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => Ok(Some(row_to_record(&row)?)),
            Ok(None) => Ok(None),
            Err(e) => Err(DatabaseError::Query(format!("find_by_email: {e}"))),
        }
    }
}
