// crates/interface-index-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Document Gateway
// Description: Durable DocumentGateway backed by a single SQLite table.
// Purpose: Store JSON records per collection with the core filter semantics.
// Dependencies: interface-index-core, rusqlite, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Records live in one `documents` table keyed by an autoincrement row id and
//! tagged with their collection. Row order is insertion order, which gives
//! `find_one` and `upsert` the same "first match" rule as the in-memory
//! gateway. A record whose `id` is a string also fills the `key` column,
//! which is unique per collection. Filters pinning `id` to a string read only
//! the keyed row plus unkeyed rows, so key lookups and metric inserts do not
//! scan the collection. Each call runs on the blocking pool so the async
//! executor never waits on disk I/O. Stored bodies are untrusted and are
//! re-validated by the document layer after decoding.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashSet;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use interface_index_core::DocumentGateway;
use interface_index_core::Filter;
use interface_index_core::GatewayError;
use interface_index_core::PRIMARY_KEY_FIELD;
use interface_index_core::Predicate;
use interface_index_core::Record;
use interface_index_core::SortOrder;
use interface_index_core::core::record::merge_fields;
use rusqlite::Connection;
use rusqlite::ErrorCode;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::ToSql;
use rusqlite::Transaction;
use rusqlite::params;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// `SQLite` schema version for the gateway.
const SCHEMA_VERSION: i64 = 2;
/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum encoded record size accepted by the gateway.
pub const MAX_DOCUMENT_BYTES: usize = 1024 * 1024;

// ============================================================================
// SECTION: Config
// ============================================================================

/// `SQLite` journal mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `journal_mode` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteJournalMode {
    /// WAL journal mode (recommended).
    #[default]
    Wal,
    /// Delete journal mode (legacy).
    Delete,
}

impl SqliteJournalMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` sync mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `synchronous` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteSyncMode {
    /// Full synchronous mode (safest).
    #[default]
    Full,
    /// Normal synchronous mode (balanced).
    Normal,
}

impl SqliteSyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// Configuration for the `SQLite` document gateway.
///
/// # Invariants
/// - `path` must resolve to a file path (not a directory).
/// - `max_document_bytes` is non-zero and no more than [`MAX_DOCUMENT_BYTES`].
#[derive(Debug, Clone, Deserialize)]
pub struct SqliteGatewayConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteJournalMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
    /// Maximum encoded record size in bytes.
    #[serde(default = "default_max_document_bytes")]
    pub max_document_bytes: usize,
}

impl SqliteGatewayConfig {
    /// Builds a config for `path` with default tuning.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            journal_mode: SqliteJournalMode::default(),
            sync_mode: SqliteSyncMode::default(),
            max_document_bytes: MAX_DOCUMENT_BYTES,
        }
    }
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

/// Returns the default record size limit.
const fn default_max_document_bytes() -> usize {
    MAX_DOCUMENT_BYTES
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// `SQLite` gateway errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum SqliteGatewayError {
    /// Filesystem error.
    #[error("sqlite gateway io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite gateway db error: {0}")]
    Db(String),
    /// Database stayed locked past the busy timeout.
    #[error("sqlite gateway busy: {0}")]
    Busy(String),
    /// Stored body is not a JSON object.
    #[error("sqlite gateway corruption: {0}")]
    Corrupt(String),
    /// Write collides with a stored key.
    #[error("sqlite gateway conflict: {0}")]
    Conflict(String),
    /// Database was written by an incompatible version.
    #[error("sqlite gateway version mismatch: {0}")]
    VersionMismatch(String),
    /// Configuration or request data is invalid.
    #[error("sqlite gateway invalid data: {0}")]
    Invalid(String),
    /// Record exceeded the size limit.
    #[error("sqlite gateway payload too large: {actual_bytes} bytes (max {max_bytes})")]
    TooLarge {
        /// Maximum allowed bytes.
        max_bytes: usize,
        /// Actual payload size in bytes.
        actual_bytes: usize,
    },
}

impl From<SqliteGatewayError> for GatewayError {
    fn from(error: SqliteGatewayError) -> Self {
        match error {
            SqliteGatewayError::Io(message) | SqliteGatewayError::Db(message) => {
                Self::Unavailable(message)
            }
            SqliteGatewayError::Busy(message) => Self::Timeout(message),
            SqliteGatewayError::Corrupt(message) => Self::Corrupt(message),
            SqliteGatewayError::Conflict(message) => Self::Conflict(message),
            SqliteGatewayError::VersionMismatch(message) | SqliteGatewayError::Invalid(message) => {
                Self::Invalid(message)
            }
            error @ SqliteGatewayError::TooLarge { .. } => Self::TooLarge(error.to_string()),
        }
    }
}

/// Maps an engine error, separating lock contention and key collisions from
/// other failures.
fn db_error(err: &rusqlite::Error) -> SqliteGatewayError {
    match err.sqlite_error_code() {
        Some(ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked) => {
            SqliteGatewayError::Busy(err.to_string())
        }
        Some(ErrorCode::ConstraintViolation) => SqliteGatewayError::Conflict(err.to_string()),
        _ => SqliteGatewayError::Db(err.to_string()),
    }
}

// ============================================================================
// SECTION: Gateway
// ============================================================================

/// SQLite-backed document gateway.
///
/// # Invariants
/// - All access goes through one mutex-guarded connection.
#[derive(Clone)]
pub struct SqliteDocumentGateway {
    /// Gateway configuration.
    config: Arc<SqliteGatewayConfig>,
    /// Shared connection.
    connection: Arc<Mutex<Connection>>,
}

impl SqliteDocumentGateway {
    /// Opens (and initializes when new) an SQLite-backed gateway.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteGatewayError`] when the path is unsafe or the database
    /// cannot be opened or initialized.
    pub fn new(config: SqliteGatewayConfig) -> Result<Self, SqliteGatewayError> {
        validate_store_path(&config.path)?;
        if config.max_document_bytes == 0 || config.max_document_bytes > MAX_DOCUMENT_BYTES {
            return Err(SqliteGatewayError::Invalid(format!(
                "max_document_bytes out of range: {} (max {MAX_DOCUMENT_BYTES})",
                config.max_document_bytes
            )));
        }
        ensure_parent_dir(&config.path)?;
        let mut connection = open_connection(&config)?;
        initialize_schema(&mut connection)?;
        Ok(Self {
            config: Arc::new(config),
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    /// Returns the gateway configuration.
    #[must_use]
    pub fn config(&self) -> &SqliteGatewayConfig {
        &self.config
    }

    /// Runs `op` against the connection on the blocking pool.
    async fn with_connection<T, F>(&self, op: F) -> Result<T, GatewayError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection, &SqliteGatewayConfig) -> Result<T, SqliteGatewayError>
            + Send
            + 'static,
    {
        let connection = Arc::clone(&self.connection);
        let config = Arc::clone(&self.config);
        let result = tokio::task::spawn_blocking(move || {
            let mut guard = connection
                .lock()
                .map_err(|_| SqliteGatewayError::Io("sqlite connection mutex poisoned".to_string()))?;
            op(&mut guard, &config)
        })
        .await
        .map_err(|err| GatewayError::Unavailable(format!("sqlite task failed: {err}")))?;
        result.map_err(GatewayError::from)
    }
}

#[async_trait]
impl DocumentGateway for SqliteDocumentGateway {
    async fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Option<Record>, GatewayError> {
        let collection = collection.to_string();
        let filter = filter.clone();
        self.with_connection(move |connection, _| {
            let rows = candidate_rows(connection, &collection, &filter)?;
            Ok(rows.into_iter().map(|(_, record)| record).find(|record| filter.matches(record)))
        })
        .await
    }

    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        sort: Option<&SortOrder>,
    ) -> Result<Vec<Record>, GatewayError> {
        let collection = collection.to_string();
        let filter = filter.clone();
        let order = sort.cloned();
        self.with_connection(move |connection, _| {
            let mut matched: Vec<Record> = candidate_rows(connection, &collection, &filter)?
                .into_iter()
                .map(|(_, record)| record)
                .filter(|record| filter.matches(record))
                .collect();
            if let Some(order) = order {
                matched.sort_by(|left, right| order.compare(left, right));
            }
            Ok(matched)
        })
        .await
    }

    async fn upsert(
        &self,
        collection: &str,
        filter: &Filter,
        record: &Record,
    ) -> Result<(), GatewayError> {
        let collection = collection.to_string();
        let filter = filter.clone();
        let record = record.clone();
        self.with_connection(move |connection, config| {
            let tx = connection.transaction().map_err(|err| db_error(&err))?;
            let existing = candidate_rows(&tx, &collection, &filter)?
                .into_iter()
                .find(|(_, stored)| filter.matches(stored));
            match existing {
                Some((row_id, stored)) => {
                    let merged = merge_fields(&stored, &record);
                    let body = encode_record(&merged, config)?;
                    tx.execute(
                        "UPDATE documents SET key = ?1, body = ?2 WHERE row_id = ?3",
                        params![record_key(&merged), body, row_id],
                    )
                    .map_err(|err| db_error(&err))?;
                }
                None => {
                    let merged = merge_fields(&filter.equality_fields(), &record);
                    insert_row(&tx, &collection, &merged, config)?;
                }
            }
            tx.commit().map_err(|err| db_error(&err))
        })
        .await
    }

    async fn insert(&self, collection: &str, record: &Record) -> Result<(), GatewayError> {
        let collection = collection.to_string();
        let record = record.clone();
        self.with_connection(move |connection, config| {
            insert_row(connection, &collection, &record, config)
        })
        .await
    }

    async fn delete(&self, collection: &str, filter: &Filter) -> Result<u64, GatewayError> {
        let collection = collection.to_string();
        let filter = filter.clone();
        self.with_connection(move |connection, _| {
            let tx = connection.transaction().map_err(|err| db_error(&err))?;
            let doomed: Vec<i64> = candidate_rows(&tx, &collection, &filter)?
                .into_iter()
                .filter(|(_, stored)| filter.matches(stored))
                .map(|(row_id, _)| row_id)
                .collect();
            for row_id in &doomed {
                tx.execute("DELETE FROM documents WHERE row_id = ?1", params![row_id])
                    .map_err(|err| db_error(&err))?;
            }
            tx.commit().map_err(|err| db_error(&err))?;
            u64::try_from(doomed.len()).map_err(|err| SqliteGatewayError::Invalid(err.to_string()))
        })
        .await
    }

    async fn readiness(&self) -> Result<(), GatewayError> {
        self.with_connection(|connection, _| {
            connection
                .query_row("SELECT 1", params![], |row| row.get::<_, i64>(0))
                .map(|_| ())
                .map_err(|err| db_error(&err))
        })
        .await
    }
}

// ============================================================================
// SECTION: Row Access
// ============================================================================

/// Returns the string primary key a record is indexed under.
fn record_key(record: &Record) -> Option<&str> {
    record.get(PRIMARY_KEY_FIELD).and_then(Value::as_str)
}

/// Returns the key pinned by an `id` equality clause of `filter`.
fn filter_key(filter: &Filter) -> Option<&str> {
    filter.clauses().iter().find_map(|clause| match &clause.predicate {
        Predicate::Equals(Value::String(key)) if clause.field == PRIMARY_KEY_FIELD => {
            Some(key.as_str())
        }
        _ => None,
    })
}

/// Reads the rows of a collection that may match `filter`, in insertion
/// order.
///
/// A pinned key narrows the read to the keyed row plus unkeyed rows, since
/// any other keyed row carries a different string `id`.
fn candidate_rows(
    connection: &Connection,
    collection: &str,
    filter: &Filter,
) -> Result<Vec<(i64, Record)>, SqliteGatewayError> {
    match filter_key(filter) {
        Some(key) => read_rows(
            connection,
            "SELECT row_id, body FROM documents WHERE collection = ?1 AND key = ?2
             UNION ALL
             SELECT row_id, body FROM documents WHERE collection = ?1 AND key IS NULL
             ORDER BY row_id ASC",
            params![collection, key],
        ),
        None => read_rows(
            connection,
            "SELECT row_id, body FROM documents WHERE collection = ?1 ORDER BY row_id ASC",
            params![collection],
        ),
    }
}

/// Runs a `(row_id, body)` query and decodes every row.
fn read_rows(
    connection: &Connection,
    sql: &str,
    args: &[&dyn ToSql],
) -> Result<Vec<(i64, Record)>, SqliteGatewayError> {
    let mut statement = connection.prepare_cached(sql).map_err(|err| db_error(&err))?;
    let rows = statement
        .query_map(args, |row| Ok((row.get::<_, i64>(0)?, row.get::<_, Vec<u8>>(1)?)))
        .map_err(|err| db_error(&err))?;
    let mut records = Vec::new();
    for row in rows {
        let (row_id, body) = row.map_err(|err| db_error(&err))?;
        records.push((row_id, decode_record(row_id, &body)?));
    }
    Ok(records)
}

/// Appends one row, failing with a conflict when its key is taken.
fn insert_row(
    connection: &Connection,
    collection: &str,
    record: &Record,
    config: &SqliteGatewayConfig,
) -> Result<(), SqliteGatewayError> {
    let body = encode_record(record, config)?;
    let mut statement = connection
        .prepare_cached("INSERT INTO documents (collection, key, body) VALUES (?1, ?2, ?3)")
        .map_err(|err| db_error(&err))?;
    statement
        .execute(params![collection, record_key(record), body])
        .map_err(|err| db_error(&err))?;
    Ok(())
}

/// Encodes a record, enforcing the size limit.
fn encode_record(
    record: &Record,
    config: &SqliteGatewayConfig,
) -> Result<Vec<u8>, SqliteGatewayError> {
    let body =
        serde_json::to_vec(record).map_err(|err| SqliteGatewayError::Invalid(err.to_string()))?;
    if body.len() > config.max_document_bytes {
        return Err(SqliteGatewayError::TooLarge {
            max_bytes: config.max_document_bytes,
            actual_bytes: body.len(),
        });
    }
    Ok(body)
}

/// Decodes a stored body into a record.
fn decode_record(row_id: i64, body: &[u8]) -> Result<Record, SqliteGatewayError> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(record)) => Ok(record),
        Ok(_) => Err(SqliteGatewayError::Corrupt(format!("row {row_id} is not a JSON object"))),
        Err(err) => Err(SqliteGatewayError::Corrupt(format!("row {row_id}: {err}"))),
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Ensures the parent directory for the database exists.
fn ensure_parent_dir(path: &Path) -> Result<(), SqliteGatewayError> {
    let Some(parent) = path.parent() else {
        return Err(SqliteGatewayError::Io("store path missing parent directory".to_string()));
    };
    if parent.as_os_str().is_empty() {
        return Ok(());
    }
    std::fs::create_dir_all(parent).map_err(|err| SqliteGatewayError::Io(err.to_string()))
}

/// Validates store paths for safety limits.
fn validate_store_path(path: &Path) -> Result<(), SqliteGatewayError> {
    if path.as_os_str().is_empty() {
        return Err(SqliteGatewayError::Invalid("store path must not be empty".to_string()));
    }
    let path_string = path.display().to_string();
    if path_string.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SqliteGatewayError::Invalid("store path exceeds length limit".to_string()));
    }
    for component in path.components() {
        let name = component.as_os_str().to_string_lossy();
        if name.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(SqliteGatewayError::Invalid(
                "store path contains an overlong component".to_string(),
            ));
        }
    }
    if path.is_dir() {
        return Err(SqliteGatewayError::Invalid(
            "store path must be a file, not a directory".to_string(),
        ));
    }
    Ok(())
}

/// Opens an `SQLite` connection with the configured pragmas.
fn open_connection(config: &SqliteGatewayConfig) -> Result<Connection, SqliteGatewayError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection =
        Connection::open_with_flags(&config.path, flags).map_err(|err| db_error(&err))?;
    connection
        .execute_batch(&format!("PRAGMA journal_mode = {};", config.journal_mode.pragma_value()))
        .map_err(|err| db_error(&err))?;
    connection
        .execute_batch(&format!("PRAGMA synchronous = {};", config.sync_mode.pragma_value()))
        .map_err(|err| db_error(&err))?;
    connection
        .busy_timeout(Duration::from_millis(config.busy_timeout_ms))
        .map_err(|err| db_error(&err))?;
    Ok(connection)
}

/// Creates the schema on first open and checks the version afterwards.
fn initialize_schema(connection: &mut Connection) -> Result<(), SqliteGatewayError> {
    let tx: Transaction<'_> = connection.transaction().map_err(|err| db_error(&err))?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL);")
        .map_err(|err| db_error(&err))?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM store_meta LIMIT 1", params![], |row| row.get(0))
        .optional()
        .map_err(|err| db_error(&err))?;
    match version {
        None => {
            tx.execute("INSERT INTO store_meta (version) VALUES (?1)", params![SCHEMA_VERSION])
                .map_err(|err| db_error(&err))?;
            tx.execute_batch(
                "CREATE TABLE IF NOT EXISTS documents (
                    row_id INTEGER PRIMARY KEY AUTOINCREMENT,
                    collection TEXT NOT NULL,
                    key TEXT,
                    body BLOB NOT NULL
                );
                CREATE INDEX IF NOT EXISTS idx_documents_collection
                    ON documents (collection, row_id);
                CREATE UNIQUE INDEX IF NOT EXISTS idx_documents_key
                    ON documents (collection, key);",
            )
            .map_err(|err| db_error(&err))?;
        }
        Some(1) => {
            backfill_keys(&tx)?;
            tx.execute("UPDATE store_meta SET version = ?1", params![SCHEMA_VERSION])
                .map_err(|err| db_error(&err))?;
        }
        Some(SCHEMA_VERSION) => {}
        Some(other) => {
            return Err(SqliteGatewayError::VersionMismatch(format!(
                "expected schema version {SCHEMA_VERSION}, found {other}"
            )));
        }
    }
    tx.commit().map_err(|err| db_error(&err))
}

/// Adds and fills the `key` column of a version 1 database.
///
/// Rows that do not decode or carry no string `id` stay unkeyed. When a
/// collection holds the same key twice, the oldest row keeps it.
fn backfill_keys(tx: &Transaction<'_>) -> Result<(), SqliteGatewayError> {
    tx.execute_batch("ALTER TABLE documents ADD COLUMN key TEXT;")
        .map_err(|err| db_error(&err))?;
    let rows: Vec<(i64, String, Vec<u8>)> = {
        let mut statement = tx
            .prepare("SELECT row_id, collection, body FROM documents ORDER BY row_id ASC")
            .map_err(|err| db_error(&err))?;
        let rows = statement
            .query_map(params![], |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?, row.get::<_, Vec<u8>>(2)?))
            })
            .map_err(|err| db_error(&err))?;
        rows.collect::<Result<_, _>>().map_err(|err| db_error(&err))?
    };
    let mut seen: HashSet<(String, String)> = HashSet::new();
    for (row_id, collection, body) in rows {
        let Ok(record) = decode_record(row_id, &body) else {
            continue;
        };
        let Some(key) = record_key(&record) else {
            continue;
        };
        if seen.insert((collection, key.to_string())) {
            tx.execute("UPDATE documents SET key = ?1 WHERE row_id = ?2", params![key, row_id])
                .map_err(|err| db_error(&err))?;
        }
    }
    tx.execute_batch(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_documents_key ON documents (collection, key);",
    )
    .map_err(|err| db_error(&err))
}
