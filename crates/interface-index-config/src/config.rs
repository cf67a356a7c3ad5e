// crates/interface-index-config/src/config.rs
// ============================================================================
// Module: Interface Index Configuration
// Description: Configuration loading and validation for the index service.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: interface-index-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! The path comes from the caller, then `INTERFACE_INDEX_CONFIG`, then
//! `interface-index.toml` in the working directory. Missing or invalid
//! configuration fails closed; a file with no sections yields a local-only
//! service backed by the in-memory store.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::path::PathBuf;

use interface_index_store_sqlite::MAX_DOCUMENT_BYTES;
use interface_index_store_sqlite::SqliteGatewayConfig;
use interface_index_store_sqlite::SqliteJournalMode;
use interface_index_store_sqlite::SqliteSyncMode;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
pub const DEFAULT_CONFIG_NAME: &str = "interface-index.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "INTERFACE_INDEX_CONFIG";
/// Maximum configuration file size in bytes.
pub const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Default bind address.
const DEFAULT_BIND: &str = "127.0.0.1:8080";
/// Default request body limit in bytes.
const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;
/// Default header carrying the proxy-asserted principal.
pub const DEFAULT_PRINCIPAL_HEADER: &str = "x-remote-user";
/// Maximum header name length.
const MAX_HEADER_NAME_LENGTH: usize = 128;
/// Maximum number of bearer tokens.
const MAX_AUTH_TOKENS: usize = 64;
/// Maximum length of a bearer token.
const MAX_AUTH_TOKEN_LENGTH: usize = 256;
/// Maximum number of admin groups.
const MAX_ADMIN_GROUPS: usize = 64;
/// Maximum number of static membership groups.
const MAX_STATIC_GROUPS: usize = 1024;
/// Maximum length of a principal or group name.
const MAX_NAME_LENGTH: usize = 256;
/// Default membership connect timeout (ms).
const DEFAULT_MEMBERSHIP_CONNECT_TIMEOUT_MS: u64 = 500;
/// Default membership request timeout (ms).
const DEFAULT_MEMBERSHIP_REQUEST_TIMEOUT_MS: u64 = 2_000;
/// Minimum membership connect timeout (ms).
const MIN_MEMBERSHIP_CONNECT_TIMEOUT_MS: u64 = 50;
/// Maximum membership connect timeout (ms).
const MAX_MEMBERSHIP_CONNECT_TIMEOUT_MS: u64 = 10_000;
/// Minimum membership request timeout (ms).
const MIN_MEMBERSHIP_REQUEST_TIMEOUT_MS: u64 = 100;
/// Maximum membership request timeout (ms).
const MAX_MEMBERSHIP_REQUEST_TIMEOUT_MS: u64 = 30_000;
/// Default `SQLite` busy timeout (ms).
const DEFAULT_STORE_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum `SQLite` busy timeout (ms).
const MAX_STORE_BUSY_TIMEOUT_MS: u64 = 60_000;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Interface index service configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InterfaceIndexConfig {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Principal resolution configuration.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Write authorization configuration.
    #[serde(default)]
    pub authz: AuthzConfig,
    /// Group membership backend configuration.
    #[serde(default)]
    pub membership: MembershipConfig,
    /// Schema source configuration.
    #[serde(default)]
    pub schemas: SchemasConfig,
    /// Document store configuration.
    #[serde(default)]
    pub store: StoreConfig,
    /// Audit sink configuration.
    #[serde(default)]
    pub audit: AuditConfig,
    /// Usage metrics configuration.
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl InterfaceIndexConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let config = Self::from_toml(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parses configuration text without validating it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the TOML is malformed.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.auth.validate()?;
        self.authz.validate()?;
        self.membership.validate()?;
        self.schemas.validate()?;
        self.store.validate()?;
        self.audit.validate()?;
        self.validate_metrics()?;
        Ok(())
    }

    /// Returns whether usage metrics are recorded.
    ///
    /// Metrics default to on for the `SQLite` store and off for the memory
    /// store.
    #[must_use]
    pub fn metrics_enabled(&self) -> bool {
        self.metrics.enabled.unwrap_or(self.store.store_type == StoreType::Sqlite)
    }

    /// Rejects metrics on the memory store, which never evicts records.
    fn validate_metrics(&self) -> Result<(), ConfigError> {
        if self.metrics.enabled == Some(true) && self.store.store_type == StoreType::Memory {
            return Err(ConfigError::Invalid(
                "metrics.enabled requires store.type = \"sqlite\"".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Server
// ============================================================================

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Socket address to bind.
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Maximum request body size in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl ServerConfig {
    /// Returns the parsed bind address.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the bind address does not parse.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid("invalid server.bind address".to_string()))
    }

    /// Validates server configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_body_bytes == 0 {
            return Err(ConfigError::Invalid(
                "server.max_body_bytes must be greater than zero".to_string(),
            ));
        }
        self.bind_addr()?;
        Ok(())
    }
}

// ============================================================================
// SECTION: Auth
// ============================================================================

/// Principal resolution modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AuthMode {
    /// Principal asserted by a trusted session proxy header.
    #[default]
    TrustedHeader,
    /// Principal mapped from an `Authorization: Bearer` token.
    BearerToken,
}

/// Principal resolution configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Resolution mode.
    #[serde(default)]
    pub mode: AuthMode,
    /// Header read in `trusted_header` mode.
    #[serde(default = "default_principal_header")]
    pub header: String,
    /// Bearer token to principal table for `bearer_token` mode.
    #[serde(default)]
    pub tokens: BTreeMap<String, String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            mode: AuthMode::default(),
            header: default_principal_header(),
            tokens: BTreeMap::new(),
        }
    }
}

impl AuthConfig {
    /// Validates auth configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        let header = self.header.trim();
        if header.is_empty() || header.len() > MAX_HEADER_NAME_LENGTH {
            return Err(ConfigError::Invalid("auth.header must be 1-128 bytes".to_string()));
        }
        if !header.bytes().all(is_header_name_byte) {
            return Err(ConfigError::Invalid(format!(
                "auth.header is not a valid header name: {header}"
            )));
        }
        if self.tokens.len() > MAX_AUTH_TOKENS {
            return Err(ConfigError::Invalid("too many auth tokens".to_string()));
        }
        for (token, principal) in &self.tokens {
            if token.trim().is_empty() || token.trim() != token {
                return Err(ConfigError::Invalid(
                    "auth token must be non-empty and trimmed".to_string(),
                ));
            }
            if token.len() > MAX_AUTH_TOKEN_LENGTH {
                return Err(ConfigError::Invalid("auth token too long".to_string()));
            }
            validate_name("auth.tokens principal", principal)?;
        }
        if self.mode == AuthMode::BearerToken && self.tokens.is_empty() {
            return Err(ConfigError::Invalid("bearer_token auth requires tokens".to_string()));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Authorization
// ============================================================================

/// Write authorization configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthzConfig {
    /// Groups whose members may write any document (each prefixed `~`).
    #[serde(default)]
    pub admin_groups: Vec<String>,
}

impl AuthzConfig {
    /// Validates authorization configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.admin_groups.len() > MAX_ADMIN_GROUPS {
            return Err(ConfigError::Invalid("too many authz.admin_groups".to_string()));
        }
        for group in &self.admin_groups {
            validate_group_name("authz.admin_groups", group)?;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Membership
// ============================================================================

/// Group membership backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MembershipType {
    /// No groups; only plain owners may write owned documents.
    #[default]
    None,
    /// Fixed group table from configuration.
    Static,
    /// External membership service over HTTP.
    Http,
}

/// Group membership backend configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MembershipConfig {
    /// Backend type.
    #[serde(rename = "type", default)]
    pub membership_type: MembershipType,
    /// Group name to members for the static backend.
    #[serde(default)]
    pub groups: BTreeMap<String, Vec<String>>,
    /// Base URL of the membership service for the http backend.
    #[serde(default)]
    pub base_url: Option<String>,
    /// Optional bearer token for membership queries.
    #[serde(default)]
    pub auth_token: Option<String>,
    /// Connect timeout in milliseconds.
    #[serde(default = "default_membership_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Request timeout in milliseconds.
    #[serde(default = "default_membership_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for MembershipConfig {
    fn default() -> Self {
        Self {
            membership_type: MembershipType::default(),
            groups: BTreeMap::new(),
            base_url: None,
            auth_token: None,
            connect_timeout_ms: default_membership_connect_timeout_ms(),
            request_timeout_ms: default_membership_request_timeout_ms(),
        }
    }
}

impl MembershipConfig {
    /// Validates membership configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        match self.membership_type {
            MembershipType::None => {
                if !self.groups.is_empty() || self.base_url.is_some() {
                    return Err(ConfigError::Invalid(
                        "membership settings require membership.type static or http".to_string(),
                    ));
                }
            }
            MembershipType::Static => {
                if self.base_url.is_some() {
                    return Err(ConfigError::Invalid(
                        "membership.base_url is only valid for http membership".to_string(),
                    ));
                }
                if self.groups.len() > MAX_STATIC_GROUPS {
                    return Err(ConfigError::Invalid("too many membership.groups".to_string()));
                }
                for (group, members) in &self.groups {
                    validate_group_name("membership.groups", group)?;
                    for member in members {
                        validate_name("membership.groups member", member)?;
                    }
                }
            }
            MembershipType::Http => {
                if !self.groups.is_empty() {
                    return Err(ConfigError::Invalid(
                        "membership.groups is only valid for static membership".to_string(),
                    ));
                }
                let base_url = self.base_url.as_deref().unwrap_or_default().trim();
                if base_url.is_empty() {
                    return Err(ConfigError::Invalid(
                        "membership.base_url is required for http membership".to_string(),
                    ));
                }
                if !(base_url.starts_with("https://") || base_url.starts_with("http://")) {
                    return Err(ConfigError::Invalid(
                        "membership.base_url must include http:// or https://".to_string(),
                    ));
                }
                if let Some(token) = &self.auth_token
                    && token.trim().is_empty()
                {
                    return Err(ConfigError::Invalid(
                        "membership.auth_token must be non-empty".to_string(),
                    ));
                }
                validate_timeout_range(
                    "membership.connect_timeout_ms",
                    self.connect_timeout_ms,
                    MIN_MEMBERSHIP_CONNECT_TIMEOUT_MS,
                    MAX_MEMBERSHIP_CONNECT_TIMEOUT_MS,
                )?;
                validate_timeout_range(
                    "membership.request_timeout_ms",
                    self.request_timeout_ms,
                    MIN_MEMBERSHIP_REQUEST_TIMEOUT_MS,
                    MAX_MEMBERSHIP_REQUEST_TIMEOUT_MS,
                )?;
            }
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Schemas
// ============================================================================

/// Schema source configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SchemasConfig {
    /// Directory holding `interface.schema.json` and `layer.schema.json`.
    /// Bundled schemas are used when unset.
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

impl SchemasConfig {
    /// Validates schema configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(directory) = &self.directory {
            validate_path_string("schemas.directory", &directory.to_string_lossy())?;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// Document store backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StoreType {
    /// Process-local in-memory store.
    #[default]
    Memory,
    /// `SQLite` file store.
    Sqlite,
}

/// Document store configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Store backend type.
    #[serde(rename = "type", default)]
    pub store_type: StoreType,
    /// `SQLite` database path when using the sqlite backend.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_store_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteJournalMode,
    /// `SQLite` synchronous mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            store_type: StoreType::default(),
            path: None,
            busy_timeout_ms: default_store_busy_timeout_ms(),
            journal_mode: SqliteJournalMode::default(),
            sync_mode: SqliteSyncMode::default(),
        }
    }
}

impl StoreConfig {
    /// Returns the `SQLite` gateway settings when the sqlite backend is selected.
    #[must_use]
    pub fn sqlite_gateway_config(&self) -> Option<SqliteGatewayConfig> {
        if self.store_type != StoreType::Sqlite {
            return None;
        }
        let path = self.path.clone()?;
        Some(SqliteGatewayConfig {
            path,
            busy_timeout_ms: self.busy_timeout_ms,
            journal_mode: self.journal_mode,
            sync_mode: self.sync_mode,
            max_document_bytes: MAX_DOCUMENT_BYTES,
        })
    }

    /// Validates store configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        match self.store_type {
            StoreType::Memory => {
                if self.path.is_some() {
                    return Err(ConfigError::Invalid(
                        "memory store must not set store.path".to_string(),
                    ));
                }
            }
            StoreType::Sqlite => {
                let path = self.path.as_ref().ok_or_else(|| {
                    ConfigError::Invalid("sqlite store requires store.path".to_string())
                })?;
                validate_path_string("store.path", &path.to_string_lossy())?;
            }
        }
        if self.busy_timeout_ms > MAX_STORE_BUSY_TIMEOUT_MS {
            return Err(ConfigError::Invalid(
                "store.busy_timeout_ms exceeds max (60000)".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Audit
// ============================================================================

/// Audit sink selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AuditSinkKind {
    /// JSON lines on stderr.
    #[default]
    Stderr,
    /// JSON lines appended to a file.
    File,
    /// Audit disabled.
    None,
}

/// Audit sink configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditConfig {
    /// Sink selection.
    #[serde(default)]
    pub sink: AuditSinkKind,
    /// Output path for the file sink.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl AuditConfig {
    /// Validates audit configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        match (self.sink, &self.path) {
            (AuditSinkKind::File, Some(path)) => {
                validate_path_string("audit.path", &path.to_string_lossy())
            }
            (AuditSinkKind::File, None) => {
                Err(ConfigError::Invalid("file audit sink requires audit.path".to_string()))
            }
            (_, Some(_)) => {
                Err(ConfigError::Invalid("audit.path is only valid for the file sink".to_string()))
            }
            (_, None) => Ok(()),
        }
    }
}

// ============================================================================
// SECTION: Metrics
// ============================================================================

/// Usage metrics configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetricsConfig {
    /// Record document usage into the `metrics` collection. Unset follows the
    /// store type; see [`InterfaceIndexConfig::metrics_enabled`].
    #[serde(default)]
    pub enabled: Option<bool>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against security limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        let component_value = component.as_os_str().to_string_lossy();
        if component_value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Validates a principal or member name.
fn validate_name(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() || value.trim() != value {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty and trimmed")));
    }
    if value.len() > MAX_NAME_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} too long")));
    }
    Ok(())
}

/// Validates a group name, which must carry the `~` prefix.
fn validate_group_name(field: &str, value: &str) -> Result<(), ConfigError> {
    validate_name(field, value)?;
    match value.strip_prefix('~') {
        Some(rest) if !rest.is_empty() => Ok(()),
        _ => Err(ConfigError::Invalid(format!("{field} entry must start with '~': {value}"))),
    }
}

/// Validates that a timeout falls inside an inclusive range.
fn validate_timeout_range(field: &str, value: u64, min: u64, max: u64) -> Result<(), ConfigError> {
    if value < min || value > max {
        return Err(ConfigError::Invalid(format!("{field} must be between {min} and {max}")));
    }
    Ok(())
}

/// Returns true for bytes permitted in an HTTP header name.
const fn is_header_name_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric()
        || matches!(
            byte,
            b'!' | b'#'
                | b'$'
                | b'%'
                | b'&'
                | b'\''
                | b'*'
                | b'+'
                | b'-'
                | b'.'
                | b'^'
                | b'_'
                | b'`'
                | b'|'
                | b'~'
        )
}

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Default bind address.
fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}

/// Default request body limit.
const fn default_max_body_bytes() -> usize {
    DEFAULT_MAX_BODY_BYTES
}

/// Default principal header.
fn default_principal_header() -> String {
    DEFAULT_PRINCIPAL_HEADER.to_string()
}

/// Default membership connect timeout.
const fn default_membership_connect_timeout_ms() -> u64 {
    DEFAULT_MEMBERSHIP_CONNECT_TIMEOUT_MS
}

/// Default membership request timeout.
const fn default_membership_request_timeout_ms() -> u64 {
    DEFAULT_MEMBERSHIP_REQUEST_TIMEOUT_MS
}

/// Default `SQLite` busy timeout.
const fn default_store_busy_timeout_ms() -> u64 {
    DEFAULT_STORE_BUSY_TIMEOUT_MS
}
