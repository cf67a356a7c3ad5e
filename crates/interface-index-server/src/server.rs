// crates/interface-index-server/src/server.rs
// ============================================================================
// Module: HTTP Server
// Description: REST surface over the interface and layer repositories.
// Purpose: Expose document find, load, write, and delete flows over HTTP.
// Dependencies: axum, interface-index-config, interface-index-core, tokio, url
// ============================================================================

//! ## Overview
//! [`InterfaceIndexServer`] wires configuration into a schema registry, a
//! document gateway, a membership backend, and an audit sink, then serves
//! the REST routes:
//! - `GET /` lists API links
//! - `GET|POST /api/v1/{collection}` finds or batch-writes documents
//! - `GET|POST|DELETE /api/v1/{kind}/{id}` loads, writes, or deletes one
//!
//! Trailing slashes are accepted on every API route. Write routes require a
//! resolved principal. Security posture: request bodies, query terms, and
//! principal headers are untrusted and bounded before use.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;

use axum::Json;
use axum::Router;
use axum::body::Bytes;
use axum::extract::DefaultBodyLimit;
use axum::extract::MatchedPath;
use axum::extract::Path;
use axum::extract::RawQuery;
use axum::extract::Request;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::middleware;
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::get;
use interface_index_config::AuditSinkKind;
use interface_index_config::AuthMode;
use interface_index_config::InterfaceIndexConfig;
use interface_index_config::MembershipType;
use interface_index_config::StoreType;
use interface_index_core::Document;
use interface_index_core::DocumentError;
use interface_index_core::DocumentGateway;
use interface_index_core::GatewayError;
use interface_index_core::GatewayMetricsRecorder;
use interface_index_core::GroupMembership;
use interface_index_core::InMemoryDocumentGateway;
use interface_index_core::Kind;
use interface_index_core::MetricsRecorder;
use interface_index_core::NoGroupMembership;
use interface_index_core::OwnershipAuthorizer;
use interface_index_core::QueryTerm;
use interface_index_core::Repository;
use interface_index_core::SchemaRegistry;
use interface_index_core::StaticGroupMembership;
use interface_index_core::WriteDecision;
use interface_index_store_sqlite::SqliteDocumentGateway;
use serde_json::Value;
use serde_json::json;
use thiserror::Error;

use crate::audit::AuditSink;
use crate::audit::FileAuditSink;
use crate::audit::NoopAuditSink;
use crate::audit::RequestAuditEvent;
use crate::audit::SecurityAuditEvent;
use crate::audit::StderrAuditSink;
use crate::audit::WriteAuditEvent;
use crate::auth::AuthError;
use crate::auth::PrincipalResolver;
use crate::membership::HttpGroupMembership;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Links advertised by the service index.
const INDEX_LINKS: [&str; 4] = [
    "/api/v1/interfaces/",
    "/api/v1/interface/mysql/",
    "/api/v1/layers/",
    "/api/v1/layer/charmhelpers/",
];

/// Query parameter carrying search terms.
const QUERY_PARAM: &str = "q";

// ============================================================================
// SECTION: Server
// ============================================================================

/// Interface index HTTP server.
pub struct InterfaceIndexServer {
    /// Socket address to bind.
    bind: SocketAddr,
    /// Maximum request body size in bytes.
    max_body_bytes: usize,
    /// Document store shared by both repositories.
    gateway: Arc<dyn DocumentGateway>,
    /// Shared handler state.
    state: ServerState,
}

impl InterfaceIndexServer {
    /// Builds a server from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] when the configuration is invalid or a backend
    /// cannot be initialized.
    pub fn from_config(config: &InterfaceIndexConfig) -> Result<Self, ServerError> {
        config.validate().map_err(|err| ServerError::Config(err.to_string()))?;
        let bind =
            config.server.bind_addr().map_err(|err| ServerError::Config(err.to_string()))?;
        let registry = build_registry(config)?;
        let gateway = build_gateway(config)?;
        let membership = build_membership(config)?;
        let audit = build_audit_sink(config)?;
        let authorizer =
            Arc::new(OwnershipAuthorizer::new(membership, config.authz.admin_groups.clone()));
        let metrics: Option<Arc<dyn MetricsRecorder>> = if config.metrics_enabled() {
            Some(Arc::new(GatewayMetricsRecorder::new(Arc::clone(&gateway))))
        } else {
            None
        };
        let repository = |kind: Kind| {
            let repository = Repository::new(
                registry.descriptor(kind),
                Arc::clone(&gateway),
                Arc::clone(&authorizer),
            );
            match &metrics {
                Some(metrics) => repository.with_metrics(Arc::clone(metrics)),
                None => repository,
            }
        };
        Ok(Self {
            bind,
            max_body_bytes: config.server.max_body_bytes,
            gateway: Arc::clone(&gateway),
            state: ServerState {
                interfaces: repository(Kind::Interface),
                layers: repository(Kind::Layer),
                resolver: PrincipalResolver::from_config(&config.auth),
                audit,
            },
        })
    }

    /// Replaces the audit sink.
    #[must_use]
    pub fn with_audit_sink(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.state.audit = audit;
        self
    }

    /// Returns the configured bind address.
    #[must_use]
    pub const fn bind_addr(&self) -> SocketAddr {
        self.bind
    }

    /// Returns the repository serving `kind`.
    #[must_use]
    pub const fn repository(&self, kind: Kind) -> &Repository {
        self.state.repository(kind)
    }

    /// Builds the HTTP router.
    #[must_use]
    pub fn router(&self) -> Router {
        let state = Arc::new(self.state.clone());
        Router::new()
            .route("/", get(service_index))
            .route("/api/v1/{name}", get(list_documents).post(write_collection))
            .route("/api/v1/{name}/", get(list_documents).post(write_collection))
            .route(
                "/api/v1/{name}/{id}",
                get(get_document).post(post_document).delete(delete_document),
            )
            .route(
                "/api/v1/{name}/{id}/",
                get(get_document).post(post_document).delete(delete_document),
            )
            .route_layer(middleware::from_fn_with_state(Arc::clone(&state), audit_requests))
            .layer(DefaultBodyLimit::max(self.max_body_bytes))
            .with_state(state)
    }

    /// Records the startup security posture to the audit sink.
    pub fn report_security_posture(&self) {
        let audit = &self.state.audit;
        match self.state.resolver.mode() {
            AuthMode::TrustedHeader => audit.record_security(&SecurityAuditEvent::new(
                "trusted_header_auth",
                Some(format!(
                    "principals are taken from the {} header; only a session proxy may reach \
                     this listener",
                    self.state.resolver.header()
                )),
            )),
            AuthMode::BearerToken => {
                audit.record_security(&SecurityAuditEvent::new("bearer_token_auth", None));
            }
        }
        if !self.bind.ip().is_loopback() {
            audit.record_security(&SecurityAuditEvent::new(
                "non_loopback_bind",
                Some(format!("listening on {}", self.bind)),
            ));
        }
    }

    /// Checks that the document store answers.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Init`] when the store is not ready.
    pub async fn readiness(&self) -> Result<(), ServerError> {
        self.gateway
            .readiness()
            .await
            .map_err(|err| ServerError::Init(format!("document store not ready: {err}")))
    }

    /// Checks store readiness, then binds the configured address and serves
    /// until the listener fails.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Init`] when the store is not ready and
    /// [`ServerError::Transport`] when binding or serving fails.
    pub async fn serve(self) -> Result<(), ServerError> {
        self.readiness().await?;
        self.report_security_posture();
        let app = self.router();
        let listener = tokio::net::TcpListener::bind(self.bind)
            .await
            .map_err(|err| ServerError::Transport(format!("http bind failed: {err}")))?;
        axum::serve(listener, app)
            .await
            .map_err(|err| ServerError::Transport(format!("http server failed: {err}")))
    }
}

/// Shared state for HTTP handlers.
#[derive(Clone)]
struct ServerState {
    /// Interface repository.
    interfaces: Repository,
    /// Layer repository.
    layers: Repository,
    /// Principal resolver.
    resolver: PrincipalResolver,
    /// Audit sink.
    audit: Arc<dyn AuditSink>,
}

impl ServerState {
    /// Returns the repository serving `kind`.
    const fn repository(&self, kind: Kind) -> &Repository {
        match kind {
            Kind::Interface => &self.interfaces,
            Kind::Layer => &self.layers,
        }
    }

    /// Returns the repository whose collection is named `name`.
    fn by_collection(&self, name: &str) -> Result<&Repository, ApiError> {
        Kind::ALL
            .into_iter()
            .find(|kind| kind.collection() == name)
            .map(|kind| self.repository(kind))
            .ok_or_else(|| ApiError::unknown_route(name))
    }

    /// Returns the repository whose singular kind label is `name`.
    fn by_kind(&self, name: &str) -> Result<&Repository, ApiError> {
        Kind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == name)
            .map(|kind| self.repository(kind))
            .ok_or_else(|| ApiError::unknown_route(name))
    }

    /// Resolves the acting principal for a write route.
    fn principal(&self, headers: &HeaderMap) -> Result<String, ApiError> {
        self.resolver.resolve(headers).map_err(ApiError::from)
    }

    /// Records an allowed write.
    fn audit_allowed(&self, kind: Kind, key: &str, principal: &str, decision: WriteDecision) {
        self.audit.record_write(&WriteAuditEvent::new(
            kind,
            key,
            principal,
            decision.allowed,
            decision.reason,
        ));
    }

    /// Records a denied write when `error` is an authorization failure.
    fn audit_denied(&self, kind: Kind, error: &DocumentError) {
        if let DocumentError::Unauthorized {
            key,
            principal,
            reason,
        } = error
        {
            self.audit.record_write(&WriteAuditEvent::new(kind, key, principal, false, reason));
        }
    }
}

// ============================================================================
// SECTION: Handlers
// ============================================================================

/// Serves the API link index.
async fn service_index() -> Json<Value> {
    Json(json!({ "links": INDEX_LINKS }))
}

/// Finds documents in a collection, sorted by primary key.
async fn list_documents(
    State(state): State<Arc<ServerState>>,
    Path(name): Path<String>,
    RawQuery(query): RawQuery,
) -> Result<Json<Vec<Document>>, ApiError> {
    let repository = state.by_collection(&name)?;
    let terms = query_terms(query.as_deref())?;
    let documents = repository.find(&terms, true).await?;
    Ok(Json(documents))
}

/// Writes a JSON array of records, each carrying its primary key.
async fn write_collection(
    State(state): State<Arc<ServerState>>,
    Path(name): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Vec<Document>>, ApiError> {
    let repository = state.by_collection(&name)?;
    let principal = state.principal(&headers)?;
    let Value::Array(items) = parse_body(&body)? else {
        return Err(ApiError::bad_request("batch body must be a JSON array"));
    };
    let items = repository.batch_items(items)?;
    match repository.write_batch(items, &principal).await {
        Ok(outcomes) => {
            let documents = outcomes
                .into_iter()
                .map(|outcome| {
                    state.audit_allowed(
                        repository.kind(),
                        outcome.document.key(),
                        &principal,
                        outcome.decision,
                    );
                    outcome.document
                })
                .collect();
            Ok(Json(documents))
        }
        Err(err) => {
            state.audit_denied(repository.kind(), &err);
            Err(err.into())
        }
    }
}

/// Loads one document; a missing key yields the unpersisted shell.
async fn get_document(
    State(state): State<Arc<ServerState>>,
    Path((name, id)): Path<(String, String)>,
) -> Result<Json<Document>, ApiError> {
    let repository = state.by_kind(&name)?;
    let document = repository.load(&id).await?;
    Ok(Json(document))
}

/// Merges the body into one document and saves it.
async fn post_document(
    State(state): State<Arc<ServerState>>,
    Path((name, id)): Path<(String, String)>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Document>, ApiError> {
    let repository = state.by_kind(&name)?;
    let principal = state.principal(&headers)?;
    let Value::Object(partial) = parse_body(&body)? else {
        return Err(ApiError::bad_request("document body must be a JSON object"));
    };
    match repository.write(&id, &partial, &principal).await {
        Ok(outcome) => {
            state.audit_allowed(repository.kind(), &id, &principal, outcome.decision);
            Ok(Json(outcome.document))
        }
        Err(err) => {
            state.audit_denied(repository.kind(), &err);
            Err(err.into())
        }
    }
}

/// Deletes one stored document.
async fn delete_document(
    State(state): State<Arc<ServerState>>,
    Path((name, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let repository = state.by_kind(&name)?;
    let principal = state.principal(&headers)?;
    match repository.delete(&id, &principal).await {
        Ok(decision) => {
            state.audit_allowed(repository.kind(), &id, &principal, decision);
            Ok(StatusCode::NO_CONTENT)
        }
        Err(err) => {
            state.audit_denied(repository.kind(), &err);
            Err(err.into())
        }
    }
}

/// Records one request audit event per routed request.
async fn audit_requests(
    State(state): State<Arc<ServerState>>,
    request: Request,
    next: Next,
) -> Response {
    let started = Instant::now();
    let method = request.method().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path().to_string(), |path| path.as_str().to_string());
    let principal = state.resolver.resolve(request.headers()).ok();
    let response = next.run(request).await;
    let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    state.audit.record_request(&RequestAuditEvent::new(
        &method,
        &route,
        response.status().as_u16(),
        principal,
        latency_ms,
    ));
    response
}

// ============================================================================
// SECTION: Request Helpers
// ============================================================================

/// Parses repeated `q` parameters into query terms.
fn query_terms(raw: Option<&str>) -> Result<Vec<QueryTerm>, ApiError> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };
    url::form_urlencoded::parse(raw.as_bytes())
        .filter(|(name, _)| name == QUERY_PARAM)
        .map(|(_, value)| {
            QueryTerm::parse(&value).map_err(|err| ApiError::from(DocumentError::from(err)))
        })
        .collect()
}

/// Parses a request body as JSON.
fn parse_body(body: &[u8]) -> Result<Value, ApiError> {
    serde_json::from_slice(body)
        .map_err(|err| ApiError::bad_request(&format!("malformed json body: {err}")))
}

// ============================================================================
// SECTION: Wiring
// ============================================================================

/// Loads schemas from the configured directory, or the bundled set.
fn build_registry(config: &InterfaceIndexConfig) -> Result<SchemaRegistry, ServerError> {
    let registry = match &config.schemas.directory {
        Some(directory) => SchemaRegistry::from_dir(directory),
        None => SchemaRegistry::bundled(),
    };
    registry.map_err(|err| ServerError::Init(err.to_string()))
}

/// Builds the configured document gateway.
fn build_gateway(config: &InterfaceIndexConfig) -> Result<Arc<dyn DocumentGateway>, ServerError> {
    match config.store.store_type {
        StoreType::Memory => Ok(Arc::new(InMemoryDocumentGateway::new())),
        StoreType::Sqlite => {
            let sqlite_config = config.store.sqlite_gateway_config().ok_or_else(|| {
                ServerError::Config("sqlite store requires store.path".to_string())
            })?;
            let gateway = SqliteDocumentGateway::new(sqlite_config)
                .map_err(|err| ServerError::Init(err.to_string()))?;
            Ok(Arc::new(gateway))
        }
    }
}

/// Builds the configured group membership backend.
fn build_membership(
    config: &InterfaceIndexConfig,
) -> Result<Arc<dyn GroupMembership>, ServerError> {
    let membership = &config.membership;
    match membership.membership_type {
        MembershipType::None => Ok(Arc::new(NoGroupMembership)),
        MembershipType::Static => {
            Ok(Arc::new(StaticGroupMembership::new(membership.groups.clone())))
        }
        MembershipType::Http => {
            let base_url = membership.base_url.clone().ok_or_else(|| {
                ServerError::Config("http membership requires membership.base_url".to_string())
            })?;
            let client = HttpGroupMembership::new(
                base_url,
                membership.auth_token.clone(),
                Duration::from_millis(membership.connect_timeout_ms),
                Duration::from_millis(membership.request_timeout_ms),
            )
            .map_err(|err| ServerError::Init(err.to_string()))?;
            Ok(Arc::new(client))
        }
    }
}

/// Builds the configured audit sink.
fn build_audit_sink(config: &InterfaceIndexConfig) -> Result<Arc<dyn AuditSink>, ServerError> {
    match config.audit.sink {
        AuditSinkKind::Stderr => Ok(Arc::new(StderrAuditSink)),
        AuditSinkKind::None => Ok(Arc::new(NoopAuditSink)),
        AuditSinkKind::File => {
            let path = config.audit.path.as_deref().ok_or_else(|| {
                ServerError::Config("file audit sink requires audit.path".to_string())
            })?;
            let sink = FileAuditSink::new(path)
                .map_err(|err| ServerError::Init(format!("audit log: {err}")))?;
            Ok(Arc::new(sink))
        }
    }
}

// ============================================================================
// SECTION: API Errors
// ============================================================================

/// HTTP error response.
#[derive(Debug)]
struct ApiError {
    /// Response status.
    status: StatusCode,
    /// Stable error label.
    error: &'static str,
    /// Human-readable message.
    message: String,
}

impl ApiError {
    /// Malformed request body or parameters.
    fn bad_request(message: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error: "bad_request",
            message: message.to_string(),
        }
    }

    /// Path segment names no collection or kind.
    fn unknown_route(name: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            error: "not_found",
            message: format!("unknown collection: {name}"),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            error: "unauthenticated",
            message: err.to_string(),
        }
    }
}

impl From<DocumentError> for ApiError {
    fn from(err: DocumentError) -> Self {
        let (status, error) = match &err {
            DocumentError::SchemaValidation(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "schema_validation")
            }
            DocumentError::MalformedQuery(_) => (StatusCode::BAD_REQUEST, "malformed_query"),
            DocumentError::Invalid(_) => (StatusCode::BAD_REQUEST, "invalid_request"),
            DocumentError::Unauthorized {
                ..
            } => (StatusCode::FORBIDDEN, "unauthorized"),
            DocumentError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            DocumentError::Store(store) => store_status(store),
            DocumentError::StoredRecordInvalid {
                ..
            } => (StatusCode::INTERNAL_SERVER_ERROR, "store_corrupt"),
            DocumentError::MembershipUnavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "membership_unavailable")
            }
        };
        Self {
            status,
            error,
            message: err.to_string(),
        }
    }
}

/// Maps a store failure to a status and label.
const fn store_status(error: &GatewayError) -> (StatusCode, &'static str) {
    match error {
        GatewayError::Unavailable(_) | GatewayError::Timeout(_) => {
            (StatusCode::SERVICE_UNAVAILABLE, "store_unavailable")
        }
        GatewayError::TooLarge(_) => (StatusCode::PAYLOAD_TOO_LARGE, "payload_too_large"),
        GatewayError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
        GatewayError::Corrupt(_) => (StatusCode::INTERNAL_SERVER_ERROR, "store_corrupt"),
        GatewayError::Invalid(_) => (StatusCode::INTERNAL_SERVER_ERROR, "store_error"),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({ "error": self.error, "message": self.message });
        (self.status, Json(body)).into_response()
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Server startup and transport errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Configuration errors.
    #[error("config error: {0}")]
    Config(String),
    /// Initialization errors.
    #[error("init error: {0}")]
    Init(String),
    /// Transport errors.
    #[error("transport error: {0}")]
    Transport(String),
}
