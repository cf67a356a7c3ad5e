// crates/interface-index-server/src/audit.rs
// ============================================================================
// Module: Audit Logging
// Description: Structured audit events for HTTP request handling and writes.
// Purpose: Emit JSON-line audit records without a logging framework.
// Dependencies: interface-index-core, serde, serde_json
// ============================================================================

//! ## Overview
//! Audit events are plain serializable structs written one JSON object per
//! line. Sinks never fail the request that produced an event; write errors are
//! dropped.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use interface_index_core::Kind;
use interface_index_core::Timestamp;
use serde::Serialize;

// ============================================================================
// SECTION: Events
// ============================================================================

/// Per-request audit event.
#[derive(Debug, Clone, Serialize)]
pub struct RequestAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u64,
    /// HTTP method.
    pub method: String,
    /// Matched route template, or the raw path when unmatched.
    pub route: String,
    /// Response status code.
    pub status: u16,
    /// Resolved principal, when the request carried one.
    pub principal: Option<String>,
    /// Handler latency in milliseconds.
    pub latency_ms: u64,
}

impl RequestAuditEvent {
    /// Creates a request audit event stamped with the current time.
    #[must_use]
    pub fn new(
        method: &str,
        route: &str,
        status: u16,
        principal: Option<String>,
        latency_ms: u64,
    ) -> Self {
        Self {
            event: "request_audit",
            timestamp_ms: Timestamp::now().unix_millis(),
            method: method.to_string(),
            route: route.to_string(),
            status,
            principal,
            latency_ms,
        }
    }
}

/// Write authorization outcome.
#[derive(Debug, Clone, Serialize)]
pub struct WriteAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u64,
    /// Document kind.
    pub kind: Kind,
    /// Document key.
    pub key: String,
    /// Acting principal.
    pub principal: String,
    /// Whether the write was allowed.
    pub allowed: bool,
    /// Decision reason label.
    pub reason: String,
}

impl WriteAuditEvent {
    /// Creates a write audit event stamped with the current time.
    #[must_use]
    pub fn new(kind: Kind, key: &str, principal: &str, allowed: bool, reason: &str) -> Self {
        Self {
            event: "write_audit",
            timestamp_ms: Timestamp::now().unix_millis(),
            kind,
            key: key.to_string(),
            principal: principal.to_string(),
            allowed,
            reason: reason.to_string(),
        }
    }
}

/// Security posture audit event.
#[derive(Debug, Clone, Serialize)]
pub struct SecurityAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u64,
    /// Security event kind.
    pub kind: String,
    /// Optional message.
    pub message: Option<String>,
}

impl SecurityAuditEvent {
    /// Creates a security audit event stamped with the current time.
    #[must_use]
    pub fn new(kind: &str, message: Option<String>) -> Self {
        Self {
            event: "security_audit",
            timestamp_ms: Timestamp::now().unix_millis(),
            kind: kind.to_string(),
            message,
        }
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Audit sink for server events.
pub trait AuditSink: Send + Sync {
    /// Record a request audit event.
    fn record_request(&self, event: &RequestAuditEvent);

    /// Record a write audit event.
    fn record_write(&self, event: &WriteAuditEvent);

    /// Record a security posture audit event.
    fn record_security(&self, event: &SecurityAuditEvent);
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl StderrAuditSink {
    /// Writes one serialized event.
    fn emit(event: &impl Serialize) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

impl AuditSink for StderrAuditSink {
    fn record_request(&self, event: &RequestAuditEvent) {
        Self::emit(event);
    }

    fn record_write(&self, event: &WriteAuditEvent) {
        Self::emit(event);
    }

    fn record_security(&self, event: &SecurityAuditEvent) {
        Self::emit(event);
    }
}

/// Audit sink that logs JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }

    /// Appends one serialized event and flushes.
    fn emit(&self, event: &impl Serialize) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

impl AuditSink for FileAuditSink {
    fn record_request(&self, event: &RequestAuditEvent) {
        self.emit(event);
    }

    fn record_write(&self, event: &WriteAuditEvent) {
        self.emit(event);
    }

    fn record_security(&self, event: &SecurityAuditEvent) {
        self.emit(event);
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl AuditSink for NoopAuditSink {
    fn record_request(&self, _event: &RequestAuditEvent) {}

    fn record_write(&self, _event: &WriteAuditEvent) {}

    fn record_security(&self, _event: &SecurityAuditEvent) {}
}
