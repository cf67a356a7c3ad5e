// crates/interface-index-server/tests/common/mod.rs
// ============================================================================
// Module: Server Test Helpers
// Description: In-process listeners and recording audit sinks.
// Purpose: Drive the HTTP surface end to end without external services.
// Dependencies: axum, interface-index-server, tokio
// ============================================================================

//! ## Overview
//! Helpers serve routers on ephemeral loopback ports and capture audit events.

#![allow(
    dead_code,
    clippy::unwrap_used,
    reason = "Shared test helpers may be unused in some cases and may unwrap."
)]

use std::sync::Arc;
use std::sync::Mutex;

use axum::Router;
use interface_index_config::AuditSinkKind;
use interface_index_config::InterfaceIndexConfig;
use interface_index_server::AuditSink;
use interface_index_server::InterfaceIndexServer;
use interface_index_server::RequestAuditEvent;
use interface_index_server::SecurityAuditEvent;
use interface_index_server::WriteAuditEvent;
use serde_json::Value;

/// Audit sink that keeps every event as JSON.
#[derive(Default)]
pub struct RecordingAuditSink {
    /// Recorded events in arrival order.
    events: Mutex<Vec<Value>>,
}

impl RecordingAuditSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<Value> {
        self.events.lock().unwrap().clone()
    }

    pub fn events_named(&self, name: &str) -> Vec<Value> {
        self.events().into_iter().filter(|event| event["event"] == name).collect()
    }

    fn push(&self, event: Value) {
        self.events.lock().unwrap().push(event);
    }
}

impl AuditSink for RecordingAuditSink {
    fn record_request(&self, event: &RequestAuditEvent) {
        self.push(serde_json::to_value(event).unwrap());
    }

    fn record_write(&self, event: &WriteAuditEvent) {
        self.push(serde_json::to_value(event).unwrap());
    }

    fn record_security(&self, event: &SecurityAuditEvent) {
        self.push(serde_json::to_value(event).unwrap());
    }
}

/// Returns a loopback, in-memory config with metrics and stderr audit off.
pub fn memory_config() -> InterfaceIndexConfig {
    let mut config = InterfaceIndexConfig::default();
    config.server.bind = "127.0.0.1:0".to_string();
    config.audit.sink = AuditSinkKind::None;
    config.metrics.enabled = Some(false);
    config
}

/// Serves `router` on an ephemeral loopback port and returns its base URL.
pub async fn spawn_router(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    format!("http://{addr}")
}

/// Builds a server from `config` with a recording audit sink and serves it.
pub async fn spawn_server(
    config: &InterfaceIndexConfig,
) -> (String, Arc<RecordingAuditSink>, InterfaceIndexServer) {
    let audit = RecordingAuditSink::new();
    let server = InterfaceIndexServer::from_config(config)
        .unwrap()
        .with_audit_sink(Arc::clone(&audit) as Arc<dyn AuditSink>);
    let base = spawn_router(server.router()).await;
    (base, audit, server)
}
