// crates/interface-index-server/tests/audit_sinks.rs
// ============================================================================
// Module: Audit Sink Tests
// Description: Tests for file audit output and startup posture events.
// Purpose: Ensure audit records are appended as JSON lines.
// Dependencies: interface-index-server, tempfile
// ============================================================================

//! Audit sink and security posture tests.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions."
)]

mod common;

use std::fs;
use std::sync::Arc;

use interface_index_config::AuditSinkKind;
use interface_index_config::AuthMode;
use interface_index_core::Kind;
use interface_index_server::AuditSink;
use interface_index_server::FileAuditSink;
use interface_index_server::InterfaceIndexServer;
use interface_index_server::SecurityAuditEvent;
use interface_index_server::WriteAuditEvent;
use serde_json::Value;

fn read_lines(path: &std::path::Path) -> Vec<Value> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[test]
fn file_sink_appends_json_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("audit.jsonl");
    {
        let sink = FileAuditSink::new(&path).unwrap();
        sink.record_write(&WriteAuditEvent::new(Kind::Layer, "basic", "alice", true, "owner_match"));
    }
    let sink = FileAuditSink::new(&path).unwrap();
    sink.record_security(&SecurityAuditEvent::new("bearer_token_auth", None));

    let lines = read_lines(&path);
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["event"], "write_audit");
    assert_eq!(lines[0]["kind"], "layer");
    assert_eq!(lines[0]["reason"], "owner_match");
    assert_eq!(lines[1]["event"], "security_audit");
    assert!(lines[1]["timestamp_ms"].as_u64().unwrap() > 0);
}

#[test]
fn configured_file_sink_receives_posture_events() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("audit.jsonl");
    let mut config = common::memory_config();
    config.server.bind = "0.0.0.0:0".to_string();
    config.audit.sink = AuditSinkKind::File;
    config.audit.path = Some(path.clone());
    let server = InterfaceIndexServer::from_config(&config).unwrap();
    server.report_security_posture();

    let kinds: Vec<Value> = read_lines(&path).into_iter().map(|line| line["kind"].clone()).collect();
    assert_eq!(kinds, vec!["trusted_header_auth", "non_loopback_bind"]);
}

#[test]
fn loopback_bearer_posture_is_quiet() {
    let audit = common::RecordingAuditSink::new();
    let mut config = common::memory_config();
    config.auth.mode = AuthMode::BearerToken;
    config.auth.tokens.insert("s3cret".to_string(), "alice".to_string());
    let server = InterfaceIndexServer::from_config(&config)
        .unwrap()
        .with_audit_sink(Arc::clone(&audit) as Arc<dyn AuditSink>);
    server.report_security_posture();

    let events = audit.events_named("security_audit");
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["kind"], "bearer_token_auth");
}

#[test]
fn invalid_config_is_rejected_at_startup() {
    let mut config = common::memory_config();
    config.authz.admin_groups = vec!["admins".to_string()];
    assert!(InterfaceIndexServer::from_config(&config).is_err());
}
