// crates/interface-index-core/tests/write_batch.rs
// ============================================================================
// Module: Batch Write Tests
// Description: Up-front authorization and validation for batch writes.
// Purpose: Ensure a denied or invalid item prevents every write in the batch.
// Dependencies: interface-index-core
// ============================================================================

//! Batch write flow tests.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

mod common;

use interface_index_core::DocumentError;
use interface_index_core::Kind;
use serde_json::json;

use crate::common::RecordingMembership;
use crate::common::fixture;
use crate::common::record;

#[tokio::test]
async fn batch_writes_every_item_in_order() {
    let fx = fixture(Kind::Layer, RecordingMembership::answering(false), &[]);
    let items = fx
        .repository
        .batch_items(vec![json!({"id": "basic", "priority": 1}), json!({"id": "apt"})])
        .expect("items");
    let outcomes = fx.repository.write_batch(items, "alice").await.expect("batch");
    let keys: Vec<&str> = outcomes.iter().map(|outcome| outcome.document.key()).collect();
    assert_eq!(keys, vec!["basic", "apt"]);
    assert_eq!(fx.gateway.count("layers").expect("count"), 2);
}

#[tokio::test]
async fn denied_second_item_blocks_whole_batch() {
    let fx = fixture(Kind::Layer, RecordingMembership::answering(false), &[]);
    fx.repository.write("locked", &record(json!({"summary": "kept"})), "carol").await.expect("seed");
    let items = vec![
        ("fresh".to_string(), record(json!({"summary": "new"}))),
        ("locked".to_string(), record(json!({"summary": "overwrite"}))),
    ];
    let err = fx.repository.write_batch(items, "alice").await.expect_err("denied");
    assert!(matches!(err, DocumentError::Unauthorized { .. }));
    assert_eq!(fx.gateway.count("layers").expect("count"), 1);
    let locked = fx.repository.load("locked").await.expect("load");
    assert_eq!(locked.record().get("summary"), Some(&json!("kept")));
    assert!(!fx.repository.load("fresh").await.expect("load").is_persisted());
}

#[tokio::test]
async fn invalid_item_blocks_whole_batch() {
    let fx = fixture(Kind::Layer, RecordingMembership::answering(false), &[]);
    let items = vec![
        ("one".to_string(), record(json!({"summary": "fine"}))),
        ("two".to_string(), record(json!({"priority": "high"}))),
    ];
    let err = fx.repository.write_batch(items, "alice").await.expect_err("invalid");
    assert!(matches!(err, DocumentError::SchemaValidation(_)));
    assert_eq!(fx.gateway.count("layers").expect("count"), 0);
}

#[tokio::test]
async fn duplicate_keys_are_rejected() {
    let fx = fixture(Kind::Layer, RecordingMembership::answering(false), &[]);
    let items = vec![
        ("one".to_string(), record(json!({}))),
        ("one".to_string(), record(json!({"summary": "again"}))),
    ];
    let err = fx.repository.write_batch(items, "alice").await.expect_err("duplicate");
    assert!(matches!(err, DocumentError::Invalid(_)));
}

#[tokio::test]
async fn batch_items_require_string_keys() {
    let fx = fixture(Kind::Layer, RecordingMembership::answering(false), &[]);
    assert!(fx.repository.batch_items(vec![json!({"summary": "no id"})]).is_err());
    assert!(fx.repository.batch_items(vec![json!({"id": 4})]).is_err());
    assert!(fx.repository.batch_items(vec![json!("basic")]).is_err());
}
