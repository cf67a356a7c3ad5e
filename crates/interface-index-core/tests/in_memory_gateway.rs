// crates/interface-index-core/tests/in_memory_gateway.rs
// ============================================================================
// Module: In-Memory Gateway Tests
// Description: Upsert, find, delete, and metrics recording semantics.
// Purpose: Pin the gateway contract shared by every store backend.
// Dependencies: interface-index-core
// ============================================================================

//! In-memory gateway and metrics recorder tests.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::sync::Arc;
use std::time::Duration;

use interface_index_core::DocumentGateway;
use interface_index_core::Filter;
use interface_index_core::GatewayMetricsRecorder;
use interface_index_core::InMemoryDocumentGateway;
use interface_index_core::Kind;
use interface_index_core::METRICS_COLLECTION;
use interface_index_core::MetricAction;
use interface_index_core::MetricEvent;
use interface_index_core::MetricsRecorder;
use interface_index_core::NoGroupMembership;
use interface_index_core::OwnershipAuthorizer;
use interface_index_core::Record;
use interface_index_core::Repository;
use interface_index_core::SchemaRegistry;
use interface_index_core::SortOrder;
use serde_json::Value;
use serde_json::json;

fn record(value: Value) -> Record {
    value.as_object().cloned().expect("object literal")
}

#[tokio::test]
async fn upsert_inserts_with_filter_fields_then_merges() {
    let gateway = InMemoryDocumentGateway::new();
    let filter = Filter::equals("id", json!("mysql"));
    gateway.upsert("interfaces", &filter, &record(json!({"summary": "a"}))).await.expect("insert");
    gateway.upsert("interfaces", &filter, &record(json!({"repo": "r"}))).await.expect("merge");
    let stored = gateway.find_one("interfaces", &filter).await.expect("find").expect("present");
    assert_eq!(stored, record(json!({"id": "mysql", "summary": "a", "repo": "r"})));
    assert_eq!(gateway.count("interfaces").expect("count"), 1);
}

#[tokio::test]
async fn collections_are_isolated() {
    let gateway = InMemoryDocumentGateway::new();
    let filter = Filter::equals("id", json!("x"));
    gateway.upsert("interfaces", &filter, &Record::new()).await.expect("insert");
    assert!(gateway.find_one("layers", &filter).await.expect("find").is_none());
}

#[tokio::test]
async fn find_sorts_when_requested() {
    let gateway = InMemoryDocumentGateway::new();
    for key in ["c", "a", "b"] {
        gateway
            .upsert("layers", &Filter::equals("id", json!(key)), &Record::new())
            .await
            .expect("insert");
    }
    let unsorted = gateway.find("layers", &Filter::all(), None).await.expect("find");
    let order = SortOrder::ascending("id");
    let sorted = gateway.find("layers", &Filter::all(), Some(&order)).await.expect("find");
    let ids = |records: &[Record]| -> Vec<String> {
        records.iter().filter_map(|r| r.get("id")?.as_str().map(ToString::to_string)).collect()
    };
    assert_eq!(ids(&unsorted), vec!["c", "a", "b"]);
    assert_eq!(ids(&sorted), vec!["a", "b", "c"]);
}

#[tokio::test]
async fn delete_reports_removed_count() {
    let gateway = InMemoryDocumentGateway::new();
    let filter = Filter::equals("id", json!("x"));
    assert_eq!(gateway.delete("layers", &filter).await.expect("delete"), 0);
    gateway.upsert("layers", &filter, &Record::new()).await.expect("insert");
    assert_eq!(gateway.delete("layers", &filter).await.expect("delete"), 1);
    assert!(gateway.readiness().await.is_ok());
}

#[tokio::test]
async fn insert_appends_without_merging() {
    let gateway = InMemoryDocumentGateway::new();
    gateway.insert("metrics", &record(json!({"id": "a", "n": 1}))).await.expect("insert");
    gateway.insert("metrics", &record(json!({"id": "a", "n": 2}))).await.expect("insert");
    assert_eq!(gateway.count("metrics").expect("count"), 2);
}

async fn wait_for_metrics(gateway: &InMemoryDocumentGateway, expected: usize) -> usize {
    let mut stored = 0;
    for _ in 0 .. 50 {
        stored = gateway.count(METRICS_COLLECTION).expect("count");
        if stored == expected {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    stored
}

#[tokio::test]
async fn metrics_recorder_writes_to_metrics_collection() {
    let gateway = InMemoryDocumentGateway::new();
    let recorder = GatewayMetricsRecorder::new(Arc::new(gateway.clone()));
    let write = MetricEvent::now(MetricAction::Write, Kind::Layer, Some("basic"), Some("alice"));
    recorder.record(write);
    recorder.record(MetricEvent::now(MetricAction::Find, Kind::Layer, None, None));
    assert_eq!(wait_for_metrics(&gateway, 2).await, 2);
    let events = gateway
        .find(METRICS_COLLECTION, &Filter::equals("action", json!("write")), None)
        .await
        .expect("find");
    assert_eq!(events[0].get("principal"), Some(&json!("alice")));
    assert_eq!(events[0].get("kind"), Some(&json!("layer")));
}

#[tokio::test]
async fn repositories_sharing_a_recorder_keep_every_event() {
    let gateway = InMemoryDocumentGateway::new();
    let store: Arc<dyn DocumentGateway> = Arc::new(gateway.clone());
    let recorder: Arc<dyn MetricsRecorder> =
        Arc::new(GatewayMetricsRecorder::new(Arc::clone(&store)));
    let registry = SchemaRegistry::bundled().expect("bundled schemas");
    let authorizer = Arc::new(OwnershipAuthorizer::new(Arc::new(NoGroupMembership), Vec::new()));
    let interfaces = Repository::new(
        registry.descriptor(Kind::Interface),
        Arc::clone(&store),
        Arc::clone(&authorizer),
    )
    .with_metrics(Arc::clone(&recorder));
    let layers = Repository::new(registry.descriptor(Kind::Layer), Arc::clone(&store), authorizer)
        .with_metrics(recorder);
    let (interface, layer) = tokio::join!(interfaces.load("shared"), layers.load("shared"));
    interface.expect("interface load");
    layer.expect("layer load");
    assert_eq!(wait_for_metrics(&gateway, 2).await, 2);
    let events = gateway.find(METRICS_COLLECTION, &Filter::all(), None).await.expect("find");
    let ids: Vec<&Value> = events.iter().filter_map(|event| event.get("id")).collect();
    assert_eq!(ids.len(), 2);
    assert_ne!(ids[0], ids[1]);
}

#[test]
fn metrics_recorder_outside_runtime_is_silent() {
    let gateway = InMemoryDocumentGateway::new();
    let recorder = GatewayMetricsRecorder::new(Arc::new(gateway.clone()));
    recorder.record(MetricEvent::now(MetricAction::Load, Kind::Interface, Some("x"), None));
    assert_eq!(gateway.count(METRICS_COLLECTION).expect("count"), 0);
}
