// crates/interface-index-server/tests/http_membership.rs
// ============================================================================
// Module: HTTP Membership Tests
// Description: Tests for the identity-service membership client.
// Purpose: Ensure status mapping fails closed and group owners can write.
// Dependencies: interface-index-server, axum, reqwest, tokio
// ============================================================================

//! HTTP group membership client tests against an in-process identity service.

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

use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::post;
use interface_index_config::MembershipType;
use interface_index_core::GroupMembership;
use interface_index_core::MembershipError;
use interface_index_server::HttpGroupMembership;
use interface_index_server::MEMBERSHIP_CHECK_PATH;
use reqwest::Client;
use serde_json::Value;
use serde_json::json;

// ============================================================================
// SECTION: Fake Identity Service
// ============================================================================

/// Answers membership for `bob` in `~core-devs`; `error` principals get 500
/// and `ghost` gets 404. Requests without the expected token get 401.
async fn check_membership(headers: HeaderMap, Json(body): Json<Value>) -> Response {
    let authorized = headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == "Bearer idp-token");
    if !authorized {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let principal = body["principal"].as_str().unwrap_or_default();
    let groups: Vec<&str> =
        body["groups"].as_array().unwrap().iter().filter_map(Value::as_str).collect();
    match principal {
        "error" => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        "ghost" => StatusCode::NOT_FOUND.into_response(),
        "garbled" => (StatusCode::OK, "not json").into_response(),
        _ => {
            let member = principal == "bob" && groups.contains(&"~core-devs");
            Json(json!({ "member": member })).into_response()
        }
    }
}

async fn spawn_identity_service() -> String {
    let router = Router::new().route(MEMBERSHIP_CHECK_PATH, post(check_membership));
    common::spawn_router(router).await
}

fn client(base: &str, token: Option<&str>) -> HttpGroupMembership {
    HttpGroupMembership::new(
        format!("{base}/"),
        token.map(ToString::to_string),
        Duration::from_millis(500),
        Duration::from_secs(2),
    )
    .unwrap()
}

fn groups(names: &[&str]) -> Vec<String> {
    names.iter().map(ToString::to_string).collect()
}

// ============================================================================
// SECTION: Client
// ============================================================================

#[tokio::test]
async fn member_and_non_member_answers() {
    let base = spawn_identity_service().await;
    let membership = client(&base, Some("idp-token"));
    assert!(membership.check("bob", &groups(&["~core-devs", "~admins"])).await.unwrap());
    assert!(!membership.check("carol", &groups(&["~core-devs"])).await.unwrap());
    assert!(!membership.check("bob", &groups(&["~admins"])).await.unwrap());
}

#[tokio::test]
async fn denial_statuses_mean_not_a_member() {
    let base = spawn_identity_service().await;
    assert!(!client(&base, None).check("bob", &groups(&["~core-devs"])).await.unwrap());
    let membership = client(&base, Some("idp-token"));
    assert!(!membership.check("ghost", &groups(&["~core-devs"])).await.unwrap());
}

#[tokio::test]
async fn server_errors_and_garbage_are_unavailable() {
    let base = spawn_identity_service().await;
    let membership = client(&base, Some("idp-token"));
    let result = membership.check("error", &groups(&["~core-devs"])).await;
    assert!(matches!(result, Err(MembershipError::Unavailable(_))));
    let result = membership.check("garbled", &groups(&["~core-devs"])).await;
    assert!(matches!(result, Err(MembershipError::Unavailable(_))));
}

#[tokio::test]
async fn unreachable_service_is_unavailable() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let membership = client(&format!("http://{addr}"), None);
    let result = membership.check("bob", &groups(&["~core-devs"])).await;
    assert!(matches!(result, Err(MembershipError::Unavailable(_))));
}

// ============================================================================
// SECTION: Server Integration
// ============================================================================

#[tokio::test]
async fn group_owner_member_may_write_through_server() {
    let identity = spawn_identity_service().await;
    let mut config = common::memory_config();
    config.membership.membership_type = MembershipType::Http;
    config.membership.base_url = Some(identity);
    config.membership.auth_token = Some("idp-token".to_string());
    let (base, audit, _) = common::spawn_server(&config).await;
    let http = Client::new();
    let url = format!("{base}/api/v1/interface/mysql");

    let response = http
        .post(&url)
        .header("x-remote-user", "alice")
        .json(&json!({"owner": ["~core-devs"], "summary": "provides mysql"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let response = http
        .post(&url)
        .header("x-remote-user", "bob")
        .json(&json!({"summary": "bob was here"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let response = http
        .post(&url)
        .header("x-remote-user", "carol")
        .json(&json!({"summary": "carol was here"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::FORBIDDEN);

    let response = http
        .post(&url)
        .header("x-remote-user", "error")
        .json(&json!({"summary": "outage"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::SERVICE_UNAVAILABLE);

    let reasons: Vec<Value> =
        audit.events_named("write_audit").into_iter().map(|event| event["reason"].clone()).collect();
    assert_eq!(reasons, vec![json!("open_document"), json!("group_member"), json!("not_owner")]);
}
