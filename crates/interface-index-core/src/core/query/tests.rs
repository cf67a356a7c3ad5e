// crates/interface-index-core/src/core/query/tests.rs
// ============================================================================
// Module: Query Translator Unit Tests
// Description: Unit tests for term parsing, translation, and matching.
// Purpose: Pin the predicate chosen for each declared and undeclared field.
// Dependencies: interface-index-core
// ============================================================================

//! ## Overview
//! Exercises the three predicate families and the filter evaluation rules
//! gateways rely on.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions."
)]

use std::cmp::Ordering;

use serde_json::Value;
use serde_json::json;

use super::Filter;
use super::Predicate;
use super::QueryError;
use super::QueryTerm;
use super::SortOrder;
use super::TextPattern;
use super::translate;
use crate::core::kind::Kind;
use crate::core::record::Record;
use crate::core::schema::SchemaRegistry;

fn record(value: Value) -> Record {
    value.as_object().cloned().expect("object literal")
}

fn terms(raw: &[&str]) -> Vec<QueryTerm> {
    raw.iter().map(|term| QueryTerm::parse(term).expect("term parses")).collect()
}

#[test]
fn parse_splits_on_first_colon() {
    let term = QueryTerm::parse("repo:git://host:9418/x").expect("parses");
    assert_eq!(term.field(), Some("repo"));
    assert_eq!(term.value(), "git://host:9418/x");
}

#[test]
fn parse_bare_term_has_no_field() {
    let term = QueryTerm::parse("mysql").expect("parses");
    assert_eq!(term.field(), None);
    assert_eq!(term.value(), "mysql");
}

#[test]
fn parse_rejects_empty_field() {
    assert!(matches!(QueryTerm::parse(":value"), Err(QueryError::Malformed(_))));
}

#[test]
fn numeric_field_translates_to_integer_equality() {
    let registry = SchemaRegistry::bundled().expect("schemas");
    let filter = translate(registry.schema_for(Kind::Layer), "id", &terms(&["priority:5"]))
        .expect("translates");
    assert_eq!(filter, Filter::equals("priority", json!(5)));
    assert!(filter.matches(&record(json!({"id": "a", "priority": 5}))));
    assert!(filter.matches(&record(json!({"id": "a", "priority": 5.0}))));
    assert!(!filter.matches(&record(json!({"id": "a", "priority": 6}))));
}

#[test]
fn numeric_field_rejects_non_integer_input() {
    let registry = SchemaRegistry::bundled().expect("schemas");
    let err = translate(registry.schema_for(Kind::Layer), "id", &terms(&["priority:abc"]))
        .expect_err("malformed");
    assert!(matches!(err, QueryError::Malformed(_)));
}

#[test]
fn undeclared_field_translates_to_exact_string() {
    let registry = SchemaRegistry::bundled().expect("schemas");
    let filter = translate(registry.schema_for(Kind::Layer), "id", &terms(&["foo:bar"]))
        .expect("translates");
    assert_eq!(filter, Filter::equals("foo", json!("bar")));
    assert!(!filter.matches(&record(json!({"foo": "BAR"}))));
}

#[test]
fn declared_text_field_matches_case_insensitive_substring() {
    let registry = SchemaRegistry::bundled().expect("schemas");
    let filter =
        translate(registry.schema_for(Kind::Interface), "id", &terms(&["summary:prov"]))
            .expect("translates");
    assert!(filter.matches(&record(json!({"summary": "Provides MySQL"}))));
    assert!(!filter.matches(&record(json!({"summary": "requires mysql"}))));
    assert!(!filter.matches(&record(json!({"summary": 4}))));
}

#[test]
fn invalid_pattern_is_malformed() {
    let registry = SchemaRegistry::bundled().expect("schemas");
    let err = translate(registry.schema_for(Kind::Interface), "id", &terms(&["summary:(("]))
        .expect_err("bad regex");
    assert!(matches!(err, QueryError::Malformed(_)));
}

#[test]
fn bare_term_targets_primary_key() {
    let registry = SchemaRegistry::bundled().expect("schemas");
    let filter = translate(registry.schema_for(Kind::Interface), "id", &terms(&["^my"]))
        .expect("translates");
    assert_eq!(filter.clauses()[0].field, "id");
    assert!(filter.matches(&record(json!({"id": "mysql"}))));
    assert!(!filter.matches(&record(json!({"id": "pgsql-my"}))));
}

#[test]
fn empty_terms_select_records_with_primary_key() {
    let registry = SchemaRegistry::bundled().expect("schemas");
    let filter = translate(registry.schema_for(Kind::Interface), "id", &[]).expect("translates");
    assert_eq!(filter, Filter::exists("id"));
    assert!(filter.matches(&record(json!({"id": "x"}))));
    assert!(!filter.matches(&record(json!({"summary": "x"}))));
}

#[test]
fn repeated_terms_on_one_field_are_conjoined() {
    let registry = SchemaRegistry::bundled().expect("schemas");
    let filter = translate(
        registry.schema_for(Kind::Interface),
        "id",
        &terms(&["summary:mysql", "summary:provides"]),
    )
    .expect("translates");
    assert_eq!(filter.clauses().len(), 2);
    assert!(filter.matches(&record(json!({"summary": "provides mysql"}))));
    assert!(!filter.matches(&record(json!({"summary": "mysql client"}))));
}

#[test]
fn pattern_matches_string_array_entries() {
    let pattern = TextPattern::new("alice").expect("compiles");
    let predicate = Predicate::Pattern(pattern);
    assert!(predicate.matches(Some(&json!(["bob", "Alice"]))));
    assert!(!predicate.matches(Some(&json!(["bob"]))));
    assert!(!predicate.matches(None));
}

#[test]
fn equality_fields_collect_only_equals_clauses() {
    let filter = Filter::equals("id", json!("x")).and("summary", Predicate::Exists);
    let fields = filter.equality_fields();
    assert_eq!(fields.len(), 1);
    assert_eq!(fields.get("id"), Some(&json!("x")));
}

#[test]
fn sort_ranks_missing_before_values() {
    let order = SortOrder::ascending("id");
    let missing = record(json!({}));
    let number = record(json!({"id": 3}));
    let alpha = record(json!({"id": "alpha"}));
    let beta = record(json!({"id": "beta"}));
    assert_eq!(order.compare(&missing, &number), Ordering::Less);
    assert_eq!(order.compare(&number, &alpha), Ordering::Less);
    assert_eq!(order.compare(&alpha, &beta), Ordering::Less);
    assert_eq!(order.compare(&beta, &beta), Ordering::Equal);
}
