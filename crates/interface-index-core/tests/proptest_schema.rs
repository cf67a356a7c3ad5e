// crates/interface-index-core/tests/proptest_schema.rs
// ============================================================================
// Module: Schema and Query Property-Based Tests
// Description: Property tests for defaults, validation, and query translation.
// Purpose: Detect panics and invariant breaks across wide input ranges.
// ============================================================================

//! Property-based tests for schema defaults, type validation, and query
//! translation.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use interface_index_core::Filter;
use interface_index_core::Kind;
use interface_index_core::PropertyType;
use interface_index_core::QueryTerm;
use interface_index_core::Record;
use interface_index_core::Schema;
use interface_index_core::SchemaRegistry;
use interface_index_core::defaults;
use interface_index_core::translate;
use proptest::prelude::*;
use serde_json::Value;
use serde_json::json;

fn type_strategy() -> impl Strategy<Value = (&'static str, Option<Value>)> {
    prop_oneof![
        Just(("string", None)),
        "[a-z ]{0,12}".prop_map(|text| ("string", Some(Value::String(text)))),
        Just(("number", None)),
        any::<i32>().prop_map(|n| ("number", Some(json!(n)))),
        any::<i32>().prop_map(|n| ("integer", Some(json!(n)))),
        any::<bool>().prop_map(|b| ("boolean", Some(json!(b)))),
        Just(("array", Some(json!([])))),
        Just(("object", None)),
    ]
}

fn declared_type_strategy() -> impl Strategy<Value = Option<PropertyType>> {
    prop_oneof![
        Just(None),
        Just(Some(PropertyType::String)),
        Just(Some(PropertyType::Number)),
        Just(Some(PropertyType::Integer)),
        Just(Some(PropertyType::Boolean)),
        Just(Some(PropertyType::Array)),
        Just(Some(PropertyType::Object)),
    ]
}

fn value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        "[a-z]{0,6}".prop_map(Value::String),
        any::<i64>().prop_map(|n| json!(n)),
        (-1_000_000_i32 .. 1_000_000).prop_map(|n| json!(f64::from(n) + 0.5)),
        any::<bool>().prop_map(Value::Bool),
        Just(json!([1, "a"])),
        Just(json!({"k": 1})),
        Just(Value::Null),
    ]
}

proptest! {
    #[test]
    fn validate_accepts_exactly_the_declared_types(
        declared in prop::collection::btree_map("[a-d]{1,2}", declared_type_strategy(), 0 .. 6),
        values in prop::collection::btree_map("[a-d]{1,2}", value_strategy(), 0 .. 6),
    ) {
        let mut properties = serde_json::Map::new();
        for (field, declared_type) in &declared {
            let spec = match declared_type {
                Some(declared_type) => json!({"type": declared_type.as_str()}),
                None => json!({}),
            };
            properties.insert(field.clone(), spec);
        }
        let schema = Schema::from_value("generated", json!({"properties": properties}))
            .expect("schema compiles");
        let expected = values.iter().all(|(field, value)| match declared.get(field) {
            Some(declared_type) => declared_type.unwrap_or_default().matches(value),
            None => true,
        });
        let record: Record = values.into_iter().collect();
        prop_assert_eq!(schema.validate(&record).is_ok(), expected);
    }

    #[test]
    fn defaults_are_idempotent_and_valid(
        properties in prop::collection::btree_map("[a-z]{1,8}", type_strategy(), 0 .. 8)
    ) {
        let mut declared = serde_json::Map::new();
        for (field, (type_name, default)) in properties {
            let mut spec = serde_json::Map::new();
            spec.insert("type".to_string(), json!(type_name));
            if let Some(default) = default {
                spec.insert("default".to_string(), default);
            }
            declared.insert(field, Value::Object(spec));
        }
        let source = json!({"properties": declared});
        let schema = Schema::from_value("generated", source).expect("schema compiles");
        let first = defaults(&schema);
        let second = defaults(&schema);
        prop_assert_eq!(&first, &second);
        prop_assert!(schema.validate(&first).is_ok());
    }

    #[test]
    fn numeric_terms_translate_to_integer_equality(value in any::<i64>()) {
        let registry = SchemaRegistry::bundled().expect("schemas");
        let term = QueryTerm::parse(&format!("priority:{value}")).expect("term");
        let filter = translate(registry.schema_for(Kind::Layer), "id", &[term]).expect("filter");
        prop_assert_eq!(filter, Filter::equals("priority", json!(value)));
    }

    #[test]
    fn text_terms_never_panic(raw in ".{0,64}") {
        let registry = SchemaRegistry::bundled().expect("schemas");
        if let Ok(term) = QueryTerm::parse(&raw) {
            let _ = translate(registry.schema_for(Kind::Interface), "id", &[term]);
        }
    }
}
