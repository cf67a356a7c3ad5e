// crates/interface-index-core/src/core/mod.rs
// ============================================================================
// Module: Interface Index Core Types
// Description: Kinds, records, schemas, query predicates, and timestamps.
// Purpose: Group the pure data model shared by runtime and storage crates.
// Dependencies: serde, serde_json, jsonschema, regex, time
// ============================================================================

//! ## Overview
//! Core types are pure: nothing in this module performs I/O beyond reading
//! schema files at startup. Runtime behavior (gateways, authorization) lives
//! in [`crate::runtime`].

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod kind;
pub mod query;
pub mod record;
pub mod schema;
pub mod time;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use kind::Kind;
pub use kind::KindDescriptor;
pub use kind::ParseKindError;
pub use query::FieldPredicate;
pub use query::Filter;
pub use query::Predicate;
pub use query::QueryError;
pub use query::QueryTerm;
pub use query::SortOrder;
pub use query::TextPattern;
pub use query::translate;
pub use record::GROUP_PREFIX;
pub use record::LAST_MODIFIED_FIELD;
pub use record::OWNER_FIELD;
pub use record::PRIMARY_KEY_FIELD;
pub use record::Record;
pub use record::is_group_reference;
pub use schema::PropertySpec;
pub use schema::PropertyType;
pub use schema::Schema;
pub use schema::SchemaError;
pub use schema::SchemaRegistry;
pub use schema::ValidationError;
pub use schema::defaults;
pub use time::Timestamp;
pub use time::TimestampError;
