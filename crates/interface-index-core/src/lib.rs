// crates/interface-index-core/src/lib.rs
// ============================================================================
// Module: Interface Index Core Library
// Description: Public API surface for the Interface Index core.
// Purpose: Expose schema, document, query, and authorization building blocks.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Interface Index core owns the schema-validated document abstraction used to
//! catalog interface and layer descriptions. It loads one schema per document
//! kind, populates defaults, validates every mutation at a single commit
//! boundary, translates flat query terms into store predicates, and gates
//! writes behind an ownership check. Storage, group membership, and metrics are
//! reached only through the traits in [`interfaces`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use crate::core::*;

pub use interfaces::DocumentGateway;
pub use interfaces::GatewayError;
pub use interfaces::GroupMembership;
pub use interfaces::MembershipError;
pub use interfaces::MetricAction;
pub use interfaces::MetricEvent;
pub use interfaces::MetricsRecorder;
pub use runtime::Document;
pub use runtime::DocumentError;
pub use runtime::GatewayMetricsRecorder;
pub use runtime::METRICS_COLLECTION;
pub use runtime::InMemoryDocumentGateway;
pub use runtime::NoGroupMembership;
pub use runtime::NoopMetrics;
pub use runtime::OwnershipAuthorizer;
pub use runtime::Repository;
pub use runtime::StaticGroupMembership;
pub use runtime::WriteDecision;
pub use runtime::WriteOutcome;
