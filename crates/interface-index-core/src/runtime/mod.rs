// crates/interface-index-core/src/runtime/mod.rs
// ============================================================================
// Module: Interface Index Runtime
// Description: Documents, repositories, authorization, and local backends.
// Purpose: Execute the document lifecycle against the interface traits.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! Runtime types drive the document lifecycle. They depend only on the traits
//! in [`crate::interfaces`], so the same flows run against the in-memory
//! gateway in tests and the durable gateways in production.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod authz;
pub mod document;
pub mod membership;
pub mod metrics;
pub mod repository;
pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use authz::OwnershipAuthorizer;
pub use authz::WriteDecision;
pub use document::Document;
pub use document::DocumentError;
pub use membership::NoGroupMembership;
pub use membership::StaticGroupMembership;
pub use metrics::GatewayMetricsRecorder;
pub use metrics::METRICS_COLLECTION;
pub use metrics::NoopMetrics;
pub use repository::Repository;
pub use repository::WriteOutcome;
pub use store::InMemoryDocumentGateway;
