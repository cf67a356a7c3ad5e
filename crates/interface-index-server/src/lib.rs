// crates/interface-index-server/src/lib.rs
// ============================================================================
// Module: Interface Index Server Library
// Description: HTTP surface for the interface index.
// Purpose: Serve schema-validated interface and layer documents over REST.
// Dependencies: axum, interface-index-config, interface-index-core, reqwest
// ============================================================================

//! ## Overview
//! `interface-index-server` exposes the core repositories over HTTP. It
//! resolves the acting principal from request headers, consults an optional
//! HTTP group membership service, and records request and write outcomes to
//! an audit sink.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod auth;
pub mod membership;
pub mod server;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::AuditSink;
pub use audit::FileAuditSink;
pub use audit::NoopAuditSink;
pub use audit::RequestAuditEvent;
pub use audit::SecurityAuditEvent;
pub use audit::StderrAuditSink;
pub use audit::WriteAuditEvent;
pub use auth::AuthError;
pub use auth::PrincipalResolver;
pub use membership::HttpGroupMembership;
pub use membership::MEMBERSHIP_CHECK_PATH;
pub use server::InterfaceIndexServer;
pub use server::ServerError;
