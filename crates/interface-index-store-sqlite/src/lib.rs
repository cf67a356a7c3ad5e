// crates/interface-index-store-sqlite/src/lib.rs
// ============================================================================
// Module: SQLite Document Gateway
// Description: Durable DocumentGateway backend using SQLite.
// Purpose: Persist interface and layer records across restarts.
// Dependencies: interface-index-core, rusqlite
// ============================================================================

//! ## Overview
//! This crate provides a SQLite-backed [`DocumentGateway`] that stores each
//! record as a JSON document row tagged with its collection. Filters are
//! evaluated with the core predicate engine, so query semantics match the
//! in-memory gateway exactly.
//!
//! [`DocumentGateway`]: interface_index_core::DocumentGateway

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::MAX_DOCUMENT_BYTES;
pub use store::SqliteDocumentGateway;
pub use store::SqliteGatewayConfig;
pub use store::SqliteGatewayError;
pub use store::SqliteJournalMode;
pub use store::SqliteSyncMode;
