// crates/interface-index-config/src/lib.rs
// ============================================================================
// Module: Interface Index Config Library
// Description: Canonical config model and validation.
// Purpose: Single source of truth for interface-index.toml semantics.
// Dependencies: interface-index-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! `interface-index-config` defines the configuration model for the index
//! service. Every section has safe defaults, and [`InterfaceIndexConfig::load`]
//! fails closed on oversized, non-UTF-8, malformed or inconsistent input.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
