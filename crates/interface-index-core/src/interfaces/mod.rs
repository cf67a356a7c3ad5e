// crates/interface-index-core/src/interfaces/mod.rs
// ============================================================================
// Module: Interface Index Interfaces
// Description: Backend-agnostic contracts for storage, membership, and metrics.
// Purpose: Keep the document abstraction independent of concrete backends.
// Dependencies: crate::core, async-trait
// ============================================================================

//! ## Overview
//! The document abstraction talks to three collaborators it does not own: a
//! document store, a group-membership service, and a metrics sink. Each is a
//! trait here so storage backends and identity integrations can be swapped
//! without touching validation or authorization logic.
//!
//! Gateway and membership failures propagate to callers unchanged; nothing
//! here retries or falls back to an allow decision.

// ============================================================================
// SECTION: Imports
// ============================================================================

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::core::kind::Kind;
use crate::core::query::Filter;
use crate::core::query::SortOrder;
use crate::core::record::Record;

// ============================================================================
// SECTION: Document Gateway
// ============================================================================

/// Document store errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// Store is unreachable or failed the operation.
    #[error("document store unavailable: {0}")]
    Unavailable(String),
    /// Store did not answer in time.
    #[error("document store timeout: {0}")]
    Timeout(String),
    /// Store rejected the operation as invalid.
    #[error("document store invalid data: {0}")]
    Invalid(String),
    /// Submitted record exceeds the store size limit.
    #[error("document store payload too large: {0}")]
    TooLarge(String),
    /// Write collides with a stored primary key.
    #[error("document store conflict: {0}")]
    Conflict(String),
    /// Stored data could not be decoded.
    #[error("document store corruption: {0}")]
    Corrupt(String),
}

/// Async document store addressed by collection name.
#[async_trait]
pub trait DocumentGateway: Send + Sync {
    /// Returns the first record matching the filter.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] when the store fails.
    async fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Option<Record>, GatewayError>;

    /// Returns every record matching the filter, optionally sorted.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] when the store fails.
    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        sort: Option<&SortOrder>,
    ) -> Result<Vec<Record>, GatewayError>;

    /// Merges `record` into the first match, or inserts `record` plus the
    /// filter's equality fields when nothing matches.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] when the store fails.
    async fn upsert(
        &self,
        collection: &str,
        filter: &Filter,
        record: &Record,
    ) -> Result<(), GatewayError>;

    /// Appends `record` without looking for an existing match.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] when the store fails. Stores that enforce
    /// unique primary keys also fail when the key is already taken.
    async fn insert(&self, collection: &str, record: &Record) -> Result<(), GatewayError>;

    /// Deletes every matching record and returns how many were removed.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] when the store fails.
    async fn delete(&self, collection: &str, filter: &Filter) -> Result<u64, GatewayError>;

    /// Reports store readiness.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] when the store is unavailable.
    async fn readiness(&self) -> Result<(), GatewayError> {
        Ok(())
    }
}

// ============================================================================
// SECTION: Group Membership
// ============================================================================

/// Group membership lookup failures.
///
/// # Invariants
/// - Variants are stable for error classification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MembershipError {
    /// Membership service is unreachable or returned an unexpected answer.
    #[error("group membership unavailable: {0}")]
    Unavailable(String),
    /// Request could not be formed.
    #[error("invalid group membership request: {0}")]
    Invalid(String),
}

/// External group membership check.
#[async_trait]
pub trait GroupMembership: Send + Sync {
    /// Returns true when `principal` belongs to at least one of `groups`.
    ///
    /// # Errors
    ///
    /// Returns [`MembershipError`] when membership cannot be determined.
    async fn check(&self, principal: &str, groups: &[String]) -> Result<bool, MembershipError>;
}

// ============================================================================
// SECTION: Metrics
// ============================================================================

/// Action recorded by a metric event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricAction {
    /// Single-document load.
    Load,
    /// Collection search.
    Find,
    /// Document write.
    Write,
    /// Document delete.
    Delete,
    /// Write rejected by the authorizer.
    Denied,
}

impl MetricAction {
    /// Returns the stable label for the action.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::Find => "find",
            Self::Write => "write",
            Self::Delete => "delete",
            Self::Denied => "denied",
        }
    }
}

/// Usage event stored in the metrics collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricEvent {
    /// Event name.
    pub event: &'static str,
    /// Recorded action.
    pub action: MetricAction,
    /// Document kind.
    pub kind: Kind,
    /// Document key, when the action targets one document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Acting principal, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub principal: Option<String>,
    /// Event timestamp in unix milliseconds.
    pub timestamp_ms: u64,
}

impl MetricEvent {
    /// Builds an event stamped with the current time.
    #[must_use]
    pub fn now(
        action: MetricAction,
        kind: Kind,
        key: Option<&str>,
        principal: Option<&str>,
    ) -> Self {
        Self {
            event: "document_metric",
            action,
            kind,
            key: key.map(ToString::to_string),
            principal: principal.map(ToString::to_string),
            timestamp_ms: crate::core::time::Timestamp::now().unix_millis(),
        }
    }
}

/// Fire-and-forget metrics sink.
pub trait MetricsRecorder: Send + Sync {
    /// Records a metric event. Failures are never reported to the caller.
    fn record(&self, event: MetricEvent);
}
