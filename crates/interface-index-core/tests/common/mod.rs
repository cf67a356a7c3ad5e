// crates/interface-index-core/tests/common/mod.rs
// ============================================================================
// Module: Common Test Fixtures
// Description: Shared repositories, membership stubs, and record helpers.
// Purpose: Build in-memory document stacks for core integration tests.
// Dependencies: interface-index-core
// ============================================================================

//! ## Overview
//! Fixtures wire a [`Repository`] to an [`InMemoryDocumentGateway`] and a
//! membership stub that records every check it receives.

#![allow(dead_code, reason = "Shared test helpers may be unused in some cases.")]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use interface_index_core::GroupMembership;
use interface_index_core::InMemoryDocumentGateway;
use interface_index_core::Kind;
use interface_index_core::MembershipError;
use interface_index_core::OwnershipAuthorizer;
use interface_index_core::Record;
use interface_index_core::Repository;
use interface_index_core::SchemaRegistry;
use serde_json::Value;

// ============================================================================
// SECTION: Membership Stubs
// ============================================================================

/// Membership stub returning a fixed answer and recording each call.
#[derive(Default)]
pub struct RecordingMembership {
    /// Answer returned for every check.
    pub answer: bool,
    /// Fail every check when set.
    pub fail: bool,
    /// Calls received as (principal, groups).
    pub calls: Mutex<Vec<(String, Vec<String>)>>,
}

impl RecordingMembership {
    /// Builds a stub answering `answer`.
    pub fn answering(answer: bool) -> Arc<Self> {
        Arc::new(Self {
            answer,
            ..Self::default()
        })
    }

    /// Builds a stub that always fails.
    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            ..Self::default()
        })
    }

    /// Returns the recorded calls.
    pub fn calls(&self) -> Vec<(String, Vec<String>)> {
        self.calls.lock().expect("calls lock").clone()
    }
}

#[async_trait]
impl GroupMembership for RecordingMembership {
    async fn check(&self, principal: &str, groups: &[String]) -> Result<bool, MembershipError> {
        self.calls.lock().expect("calls lock").push((principal.to_string(), groups.to_vec()));
        if self.fail {
            return Err(MembershipError::Unavailable("membership service down".to_string()));
        }
        Ok(self.answer)
    }
}

// ============================================================================
// SECTION: Fixtures
// ============================================================================

/// Document stack sharing one in-memory gateway.
pub struct Fixture {
    /// Gateway backing the repository.
    pub gateway: InMemoryDocumentGateway,
    /// Repository under test.
    pub repository: Repository,
}

/// Builds a repository for `kind` with the given membership and admin groups.
pub fn fixture(
    kind: Kind,
    membership: Arc<dyn GroupMembership>,
    admin_groups: &[&str],
) -> Fixture {
    let registry = SchemaRegistry::bundled().expect("bundled schemas");
    let gateway = InMemoryDocumentGateway::new();
    let authorizer = Arc::new(OwnershipAuthorizer::new(
        membership,
        admin_groups.iter().map(ToString::to_string).collect(),
    ));
    let repository =
        Repository::new(registry.descriptor(kind), Arc::new(gateway.clone()), authorizer);
    Fixture {
        gateway,
        repository,
    }
}

/// Converts a JSON object literal into a record.
pub fn record(value: Value) -> Record {
    value.as_object().cloned().expect("object literal")
}
