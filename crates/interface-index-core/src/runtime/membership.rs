// crates/interface-index-core/src/runtime/membership.rs
// ============================================================================
// Module: Local Group Membership
// Description: Membership backends that need no external service.
// Purpose: Back the authorizer in standalone deployments and tests.
// Dependencies: crate::interfaces, async-trait
// ============================================================================

//! ## Overview
//! [`NoGroupMembership`] denies every group check, so only plain owners can
//! write owned documents. [`StaticGroupMembership`] answers from a fixed
//! group table loaded from configuration.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::interfaces::GroupMembership;
use crate::interfaces::MembershipError;

// ============================================================================
// SECTION: Backends
// ============================================================================

/// Membership backend with no groups.
///
/// # Invariants
/// - Always reports non-membership.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoGroupMembership;

#[async_trait]
impl GroupMembership for NoGroupMembership {
    async fn check(&self, _principal: &str, _groups: &[String]) -> Result<bool, MembershipError> {
        Ok(false)
    }
}

/// Membership backend answering from a fixed group table.
///
/// Group names are stored with their `~` prefix.
#[derive(Debug, Default, Clone)]
pub struct StaticGroupMembership {
    /// Group name to member principals.
    groups: BTreeMap<String, BTreeSet<String>>,
}

impl StaticGroupMembership {
    /// Builds the table from group name to members.
    #[must_use]
    pub fn new(groups: BTreeMap<String, Vec<String>>) -> Self {
        Self {
            groups: groups
                .into_iter()
                .map(|(group, members)| (group, members.into_iter().collect()))
                .collect(),
        }
    }
}

#[async_trait]
impl GroupMembership for StaticGroupMembership {
    async fn check(&self, principal: &str, groups: &[String]) -> Result<bool, MembershipError> {
        Ok(groups.iter().any(|group| {
            self.groups.get(group).is_some_and(|members| members.contains(principal))
        }))
    }
}
