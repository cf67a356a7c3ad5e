// crates/interface-index-core/src/runtime/authz.rs
// ============================================================================
// Module: Ownership Authorizer
// Description: Owner and group based write authorization for documents.
// Purpose: Decide whether a principal may mutate a document before any write.
// Dependencies: crate::interfaces, crate::runtime::document
// ============================================================================

//! ## Overview
//! Write access is derived entirely from a document's `owner` list:
//! - an empty list leaves the document open to any authenticated principal
//! - a plain entry matching the principal grants access directly
//! - otherwise group entries (prefixed `~`) and configured admin groups are
//!   checked against the membership service, whose answer is final
//!
//! ## Invariants
//! - Membership failures surface as errors and are never treated as allow.
//! - Decisions carry a stable reason label for audit logs.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use serde::Serialize;

use crate::core::record::is_group_reference;
use crate::interfaces::GroupMembership;
use crate::interfaces::MembershipError;
use crate::runtime::document::Document;

// ============================================================================
// SECTION: Decision
// ============================================================================

/// Write authorization outcome.
///
/// # Invariants
/// - `allowed` is the authoritative decision for the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WriteDecision {
    /// Whether the write may proceed.
    pub allowed: bool,
    /// Reason label for audit logs.
    pub reason: &'static str,
}

impl WriteDecision {
    /// Document has no owners.
    pub const OPEN_DOCUMENT: Self = Self {
        allowed: true,
        reason: "open_document",
    };
    /// Principal is listed as an owner.
    pub const OWNER_MATCH: Self = Self {
        allowed: true,
        reason: "owner_match",
    };
    /// Principal belongs to an owning or admin group.
    pub const GROUP_MEMBER: Self = Self {
        allowed: true,
        reason: "group_member",
    };
    /// Principal is neither an owner nor a group member.
    pub const NOT_OWNER: Self = Self {
        allowed: false,
        reason: "not_owner",
    };
}

// ============================================================================
// SECTION: Authorizer
// ============================================================================

/// Ownership-based write authorizer.
pub struct OwnershipAuthorizer {
    /// Group membership collaborator.
    membership: Arc<dyn GroupMembership>,
    /// Groups whose members may write any document.
    admin_groups: Vec<String>,
}

impl OwnershipAuthorizer {
    /// Builds an authorizer over a membership service and admin groups.
    #[must_use]
    pub fn new(membership: Arc<dyn GroupMembership>, admin_groups: Vec<String>) -> Self {
        Self {
            membership,
            admin_groups,
        }
    }

    /// Returns the configured admin groups.
    #[must_use]
    pub fn admin_groups(&self) -> &[String] {
        &self.admin_groups
    }

    /// Decides whether `principal` may write `document`.
    ///
    /// # Errors
    ///
    /// Returns [`MembershipError`] when the membership service fails.
    pub async fn can_write(
        &self,
        document: &Document,
        principal: &str,
    ) -> Result<WriteDecision, MembershipError> {
        let owners = document.owners();
        if owners.is_empty() {
            return Ok(WriteDecision::OPEN_DOCUMENT);
        }
        if owners.iter().any(|owner| !is_group_reference(owner) && owner == principal) {
            return Ok(WriteDecision::OWNER_MATCH);
        }
        let mut groups: Vec<String> =
            owners.into_iter().filter(|owner| is_group_reference(owner)).collect();
        groups.extend(self.admin_groups.iter().cloned());
        if groups.is_empty() {
            return Ok(WriteDecision::NOT_OWNER);
        }
        if self.membership.check(principal, &groups).await? {
            Ok(WriteDecision::GROUP_MEMBER)
        } else {
            Ok(WriteDecision::NOT_OWNER)
        }
    }
}
