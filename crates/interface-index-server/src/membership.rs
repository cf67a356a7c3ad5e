// crates/interface-index-server/src/membership.rs
// ============================================================================
// Module: HTTP Group Membership
// Description: Group membership backed by an external identity service.
// Purpose: Answer owner-group checks for the ownership authorizer over HTTP.
// Dependencies: interface-index-core, reqwest, serde
// ============================================================================

//! ## Overview
//! [`HttpGroupMembership`] POSTs `{principal, groups}` to
//! `{base_url}/v1/membership/check` and reads back `{member: bool}`.
//! Security posture: membership is a trust boundary; an unreachable or
//! misbehaving service is reported as unavailable and never treated as allow.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use async_trait::async_trait;
use interface_index_core::GroupMembership;
use interface_index_core::MembershipError;
use reqwest::Client;
use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use reqwest::header::HeaderValue;
use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Path of the membership check endpoint under the base URL.
pub const MEMBERSHIP_CHECK_PATH: &str = "/v1/membership/check";

// ============================================================================
// SECTION: Wire Types
// ============================================================================

/// Membership check request body.
#[derive(Debug, Serialize)]
struct MembershipQuery<'a> {
    /// Principal being checked.
    principal: &'a str,
    /// Candidate groups, `~`-prefixed.
    groups: &'a [String],
}

/// Membership check response body.
#[derive(Debug, Deserialize)]
struct MembershipAnswer {
    /// Whether the principal belongs to any candidate group.
    member: bool,
}

// ============================================================================
// SECTION: Client
// ============================================================================

/// Identity-service-backed group membership.
pub struct HttpGroupMembership {
    /// Service base URL (no trailing slash).
    base_url: String,
    /// Optional bearer token for membership requests.
    auth_token: Option<String>,
    /// HTTP client configured with timeouts.
    client: Client,
}

impl HttpGroupMembership {
    /// Builds a membership client.
    ///
    /// # Errors
    ///
    /// Returns [`MembershipError`] when the HTTP client cannot be built.
    pub fn new(
        mut base_url: String,
        auth_token: Option<String>,
        connect_timeout: Duration,
        request_timeout: Duration,
    ) -> Result<Self, MembershipError> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(request_timeout)
            .build()
            .map_err(|err| MembershipError::Unavailable(err.to_string()))?;
        let trimmed_len = base_url.trim_end_matches('/').len();
        base_url.truncate(trimmed_len);
        Ok(Self {
            base_url,
            auth_token,
            client,
        })
    }

    /// Builds headers for membership requests.
    fn build_headers(&self) -> Result<HeaderMap, MembershipError> {
        let mut headers = HeaderMap::new();
        if let Some(token) = &self.auth_token {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| MembershipError::Invalid("invalid auth token".to_string()))?;
            headers.insert(reqwest::header::AUTHORIZATION, value);
        }
        Ok(headers)
    }
}

#[async_trait]
impl GroupMembership for HttpGroupMembership {
    async fn check(&self, principal: &str, groups: &[String]) -> Result<bool, MembershipError> {
        let url = format!("{}{MEMBERSHIP_CHECK_PATH}", self.base_url);
        let headers = self.build_headers()?;
        let response = self
            .client
            .post(url)
            .headers(headers)
            .json(&MembershipQuery {
                principal,
                groups,
            })
            .send()
            .await
            .map_err(|err| MembershipError::Unavailable(err.to_string()))?;
        match response.status() {
            StatusCode::OK => {
                let answer: MembershipAnswer = response
                    .json()
                    .await
                    .map_err(|err| MembershipError::Unavailable(err.to_string()))?;
                Ok(answer.member)
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => Ok(false),
            status => Err(MembershipError::Unavailable(format!(
                "membership service error: status {status}"
            ))),
        }
    }
}
