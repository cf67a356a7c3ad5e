// crates/interface-index-server/src/auth.rs
// ============================================================================
// Module: Principal Resolution
// Description: Resolve the acting principal for an HTTP request.
// Purpose: Turn trusted proxy headers or bearer tokens into a principal name.
// Dependencies: axum, interface-index-config, thiserror
// ============================================================================

//! ## Overview
//! Session management is external. In `trusted_header` mode the principal is
//! read from a header set by the session proxy; in `bearer_token` mode the
//! `Authorization` header is mapped through the configured token table. Header
//! values are bounded and trimmed, and empty principals are rejected.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use interface_index_config::AuthConfig;
use interface_index_config::AuthMode;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum accepted size of a principal or authorization header value.
pub const MAX_AUTH_HEADER_BYTES: usize = 8 * 1024;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Principal resolution errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    /// Missing or invalid credentials.
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),
}

// ============================================================================
// SECTION: Resolver
// ============================================================================

/// Resolves principals from request headers.
///
/// # Invariants
/// - A resolved principal is never empty and carries no surrounding whitespace.
#[derive(Debug, Clone)]
pub struct PrincipalResolver {
    /// Resolution mode.
    mode: AuthMode,
    /// Lowercased trusted header name.
    header: String,
    /// Bearer token to principal table.
    tokens: BTreeMap<String, String>,
}

impl PrincipalResolver {
    /// Builds a resolver from auth configuration.
    #[must_use]
    pub fn from_config(config: &AuthConfig) -> Self {
        Self {
            mode: config.mode,
            header: config.header.trim().to_ascii_lowercase(),
            tokens: config.tokens.clone(),
        }
    }

    /// Returns the configured mode.
    #[must_use]
    pub const fn mode(&self) -> AuthMode {
        self.mode
    }

    /// Returns the trusted header name.
    #[must_use]
    pub fn header(&self) -> &str {
        &self.header
    }

    /// Resolves the principal carried by `headers`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Unauthenticated`] when the request carries no
    /// usable principal.
    pub fn resolve(&self, headers: &HeaderMap) -> Result<String, AuthError> {
        match self.mode {
            AuthMode::TrustedHeader => {
                let value = header_value(headers, &self.header)?;
                if value.is_empty() {
                    return Err(AuthError::Unauthenticated("empty principal".to_string()));
                }
                Ok(value.to_string())
            }
            AuthMode::BearerToken => {
                let value = header_value(headers, AUTHORIZATION.as_str())?;
                let token = parse_bearer_token(value)?;
                self.tokens
                    .get(token)
                    .cloned()
                    .ok_or_else(|| AuthError::Unauthenticated("invalid bearer token".to_string()))
            }
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads a bounded, trimmed header value.
fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Result<&'a str, AuthError> {
    let raw = headers
        .get(name)
        .ok_or_else(|| AuthError::Unauthenticated(format!("missing {name} header")))?;
    if raw.len() > MAX_AUTH_HEADER_BYTES {
        return Err(AuthError::Unauthenticated(format!("{name} header too large")));
    }
    let value = raw
        .to_str()
        .map_err(|_| AuthError::Unauthenticated(format!("{name} header is not visible ascii")))?;
    Ok(value.trim())
}

/// Extracts the token from a `Bearer` authorization value.
fn parse_bearer_token(header: &str) -> Result<&str, AuthError> {
    let mut parts = header.splitn(2, ' ');
    let scheme = parts.next().unwrap_or_default();
    let token = parts.next().unwrap_or_default().trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(AuthError::Unauthenticated("invalid authorization header".to_string()));
    }
    Ok(token)
}
