// crates/interface-index-core/src/core/time.rs
// ============================================================================
// Module: Interface Index Time Model
// Description: Wall-clock timestamps for record modification and metrics.
// Purpose: Produce and parse the RFC 3339 strings stored in `lastmodified`.
// Dependencies: time
// ============================================================================

//! ## Overview
//! Records carry a server-assigned `lastmodified` value in RFC 3339 UTC form.
//! Metrics and audit events use unix milliseconds derived from the same clock.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;
use time::OffsetDateTime;
use time::UtcOffset;
use time::format_description::well_known::Rfc3339;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Timestamp formatting and parsing errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimestampError {
    /// Value could not be rendered as RFC 3339.
    #[error("timestamp format failed: {0}")]
    Format(String),
    /// Value is not a valid RFC 3339 timestamp.
    #[error("timestamp parse failed: {0}")]
    Parse(String),
}

// ============================================================================
// SECTION: Timestamp
// ============================================================================

/// UTC wall-clock instant.
///
/// # Invariants
/// - The wrapped value is always normalized to UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(OffsetDateTime);

impl Timestamp {
    /// Returns the current UTC time.
    #[must_use]
    pub fn now() -> Self {
        Self(OffsetDateTime::now_utc())
    }

    /// Wraps an existing instant, converting it to UTC.
    #[must_use]
    pub fn from_datetime(value: OffsetDateTime) -> Self {
        Self(value.to_offset(UtcOffset::UTC))
    }

    /// Renders the timestamp as RFC 3339.
    ///
    /// # Errors
    ///
    /// Returns [`TimestampError::Format`] when the instant is out of range.
    pub fn to_rfc3339(&self) -> Result<String, TimestampError> {
        self.0.format(&Rfc3339).map_err(|err| TimestampError::Format(err.to_string()))
    }

    /// Parses an RFC 3339 timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`TimestampError::Parse`] when the value is malformed.
    pub fn parse_rfc3339(value: &str) -> Result<Self, TimestampError> {
        OffsetDateTime::parse(value, &Rfc3339)
            .map(Self::from_datetime)
            .map_err(|err| TimestampError::Parse(err.to_string()))
    }

    /// Returns milliseconds since the unix epoch, saturating at zero.
    #[must_use]
    pub fn unix_millis(&self) -> u64 {
        u64::try_from(self.0.unix_timestamp_nanos() / 1_000_000).unwrap_or(0)
    }
}
