// crates/interface-index-core/src/core/record.rs
// ============================================================================
// Module: Interface Index Records
// Description: Raw record type and reserved field names.
// Purpose: Share one JSON record shape between documents, queries, and stores.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! A record is a flat JSON object. Three fields are reserved: the primary key,
//! the `owner` list, and the server-assigned `lastmodified` timestamp.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Map;
use serde_json::Value;

// ============================================================================
// SECTION: Reserved Fields
// ============================================================================

/// Raw record mapping field names to JSON values.
pub type Record = Map<String, Value>;

/// Primary key field shared by all kinds.
pub const PRIMARY_KEY_FIELD: &str = "id";

/// Field listing the principals allowed to write a record.
pub const OWNER_FIELD: &str = "owner";

/// Server-assigned modification timestamp field.
pub const LAST_MODIFIED_FIELD: &str = "lastmodified";

/// Prefix marking an owner entry as a group reference.
pub const GROUP_PREFIX: char = '~';

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns true when an owner entry names a group rather than a user.
#[must_use]
pub fn is_group_reference(entry: &str) -> bool {
    entry.starts_with(GROUP_PREFIX)
}

/// Returns a copy of `base` with every field of `partial` written over it.
#[must_use]
pub fn merge_fields(base: &Record, partial: &Record) -> Record {
    let mut merged = base.clone();
    for (field, value) in partial {
        merged.insert(field.clone(), value.clone());
    }
    merged
}

/// Returns the string entries of a record's `owner` field.
///
/// Absent, null, or non-array owner values yield an empty list; non-string
/// entries are skipped.
#[must_use]
pub fn owner_entries(record: &Record) -> Vec<String> {
    match record.get(OWNER_FIELD) {
        Some(Value::Array(entries)) => {
            entries.iter().filter_map(Value::as_str).map(ToString::to_string).collect()
        }
        _ => Vec::new(),
    }
}
