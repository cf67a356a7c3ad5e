// crates/interface-index-core/src/runtime/document.rs
// ============================================================================
// Module: Document Abstraction
// Description: Schema-validated document wrapper and the document error type.
// Purpose: Guarantee held records satisfy their kind schema after every commit.
// Dependencies: crate::core, crate::interfaces, serde
// ============================================================================

//! ## Overview
//! A [`Document`] pairs a record with the descriptor of its kind. Mutations
//! are staged on a copy, validated once, and committed only on success, so a
//! rejected update leaves the document exactly as it was.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use serde::Serialize;
use serde::Serializer;
use serde_json::Value;
use thiserror::Error;

use crate::core::kind::Kind;
use crate::core::kind::KindDescriptor;
use crate::core::query::QueryError;
use crate::core::record::LAST_MODIFIED_FIELD;
use crate::core::record::Record;
use crate::core::record::merge_fields;
use crate::core::record::owner_entries;
use crate::core::schema::ValidationError;
use crate::interfaces::GatewayError;
use crate::interfaces::MembershipError;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Document operation errors.
///
/// # Invariants
/// - A failed mutation never changes the document or the store.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// Record rejected by its kind schema.
    #[error(transparent)]
    SchemaValidation(#[from] ValidationError),
    /// Query terms could not be translated.
    #[error(transparent)]
    MalformedQuery(#[from] QueryError),
    /// Principal may not write the document.
    #[error("{principal} may not write {key}: {reason}")]
    Unauthorized {
        /// Document key.
        key: String,
        /// Acting principal.
        principal: String,
        /// Decision reason.
        reason: String,
    },
    /// Document is not stored.
    #[error("document not found: {0}")]
    NotFound(String),
    /// Document store failed or rejected the operation.
    #[error(transparent)]
    Store(#[from] GatewayError),
    /// Stored record no longer satisfies its kind schema.
    #[error("stored {key} is invalid: {source}")]
    StoredRecordInvalid {
        /// Document key, or the primary key field when the record has none.
        key: String,
        /// Schema violations.
        source: ValidationError,
    },
    /// Group membership could not be determined.
    #[error(transparent)]
    MembershipUnavailable(#[from] MembershipError),
    /// Request is structurally invalid.
    #[error("invalid document request: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Document
// ============================================================================

/// Record of one kind, validated against that kind's schema.
///
/// # Invariants
/// - `record` satisfies the kind schema whenever a method returns.
/// - The primary key never changes after construction.
#[derive(Debug, Clone)]
pub struct Document {
    /// Kind descriptor (schema, key, collection).
    descriptor: Arc<KindDescriptor>,
    /// Current committed record.
    record: Record,
    /// Whether the record was read from or written to the store.
    persisted: bool,
}

impl Document {
    /// Wraps a record read from the store.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::StoredRecordInvalid`] when the record is
    /// invalid.
    pub fn from_stored(
        descriptor: Arc<KindDescriptor>,
        record: Record,
    ) -> Result<Self, DocumentError> {
        if let Err(source) = descriptor.schema().validate(&record) {
            let key = record
                .get(descriptor.primary_key())
                .and_then(Value::as_str)
                .unwrap_or(descriptor.primary_key())
                .to_string();
            return Err(DocumentError::StoredRecordInvalid {
                key,
                source,
            });
        }
        Ok(Self {
            descriptor,
            record,
            persisted: true,
        })
    }

    /// Builds an unpersisted document holding `key` plus schema defaults.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::SchemaValidation`] when the defaults plus key
    /// do not satisfy the schema.
    pub fn shell(descriptor: Arc<KindDescriptor>, key: &str) -> Result<Self, DocumentError> {
        let mut record = descriptor.schema().defaults();
        record.insert(descriptor.primary_key().to_string(), Value::String(key.to_string()));
        descriptor.schema().validate(&record)?;
        Ok(Self {
            descriptor,
            record,
            persisted: false,
        })
    }

    /// Returns the document kind.
    #[must_use]
    pub fn kind(&self) -> Kind {
        self.descriptor.kind()
    }

    /// Returns the kind descriptor.
    #[must_use]
    pub fn descriptor(&self) -> &Arc<KindDescriptor> {
        &self.descriptor
    }

    /// Returns the primary key, or `""` when the stored key is not a string.
    #[must_use]
    pub fn key(&self) -> &str {
        self.record.get(self.descriptor.primary_key()).and_then(Value::as_str).unwrap_or_default()
    }

    /// Returns the committed record.
    #[must_use]
    pub const fn record(&self) -> &Record {
        &self.record
    }

    /// Consumes the document and returns its record.
    #[must_use]
    pub fn into_record(self) -> Record {
        self.record
    }

    /// Returns the owner entries.
    #[must_use]
    pub fn owners(&self) -> Vec<String> {
        owner_entries(&self.record)
    }

    /// Returns true when the document has no owners.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.owners().is_empty()
    }

    /// Returns true when the document exists in the store.
    #[must_use]
    pub const fn is_persisted(&self) -> bool {
        self.persisted
    }

    /// Merges `partial` into the document after validating the result.
    ///
    /// `lastmodified` in `partial` is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Invalid`] when `partial` changes the primary
    /// key, or [`DocumentError::SchemaValidation`] when the merged record is
    /// invalid. The document is unchanged on error.
    pub fn update(&mut self, partial: &Record) -> Result<(), DocumentError> {
        let staged = self.stage_update(partial)?;
        self.record = staged;
        Ok(())
    }

    /// Returns the validated result of merging `partial` without committing.
    ///
    /// # Errors
    ///
    /// Same as [`Document::update`].
    pub fn stage_update(&self, partial: &Record) -> Result<Record, DocumentError> {
        let primary_key = self.descriptor.primary_key();
        if let Some(value) = partial.get(primary_key)
            && value.as_str() != Some(self.key())
        {
            return Err(DocumentError::Invalid(format!(
                "{primary_key} cannot be changed from {}",
                self.key()
            )));
        }
        let mut accepted = partial.clone();
        accepted.remove(LAST_MODIFIED_FIELD);
        let staged = merge_fields(&self.record, &accepted);
        self.descriptor.schema().validate(&staged)?;
        Ok(staged)
    }

    /// Replaces the record with a staged, already validated one.
    pub(crate) fn commit(&mut self, record: Record, persisted: bool) {
        self.record = record;
        self.persisted = persisted;
    }
}

impl Serialize for Document {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.record.serialize(serializer)
    }
}
