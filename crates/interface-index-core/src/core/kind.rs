// crates/interface-index-core/src/core/kind.rs
// ============================================================================
// Module: Document Kinds
// Description: Enumerated document kinds and their storage descriptors.
// Purpose: Bind each kind to a schema, primary key field, and collection.
// Dependencies: crate::core::schema, serde
// ============================================================================

//! ## Overview
//! The index manages exactly two kinds of records. A [`KindDescriptor`] is the
//! only thing that differs between them, so every document operation is
//! written once and parameterized by a descriptor.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::record::PRIMARY_KEY_FIELD;
use crate::core::schema::Schema;

// ============================================================================
// SECTION: Kind
// ============================================================================

/// Document kind managed by the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    /// Interface (relation stub) descriptions.
    Interface,
    /// Layer descriptions.
    Layer,
}

impl Kind {
    /// Every managed kind, in registry order.
    pub const ALL: [Self; 2] = [Self::Interface, Self::Layer];

    /// Returns the singular label for the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Interface => "interface",
            Self::Layer => "layer",
        }
    }

    /// Returns the store collection holding records of this kind.
    #[must_use]
    pub const fn collection(self) -> &'static str {
        match self {
            Self::Interface => "interfaces",
            Self::Layer => "layers",
        }
    }

    /// Returns the primary key field for the kind.
    #[must_use]
    pub const fn primary_key(self) -> &'static str {
        PRIMARY_KEY_FIELD
    }

    /// Returns the schema file name looked up in a schema directory.
    #[must_use]
    pub const fn schema_file_name(self) -> &'static str {
        match self {
            Self::Interface => "interface.schema.json",
            Self::Layer => "layer.schema.json",
        }
    }

    /// Returns the schema source compiled into the crate.
    #[must_use]
    pub const fn bundled_schema(self) -> &'static str {
        match self {
            Self::Interface => include_str!("../../schemas/interface.schema.json"),
            Self::Layer => include_str!("../../schemas/layer.schema.json"),
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a kind label is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown document kind: {0}")]
pub struct ParseKindError(pub String);

impl FromStr for Kind {
    type Err = ParseKindError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "interface" | "interfaces" => Ok(Self::Interface),
            "layer" | "layers" => Ok(Self::Layer),
            other => Err(ParseKindError(other.to_string())),
        }
    }
}

// ============================================================================
// SECTION: Kind Descriptor
// ============================================================================

/// Storage descriptor for one kind: schema, primary key, and collection.
///
/// # Invariants
/// - Descriptors are immutable once built by the schema registry.
#[derive(Debug)]
pub struct KindDescriptor {
    /// Kind tag.
    kind: Kind,
    /// Loaded schema for the kind.
    schema: Schema,
    /// Primary key field name.
    primary_key: String,
    /// Collection name in the document store.
    collection: String,
}

impl KindDescriptor {
    /// Builds a descriptor using the kind's default key and collection.
    #[must_use]
    pub fn new(kind: Kind, schema: Schema) -> Self {
        Self {
            kind,
            schema,
            primary_key: kind.primary_key().to_string(),
            collection: kind.collection().to_string(),
        }
    }

    /// Returns the kind tag.
    #[must_use]
    pub const fn kind(&self) -> Kind {
        self.kind
    }

    /// Returns the kind's schema.
    #[must_use]
    pub const fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Returns the primary key field name.
    #[must_use]
    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    /// Returns the collection name.
    #[must_use]
    pub fn collection(&self) -> &str {
        &self.collection
    }
}
