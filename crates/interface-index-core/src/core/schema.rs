// crates/interface-index-core/src/core/schema.rs
// ============================================================================
// Module: Schema Registry
// Description: Per-kind schema loading, default population, and validation.
// Purpose: Give every document kind one compiled, immutable schema.
// Dependencies: jsonschema, serde, serde_json
// ============================================================================

//! ## Overview
//! Each kind is described by a JSON Schema document whose top-level
//! `properties` map declares field types and optional defaults. The registry
//! loads both kinds once at startup, either from the schemas bundled with this
//! crate or from `<dir>/<kind>.schema.json`, and any malformed source aborts
//! construction. Record validation runs through a `jsonschema` validator
//! compiled at load time.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use jsonschema::Draft;
use jsonschema::Validator;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::core::kind::Kind;
use crate::core::kind::KindDescriptor;
use crate::core::record::Record;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum schema source size in bytes.
pub const MAX_SCHEMA_BYTES: usize = 1024 * 1024;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Schema load errors. All variants are fatal at startup.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Schema file could not be read.
    #[error("schema io error: {0}")]
    Io(String),
    /// Schema source is not valid JSON.
    #[error("schema parse error: {0}")]
    Parse(String),
    /// Schema structure is not usable.
    #[error("invalid schema: {0}")]
    Invalid(String),
    /// Schema source exceeds the size limit.
    #[error("schema {name} exceeds {limit} bytes")]
    TooLarge {
        /// Schema name or path.
        name: String,
        /// Size limit in bytes.
        limit: usize,
    },
}

/// Record rejected by a kind schema.
///
/// # Invariants
/// - `violations` is non-empty and lists every failed constraint.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("record rejected by {kind} schema: {}", violations.join("; "))]
pub struct ValidationError {
    /// Schema name that rejected the record.
    pub kind: String,
    /// Violation messages, one per failed constraint.
    pub violations: Vec<String>,
}

// ============================================================================
// SECTION: Property Types
// ============================================================================

/// Declared JSON type of a schema property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    /// UTF-8 string.
    #[default]
    String,
    /// Any JSON number.
    Number,
    /// Whole JSON number.
    Integer,
    /// JSON boolean.
    Boolean,
    /// JSON array.
    Array,
    /// JSON object.
    Object,
}

impl PropertyType {
    /// Returns true for types queried by numeric equality.
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(self, Self::Number | Self::Integer)
    }

    /// Returns true when `value` has this JSON type.
    #[must_use]
    pub fn matches(self, value: &Value) -> bool {
        match (self, value) {
            (Self::String, Value::String(_))
            | (Self::Number, Value::Number(_))
            | (Self::Boolean, Value::Bool(_))
            | (Self::Array, Value::Array(_))
            | (Self::Object, Value::Object(_)) => true,
            (Self::Integer, Value::Number(number)) => {
                number.is_i64()
                    || number.is_u64()
                    || number.as_f64().is_some_and(|value| value.fract() == 0.0)
            }
            _ => false,
        }
    }

    /// Returns the JSON Schema type name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
        }
    }
}

/// Declared property: type plus optional default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertySpec {
    /// Declared type; `string` when omitted.
    #[serde(rename = "type", default)]
    pub property_type: PropertyType,
    /// Default value populated into fresh records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

// ============================================================================
// SECTION: Schema
// ============================================================================

/// Compiled schema for one document kind.
///
/// # Invariants
/// - Every property default matches its declared type.
/// - `validator` was compiled from `source` and never changes.
pub struct Schema {
    /// Schema name used in error messages.
    name: String,
    /// Declared properties keyed by field name.
    properties: BTreeMap<String, PropertySpec>,
    /// Raw schema document.
    source: Value,
    /// Compiled validator.
    validator: Validator,
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("name", &self.name)
            .field("properties", &self.properties)
            .finish_non_exhaustive()
    }
}

impl Schema {
    /// Parses and compiles a schema from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] when the source is oversized, unparsable, or
    /// structurally invalid.
    pub fn from_json(name: &str, source: &str) -> Result<Self, SchemaError> {
        if source.len() > MAX_SCHEMA_BYTES {
            return Err(SchemaError::TooLarge {
                name: name.to_string(),
                limit: MAX_SCHEMA_BYTES,
            });
        }
        let value: Value = serde_json::from_str(source)
            .map_err(|err| SchemaError::Parse(format!("{name}: {err}")))?;
        Self::from_value(name, value)
    }

    /// Compiles a schema from a parsed JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Invalid`] when `properties` is missing, a
    /// property type is unknown, a default mismatches its type, or the JSON
    /// Schema compiler rejects the document.
    pub fn from_value(name: &str, source: Value) -> Result<Self, SchemaError> {
        let declared = source
            .get("properties")
            .and_then(Value::as_object)
            .ok_or_else(|| SchemaError::Invalid(format!("{name}: missing properties object")))?;
        let mut properties = BTreeMap::new();
        for (field, descriptor) in declared {
            if !descriptor.is_object() {
                return Err(SchemaError::Invalid(format!(
                    "{name}: property {field} must be an object"
                )));
            }
            let spec: PropertySpec = serde_json::from_value(descriptor.clone())
                .map_err(|err| SchemaError::Invalid(format!("{name}: property {field}: {err}")))?;
            if let Some(default) = &spec.default
                && !spec.property_type.matches(default)
            {
                return Err(SchemaError::Invalid(format!(
                    "{name}: default for {field} is not of type {}",
                    spec.property_type.as_str()
                )));
            }
            properties.insert(field.clone(), spec);
        }
        let validator = jsonschema::options()
            .with_draft(Draft::Draft202012)
            .build(&with_declared_types(&source))
            .map_err(|err| SchemaError::Invalid(format!("{name}: {err}")))?;
        Ok(Self {
            name: name.to_string(),
            properties,
            source,
            validator,
        })
    }

    /// Returns the schema name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the declared property for a field.
    #[must_use]
    pub fn property(&self, field: &str) -> Option<&PropertySpec> {
        self.properties.get(field)
    }

    /// Returns every declared property.
    #[must_use]
    pub const fn properties(&self) -> &BTreeMap<String, PropertySpec> {
        &self.properties
    }

    /// Returns the raw schema document.
    #[must_use]
    pub const fn source(&self) -> &Value {
        &self.source
    }

    /// Returns a fresh record populated with defaults.
    #[must_use]
    pub fn defaults(&self) -> Record {
        defaults(self)
    }

    /// Validates a record, reporting every violation.
    ///
    /// Untyped properties are checked as strings, matching the type they are
    /// declared with.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when the record fails any constraint.
    pub fn validate(&self, record: &Record) -> Result<(), ValidationError> {
        let instance = Value::Object(record.clone());
        let violations: Vec<String> = self
            .validator
            .iter_errors(&instance)
            .map(|err| err.to_string())
            .collect();
        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError {
                kind: self.name.clone(),
                violations,
            })
        }
    }
}

/// Returns `source` with the implied `string` type written into every
/// untyped property, so the compiled validator enforces the declared types.
fn with_declared_types(source: &Value) -> Value {
    let mut compiled = source.clone();
    if let Some(declared) = compiled.get_mut("properties").and_then(Value::as_object_mut) {
        for descriptor in declared.values_mut() {
            if let Value::Object(descriptor) = descriptor {
                descriptor
                    .entry("type")
                    .or_insert_with(|| Value::String(PropertyType::String.as_str().to_string()));
            }
        }
    }
    compiled
}

/// Builds the default record for a schema.
///
/// Declared defaults are copied; string properties without one become `""`;
/// every other property is left absent.
#[must_use]
pub fn defaults(schema: &Schema) -> Record {
    let mut record = Record::new();
    for (field, spec) in &schema.properties {
        match (&spec.default, spec.property_type) {
            (Some(value), _) => {
                record.insert(field.clone(), value.clone());
            }
            (None, PropertyType::String) => {
                record.insert(field.clone(), Value::String(String::new()));
            }
            (None, _) => {}
        }
    }
    record
}

// ============================================================================
// SECTION: Registry
// ============================================================================

/// Immutable registry holding one descriptor per kind.
///
/// # Invariants
/// - Both kinds are always present; construction fails otherwise.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    /// Interface descriptor.
    interface: Arc<KindDescriptor>,
    /// Layer descriptor.
    layer: Arc<KindDescriptor>,
}

impl SchemaRegistry {
    /// Loads the schemas bundled with this crate.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] when a bundled schema fails to compile.
    pub fn bundled() -> Result<Self, SchemaError> {
        Self::from_sources(Kind::Interface.bundled_schema(), Kind::Layer.bundled_schema())
    }

    /// Loads `<dir>/<kind>.schema.json` for every kind.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] when a file is missing, oversized, or invalid.
    pub fn from_dir(dir: &Path) -> Result<Self, SchemaError> {
        let interface = load_schema_file(dir, Kind::Interface)?;
        let layer = load_schema_file(dir, Kind::Layer)?;
        Ok(Self::from_schemas(interface, layer))
    }

    /// Compiles both kinds from in-memory JSON sources.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] when either source is invalid.
    pub fn from_sources(interface: &str, layer: &str) -> Result<Self, SchemaError> {
        let interface = Schema::from_json(Kind::Interface.as_str(), interface)?;
        let layer = Schema::from_json(Kind::Layer.as_str(), layer)?;
        Ok(Self::from_schemas(interface, layer))
    }

    /// Builds the registry from compiled schemas.
    #[must_use]
    pub fn from_schemas(interface: Schema, layer: Schema) -> Self {
        Self {
            interface: Arc::new(KindDescriptor::new(Kind::Interface, interface)),
            layer: Arc::new(KindDescriptor::new(Kind::Layer, layer)),
        }
    }

    /// Returns the schema for a kind.
    #[must_use]
    pub fn schema_for(&self, kind: Kind) -> &Schema {
        match kind {
            Kind::Interface => self.interface.schema(),
            Kind::Layer => self.layer.schema(),
        }
    }

    /// Returns the shared descriptor for a kind.
    #[must_use]
    pub fn descriptor(&self, kind: Kind) -> Arc<KindDescriptor> {
        match kind {
            Kind::Interface => Arc::clone(&self.interface),
            Kind::Layer => Arc::clone(&self.layer),
        }
    }
}

/// Reads and compiles one kind's schema file from a directory.
fn load_schema_file(dir: &Path, kind: Kind) -> Result<Schema, SchemaError> {
    let path = dir.join(kind.schema_file_name());
    let display = path.display().to_string();
    let metadata = fs::metadata(&path).map_err(|err| SchemaError::Io(format!("{display}: {err}")))?;
    if usize::try_from(metadata.len()).map_or(true, |len| len > MAX_SCHEMA_BYTES) {
        return Err(SchemaError::TooLarge {
            name: display,
            limit: MAX_SCHEMA_BYTES,
        });
    }
    let source =
        fs::read_to_string(&path).map_err(|err| SchemaError::Io(format!("{display}: {err}")))?;
    Schema::from_json(kind.as_str(), &source)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
