// crates/interface-index-core/src/core/query.rs
// ============================================================================
// Module: Query Translator
// Description: Flat query terms, store predicates, and sort ordering.
// Purpose: Turn `field:value` terms into typed predicates using schema types.
// Dependencies: regex, serde_json
// ============================================================================

//! ## Overview
//! Clients search with flat `field:value` terms. The translator consults the
//! kind schema to pick a predicate per term:
//! - numeric fields match by integer equality
//! - other declared fields match by case-insensitive regular expression
//! - undeclared fields match the literal string exactly
//!
//! Bare terms target the primary key, and an empty term list selects every
//! record that has one. The resulting [`Filter`] is evaluated in-process by
//! every gateway, so matching rules live here and nowhere else.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::cmp::Ordering;
use std::fmt;

use regex::Regex;
use regex::RegexBuilder;
use serde_json::Value;
use thiserror::Error;

use crate::core::record::Record;
use crate::core::schema::Schema;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum compiled size for a pattern predicate.
const MAX_PATTERN_SIZE: usize = 1 << 20;

/// Maximum length of a raw query term.
pub const MAX_TERM_LENGTH: usize = 1024;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Query translation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// Query term cannot be translated.
    #[error("malformed query: {0}")]
    Malformed(String),
}

// ============================================================================
// SECTION: Predicates
// ============================================================================

/// Case-insensitive regular expression applied to string values.
#[derive(Clone)]
pub struct TextPattern {
    /// Pattern text as supplied by the client.
    source: String,
    /// Compiled case-insensitive regex.
    regex: Regex,
}

impl TextPattern {
    /// Compiles a case-insensitive pattern.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Malformed`] when the pattern does not compile.
    pub fn new(source: &str) -> Result<Self, QueryError> {
        let regex = RegexBuilder::new(source)
            .case_insensitive(true)
            .size_limit(MAX_PATTERN_SIZE)
            .build()
            .map_err(|err| QueryError::Malformed(format!("invalid pattern '{source}': {err}")))?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    /// Returns the pattern text.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns true when the pattern occurs anywhere in `text`.
    #[must_use]
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

impl PartialEq for TextPattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl fmt::Debug for TextPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TextPattern").field(&self.source).finish()
    }
}

/// Test applied to a single field.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Field equals the value (numbers compare numerically).
    Equals(Value),
    /// Field is a string, or an array holding a string, matching the pattern.
    Pattern(TextPattern),
    /// Field is present.
    Exists,
}

impl Predicate {
    /// Evaluates the predicate against an optional field value.
    #[must_use]
    pub fn matches(&self, value: Option<&Value>) -> bool {
        match (self, value) {
            (Self::Exists, value) => value.is_some(),
            (_, None) => false,
            (Self::Equals(expected), Some(actual)) => match actual {
                Value::Array(items) if !expected.is_array() => {
                    items.iter().any(|item| values_equal(item, expected))
                }
                _ => values_equal(actual, expected),
            },
            (Self::Pattern(pattern), Some(actual)) => match actual {
                Value::String(text) => pattern.is_match(text),
                Value::Array(items) => {
                    items.iter().filter_map(Value::as_str).any(|text| pattern.is_match(text))
                }
                _ => false,
            },
        }
    }
}

/// Predicate bound to a field name.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldPredicate {
    /// Field the predicate applies to.
    pub field: String,
    /// Predicate applied to the field value.
    pub predicate: Predicate,
}

// ============================================================================
// SECTION: Filter
// ============================================================================

/// Conjunction of field predicates.
///
/// # Invariants
/// - An empty filter matches every record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    /// Clauses that must all match.
    clauses: Vec<FieldPredicate>,
}

impl Filter {
    /// Returns a filter matching every record.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            clauses: Vec::new(),
        }
    }

    /// Returns a filter matching records whose `field` equals `value`.
    #[must_use]
    pub fn equals(field: &str, value: Value) -> Self {
        Self::all().and(field, Predicate::Equals(value))
    }

    /// Returns a filter matching records that carry `field`.
    #[must_use]
    pub fn exists(field: &str) -> Self {
        Self::all().and(field, Predicate::Exists)
    }

    /// Adds a clause to the conjunction.
    #[must_use]
    pub fn and(mut self, field: &str, predicate: Predicate) -> Self {
        self.clauses.push(FieldPredicate {
            field: field.to_string(),
            predicate,
        });
        self
    }

    /// Returns the filter clauses.
    #[must_use]
    pub fn clauses(&self) -> &[FieldPredicate] {
        &self.clauses
    }

    /// Returns true when every clause matches the record.
    #[must_use]
    pub fn matches(&self, record: &Record) -> bool {
        self.clauses.iter().all(|clause| clause.predicate.matches(record.get(&clause.field)))
    }

    /// Returns the fields pinned by equality clauses.
    ///
    /// Upserts seed newly inserted records with these fields.
    #[must_use]
    pub fn equality_fields(&self) -> Record {
        let mut fields = Record::new();
        for clause in &self.clauses {
            if let Predicate::Equals(value) = &clause.predicate {
                fields.insert(clause.field.clone(), value.clone());
            }
        }
        fields
    }
}

// ============================================================================
// SECTION: Sort Order
// ============================================================================

/// Ascending sort on a single field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOrder {
    /// Field to sort on.
    field: String,
}

impl SortOrder {
    /// Sorts ascending by `field`.
    #[must_use]
    pub fn ascending(field: &str) -> Self {
        Self {
            field: field.to_string(),
        }
    }

    /// Returns the sort field.
    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Orders two records by the sort field.
    ///
    /// Missing and null values sort first, then booleans, numbers, strings,
    /// arrays, and objects.
    #[must_use]
    pub fn compare(&self, left: &Record, right: &Record) -> Ordering {
        compare_values(left.get(&self.field), right.get(&self.field))
    }
}

/// Orders optional JSON values by type rank, then by value.
fn compare_values(left: Option<&Value>, right: Option<&Value>) -> Ordering {
    let rank = type_rank(left).cmp(&type_rank(right));
    if rank != Ordering::Equal {
        return rank;
    }
    match (left, right) {
        (Some(Value::Bool(a)), Some(Value::Bool(b))) => a.cmp(b),
        (Some(Value::Number(a)), Some(Value::Number(b))) => {
            match (a.as_f64(), b.as_f64()) {
                (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
                _ => Ordering::Equal,
            }
        }
        (Some(Value::String(a)), Some(Value::String(b))) => a.cmp(b),
        _ => Ordering::Equal,
    }
}

/// Returns the sort rank of a value's JSON type.
const fn type_rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Bool(_)) => 1,
        Some(Value::Number(_)) => 2,
        Some(Value::String(_)) => 3,
        Some(Value::Array(_)) => 4,
        Some(Value::Object(_)) => 5,
    }
}

/// Compares values, treating numbers by numeric value.
fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => match (a.as_i64(), b.as_i64()) {
            (Some(a), Some(b)) => a == b,
            _ => a.as_f64().is_some_and(|a| b.as_f64().is_some_and(|b| a == b)),
        },
        _ => left == right,
    }
}

// ============================================================================
// SECTION: Query Terms
// ============================================================================

/// One flat query term.
///
/// # Invariants
/// - `field`, when present, is non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTerm {
    /// Target field; `None` targets the primary key.
    field: Option<String>,
    /// Raw value text.
    value: String,
}

impl QueryTerm {
    /// Builds a term for a named field.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Malformed`] when `field` is empty.
    pub fn new(field: &str, value: &str) -> Result<Self, QueryError> {
        if field.is_empty() {
            return Err(QueryError::Malformed(format!("empty field name in term :{value}")));
        }
        Ok(Self {
            field: Some(field.to_string()),
            value: value.to_string(),
        })
    }

    /// Builds a term targeting the primary key.
    #[must_use]
    pub fn bare(value: &str) -> Self {
        Self {
            field: None,
            value: value.to_string(),
        }
    }

    /// Parses `field:value` or a bare `value`, splitting on the first `:`.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Malformed`] when the term is oversized or names
    /// an empty field.
    pub fn parse(raw: &str) -> Result<Self, QueryError> {
        if raw.len() > MAX_TERM_LENGTH {
            return Err(QueryError::Malformed(format!(
                "query term exceeds {MAX_TERM_LENGTH} bytes"
            )));
        }
        match raw.split_once(':') {
            Some((field, value)) => Self::new(field, value),
            None => Ok(Self::bare(raw)),
        }
    }

    /// Returns the target field, if any.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    /// Returns the raw value text.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

// ============================================================================
// SECTION: Translation
// ============================================================================

/// Translates query terms into a filter for the given schema.
///
/// # Errors
///
/// Returns [`QueryError::Malformed`] when a numeric value does not parse or a
/// pattern does not compile.
pub fn translate(
    schema: &Schema,
    primary_key: &str,
    terms: &[QueryTerm],
) -> Result<Filter, QueryError> {
    if terms.is_empty() {
        return Ok(Filter::exists(primary_key));
    }
    let mut filter = Filter::all();
    for term in terms {
        let field = term.field().unwrap_or(primary_key);
        let predicate = predicate_for(schema, field, term.value())?;
        filter = filter.and(field, predicate);
    }
    Ok(filter)
}

/// Builds the predicate for one field and raw value.
///
/// # Errors
///
/// Returns [`QueryError::Malformed`] for unparsable numbers or patterns.
pub fn predicate_for(schema: &Schema, field: &str, value: &str) -> Result<Predicate, QueryError> {
    match schema.property(field) {
        None => Ok(Predicate::Equals(Value::String(value.to_string()))),
        Some(spec) if spec.property_type.is_numeric() => {
            let number: i64 = value.trim().parse().map_err(|_| {
                QueryError::Malformed(format!("field {field} expects an integer, got '{value}'"))
            })?;
            Ok(Predicate::Equals(Value::from(number)))
        }
        Some(_) => TextPattern::new(value).map(Predicate::Pattern),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests;
