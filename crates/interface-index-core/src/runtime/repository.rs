// crates/interface-index-core/src/runtime/repository.rs
// ============================================================================
// Module: Document Repository
// Description: Load, find, save, remove, and authorized write flows per kind.
// Purpose: Compose schema, query, gateway, and authorizer into one API.
// Dependencies: crate::core, crate::interfaces, crate::runtime
// ============================================================================

//! ## Overview
//! A [`Repository`] serves one document kind. The primitive operations
//! ([`Repository::load`], [`Repository::find`], [`Repository::save`],
//! [`Repository::remove`]) mirror the document lifecycle; the composed flows
//! ([`Repository::write`], [`Repository::write_batch`],
//! [`Repository::delete`]) add the ownership check ahead of any mutation.
//!
//! ## Invariants
//! - Authorization completes before any merge or persist.
//! - A batch is authorized and validated in full before its first write.
//! - Gateway calls are awaited in issue order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::sync::Arc;

use serde_json::Value;

use crate::core::kind::Kind;
use crate::core::kind::KindDescriptor;
use crate::core::query::Filter;
use crate::core::query::QueryTerm;
use crate::core::query::SortOrder;
use crate::core::query::translate;
use crate::core::record::LAST_MODIFIED_FIELD;
use crate::core::record::OWNER_FIELD;
use crate::core::record::Record;
use crate::core::schema::ValidationError;
use crate::core::time::Timestamp;
use crate::interfaces::DocumentGateway;
use crate::interfaces::MetricAction;
use crate::interfaces::MetricEvent;
use crate::interfaces::MetricsRecorder;
use crate::runtime::authz::OwnershipAuthorizer;
use crate::runtime::authz::WriteDecision;
use crate::runtime::document::Document;
use crate::runtime::document::DocumentError;
use crate::runtime::metrics::NoopMetrics;

// ============================================================================
// SECTION: Outcomes
// ============================================================================

/// Result of an authorized write.
#[derive(Debug, Clone)]
pub struct WriteOutcome {
    /// Document as persisted.
    pub document: Document,
    /// Authorization decision that allowed the write.
    pub decision: WriteDecision,
}

/// Reason reported when no principal is supplied.
const UNAUTHENTICATED: &str = "unauthenticated";

// ============================================================================
// SECTION: Repository
// ============================================================================

/// Document operations for one kind.
#[derive(Clone)]
pub struct Repository {
    /// Kind descriptor.
    descriptor: Arc<KindDescriptor>,
    /// Document store.
    gateway: Arc<dyn DocumentGateway>,
    /// Write authorizer.
    authorizer: Arc<OwnershipAuthorizer>,
    /// Usage metrics sink.
    metrics: Arc<dyn MetricsRecorder>,
}

impl Repository {
    /// Builds a repository with metrics disabled.
    #[must_use]
    pub fn new(
        descriptor: Arc<KindDescriptor>,
        gateway: Arc<dyn DocumentGateway>,
        authorizer: Arc<OwnershipAuthorizer>,
    ) -> Self {
        Self {
            descriptor,
            gateway,
            authorizer,
            metrics: Arc::new(NoopMetrics),
        }
    }

    /// Replaces the metrics recorder.
    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<dyn MetricsRecorder>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Returns the kind served by this repository.
    #[must_use]
    pub fn kind(&self) -> Kind {
        self.descriptor.kind()
    }

    /// Returns the kind descriptor.
    #[must_use]
    pub const fn descriptor(&self) -> &Arc<KindDescriptor> {
        &self.descriptor
    }

    /// Validates a record against the kind schema.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] listing every violation.
    pub fn validate(&self, record: &Record) -> Result<(), ValidationError> {
        self.descriptor.schema().validate(record)
    }

    /// Returns schema defaults without a primary key.
    #[must_use]
    pub fn empty(&self) -> Record {
        let mut record = self.descriptor.schema().defaults();
        record.remove(self.descriptor.primary_key());
        record
    }

    // ------------------------------------------------------------------------
    // Lifecycle primitives
    // ------------------------------------------------------------------------

    /// Loads a document by key, or an unpersisted shell when absent.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError`] when the store fails or the stored record is
    /// invalid. A missing key is never an error.
    pub async fn load(&self, key: &str) -> Result<Document, DocumentError> {
        let filter = self.key_filter(key);
        let stored = self.gateway.find_one(self.descriptor.collection(), &filter).await?;
        self.record_metric(MetricAction::Load, Some(key), None);
        match stored {
            Some(record) => Document::from_stored(Arc::clone(&self.descriptor), record),
            None => Document::shell(Arc::clone(&self.descriptor), key),
        }
    }

    /// Finds documents matching flat query terms.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::MalformedQuery`] for untranslatable terms,
    /// and other variants when the store fails or a record is invalid.
    pub async fn find(
        &self,
        terms: &[QueryTerm],
        sort: bool,
    ) -> Result<Vec<Document>, DocumentError> {
        let filter =
            translate(self.descriptor.schema(), self.descriptor.primary_key(), terms)?;
        let documents = self.find_filter(&filter, sort).await?;
        self.record_metric(MetricAction::Find, None, None);
        Ok(documents)
    }

    /// Finds documents matching a prepared filter.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError`] when the store fails or a record is invalid.
    pub async fn find_filter(
        &self,
        filter: &Filter,
        sort: bool,
    ) -> Result<Vec<Document>, DocumentError> {
        let order = sort.then(|| SortOrder::ascending(self.descriptor.primary_key()));
        let records =
            self.gateway.find(self.descriptor.collection(), filter, order.as_ref()).await?;
        records
            .into_iter()
            .map(|record| Document::from_stored(Arc::clone(&self.descriptor), record))
            .collect()
    }

    /// Stamps, claims, validates, and upserts a document.
    ///
    /// The document is updated only after the store accepts the write.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Unauthorized`] for an empty principal,
    /// [`DocumentError::SchemaValidation`] when the staged record is invalid,
    /// and [`DocumentError::Store`] when the upsert fails.
    pub async fn save(&self, document: &mut Document, principal: &str) -> Result<(), DocumentError> {
        require_principal(document.key(), principal)?;
        let key = document.key().to_string();
        if key.is_empty() {
            return Err(DocumentError::Invalid(format!(
                "{} must be a non-empty string",
                self.descriptor.primary_key()
            )));
        }
        let mut staged = document.record().clone();
        let stamp = Timestamp::now()
            .to_rfc3339()
            .map_err(|err| DocumentError::Invalid(err.to_string()))?;
        staged.insert(LAST_MODIFIED_FIELD.to_string(), Value::String(stamp));
        if document.is_open() {
            staged.insert(
                OWNER_FIELD.to_string(),
                Value::Array(vec![Value::String(principal.to_string())]),
            );
        }
        self.validate(&staged)?;
        self.gateway.upsert(self.descriptor.collection(), &self.key_filter(&key), &staged).await?;
        document.commit(staged, true);
        Ok(())
    }

    /// Deletes a document by key.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::NotFound`] when nothing was deleted.
    pub async fn remove(&self, document: &Document) -> Result<(), DocumentError> {
        let key = document.key();
        let removed =
            self.gateway.delete(self.descriptor.collection(), &self.key_filter(key)).await?;
        if removed == 0 {
            return Err(DocumentError::NotFound(key.to_string()));
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Authorized flows
    // ------------------------------------------------------------------------

    /// Checks write access and converts a denial into an error.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Unauthorized`] on denial and
    /// [`DocumentError::MembershipUnavailable`] when membership fails.
    pub async fn authorize(
        &self,
        document: &Document,
        principal: &str,
    ) -> Result<WriteDecision, DocumentError> {
        require_principal(document.key(), principal)?;
        let decision = self.authorizer.can_write(document, principal).await?;
        if decision.allowed {
            Ok(decision)
        } else {
            self.record_metric(MetricAction::Denied, Some(document.key()), Some(principal));
            Err(DocumentError::Unauthorized {
                key: document.key().to_string(),
                principal: principal.to_string(),
                reason: decision.reason.to_string(),
            })
        }
    }

    /// Loads, authorizes, updates, and saves one document.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError`] from whichever step fails; nothing is written
    /// unless every prior step succeeded.
    pub async fn write(
        &self,
        key: &str,
        partial: &Record,
        principal: &str,
    ) -> Result<WriteOutcome, DocumentError> {
        require_principal(key, principal)?;
        let mut document = self.load(key).await?;
        let decision = self.authorize(&document, principal).await?;
        document.update(partial)?;
        self.save(&mut document, principal).await?;
        self.record_metric(MetricAction::Write, Some(key), Some(principal));
        Ok(WriteOutcome {
            document,
            decision,
        })
    }

    /// Writes several documents after authorizing and validating all of them.
    ///
    /// Saves run in request order; a store failure midway leaves earlier
    /// items written.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Invalid`] for duplicate keys, and the first
    /// authorization, validation, or store error otherwise.
    pub async fn write_batch(
        &self,
        items: Vec<(String, Record)>,
        principal: &str,
    ) -> Result<Vec<WriteOutcome>, DocumentError> {
        require_principal("", principal)?;
        {
            let mut seen = BTreeSet::new();
            for (key, _) in &items {
                if !seen.insert(key.as_str()) {
                    return Err(DocumentError::Invalid(format!("duplicate key in batch: {key}")));
                }
            }
        }
        let mut staged = Vec::with_capacity(items.len());
        for (key, partial) in items {
            let document = self.load(&key).await?;
            staged.push((document, partial));
        }
        let mut decisions = Vec::with_capacity(staged.len());
        for (document, _) in &staged {
            decisions.push(self.authorize(document, principal).await?);
        }
        for (document, partial) in &mut staged {
            document.update(partial)?;
        }
        let mut outcomes = Vec::with_capacity(staged.len());
        for ((mut document, _), decision) in staged.into_iter().zip(decisions) {
            self.save(&mut document, principal).await?;
            self.record_metric(MetricAction::Write, Some(document.key()), Some(principal));
            outcomes.push(WriteOutcome {
                document,
                decision,
            });
        }
        Ok(outcomes)
    }

    /// Loads, authorizes, and removes one document.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::NotFound`] when the key is not stored, and
    /// authorization or store errors otherwise.
    pub async fn delete(&self, key: &str, principal: &str) -> Result<WriteDecision, DocumentError> {
        require_principal(key, principal)?;
        let document = self.load(key).await?;
        let decision = self.authorize(&document, principal).await?;
        self.remove(&document).await?;
        self.record_metric(MetricAction::Delete, Some(key), Some(principal));
        Ok(decision)
    }

    /// Splits a JSON array of records into `(key, record)` batch items.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Invalid`] when an item is not an object or
    /// lacks a string primary key.
    pub fn batch_items(&self, items: Vec<Value>) -> Result<Vec<(String, Record)>, DocumentError> {
        let primary_key = self.descriptor.primary_key();
        items
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                let Value::Object(record) = item else {
                    return Err(DocumentError::Invalid(format!("item {index} is not an object")));
                };
                let key = record
                    .get(primary_key)
                    .and_then(Value::as_str)
                    .filter(|key| !key.is_empty())
                    .ok_or_else(|| {
                        DocumentError::Invalid(format!("item {index} lacks a string {primary_key}"))
                    })?
                    .to_string();
                Ok((key, record))
            })
            .collect()
    }

    // ------------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------------

    /// Returns the primary key equality filter.
    fn key_filter(&self, key: &str) -> Filter {
        Filter::equals(self.descriptor.primary_key(), Value::String(key.to_string()))
    }

    /// Sends a usage event to the metrics recorder.
    fn record_metric(&self, action: MetricAction, key: Option<&str>, principal: Option<&str>) {
        self.metrics.record(MetricEvent::now(action, self.kind(), key, principal));
    }
}

/// Rejects empty principals before any store access.
fn require_principal(key: &str, principal: &str) -> Result<(), DocumentError> {
    if principal.trim().is_empty() {
        return Err(DocumentError::Unauthorized {
            key: key.to_string(),
            principal: String::new(),
            reason: UNAUTHENTICATED.to_string(),
        });
    }
    Ok(())
}
