// crates/interface-index-core/src/runtime/store.rs
// ============================================================================
// Module: Interface Index In-Memory Gateway
// Description: In-memory document gateway.
// Purpose: Provide a dependency-free store for tests and local runs.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! [`InMemoryDocumentGateway`] keeps each collection as an insertion-ordered
//! list of records behind a mutex. Filters and sort orders are evaluated with
//! the shared predicate engine in [`crate::core::query`]. It is not intended
//! for production use.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::core::query::Filter;
use crate::core::query::SortOrder;
use crate::core::record::Record;
use crate::core::record::merge_fields;
use crate::interfaces::DocumentGateway;
use crate::interfaces::GatewayError;

// ============================================================================
// SECTION: In-Memory Gateway
// ============================================================================

/// In-memory document gateway for tests and examples.
#[derive(Debug, Default, Clone)]
pub struct InMemoryDocumentGateway {
    /// Collections keyed by name, each in insertion order.
    collections: Arc<Mutex<BTreeMap<String, Vec<Record>>>>,
}

impl InMemoryDocumentGateway {
    /// Creates an empty gateway.
    #[must_use]
    pub fn new() -> Self {
        Self {
            collections: Arc::new(Mutex::new(BTreeMap::new())),
        }
    }

    /// Returns the number of records stored in a collection.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] when the store mutex is poisoned.
    pub fn count(&self, collection: &str) -> Result<usize, GatewayError> {
        let guard = self.lock()?;
        Ok(guard.get(collection).map_or(0, Vec::len))
    }

    /// Locks the collection map.
    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, Vec<Record>>>, GatewayError> {
        self.collections
            .lock()
            .map_err(|_| GatewayError::Unavailable("document store mutex poisoned".to_string()))
    }
}

#[async_trait]
impl DocumentGateway for InMemoryDocumentGateway {
    async fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Option<Record>, GatewayError> {
        let guard = self.lock()?;
        Ok(guard
            .get(collection)
            .and_then(|records| records.iter().find(|record| filter.matches(record)))
            .cloned())
    }

    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        sort: Option<&SortOrder>,
    ) -> Result<Vec<Record>, GatewayError> {
        let mut matched: Vec<Record> = {
            let guard = self.lock()?;
            guard
                .get(collection)
                .map(|records| {
                    records.iter().filter(|record| filter.matches(record)).cloned().collect()
                })
                .unwrap_or_default()
        };
        if let Some(order) = sort {
            matched.sort_by(|left, right| order.compare(left, right));
        }
        Ok(matched)
    }

    async fn upsert(
        &self,
        collection: &str,
        filter: &Filter,
        record: &Record,
    ) -> Result<(), GatewayError> {
        let mut guard = self.lock()?;
        let records = guard.entry(collection.to_string()).or_default();
        if let Some(existing) = records.iter_mut().find(|existing| filter.matches(existing)) {
            *existing = merge_fields(existing, record);
        } else {
            records.push(merge_fields(&filter.equality_fields(), record));
        }
        drop(guard);
        Ok(())
    }

    async fn insert(&self, collection: &str, record: &Record) -> Result<(), GatewayError> {
        let mut guard = self.lock()?;
        guard.entry(collection.to_string()).or_default().push(record.clone());
        drop(guard);
        Ok(())
    }

    async fn delete(&self, collection: &str, filter: &Filter) -> Result<u64, GatewayError> {
        let mut guard = self.lock()?;
        let Some(records) = guard.get_mut(collection) else {
            return Ok(0);
        };
        let before = records.len();
        records.retain(|record| !filter.matches(record));
        let removed = before - records.len();
        drop(guard);
        u64::try_from(removed).map_err(|err| GatewayError::Invalid(err.to_string()))
    }
}
