//! In-memory storage implementation

use std::collections::{BTreeMap, HashMap};
use std::fmt::Debug;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::storage::{resolve_id, IdExtractor, ObjectId, Record, Storage, StorageId};
use crate::domain::DomainError;

type Slots = BTreeMap<ObjectId, Vec<Record>>;

/// Thread-safe in-memory storage implementation
///
/// Bins map slot identifiers to the list of records saved under them, so a
/// slot can hold any number of records. Slots are keyed by the coerced
/// [`ObjectId`], so `Text("4f78..")` and the matching `ObjectId` address the
/// same slot, as they do in MongoDB. Useful for testing and development.
/// Data is lost when the process terminates.
pub struct InMemoryStorage {
    bins: RwLock<HashMap<String, Slots>>,
    id_extractor: Option<IdExtractor>,
}

impl Debug for InMemoryStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryStorage")
            .field("has_id_extractor", &self.id_extractor.is_some())
            .finish()
    }
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStorage {
    /// Creates a new empty in-memory storage
    pub fn new() -> Self {
        Self {
            bins: RwLock::new(HashMap::new()),
            id_extractor: None,
        }
    }

    /// Sets the function used to derive identifiers for `save` calls without one
    pub fn with_id_extractor(mut self, extractor: IdExtractor) -> Self {
        self.id_extractor = Some(extractor);
        self
    }

    /// Names of the bins that currently hold records
    pub fn bin_names(&self) -> Result<Vec<String>, DomainError> {
        let bins = self.bins.read().map_err(|e| {
            DomainError::storage(format!("Failed to acquire read lock: {}", e))
        })?;

        let mut names: Vec<String> = bins.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn save(
        &self,
        bin: &str,
        id: Option<StorageId>,
        record: Record,
    ) -> Result<(), DomainError> {
        let id = ObjectId::coerce(&resolve_id(id, self.id_extractor.as_ref(), &record)?);
        let mut bins = self.bins.write().map_err(|e| {
            DomainError::storage(format!("Failed to acquire write lock: {}", e))
        })?;

        bins.entry(bin.to_string())
            .or_default()
            .entry(id)
            .or_default()
            .push(record);
        Ok(())
    }

    async fn retrieve(
        &self,
        bin: &str,
        id: Option<StorageId>,
        constraints: &Record,
    ) -> Result<Vec<Record>, DomainError> {
        let bins = self.bins.read().map_err(|e| {
            DomainError::storage(format!("Failed to acquire read lock: {}", e))
        })?;

        let Some(slots) = bins.get(bin) else {
            return Ok(Vec::new());
        };

        let matching = |records: &Vec<Record>| {
            records
                .iter()
                .filter(|r| r.matches(constraints))
                .cloned()
                .collect::<Vec<_>>()
        };

        Ok(match id {
            Some(id) => slots
                .get(&ObjectId::coerce(&id))
                .map(matching)
                .unwrap_or_default(),
            None => slots.values().flat_map(matching).collect(),
        })
    }

    async fn remove(
        &self,
        bin: &str,
        id: &StorageId,
        constraints: &Record,
    ) -> Result<usize, DomainError> {
        if constraints.is_empty() {
            return self.remove_all(bin, id).await;
        }

        let mut bins = self.bins.write().map_err(|e| {
            DomainError::storage(format!("Failed to acquire write lock: {}", e))
        })?;

        let Some(slots) = bins.get_mut(bin) else {
            return Ok(0);
        };
        let slot = ObjectId::coerce(id);
        let Some(records) = slots.get_mut(&slot) else {
            return Ok(0);
        };

        let before = records.len();
        records.retain(|r| !r.matches(constraints));
        let removed = before - records.len();

        if records.is_empty() {
            slots.remove(&slot);
        }
        Ok(removed)
    }

    async fn remove_all(&self, bin: &str, id: &StorageId) -> Result<usize, DomainError> {
        let mut bins = self.bins.write().map_err(|e| {
            DomainError::storage(format!("Failed to acquire write lock: {}", e))
        })?;

        Ok(bins
            .get_mut(bin)
            .and_then(|slots| slots.remove(&ObjectId::coerce(id)))
            .map_or(0, |records| records.len()))
    }
}
