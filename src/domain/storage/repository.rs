//! Storage trait definition

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use crate::domain::DomainError;

use super::identifier::StorageId;
use super::record::Record;
use super::storable::{hydrate, Storable};

/// Derives a slot identifier from the record being saved
pub type IdExtractor = Arc<dyn Fn(&Record) -> Option<StorageId> + Send + Sync>;

/// Bin/slot document storage
///
/// Records live in named bins and are addressed by a slot identifier. Absence
/// is never an error: lookups return empty vectors, removals of unknown slots
/// remove nothing.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Storage: Send + Sync {
    /// Writes `record` into `bin` under `id`, or under the identifier the
    /// configured extractor derives from the record when `id` is `None`
    ///
    /// Slots are addressed by `ObjectId::coerce(id)` in every backend, so
    /// equivalent identifiers (24-hex text and its `ObjectId`, UUID text and
    /// its `Uuid`) name the same slot.
    async fn save(&self, bin: &str, id: Option<StorageId>, record: Record)
        -> Result<(), DomainError>;

    /// Returns the records in `bin` (restricted to slot `id` when given) that
    /// match every constraint
    async fn retrieve(
        &self,
        bin: &str,
        id: Option<StorageId>,
        constraints: &Record,
    ) -> Result<Vec<Record>, DomainError>;

    /// Deletes the records under `id` that match every constraint; empty
    /// constraints delete the whole slot. Returns the number removed.
    async fn remove(
        &self,
        bin: &str,
        id: &StorageId,
        constraints: &Record,
    ) -> Result<usize, DomainError>;

    /// Deletes everything under `id`. Returns the number removed.
    async fn remove_all(&self, bin: &str, id: &StorageId) -> Result<usize, DomainError>;
}

/// Typed and single-result helpers on top of [`Storage`]
pub trait StorageExt: Storage {
    /// Saves a storable object in its persisted form
    fn save_item<'a, T>(
        &'a self,
        bin: &'a str,
        id: Option<StorageId>,
        item: &'a T,
    ) -> impl Future<Output = Result<(), DomainError>> + Send
    where
        T: Storable + Sync + ?Sized,
    {
        async move { self.save(bin, id, item.to_persistence()).await }
    }

    /// Like `retrieve`, but requires at most one match
    fn retrieve_one<'a>(
        &'a self,
        bin: &'a str,
        id: Option<StorageId>,
        constraints: &'a Record,
    ) -> impl Future<Output = Result<Option<Record>, DomainError>> + Send {
        async move {
            let results = self.retrieve(bin, id, constraints).await?;
            at_most_one(bin, results)
        }
    }

    /// `retrieve_one`, answering `default` when nothing matches
    fn retrieve_one_or<'a>(
        &'a self,
        bin: &'a str,
        id: Option<StorageId>,
        constraints: &'a Record,
        default: Record,
    ) -> impl Future<Output = Result<Record, DomainError>> + Send {
        async move {
            Ok(self
                .retrieve_one(bin, id, constraints)
                .await?
                .unwrap_or(default))
        }
    }

    /// `retrieve`, hydrating each match into a fresh `T`
    fn retrieve_as<'a, T>(
        &'a self,
        bin: &'a str,
        id: Option<StorageId>,
        constraints: &'a Record,
    ) -> impl Future<Output = Result<Vec<T>, DomainError>> + Send
    where
        T: Storable + Default + Send,
    {
        async move {
            let results = self.retrieve(bin, id, constraints).await?;
            Ok(results.iter().map(hydrate::<T>).collect())
        }
    }

    /// `retrieve_one`, hydrating the match into a fresh `T`
    fn retrieve_one_as<'a, T>(
        &'a self,
        bin: &'a str,
        id: Option<StorageId>,
        constraints: &'a Record,
    ) -> impl Future<Output = Result<Option<T>, DomainError>> + Send
    where
        T: Storable + Default + Send,
    {
        async move {
            let result = self.retrieve_one(bin, id, constraints).await?;
            Ok(result.as_ref().map(hydrate::<T>))
        }
    }
}

impl<S: Storage + ?Sized> StorageExt for S {}

/// Enforces the single-result contract
pub fn at_most_one<T>(bin: &str, mut results: Vec<T>) -> Result<Option<T>, DomainError> {
    match results.len() {
        0 => Ok(None),
        1 => Ok(results.pop()),
        count => Err(DomainError::more_than_one_result(bin, count)),
    }
}

/// Picks the explicit identifier, falling back to the extractor
pub fn resolve_id(
    id: Option<StorageId>,
    extractor: Option<&IdExtractor>,
    record: &Record,
) -> Result<StorageId, DomainError> {
    if let Some(id) = id {
        return Ok(id);
    }
    let extractor = extractor.ok_or_else(|| {
        DomainError::configuration("no storage identifier given and no identifier extractor configured")
    })?;
    extractor(record).ok_or_else(|| {
        DomainError::configuration("identifier extractor could not derive an identifier from the record")
    })
}
