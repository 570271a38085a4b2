//! MongoDB storage implementation
//!
//! Bins are collections in the `readit` database. Slot identifiers are
//! coerced into object ids and stored as `_id`, so each slot holds a single
//! document and saving overwrites it.

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::bson::{self, Bson, Document};
use mongodb::{Collection, Database};

use crate::domain::storage::{
    resolve_id, IdExtractor, ObjectId, Record, Storage, StorageId, Value, PRIMARY_KEY,
};
use crate::domain::DomainError;

use super::connection::SharedConnection;

/// Name of the database holding every bin
pub const DATABASE_NAME: &str = "readit";

/// Default connection URL
pub const DEFAULT_URL: &str = "mongodb://localhost/readit";

/// MongoDB storage configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MongoConfig {
    /// Connection URL
    pub url: String,
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
        }
    }
}

impl MongoConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

/// Storage backed by MongoDB collections
pub struct MongoStorage {
    config: MongoConfig,
    connection: Arc<SharedConnection>,
    id_extractor: Option<IdExtractor>,
}

impl Debug for MongoStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MongoStorage")
            .field("url", &self.config.url)
            .field("connected", &self.connection.is_connected())
            .finish()
    }
}

impl MongoStorage {
    /// Creates a storage on the process-wide connection
    ///
    /// Nothing is contacted until the first operation.
    pub fn new(config: MongoConfig) -> Self {
        Self::with_connection(config, SharedConnection::global())
    }

    pub fn with_connection(config: MongoConfig, connection: Arc<SharedConnection>) -> Self {
        Self {
            config,
            connection,
            id_extractor: None,
        }
    }

    /// Sets the function used to derive identifiers for `save` calls without one
    pub fn with_id_extractor(mut self, extractor: IdExtractor) -> Self {
        self.id_extractor = Some(extractor);
        self
    }

    async fn database(&self) -> Result<Database, DomainError> {
        let client = self.connection.client(&self.config.url).await?;
        Ok(client.database(DATABASE_NAME))
    }

    async fn collection(&self, bin: &str) -> Result<Collection<Document>, DomainError> {
        Ok(self.database().await?.collection::<Document>(bin))
    }
}

#[async_trait]
impl Storage for MongoStorage {
    async fn save(
        &self,
        bin: &str,
        id: Option<StorageId>,
        record: Record,
    ) -> Result<(), DomainError> {
        let id = resolve_id(id, self.id_extractor.as_ref(), &record)?;
        let oid = to_bson_oid(&ObjectId::coerce(&id));

        let mut document = record_to_document(&record);
        document.insert(PRIMARY_KEY, oid);
        let mut filter = Document::new();
        filter.insert(PRIMARY_KEY, oid);

        self.collection(bin)
            .await?
            .replace_one(filter, document)
            .upsert(true)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to save to '{}': {}", bin, e)))?;

        Ok(())
    }

    async fn retrieve(
        &self,
        bin: &str,
        id: Option<StorageId>,
        constraints: &Record,
    ) -> Result<Vec<Record>, DomainError> {
        let filter = build_filter(id.as_ref(), constraints);

        let documents: Vec<Document> = self
            .collection(bin)
            .await?
            .find(filter)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to query '{}': {}", bin, e)))?
            .try_collect()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to read from '{}': {}", bin, e)))?;

        documents.iter().map(document_to_record).collect()
    }

    async fn remove(
        &self,
        bin: &str,
        id: &StorageId,
        constraints: &Record,
    ) -> Result<usize, DomainError> {
        let filter = build_filter(Some(id), constraints);

        let result = self
            .collection(bin)
            .await?
            .delete_many(filter)
            .await
            .map_err(|e| {
                DomainError::storage(format!("Failed to remove from '{}': {}", bin, e))
            })?;

        Ok(result.deleted_count as usize)
    }

    async fn remove_all(&self, bin: &str, id: &StorageId) -> Result<usize, DomainError> {
        self.remove(bin, id, &Record::new()).await
    }
}

/// Builds the equality filter for a slot and its constraints
///
/// An explicit `_id` constraint is coerced the same way slot identifiers are;
/// a slot identifier, when given, takes precedence over it.
pub fn build_filter(id: Option<&StorageId>, constraints: &Record) -> Document {
    let mut filter = Document::new();
    for (key, value) in constraints {
        if key == PRIMARY_KEY {
            if let Some(oid) = primary_key_oid(value) {
                filter.insert(key.clone(), oid);
                continue;
            }
        }
        filter.insert(key.clone(), value_to_bson(value));
    }

    if let Some(id) = id {
        filter.insert(PRIMARY_KEY, to_bson_oid(&ObjectId::coerce(id)));
    }
    filter
}

fn primary_key_oid(value: &Value) -> Option<bson::oid::ObjectId> {
    let id = match value {
        Value::String(s) => StorageId::from(s.as_str()),
        Value::Integer(i) => StorageId::from(*i),
        _ => return None,
    };
    Some(to_bson_oid(&ObjectId::coerce(&id)))
}

fn to_bson_oid(oid: &ObjectId) -> bson::oid::ObjectId {
    bson::oid::ObjectId::from_bytes(oid.bytes())
}

pub fn record_to_document(record: &Record) -> Document {
    record
        .iter()
        .map(|(key, value)| (key.clone(), value_to_bson(value)))
        .collect()
}

pub fn document_to_record(document: &Document) -> Result<Record, DomainError> {
    document
        .iter()
        .map(|(key, value)| Ok((key.clone(), bson_to_value(value)?)))
        .collect()
}

/// Converts a value into its BSON form; timestamps keep millisecond precision
pub fn value_to_bson(value: &Value) -> Bson {
    match value {
        Value::Null => Bson::Null,
        Value::Bool(b) => Bson::Boolean(*b),
        Value::Integer(i) => Bson::Int64(*i),
        Value::Float(f) => Bson::Double(*f),
        Value::Timestamp(ts) => Bson::DateTime(bson::DateTime::from_millis(ts.timestamp_millis())),
        Value::String(s) => Bson::String(s.clone()),
        Value::List(items) => Bson::Array(items.iter().map(value_to_bson).collect()),
        Value::Map(record) => Bson::Document(record_to_document(record)),
    }
}

/// Converts BSON back into a value; object ids become their hex string
pub fn bson_to_value(value: &Bson) -> Result<Value, DomainError> {
    Ok(match value {
        Bson::Null | Bson::Undefined => Value::Null,
        Bson::Boolean(b) => Value::Bool(*b),
        Bson::Int32(i) => Value::Integer((*i).into()),
        Bson::Int64(i) => Value::Integer(*i),
        Bson::Double(f) => Value::Float(*f),
        Bson::String(s) => Value::String(s.clone()),
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        Bson::DateTime(dt) => {
            let millis = dt.timestamp_millis();
            let ts = DateTime::<Utc>::from_timestamp_millis(millis).ok_or_else(|| {
                DomainError::serialization(format!("Timestamp {} is out of range", millis))
            })?;
            Value::Timestamp(ts)
        }
        Bson::Array(items) => Value::List(
            items
                .iter()
                .map(bson_to_value)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        Bson::Document(document) => Value::Map(document_to_record(document)?),
        other => {
            return Err(DomainError::serialization(format!(
                "Unsupported BSON type: {:?}",
                other.element_type()
            )));
        }
    })
}
