//! Storage infrastructure - Storage implementations

mod connection;
mod factory;
mod in_memory;
mod mongo;

pub use connection::SharedConnection;
pub use factory::{StorageConfig, StorageFactory, StorageType};
pub use in_memory::InMemoryStorage;
pub use mongo::{
    bson_to_value, build_filter, document_to_record, record_to_document, value_to_bson,
    MongoConfig, MongoStorage, DATABASE_NAME, DEFAULT_URL,
};
