//! Storage domain - bin/slot record storage abstraction

mod identifier;
mod record;
mod repository;
mod storable;

pub use identifier::{ObjectId, StorageId, OBJECT_ID_LEN, PRIMARY_KEY};
pub use record::{Record, Value};
pub use repository::{at_most_one, resolve_id, IdExtractor, Storage, StorageExt};
pub use storable::{hydrate, storable_eq, Storable};

#[cfg(test)]
pub use repository::MockStorage;
