//! Domain layer - Core entities and the storage abstraction

pub mod error;
pub mod reading;
pub mod storage;
pub mod user;

pub use error::DomainError;
pub use reading::Reading;
pub use storage::{
    ObjectId, Record, Storable, Storage, StorageExt, StorageId, Value,
};
pub use user::{LoginDetails, User};
