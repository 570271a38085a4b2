//! Slot identifiers and their canonical object-identifier form

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::domain::DomainError;

/// Length in bytes of a canonical object identifier
pub const OBJECT_ID_LEN: usize = 12;

/// Record field holding the primary key in document-backed bins
pub const PRIMARY_KEY: &str = "_id";

/// Identifier of a slot within a bin
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StorageId {
    Text(String),
    Integer(i64),
    Uuid(Uuid),
    ObjectId(ObjectId),
}

impl fmt::Display for StorageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => write!(f, "{}", s),
            Self::Integer(i) => write!(f, "{}", i),
            Self::Uuid(u) => write!(f, "{}", u),
            Self::ObjectId(oid) => write!(f, "{}", oid),
        }
    }
}

impl From<&str> for StorageId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for StorageId {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&String> for StorageId {
    fn from(value: &String) -> Self {
        Self::Text(value.clone())
    }
}

impl From<i32> for StorageId {
    fn from(value: i32) -> Self {
        Self::Integer(value.into())
    }
}

impl From<i64> for StorageId {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<u32> for StorageId {
    fn from(value: u32) -> Self {
        Self::Integer(value.into())
    }
}

impl From<Uuid> for StorageId {
    fn from(value: Uuid) -> Self {
        Self::Uuid(value)
    }
}

impl From<ObjectId> for StorageId {
    fn from(value: ObjectId) -> Self {
        Self::ObjectId(value)
    }
}

/// Canonical 12-byte identifier, rendered as 24 lowercase hex digits
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ObjectId([u8; OBJECT_ID_LEN]);

impl ObjectId {
    pub const fn from_bytes(bytes: [u8; OBJECT_ID_LEN]) -> Self {
        Self(bytes)
    }

    /// Generates a fresh identifier from a random UUID
    pub fn generate() -> Self {
        Self::from_uuid(&Uuid::new_v4())
    }

    pub fn bytes(&self) -> [u8; OBJECT_ID_LEN] {
        self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Derives the canonical identifier for any slot identifier
    ///
    /// Tried in order: the value already is (or parses as) an object id; the
    /// value is UUID-shaped and its fields are repacked; the value is hashed.
    /// The result depends only on the input.
    pub fn coerce(id: &StorageId) -> Self {
        match id {
            StorageId::ObjectId(oid) => *oid,
            StorageId::Uuid(uuid) => Self::from_uuid(uuid),
            StorageId::Text(text) => {
                if let Ok(oid) = text.parse::<ObjectId>() {
                    oid
                } else if let Ok(uuid) = Uuid::parse_str(text) {
                    Self::from_uuid(&uuid)
                } else {
                    Self::from_hash(id)
                }
            }
            StorageId::Integer(_) => Self::from_hash(id),
        }
    }

    /// Packs `time_low`, both clock sequence bytes and `node` of a UUID
    fn from_uuid(uuid: &Uuid) -> Self {
        let raw = uuid.as_bytes();
        let mut bytes = [0u8; OBJECT_ID_LEN];
        bytes[..4].copy_from_slice(&raw[..4]);
        bytes[4..].copy_from_slice(&raw[8..]);
        Self(bytes)
    }

    fn from_hash(id: &StorageId) -> Self {
        let mut hasher = Sha256::new();
        match id {
            StorageId::Text(text) => {
                hasher.update(b"text:");
                hasher.update(text.as_bytes());
            }
            StorageId::Integer(i) => {
                hasher.update(b"integer:");
                hasher.update(i.to_be_bytes());
            }
            StorageId::Uuid(uuid) => {
                hasher.update(b"uuid:");
                hasher.update(uuid.as_bytes());
            }
            StorageId::ObjectId(oid) => {
                hasher.update(b"oid:");
                hasher.update(oid.0);
            }
        }
        let digest = hasher.finalize();
        let mut bytes = [0u8; OBJECT_ID_LEN];
        bytes.copy_from_slice(&digest[..OBJECT_ID_LEN]);
        Self(bytes)
    }
}

impl FromStr for ObjectId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != OBJECT_ID_LEN * 2 {
            return Err(DomainError::validation(format!(
                "'{}' is not a 24 digit hexadecimal object id",
                s
            )));
        }
        let mut bytes = [0u8; OBJECT_ID_LEN];
        hex::decode_to_slice(s, &mut bytes).map_err(|e| {
            DomainError::validation(format!("'{}' is not a valid object id: {}", s, e))
        })?;
        Ok(Self(bytes))
    }
}

impl TryFrom<String> for ObjectId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ObjectId> for String {
    fn from(oid: ObjectId) -> Self {
        oid.to_hex()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.to_hex())
    }
}
