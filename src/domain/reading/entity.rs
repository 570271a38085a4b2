//! Reading entity

use chrono::{DateTime, SubsecRound, Utc};
use serde::Serialize;

use crate::domain::storage::{Record, Storable, PRIMARY_KEY};
use crate::record;

/// Bin that holds every reading
pub const READINGS_BIN: &str = "readings";

/// Something a user has read
///
/// Only `title`, `link`, `when` and `user_id` are persisted; the identifier is
/// assigned by the storage layer and excluded from equality.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Reading {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    title: Option<String>,
    link: Option<String>,
    when: Option<DateTime<Utc>>,
    user_id: Option<String>,
}

impl Reading {
    /// Creates a reading stamped with the current time
    ///
    /// The timestamp is truncated to milliseconds, the resolution document
    /// stores keep.
    pub fn new(title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            id: None,
            title: Some(title.into()),
            link: Some(link.into()),
            when: Some(Utc::now().trunc_subsecs(3)),
            user_id: None,
        }
    }

    pub fn with_when(mut self, when: DateTime<Utc>) -> Self {
        self.when = Some(when);
        self
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn link(&self) -> Option<&str> {
        self.link.as_deref()
    }

    pub fn when(&self) -> Option<DateTime<Utc>> {
        self.when
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }
}

impl Storable for Reading {
    fn to_persistence(&self) -> Record {
        record! {
            "title" => self.title.clone(),
            "link" => self.link.clone(),
            "when" => self.when,
            "user_id" => self.user_id.clone(),
        }
    }

    fn from_persistence(&mut self, record: &Record) {
        if let Some(id) = record.get_str(PRIMARY_KEY) {
            self.id = Some(id.to_string());
        }
        if let Some(title) = record.get("title") {
            self.title = title.as_str().map(str::to_string);
        }
        if let Some(link) = record.get("link") {
            self.link = link.as_str().map(str::to_string);
        }
        if let Some(when) = record.get("when") {
            self.when = when.as_timestamp();
        }
        if let Some(user_id) = record.get("user_id") {
            self.user_id = user_id.as_str().map(str::to_string);
        }
    }
}

impl PartialEq for Reading {
    fn eq(&self, other: &Self) -> bool {
        self.to_persistence() == other.to_persistence()
    }
}

/// Orders readings with the most recently read first
pub fn sort_newest_first(readings: &mut [Reading]) {
    readings.sort_by(|a, b| b.when.cmp(&a.when));
}
