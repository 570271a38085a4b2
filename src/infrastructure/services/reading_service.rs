//! Reading service - add, list and remove a user's readings

use std::fmt::Debug;
use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::reading::{sort_newest_first, Reading, READINGS_BIN};
use crate::domain::storage::{ObjectId, Storable, Storage, StorageExt, StorageId, PRIMARY_KEY};
use crate::domain::DomainError;
use crate::record;

/// Request to record a new reading
#[derive(Debug, Clone)]
pub struct AddReadingRequest {
    pub title: String,
    pub link: String,
}

/// Reading service backed by the `readings` bin
pub struct ReadingService {
    storage: Arc<dyn Storage>,
}

impl Debug for ReadingService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadingService").finish()
    }
}

impl ReadingService {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Records a reading for `user_id`, stamped with the current time
    pub async fn add(
        &self,
        user_id: &str,
        request: AddReadingRequest,
    ) -> Result<Reading, DomainError> {
        let title = request.title.trim();
        let link = request.link.trim();
        if title.is_empty() {
            return Err(DomainError::validation("Reading title must not be empty"));
        }
        if link.is_empty() {
            return Err(DomainError::validation("Reading link must not be empty"));
        }

        let oid = ObjectId::generate();
        let reading = Reading::new(title, link)
            .with_user_id(user_id)
            .with_id(oid.to_hex());

        let mut persisted = reading.to_persistence();
        persisted.insert(PRIMARY_KEY, oid.to_hex());
        self.storage
            .save(READINGS_BIN, Some(StorageId::from(oid)), persisted)
            .await?;

        info!(user_id = %user_id, reading_id = %oid, "Reading added");
        Ok(reading)
    }

    /// Lists the readings of `user_id`, most recent first
    pub async fn list(&self, user_id: &str) -> Result<Vec<Reading>, DomainError> {
        let mut readings: Vec<Reading> = self
            .storage
            .retrieve_as(READINGS_BIN, None, &record! { "user_id" => user_id })
            .await?;
        sort_newest_first(&mut readings);

        debug!(user_id = %user_id, count = readings.len(), "Listed readings");
        Ok(readings)
    }

    /// Removes one of `user_id`'s readings
    ///
    /// Readings that belong to someone else are treated as missing.
    pub async fn remove(&self, user_id: &str, reading_id: &str) -> Result<(), DomainError> {
        let oid: ObjectId = reading_id
            .parse()
            .map_err(|_| DomainError::not_found(format!("Reading '{}' not found", reading_id)))?;

        let removed = self
            .storage
            .remove(
                READINGS_BIN,
                &StorageId::from(oid),
                &record! { "user_id" => user_id },
            )
            .await?;

        if removed == 0 {
            return Err(DomainError::not_found(format!(
                "Reading '{}' not found",
                reading_id
            )));
        }

        info!(user_id = %user_id, reading_id = %reading_id, "Reading removed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::storage::{MockStorage, Record};
    use crate::infrastructure::storage::InMemoryStorage;

    const USER: &str = "4f78d1f94e02d89ba0000000";

    fn create_service() -> ReadingService {
        ReadingService::new(Arc::new(InMemoryStorage::new()))
    }

    fn request(title: &str, link: &str) -> AddReadingRequest {
        AddReadingRequest {
            title: title.to_string(),
            link: link.to_string(),
        }
    }

    #[tokio::test]
    async fn test_add_reading() {
        let service = create_service();

        let reading = service.add(USER, request("<Title>", "<Link>")).await.unwrap();

        assert_eq!(reading.title(), Some("<Title>"));
        assert_eq!(reading.link(), Some("<Link>"));
        assert_eq!(reading.user_id(), Some(USER));
        assert!(reading.when().is_some());
        assert!(reading.id().unwrap().parse::<ObjectId>().is_ok());
    }

    #[tokio::test]
    async fn test_add_requires_title_and_link() {
        let service = create_service();

        let result = service.add(USER, request("  ", "<Link>")).await;
        assert!(matches!(result, Err(DomainError::Validation { .. })));

        let result = service.add(USER, request("<Title>", "")).await;
        assert!(matches!(result, Err(DomainError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_list_returns_saved_readings() {
        let service = create_service();
        let added = service.add(USER, request("<Title>", "<Link>")).await.unwrap();

        let readings = service.list(USER).await.unwrap();

        assert_eq!(readings, vec![added.clone()]);
        assert_eq!(readings[0].id(), added.id());
    }

    #[tokio::test]
    async fn test_list_is_per_user() {
        let service = create_service();
        service.add(USER, request("mine", "a")).await.unwrap();
        service
            .add("4f78d1f94e02d89ba0000001", request("theirs", "b"))
            .await
            .unwrap();

        let readings = service.list(USER).await.unwrap();
        assert_eq!(readings.len(), 1);
        assert_eq!(readings[0].title(), Some("mine"));
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let service = create_service();
        service.add(USER, request("first", "a")).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        service.add(USER, request("second", "b")).await.unwrap();

        let titles: Vec<_> = service
            .list(USER)
            .await
            .unwrap()
            .iter()
            .filter_map(|r| r.title().map(str::to_string))
            .collect();
        assert_eq!(titles, vec!["second", "first"]);
    }

    #[tokio::test]
    async fn test_remove_reading() {
        let service = create_service();
        let reading = service.add(USER, request("<Title>", "<Link>")).await.unwrap();
        let id = reading.id().unwrap().to_string();

        service.remove(USER, &id).await.unwrap();
        assert!(service.list(USER).await.unwrap().is_empty());

        let again = service.remove(USER, &id).await;
        assert!(matches!(again, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_remove_other_users_reading_is_not_found() {
        let service = create_service();
        let reading = service.add(USER, request("<Title>", "<Link>")).await.unwrap();

        let result = service
            .remove("4f78d1f94e02d89ba0000001", reading.id().unwrap())
            .await;

        assert!(matches!(result, Err(DomainError::NotFound { .. })));
        assert_eq!(service.list(USER).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_remove_malformed_id_is_not_found() {
        let service = create_service();
        let result = service.remove(USER, "not-an-id").await;
        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_storage_errors_propagate() {
        let mut storage = MockStorage::new();
        storage
            .expect_retrieve()
            .returning(|_, _, _| Err(DomainError::storage("connection refused")));
        let service = ReadingService::new(Arc::new(storage));

        let result = service.list(USER).await;
        assert!(matches!(result, Err(DomainError::Storage { .. })));
    }

    #[tokio::test]
    async fn test_add_saves_into_readings_bin() {
        let mut storage = MockStorage::new();
        storage
            .expect_save()
            .withf(|bin, id, record: &Record| {
                bin == READINGS_BIN
                    && matches!(id, Some(StorageId::ObjectId(_)))
                    && record.get_str("title") == Some("<Title>")
                    && record.get_str("user_id") == Some(USER)
                    && record.contains_key(PRIMARY_KEY)
            })
            .times(1)
            .returning(|_, _, _| Ok(()));
        let service = ReadingService::new(Arc::new(storage));

        service.add(USER, request("<Title>", "<Link>")).await.unwrap();
    }
}
