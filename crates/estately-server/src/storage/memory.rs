//! In-memory storage using DashMap
//!
//! The fallback backend: process-lifetime maps, nothing survives a restart.

use super::{Result, Storage, StorageError};
use async_trait::async_trait;
use dashmap::DashMap;
use estately_types::{InsertProperty, Property, PropertyPatch, User};

/// Volatile key-value store, one map per entity type. Each instance owns
/// its maps, so tests can run against isolated stores.
pub struct MemoryStorage {
    users: DashMap<String, User>,
    properties: DashMap<String, Property>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
            properties: DashMap::new(),
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn get_user(&self, id: &str) -> Result<Option<User>> {
        Ok(self.users.get(id).map(|entry| entry.value().clone()))
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .iter()
            .find(|entry| entry.value().username == username)
            .map(|entry| entry.value().clone()))
    }

    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User> {
        if self.get_user_by_username(username).await?.is_some() {
            return Err(StorageError::Conflict(format!(
                "username '{}' is already taken",
                username
            )));
        }

        let user = User {
            id: uuid::Uuid::new_v4().to_string(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
        };
        self.users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn get_property(&self, id: &str) -> Result<Option<Property>> {
        Ok(self.properties.get(id).map(|entry| entry.value().clone()))
    }

    async fn list_properties(&self) -> Result<Vec<Property>> {
        Ok(self
            .properties
            .iter()
            .map(|entry| entry.value().clone())
            .collect())
    }

    async fn create_property(&self, payload: &InsertProperty) -> Result<Property> {
        let property = Property::new(uuid::Uuid::new_v4().to_string(), payload);
        self.properties.insert(property.id.clone(), property.clone());
        Ok(property)
    }

    async fn update_property(&self, id: &str, patch: &PropertyPatch) -> Result<Option<Property>> {
        match self.properties.get_mut(id) {
            Some(mut entry) => {
                let property = entry.value_mut();
                patch.apply(property);
                property.touch();
                Ok(Some(property.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete_property(&self, id: &str) -> Result<bool> {
        Ok(self.properties.remove(id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use estately_types::{PropertyStatus, PropertyType};

    fn lakehouse() -> InsertProperty {
        serde_json::from_value(serde_json::json!({
            "title": "Lakehouse",
            "price": 250000.0,
            "location": "Tahoe",
            "type": "house"
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_create_sets_both_timestamps() {
        let storage = MemoryStorage::new();
        let before = Utc::now();

        let property = storage.create_property(&lakehouse()).await.unwrap();

        assert_eq!(property.created_at, property.updated_at);
        assert!(property.created_at >= before);
        assert!(property.created_at <= Utc::now());
    }

    #[tokio::test]
    async fn test_missing_ids() {
        let storage = MemoryStorage::new();

        assert!(storage.get_property("missing").await.unwrap().is_none());
        assert!(storage.get_user("missing").await.unwrap().is_none());
        assert!(!storage.delete_property("missing").await.unwrap());
        assert!(storage
            .update_property("missing", &PropertyPatch::default())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let storage = MemoryStorage::new();
        let property = storage.create_property(&lakehouse()).await.unwrap();

        assert!(storage.delete_property(&property.id).await.unwrap());
        assert!(!storage.delete_property(&property.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_update_merges_and_refreshes_updated_at() {
        let storage = MemoryStorage::new();
        let property = storage.create_property(&lakehouse()).await.unwrap();

        let patch = PropertyPatch {
            price: Some(500000.0),
            ..Default::default()
        };
        let updated = storage
            .update_property(&property.id, &patch)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.price, 500000.0);
        assert_eq!(updated.title, property.title);
        assert_eq!(updated.location, property.location);
        assert_eq!(updated.created_at, property.created_at);
        assert!(updated.updated_at >= property.updated_at);
    }

    #[tokio::test]
    async fn test_username_uniqueness() {
        let storage = MemoryStorage::new();

        storage.create_user("a", "hash-x").await.unwrap();
        let err = storage.create_user("a", "hash-y").await.unwrap_err();

        assert!(matches!(err, StorageError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_lookup_user_by_username() {
        let storage = MemoryStorage::new();
        let created = storage.create_user("frank", "hash").await.unwrap();

        let found = storage.get_user_by_username("frank").await.unwrap().unwrap();
        assert_eq!(found.id, created.id);
        assert!(storage
            .get_user_by_username("nobody")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_property_lifecycle() {
        let storage = MemoryStorage::new();

        let property = storage.create_property(&lakehouse()).await.unwrap();
        assert!(!property.id.is_empty());
        assert_eq!(property.status, PropertyStatus::Available);
        assert_eq!(property.property_type, PropertyType::House);

        let patch = PropertyPatch {
            status: Some(PropertyStatus::Sold),
            ..Default::default()
        };
        let updated = storage
            .update_property(&property.id, &patch)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, PropertyStatus::Sold);
        assert_eq!(updated.title, "Lakehouse");
        assert_eq!(updated.price, 250000.0);
        assert_eq!(updated.location, "Tahoe");

        assert!(storage.delete_property(&property.id).await.unwrap());
        assert!(storage.get_property(&property.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_returns_all() {
        let storage = MemoryStorage::new();
        storage.create_property(&lakehouse()).await.unwrap();
        storage.create_property(&lakehouse()).await.unwrap();

        assert_eq!(storage.list_properties().await.unwrap().len(), 2);
    }
}
