//! MongoDB storage backend
//!
//! Store-assigned ObjectIds are normalized to the same hex-string `id`
//! shape the in-memory backend exposes, so callers cannot tell the two
//! apart beyond string equality. Malformed ids and missing documents
//! collapse to not-found; genuine driver failures surface as
//! `StorageError::Unavailable`.

use super::hybrid::ConnectionHealth;
use super::{Result, Storage, StorageError};
use anyhow::Context;
use async_trait::async_trait;
use estately_types::{InsertProperty, Property, PropertyPatch, PropertyStatus, PropertyType, User};
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, to_document, DateTime};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{ClientOptions, FindOneAndUpdateOptions, IndexOptions, ReturnDocument};
use mongodb::{Client, Collection, Database, IndexModel};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub struct MongoStorage {
    db: Database,
    users: Collection<UserDocument>,
    properties: Collection<PropertyDocument>,
}

impl MongoStorage {
    pub async fn connect(url: &str, db_name: &str) -> anyhow::Result<Self> {
        tracing::info!("Connecting to MongoDB...");

        let mut options = ClientOptions::parse(url)
            .await
            .context("Failed to parse MongoDB connection string")?;
        options.server_selection_timeout = Some(Duration::from_secs(5));
        options.app_name = Some("estately-server".to_string());

        let client = Client::with_options(options).context("Failed to build MongoDB client")?;
        let db = client.database(db_name);

        // Fail fast if the server is unreachable so the caller can fall
        // back to memory-only mode.
        db.run_command(doc! { "ping": 1 }, None)
            .await
            .context("MongoDB ping failed")?;

        tracing::info!("MongoDB connection established, creating indexes...");

        let storage = Self::with_database(db);
        storage
            .ensure_indexes()
            .await
            .context("Failed to create indexes")?;

        tracing::info!("MongoDB initialization complete");

        Ok(storage)
    }

    fn with_database(db: Database) -> Self {
        Self {
            users: db.collection("users"),
            properties: db.collection("properties"),
            db,
        }
    }

    /// Health probe bound to this storage's database handle.
    pub fn health(&self) -> MongoHealth {
        MongoHealth {
            db: self.db.clone(),
        }
    }

    async fn ensure_indexes(&self) -> mongodb::error::Result<()> {
        let index = IndexModel::builder()
            .keys(doc! { "username": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.users.create_index(index, None).await?;
        Ok(())
    }
}

#[async_trait]
impl Storage for MongoStorage {
    async fn get_user(&self, id: &str) -> Result<Option<User>> {
        let oid = match ObjectId::parse_str(id) {
            Ok(oid) => oid,
            Err(_) => return Ok(None),
        };

        let document = self
            .users
            .find_one(doc! { "_id": oid }, None)
            .await
            .map_err(unavailable)?;
        Ok(document.map(User::from))
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let document = self
            .users
            .find_one(doc! { "username": username }, None)
            .await
            .map_err(unavailable)?;
        Ok(document.map(User::from))
    }

    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User> {
        let mut document = UserDocument {
            id: None,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
        };

        let result = self.users.insert_one(&document, None).await.map_err(|e| {
            if is_duplicate_key(&e) {
                StorageError::Conflict(format!("username '{}' is already taken", username))
            } else {
                unavailable(e)
            }
        })?;

        let id = result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| StorageError::Internal("insert did not return an ObjectId".to_string()))?;
        document.id = Some(id);
        Ok(document.into())
    }

    async fn get_property(&self, id: &str) -> Result<Option<Property>> {
        let oid = match ObjectId::parse_str(id) {
            Ok(oid) => oid,
            Err(_) => return Ok(None),
        };

        let document = self
            .properties
            .find_one(doc! { "_id": oid }, None)
            .await
            .map_err(unavailable)?;
        Ok(document.map(Property::from))
    }

    async fn list_properties(&self) -> Result<Vec<Property>> {
        let cursor = self
            .properties
            .find(None, None)
            .await
            .map_err(unavailable)?;
        let documents: Vec<PropertyDocument> = cursor.try_collect().await.map_err(unavailable)?;
        Ok(documents.into_iter().map(Property::from).collect())
    }

    async fn create_property(&self, payload: &InsertProperty) -> Result<Property> {
        let mut document = PropertyDocument::new(payload);

        let result = self
            .properties
            .insert_one(&document, None)
            .await
            .map_err(unavailable)?;

        let id = result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| StorageError::Internal("insert did not return an ObjectId".to_string()))?;
        document.id = Some(id);
        Ok(document.into())
    }

    async fn update_property(&self, id: &str, patch: &PropertyPatch) -> Result<Option<Property>> {
        let oid = match ObjectId::parse_str(id) {
            Ok(oid) => oid,
            Err(_) => return Ok(None),
        };

        let set = to_document(patch).map_err(|e| StorageError::Internal(e.to_string()))?;
        // updated_at is stamped by the server, even for an empty patch.
        let mut update = doc! { "$currentDate": { "updated_at": true } };
        if !set.is_empty() {
            update.insert("$set", set);
        }

        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();
        let document = self
            .properties
            .find_one_and_update(doc! { "_id": oid }, update, options)
            .await
            .map_err(unavailable)?;
        Ok(document.map(Property::from))
    }

    async fn delete_property(&self, id: &str) -> Result<bool> {
        let oid = match ObjectId::parse_str(id) {
            Ok(oid) => oid,
            Err(_) => return Ok(false),
        };

        let document = self
            .properties
            .find_one_and_delete(doc! { "_id": oid }, None)
            .await
            .map_err(unavailable)?;
        Ok(document.is_some())
    }
}

/// Per-call readiness probe for the persistent store. A `ping` round trip
/// is the only live signal the driver exposes.
pub struct MongoHealth {
    db: Database,
}

#[async_trait]
impl ConnectionHealth for MongoHealth {
    async fn is_ready(&self) -> bool {
        self.db.run_command(doc! { "ping": 1 }, None).await.is_ok()
    }
}

fn unavailable(err: mongodb::error::Error) -> StorageError {
    StorageError::Unavailable(err.to_string())
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => write_error.code == 11000,
        ErrorKind::Command(command_error) => command_error.code == 11000,
        _ => false,
    }
}

// Helper structs for the document shapes; ids are store-assigned.
#[derive(Debug, Serialize, Deserialize)]
struct UserDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    username: String,
    password_hash: String,
}

impl From<UserDocument> for User {
    fn from(document: UserDocument) -> Self {
        User {
            id: document.id.map(|oid| oid.to_hex()).unwrap_or_default(),
            username: document.username,
            password_hash: document.password_hash,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct PropertyDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    title: String,
    description: Option<String>,
    price: f64,
    location: String,
    bedrooms: Option<u32>,
    bathrooms: Option<f64>,
    area: Option<f64>,
    #[serde(rename = "type")]
    property_type: PropertyType,
    status: PropertyStatus,
    created_at: DateTime,
    updated_at: DateTime,
}

impl PropertyDocument {
    fn new(payload: &InsertProperty) -> Self {
        let now = DateTime::now();
        Self {
            id: None,
            title: payload.title.clone(),
            description: payload.description.clone(),
            price: payload.price,
            location: payload.location.clone(),
            bedrooms: payload.bedrooms,
            bathrooms: payload.bathrooms,
            area: payload.area,
            property_type: payload.property_type,
            status: payload.status,
            created_at: now,
            updated_at: now,
        }
    }
}

impl From<PropertyDocument> for Property {
    fn from(document: PropertyDocument) -> Self {
        Property {
            id: document.id.map(|oid| oid.to_hex()).unwrap_or_default(),
            title: document.title,
            description: document.description,
            price: document.price,
            location: document.location,
            bedrooms: document.bedrooms,
            bathrooms: document.bathrooms,
            area: document.area,
            property_type: document.property_type,
            status: document.status,
            created_at: document.created_at.to_chrono(),
            updated_at: document.updated_at.to_chrono(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn offline_storage() -> MongoStorage {
        // Parsing the URI does not contact the server; no operation in
        // these tests reaches the network.
        let client = Client::with_uri_str("mongodb://127.0.0.1:27017")
            .await
            .expect("parse client options");
        MongoStorage::with_database(client.database("estately_test"))
    }

    #[tokio::test]
    async fn test_malformed_ids_normalize_to_not_found() {
        let storage = offline_storage().await;

        assert!(storage.get_property("not-a-hex-id").await.unwrap().is_none());
        assert!(storage.get_user("not-a-hex-id").await.unwrap().is_none());
        assert!(!storage.delete_property("not-a-hex-id").await.unwrap());
        assert!(storage
            .update_property("not-a-hex-id", &PropertyPatch::default())
            .await
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_document_id_normalization() {
        let oid = ObjectId::new();
        let document = UserDocument {
            id: Some(oid),
            username: "frank".to_string(),
            password_hash: "hash".to_string(),
        };

        let user = User::from(document);
        assert_eq!(user.id, oid.to_hex());
        assert_eq!(user.id, ObjectId::parse_str(&user.id).unwrap().to_hex());
    }

    #[test]
    fn test_property_document_timestamps() {
        let payload = InsertProperty {
            title: "Lakehouse".to_string(),
            description: None,
            price: 250000.0,
            location: "Tahoe".to_string(),
            bedrooms: None,
            bathrooms: None,
            area: None,
            property_type: PropertyType::House,
            status: PropertyStatus::Available,
        };

        let document = PropertyDocument::new(&payload);
        assert_eq!(document.created_at, document.updated_at);
    }
}
