//! Storage layer
//!
//! One `Storage` contract with two backends: MongoDB (persistent) and
//! DashMap (volatile, process-lifetime). `HybridStorage` routes each call
//! to whichever backend is currently viable.

pub mod db;
pub mod hybrid;
pub mod memory;

pub use db::{MongoHealth, MongoStorage};
pub use hybrid::{ConnectionHealth, HybridStorage};
pub use memory::MemoryStorage;

use async_trait::async_trait;
use estately_types::{InsertProperty, Property, PropertyPatch, User};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, StorageError>;

#[derive(Error, Debug)]
pub enum StorageError {
    /// The persistent store is reachable but failing (timeout, lost
    /// connection mid-call). Distinct from not-found, which is an absent
    /// result, not an error.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// A uniqueness rule was violated at write time.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("storage error: {0}")]
    Internal(String),
}

/// Storage contract shared by both backends and the facade.
///
/// Validation happens before any of these are called; backends only see
/// payloads that already passed their rules. Passwords arrive pre-hashed.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn get_user(&self, id: &str) -> Result<Option<User>>;
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User>;

    async fn get_property(&self, id: &str) -> Result<Option<Property>>;
    async fn list_properties(&self) -> Result<Vec<Property>>;
    async fn create_property(&self, payload: &InsertProperty) -> Result<Property>;
    async fn update_property(&self, id: &str, patch: &PropertyPatch) -> Result<Option<Property>>;
    async fn delete_property(&self, id: &str) -> Result<bool>;
}
