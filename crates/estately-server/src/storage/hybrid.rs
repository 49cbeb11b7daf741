//! Hybrid storage facade
//!
//! Routes every call to the persistent backend while its connection is
//! healthy, and to the volatile backend otherwise. The health check runs
//! on each call, so a session can migrate between backends as
//! connectivity changes. Data written on one backend is invisible while
//! the other is active; no migration or replay happens between them.

use super::{Result, Storage};
use async_trait::async_trait;
use estately_types::{InsertProperty, Property, PropertyPatch, User};
use std::sync::Arc;

/// Live readiness of the persistent store. Implementations answer with a
/// fresh observation on every call; the facade never caches the result.
#[async_trait]
pub trait ConnectionHealth: Send + Sync {
    async fn is_ready(&self) -> bool;
}

pub struct HybridStorage {
    primary: Arc<dyn Storage>,
    fallback: Arc<dyn Storage>,
    health: Arc<dyn ConnectionHealth>,
}

impl HybridStorage {
    pub fn new(
        primary: Arc<dyn Storage>,
        fallback: Arc<dyn Storage>,
        health: Arc<dyn ConnectionHealth>,
    ) -> Self {
        Self {
            primary,
            fallback,
            health,
        }
    }

    async fn active(&self) -> &dyn Storage {
        if self.health.is_ready().await {
            self.primary.as_ref()
        } else {
            self.fallback.as_ref()
        }
    }
}

#[async_trait]
impl Storage for HybridStorage {
    async fn get_user(&self, id: &str) -> Result<Option<User>> {
        self.active().await.get_user(id).await
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.active().await.get_user_by_username(username).await
    }

    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User> {
        self.active().await.create_user(username, password_hash).await
    }

    async fn get_property(&self, id: &str) -> Result<Option<Property>> {
        self.active().await.get_property(id).await
    }

    async fn list_properties(&self) -> Result<Vec<Property>> {
        self.active().await.list_properties().await
    }

    async fn create_property(&self, payload: &InsertProperty) -> Result<Property> {
        self.active().await.create_property(payload).await
    }

    async fn update_property(&self, id: &str, patch: &PropertyPatch) -> Result<Option<Property>> {
        self.active().await.update_property(id, patch).await
    }

    async fn delete_property(&self, id: &str) -> Result<bool> {
        self.active().await.delete_property(id).await
    }
}
