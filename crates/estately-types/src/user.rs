//! User types

use serde::{Deserialize, Serialize};

/// A stored user account. `password_hash` is an Argon2 hash; the plaintext
/// credential is never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub password_hash: String,
}

/// Insert payload for a user account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsertUser {
    pub username: String,
    pub password: String,
}
