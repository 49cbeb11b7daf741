//! User handlers

use crate::handlers::error::ApiError;
use crate::services::credentials;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use estately_types::{InsertUser, User};
use serde::Serialize;
use tracing::info;

/// Read-path shape for a user. The credential hash never leaves the
/// server.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
        }
    }
}

pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<InsertUser>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    payload.validate().map_err(ApiError::Validation)?;

    // Best-effort pre-check; the store still enforces uniqueness at write
    // time, so concurrent creates lose there rather than here.
    if state
        .storage
        .get_user_by_username(&payload.username)
        .await?
        .is_some()
    {
        return Err(ApiError::Conflict(format!(
            "username '{}' is already taken",
            payload.username
        )));
    }

    let password_hash = credentials::hash_password(&payload.password)?;
    let user = state
        .storage
        .create_user(&payload.username, &password_hash)
        .await?;

    info!("Created user: {}", user.username);
    Ok((StatusCode::CREATED, Json(user.into())))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    match state.storage.get_user(&id).await? {
        Some(user) => Ok(Json(user.into())),
        None => Err(ApiError::NotFound("User")),
    }
}
