//! Property handlers

use crate::handlers::error::ApiError;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use estately_types::{InsertProperty, Property, PropertyPatch};
use tracing::info;

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Property>>, ApiError> {
    let properties = state.storage.list_properties().await?;
    Ok(Json(properties))
}

pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<InsertProperty>,
) -> Result<(StatusCode, Json<Property>), ApiError> {
    payload.validate().map_err(ApiError::Validation)?;

    let property = state.storage.create_property(&payload).await?;
    info!("Created property {}: {}", property.id, property.title);

    Ok((StatusCode::CREATED, Json(property)))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Property>, ApiError> {
    match state.storage.get_property(&id).await? {
        Some(property) => Ok(Json(property)),
        None => Err(ApiError::NotFound("Property")),
    }
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<PropertyPatch>,
) -> Result<Json<Property>, ApiError> {
    patch.validate().map_err(ApiError::Validation)?;

    match state.storage.update_property(&id, &patch).await? {
        Some(property) => Ok(Json(property)),
        None => Err(ApiError::NotFound("Property")),
    }
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if state.storage.delete_property(&id).await? {
        info!("Deleted property {}", id);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("Property"))
    }
}
