//! Health check handler

use crate::AppState;
use axum::{extract::State, Json};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: &'static str,
    storage: &'static str,
}

/// Reports liveness and which backend the next storage call would hit.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let storage = match &state.health {
        Some(health) if health.is_ready().await => "mongodb",
        _ => "memory",
    };

    Json(HealthResponse {
        status: "ok",
        storage,
    })
}
