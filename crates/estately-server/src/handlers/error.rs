//! HTTP error mapping
//!
//! Validation failures carry every violated field so clients get the
//! complete picture in one 400 response.

use crate::storage::StorageError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use estately_types::FieldError;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
}

#[derive(Debug)]
pub enum ApiError {
    Validation(Vec<FieldError>),
    NotFound(&'static str),
    Conflict(String),
    Unavailable(String),
    Internal(anyhow::Error),
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Conflict(message) => ApiError::Conflict(message),
            StorageError::Unavailable(message) => ApiError::Unavailable(message),
            StorageError::Internal(message) => ApiError::Internal(anyhow::anyhow!(message)),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    message: "Validation failed".to_string(),
                    errors,
                },
            ),
            ApiError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    message: format!("{} not found", resource),
                    errors: Vec::new(),
                },
            ),
            ApiError::Conflict(message) => (
                StatusCode::CONFLICT,
                ErrorBody {
                    message,
                    errors: Vec::new(),
                },
            ),
            ApiError::Unavailable(message) => {
                tracing::error!("Storage unavailable: {}", message);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    ErrorBody {
                        message: "Storage unavailable".to_string(),
                        errors: Vec::new(),
                    },
                )
            }
            ApiError::Internal(err) => {
                tracing::error!("Internal error: {:#}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        message: "Internal Server Error".to_string(),
                        errors: Vec::new(),
                    },
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
