//! Payload validation
//!
//! Each insert/update payload validates as a whole, collecting every
//! violated field rather than stopping at the first, so the HTTP layer can
//! return a complete 400 response in one round trip.

use crate::{InsertProperty, InsertUser, PropertyPatch};
use serde::Serialize;

/// A single violated validation rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

impl FieldError {
    pub fn new(field: &'static str, message: &'static str) -> Self {
        Self { field, message }
    }
}

impl InsertUser {
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();

        if self.username.trim().is_empty() {
            errors.push(FieldError::new("username", "Username is required"));
        }
        if self.password.trim().is_empty() {
            errors.push(FieldError::new("password", "Password is required"));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl InsertProperty {
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();

        if self.title.trim().is_empty() {
            errors.push(FieldError::new("title", "Title is required"));
        }
        // NaN fails these comparisons and is rejected along with the rest.
        if !(self.price > 0.0) {
            errors.push(FieldError::new("price", "Price must be positive"));
        }
        if self.location.trim().is_empty() {
            errors.push(FieldError::new("location", "Location is required"));
        }
        if let Some(bathrooms) = self.bathrooms {
            if !(bathrooms >= 0.0) {
                errors.push(FieldError::new("bathrooms", "Bathrooms must not be negative"));
            }
        }
        if let Some(area) = self.area {
            if !(area > 0.0) {
                errors.push(FieldError::new("area", "Area must be positive"));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl PropertyPatch {
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();

        if let Some(title) = &self.title {
            if title.trim().is_empty() {
                errors.push(FieldError::new("title", "Title is required"));
            }
        }
        if let Some(price) = self.price {
            if !(price > 0.0) {
                errors.push(FieldError::new("price", "Price must be positive"));
            }
        }
        if let Some(location) = &self.location {
            if location.trim().is_empty() {
                errors.push(FieldError::new("location", "Location is required"));
            }
        }
        if let Some(bathrooms) = self.bathrooms {
            if !(bathrooms >= 0.0) {
                errors.push(FieldError::new("bathrooms", "Bathrooms must not be negative"));
            }
        }
        if let Some(area) = self.area {
            if !(area > 0.0) {
                errors.push(FieldError::new("area", "Area must be positive"));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
