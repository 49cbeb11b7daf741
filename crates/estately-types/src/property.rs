//! Property listing types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of property being listed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    House,
    Apartment,
    Condo,
    Townhouse,
}

impl Default for PropertyType {
    fn default() -> Self {
        PropertyType::House
    }
}

impl std::fmt::Display for PropertyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PropertyType::House => write!(f, "house"),
            PropertyType::Apartment => write!(f, "apartment"),
            PropertyType::Condo => write!(f, "condo"),
            PropertyType::Townhouse => write!(f, "townhouse"),
        }
    }
}

/// Listing status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyStatus {
    Available,
    Sold,
    Rented,
}

impl Default for PropertyStatus {
    fn default() -> Self {
        PropertyStatus::Available
    }
}

impl std::fmt::Display for PropertyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PropertyStatus::Available => write!(f, "available"),
            PropertyStatus::Sold => write!(f, "sold"),
            PropertyStatus::Rented => write!(f, "rented"),
        }
    }
}

/// A stored property listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Property {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub price: f64,
    pub location: String,
    pub bedrooms: Option<u32>,
    pub bathrooms: Option<f64>,
    pub area: Option<f64>,
    #[serde(rename = "type")]
    pub property_type: PropertyType,
    pub status: PropertyStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Property {
    /// Build a stored property from an insert payload. Both timestamps are
    /// set to the same instant.
    pub fn new(id: String, payload: &InsertProperty) -> Self {
        let now = Utc::now();
        Self {
            id,
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

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Insert payload for a property listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsertProperty {
    pub title: String,
    pub description: Option<String>,
    pub price: f64,
    pub location: String,
    pub bedrooms: Option<u32>,
    pub bathrooms: Option<f64>,
    pub area: Option<f64>,
    #[serde(default, rename = "type")]
    pub property_type: PropertyType,
    #[serde(default)]
    pub status: PropertyStatus,
}

/// Partial update for a property listing. Absent fields keep their stored
/// values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PropertyPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bedrooms: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bathrooms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area: Option<f64>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub property_type: Option<PropertyType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PropertyStatus>,
}

impl PropertyPatch {
    /// Merge the provided fields over an existing property. Does not touch
    /// timestamps; the store owns those.
    pub fn apply(&self, property: &mut Property) {
        if let Some(title) = &self.title {
            property.title = title.clone();
        }
        if let Some(description) = &self.description {
            property.description = Some(description.clone());
        }
        if let Some(price) = self.price {
            property.price = price;
        }
        if let Some(location) = &self.location {
            property.location = location.clone();
        }
        if let Some(bedrooms) = self.bedrooms {
            property.bedrooms = Some(bedrooms);
        }
        if let Some(bathrooms) = self.bathrooms {
            property.bathrooms = Some(bathrooms);
        }
        if let Some(area) = self.area {
            property.area = Some(area);
        }
        if let Some(property_type) = self.property_type {
            property.property_type = property_type;
        }
        if let Some(status) = self.status {
            property.status = status;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_defaults() {
        let payload: InsertProperty = serde_json::from_value(serde_json::json!({
            "title": "Lakehouse",
            "price": 250000.0,
            "location": "Tahoe"
        }))
        .unwrap();

        assert_eq!(payload.property_type, PropertyType::House);
        assert_eq!(payload.status, PropertyStatus::Available);
        assert_eq!(payload.description, None);
    }

    #[test]
    fn test_invalid_enum_rejected() {
        let result: Result<InsertProperty, _> = serde_json::from_value(serde_json::json!({
            "title": "Lakehouse",
            "price": 250000.0,
            "location": "Tahoe",
            "type": "castle"
        }));

        assert!(result.is_err());
    }

    #[test]
    fn test_patch_merge() {
        let payload: InsertProperty = serde_json::from_value(serde_json::json!({
            "title": "Lakehouse",
            "price": 250000.0,
            "location": "Tahoe"
        }))
        .unwrap();
        let mut property = Property::new("p1".to_string(), &payload);

        let patch = PropertyPatch {
            status: Some(PropertyStatus::Sold),
            ..Default::default()
        };
        patch.apply(&mut property);

        assert_eq!(property.status, PropertyStatus::Sold);
        assert_eq!(property.title, "Lakehouse");
        assert_eq!(property.price, 250000.0);
        assert_eq!(property.location, "Tahoe");
    }

    #[test]
    fn test_patch_serializes_only_provided_fields() {
        let patch = PropertyPatch {
            price: Some(500000.0),
            ..Default::default()
        };
        let value = serde_json::to_value(&patch).unwrap();
        let object = value.as_object().unwrap();

        assert_eq!(object.len(), 1);
        assert_eq!(object["price"], 500000.0);
    }
}
