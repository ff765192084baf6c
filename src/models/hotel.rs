use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::db::store::Record;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerHotel {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub city: String,
    #[serde(default)]
    pub city_lower: String,
    pub state: Option<String>,
    pub address: Option<String>,
    pub coordinates: Option<Coordinates>,
    pub price_per_night: Option<f64>,
    pub rating: Option<f64>,
    #[serde(default)]
    pub amenities: Vec<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub booking_url: Option<String>,
    pub image_url: Option<String>,
    pub description: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl PartnerHotel {
    pub fn normalize_city(city: &str) -> String {
        city.trim().to_lowercase()
    }

    /// Checks admin input and recomputes `city_lower`.
    pub fn prepare(&mut self) -> Result<(), String> {
        self.name = self.name.trim().to_string();
        self.city = self.city.trim().to_string();
        if self.name.is_empty() {
            return Err("name is required".to_string());
        }
        if self.city.is_empty() {
            return Err("city is required".to_string());
        }
        if let Some(coordinates) = &self.coordinates {
            if !coordinates.is_valid() {
                return Err("coordinates are out of range".to_string());
            }
        }
        if matches!(self.price_per_night, Some(price) if !price.is_finite() || price < 0.0) {
            return Err("pricePerNight must not be negative".to_string());
        }
        if matches!(self.rating, Some(rating) if !(0.0..=5.0).contains(&rating)) {
            return Err("rating must be between 0 and 5".to_string());
        }
        self.city_lower = Self::normalize_city(&self.city);
        Ok(())
    }
}

impl Record for PartnerHotel {
    fn id(&self) -> Option<ObjectId> {
        self.id
    }

    fn set_id(&mut self, id: ObjectId) {
        self.id = Some(id);
    }
}

/// A hotel returned by a proximity query.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelMatch {
    #[serde(flatten)]
    pub hotel: PartnerHotel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}
