use chrono::{DateTime, NaiveDate, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::db::store::Record;

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub city: Option<String>,
    #[serde(default)]
    pub city_lower: Option<String>,
    pub venue: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub capacity: Option<u32>,
    #[serde(default)]
    pub registered_count: u32,
    pub price: Option<f64>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    pub image_url: Option<String>,
    pub registration_url: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Event {
    pub fn prepare(&mut self) -> Result<(), String> {
        self.title = self.title.trim().to_string();
        if self.title.is_empty() {
            return Err("title is required".to_string());
        }
        if matches!(self.end_date, Some(end) if end < self.start_date) {
            return Err("endDate must not be before startDate".to_string());
        }
        if matches!(self.price, Some(price) if !price.is_finite() || price < 0.0) {
            return Err("price must not be negative".to_string());
        }
        self.tags = self
            .tags
            .iter()
            .map(|tag| tag.trim().to_lowercase())
            .filter(|tag| !tag.is_empty())
            .collect();
        self.city_lower = self
            .city
            .as_deref()
            .map(|city| city.trim().to_lowercase())
            .filter(|city| !city.is_empty());
        Ok(())
    }

    pub fn seats_left(&self) -> Option<u32> {
        self.capacity
            .map(|capacity| capacity.saturating_sub(self.registered_count))
    }
}

impl Record for Event {
    fn id(&self) -> Option<ObjectId> {
        self.id
    }

    fn set_id(&mut self, id: ObjectId) {
        self.id = Some(id);
    }
}
