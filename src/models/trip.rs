use chrono::{DateTime, NaiveDate, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::db::store::Record;

pub const DEFAULT_DAYS: u32 = 3;
pub const MAX_DAYS: u32 = 30;
pub const DEFAULT_CURRENCY: &str = "INR";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TravelStyle {
    Budget,
    #[default]
    Balanced,
    Luxury,
    Adventure,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccommodationType {
    Hostel,
    Budget,
    #[default]
    Balanced,
    Luxury,
    Homestay,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransportationType {
    Bus,
    Train,
    Flight,
    OwnVehicle,
    #[default]
    Mix,
}

impl TravelStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            TravelStyle::Budget => "budget",
            TravelStyle::Balanced => "balanced",
            TravelStyle::Luxury => "luxury",
            TravelStyle::Adventure => "adventure",
        }
    }
}

impl AccommodationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccommodationType::Hostel => "hostel",
            AccommodationType::Budget => "budget",
            AccommodationType::Balanced => "balanced",
            AccommodationType::Luxury => "luxury",
            AccommodationType::Homestay => "homestay",
        }
    }
}

impl TransportationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportationType::Bus => "bus",
            TransportationType::Train => "train",
            TransportationType::Flight => "flight",
            TransportationType::OwnVehicle => "own-vehicle",
            TransportationType::Mix => "mix",
        }
    }
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

/// Itinerary request for one or more known destinations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanRequest {
    #[serde(default)]
    pub destinations: Vec<String>,
    pub starting_location: Option<String>,
    pub budget: Option<f64>,
    pub days: Option<u32>,
    pub travelers: Option<u32>,
    #[serde(default)]
    pub travel_style: TravelStyle,
    #[serde(default)]
    pub accommodation_type: AccommodationType,
    #[serde(default)]
    pub transportation_type: TransportationType,
    pub fuel_cost_per_liter: Option<f64>,
    pub vehicle_mileage: Option<f64>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub dietary_preferences: Vec<String>,
    #[serde(default)]
    pub accessibility_needs: Vec<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[serde(default = "default_currency")]
    pub currency: String,
}

/// Destination suggestions for a fixed budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestRequest {
    pub budget: Option<f64>,
    pub days: Option<u32>,
    pub travelers: Option<u32>,
    #[serde(default)]
    pub travel_style: TravelStyle,
    pub starting_location: Option<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    pub month: Option<String>,
    #[serde(default = "default_currency")]
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RequestError {
    #[error("at least one destination is required")]
    NoDestinations,
    #[error("budget must be a positive number")]
    InvalidBudget,
    #[error("budget is required")]
    MissingBudget,
    #[error("days must be between 1 and 30")]
    InvalidDays,
    #[error("travelers must be at least 1")]
    InvalidTravelers,
    #[error("endDate must not be before startDate")]
    InvertedDates,
    #[error("{0} must be a positive number")]
    InvalidVehicleFigure(&'static str),
}

fn check_days(days: u32) -> Result<u32, RequestError> {
    if (1..=MAX_DAYS).contains(&days) {
        Ok(days)
    } else {
        Err(RequestError::InvalidDays)
    }
}

fn check_travelers(travelers: Option<u32>) -> Result<u32, RequestError> {
    match travelers {
        None => Ok(1),
        Some(0) => Err(RequestError::InvalidTravelers),
        Some(n) => Ok(n),
    }
}

fn check_budget(budget: Option<f64>) -> Result<Option<f64>, RequestError> {
    match budget {
        Some(b) if !b.is_finite() || b <= 0.0 => Err(RequestError::InvalidBudget),
        other => Ok(other),
    }
}

fn clean_tags(tags: &[String]) -> Vec<String> {
    tags.iter()
        .map(|tag| tag.trim())
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

impl PlanRequest {
    /// Trip length; a full date range wins over an explicit day count.
    pub fn trip_days(&self) -> Result<u32, RequestError> {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => {
                if end < start {
                    return Err(RequestError::InvertedDates);
                }
                let span = (end - start).num_days() + 1;
                check_days(u32::try_from(span).map_err(|_| RequestError::InvalidDays)?)
            }
            _ => check_days(self.days.unwrap_or(DEFAULT_DAYS)),
        }
    }

    pub fn traveler_count(&self) -> Result<u32, RequestError> {
        check_travelers(self.travelers)
    }

    /// Validates the request and returns a copy with blank entries removed.
    pub fn validated(&self) -> Result<PlanRequest, RequestError> {
        let destinations = clean_tags(&self.destinations);
        if destinations.is_empty() {
            return Err(RequestError::NoDestinations);
        }
        self.trip_days()?;
        self.traveler_count()?;
        let budget = check_budget(self.budget)?;
        for (name, value) in [
            ("fuelCostPerLiter", self.fuel_cost_per_liter),
            ("vehicleMileage", self.vehicle_mileage),
        ] {
            if matches!(value, Some(v) if !v.is_finite() || v <= 0.0) {
                return Err(RequestError::InvalidVehicleFigure(name));
            }
        }

        Ok(PlanRequest {
            destinations,
            starting_location: self
                .starting_location
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            budget,
            interests: clean_tags(&self.interests),
            dietary_preferences: clean_tags(&self.dietary_preferences),
            accessibility_needs: clean_tags(&self.accessibility_needs),
            ..self.clone()
        })
    }
}

impl SuggestRequest {
    pub fn trip_days(&self) -> Result<u32, RequestError> {
        check_days(self.days.unwrap_or(DEFAULT_DAYS))
    }

    pub fn traveler_count(&self) -> Result<u32, RequestError> {
        check_travelers(self.travelers)
    }

    pub fn validated(&self) -> Result<SuggestRequest, RequestError> {
        if check_budget(self.budget)?.is_none() {
            return Err(RequestError::MissingBudget);
        }
        self.trip_days()?;
        self.traveler_count()?;
        Ok(SuggestRequest {
            interests: clean_tags(&self.interests),
            ..self.clone()
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetBreakdown {
    pub accommodation: u64,
    pub transportation: u64,
    pub food: u64,
    pub attractions: u64,
    pub miscellaneous: u64,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ShapeError {
    #[error("expected a JSON object")]
    NotAnObject,
    #[error("missing keys: {}", .0.join(", "))]
    MissingKeys(Vec<&'static str>),
}

fn require_keys(value: Value, keys: &[&'static str]) -> Result<Map<String, Value>, ShapeError> {
    let Value::Object(map) = value else {
        return Err(ShapeError::NotAnObject);
    };
    let missing: Vec<&'static str> = keys
        .iter()
        .copied()
        .filter(|key| !map.contains_key(*key))
        .collect();
    if missing.is_empty() {
        Ok(map)
    } else {
        Err(ShapeError::MissingKeys(missing))
    }
}

/// Model output that carries the top-level keys of an itinerary.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct GeneratedPlan(Map<String, Value>);

/// Model output that carries a `suggestions` list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct GeneratedSuggestions(Map<String, Value>);

impl GeneratedPlan {
    pub const REQUIRED_KEYS: [&'static str; 3] = ["roadmap", "accommodations", "attractions"];

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn as_map_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl TryFrom<Value> for GeneratedPlan {
    type Error = ShapeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        require_keys(value, &Self::REQUIRED_KEYS).map(GeneratedPlan)
    }
}

impl GeneratedSuggestions {
    pub const REQUIRED_KEYS: [&'static str; 1] = ["suggestions"];

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl TryFrom<Value> for GeneratedSuggestions {
    type Error = ShapeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        require_keys(value, &Self::REQUIRED_KEYS).map(GeneratedSuggestions)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TripKind {
    Plan,
    Suggest,
}

/// Persisted outcome of one generation request. Never updated after insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripRecord {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub owner_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_email: Option<String>,
    #[serde(rename = "type")]
    kind: TripKind,
    pub request: Value,
    result: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calculated_budget: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_breakdown: Option<BudgetBreakdown>,
    pub created_at: DateTime<Utc>,
}

impl TripRecord {
    pub fn plan(
        owner_id: String,
        owner_email: Option<String>,
        request: &PlanRequest,
        plan: &GeneratedPlan,
        breakdown: Option<BudgetBreakdown>,
    ) -> Self {
        Self {
            id: None,
            owner_id,
            owner_email,
            kind: TripKind::Plan,
            request: serde_json::to_value(request).unwrap_or(Value::Null),
            result: Value::Object(plan.as_map().clone()),
            calculated_budget: breakdown.map(|b| b.total),
            budget_breakdown: breakdown,
            created_at: Utc::now(),
        }
    }

    pub fn suggestion(
        owner_id: String,
        owner_email: Option<String>,
        request: &SuggestRequest,
        suggestions: &GeneratedSuggestions,
    ) -> Self {
        Self {
            id: None,
            owner_id,
            owner_email,
            kind: TripKind::Suggest,
            request: serde_json::to_value(request).unwrap_or(Value::Null),
            result: Value::Object(suggestions.as_map().clone()),
            calculated_budget: None,
            budget_breakdown: None,
            created_at: Utc::now(),
        }
    }

    pub fn kind(&self) -> TripKind {
        self.kind
    }

    pub fn result(&self) -> &Value {
        &self.result
    }
}

impl Record for TripRecord {
    fn id(&self) -> Option<ObjectId> {
        self.id
    }

    fn set_id(&mut self, id: ObjectId) {
        self.id = Some(id);
    }
}
