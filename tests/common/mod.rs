#![allow(dead_code)]

use std::sync::Arc;

use actix_web::{web, App};
use async_trait::async_trait;
use bson::oid::ObjectId;
use jsonwebtoken::{encode, EncodingKey, Header};
use parking_lot::Mutex;
use serde::ser::Error as _;

use trip_planner_api::config::AppConfig;
use trip_planner_api::db::store::{DocumentStore, Filter, MemoryStore, StoreError};
use trip_planner_api::middleware::auth::Claims;
use trip_planner_api::models::event::Event;
use trip_planner_api::models::hotel::PartnerHotel;
use trip_planner_api::models::trip::TripRecord;
use trip_planner_api::routes;
use trip_planner_api::services::geo_service::GeoService;
use trip_planner_api::services::llm_service::{LlmError, TextGenerator};
use trip_planner_api::state::AppState;

pub const TEST_SECRET: &str = "test_secret";
pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_USER_ID: &str = "admin_user_1";

pub const PLAN_ANSWER: &str = r#"Here is your itinerary:
```json
{
  "tripTitle": "Goa in three days",
  "roadmap": [
    {
      "day": 1,
      "location": "North Goa",
      "activities": [
        { "time": "09:00", "name": "Fort Aguada" },
        { "time": "17:00", "name": "Baga Beach", "mapLink": "https://maps.example/baga" }
      ]
    }
  ],
  "accommodations": [{ "name": "Casa Anjuna", "location": "Anjuna" }],
  "attractions": [{ "name": "Basilica of Bom Jesus", "location": "Old Goa" }],
  "restaurants": [{ "name": "Gunpowder", "location": "Assagao" },],
}
```"#;

pub const SUGGEST_ANSWER: &str = r#"{"suggestions": [{"destination": "Hampi", "estimatedCost": 18000}]}"#;

/// Generator that always answers with the same text and remembers prompts.
pub struct CannedGenerator {
    answer: String,
    pub prompts: Mutex<Vec<String>>,
}

impl CannedGenerator {
    pub fn new(answer: &str) -> Self {
        Self {
            answer: answer.to_string(),
            prompts: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl TextGenerator for CannedGenerator {
    fn name(&self) -> &'static str {
        "canned"
    }

    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        self.prompts.lock().push(prompt.to_string());
        Ok(self.answer.clone())
    }
}

/// Trip store whose writes always fail.
pub struct FailingStore;

fn offline() -> StoreError {
    StoreError::Serialization(bson::ser::Error::custom("store offline"))
}

#[async_trait]
impl DocumentStore<TripRecord> for FailingStore {
    async fn insert(&self, _record: TripRecord) -> Result<ObjectId, StoreError> {
        Err(offline())
    }

    async fn get(&self, _id: &ObjectId) -> Result<Option<TripRecord>, StoreError> {
        Ok(None)
    }

    async fn find(&self, _filter: Filter) -> Result<Vec<TripRecord>, StoreError> {
        Ok(Vec::new())
    }

    async fn replace(&self, _id: &ObjectId, _record: TripRecord) -> Result<bool, StoreError> {
        Err(offline())
    }

    async fn delete(&self, _id: &ObjectId) -> Result<bool, StoreError> {
        Err(offline())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Err(offline())
    }
}

pub struct TestApp {
    pub state: web::Data<AppState>,
    pub generator: Option<Arc<CannedGenerator>>,
    pub trips: Arc<MemoryStore<TripRecord>>,
    pub hotels: Arc<MemoryStore<PartnerHotel>>,
    pub events: Arc<MemoryStore<Event>>,
}

pub fn test_config() -> AppConfig {
    AppConfig {
        jwt_secret: TEST_SECRET.to_string(),
        admin_emails: vec![ADMIN_EMAIL.to_string()],
        admin_user_ids: vec![ADMIN_USER_ID.to_string()],
        ..AppConfig::default()
    }
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_answer(PLAN_ANSWER)
    }

    pub fn with_answer(answer: &str) -> Self {
        Self::build(Some(Arc::new(CannedGenerator::new(answer))), None)
    }

    pub fn without_provider() -> Self {
        Self::build(None, None)
    }

    pub fn with_failing_trip_store(answer: &str) -> Self {
        Self::build(
            Some(Arc::new(CannedGenerator::new(answer))),
            Some(Arc::new(FailingStore)),
        )
    }

    fn build(
        generator: Option<Arc<CannedGenerator>>,
        trip_store: Option<Arc<dyn DocumentStore<TripRecord>>>,
    ) -> Self {
        let trips = Arc::new(MemoryStore::<TripRecord>::new());
        let hotels = Arc::new(MemoryStore::<PartnerHotel>::new());
        let events = Arc::new(MemoryStore::<Event>::new());
        let trip_store = trip_store
            .unwrap_or_else(|| trips.clone() as Arc<dyn DocumentStore<TripRecord>>);

        let state = web::Data::new(AppState::new(
            test_config(),
            generator
                .clone()
                .map(|generator| generator as Arc<dyn TextGenerator>),
            trip_store,
            hotels.clone(),
            events.clone(),
            GeoService::new().expect("http client"),
        ));

        Self {
            state,
            generator,
            trips,
            hotels,
            events,
        }
    }

    pub fn create_app(
        &self,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(self.state.clone())
            .configure(routes::config)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.generator
            .as_ref()
            .and_then(|generator| generator.prompts.lock().last().cloned())
    }
}

fn sign(claims: &Claims) -> String {
    let token = encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .expect("token encodes");
    format!("Bearer {token}")
}

pub fn bearer(user_id: &str, email: Option<&str>, role: Option<&str>) -> String {
    let now = chrono::Utc::now().timestamp() as usize;
    sign(&Claims {
        sub: user_id.to_string(),
        email: email.map(str::to_string),
        role: role.map(str::to_string),
        exp: now + 3600,
        iat: now,
    })
}

pub fn user_token(user_id: &str) -> String {
    bearer(user_id, Some(&format!("{user_id}@example.com")), None)
}

pub fn admin_token() -> String {
    bearer("someone", Some(ADMIN_EMAIL), None)
}

pub fn expired_token(user_id: &str) -> String {
    sign(&Claims {
        sub: user_id.to_string(),
        email: None,
        role: None,
        exp: 1_000,
        iat: 0,
    })
}
