use std::sync::Arc;

use bson::oid::ObjectId;
use log::{info, warn};
use serde::Serialize;
use serde_json::Value;

use crate::db::store::{DocumentStore, Filter, SortOrder, StoreError};
use crate::error::ApiError;
use crate::models::trip::{
    BudgetBreakdown, GeneratedPlan, GeneratedSuggestions, PlanRequest, SuggestRequest, TripRecord,
};
use crate::services::budget_service::{BudgetInputs, BudgetService};
use crate::services::json_extraction_service::extract_json;
use crate::services::llm_service::TextGenerator;
use crate::services::map_link_service::attach_map_links;
use crate::services::prompt_service::{plan_prompt, suggest_prompt};

/// Who a generated trip belongs to.
#[derive(Debug, Clone)]
pub struct TripOwner {
    pub user_id: String,
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanResponse {
    pub trip_id: Option<String>,
    pub plan: GeneratedPlan,
    pub calculated_budget: Option<u64>,
    pub budget_breakdown: Option<BudgetBreakdown>,
    pub provider: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestResponse {
    pub trip_id: Option<String>,
    pub suggestions: Value,
    pub provider: &'static str,
}

/// Serialized view of a stored trip.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripSummary {
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub kind: crate::models::trip::TripKind,
    pub request: Value,
    pub result: Value,
    pub calculated_budget: Option<u64>,
    pub budget_breakdown: Option<BudgetBreakdown>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<TripRecord> for TripSummary {
    fn from(record: TripRecord) -> Self {
        Self {
            id: record.id.map(|id| id.to_hex()),
            kind: record.kind(),
            result: record.result().clone(),
            request: record.request,
            calculated_budget: record.calculated_budget,
            budget_breakdown: record.budget_breakdown,
            created_at: record.created_at,
        }
    }
}

/// Runs the generation pipeline: validate, estimate, prompt, generate,
/// repair, enrich and persist.
pub struct TripService {
    generator: Option<Arc<dyn TextGenerator>>,
    trips: Arc<dyn DocumentStore<TripRecord>>,
}

fn invalid_output(details: impl ToString, raw: &str) -> ApiError {
    ApiError::InvalidAiOutput {
        details: details.to_string(),
        raw: raw.to_string(),
    }
}

impl TripService {
    pub fn new(
        generator: Option<Arc<dyn TextGenerator>>,
        trips: Arc<dyn DocumentStore<TripRecord>>,
    ) -> Self {
        Self { generator, trips }
    }

    fn generator(&self) -> Result<&Arc<dyn TextGenerator>, ApiError> {
        self.generator.as_ref().ok_or(ApiError::ProviderNotConfigured)
    }

    pub async fn plan(&self, owner: &TripOwner, request: &PlanRequest) -> Result<PlanResponse, ApiError> {
        let request = request
            .validated()
            .map_err(|err| ApiError::bad_request(err.to_string()))?;
        let days = request
            .trip_days()
            .map_err(|err| ApiError::bad_request(err.to_string()))?;
        let travelers = request
            .traveler_count()
            .map_err(|err| ApiError::bad_request(err.to_string()))?;
        let generator = self.generator()?;

        let breakdown = match request.budget {
            Some(_) => None,
            None => Some(BudgetService::estimate(&BudgetInputs::from_request(
                &request, days, travelers,
            ))),
        };
        let budget = request
            .budget
            .or_else(|| breakdown.map(|b| b.total as f64))
            .unwrap_or_default();

        let prompt = plan_prompt(&request, days, travelers, budget, breakdown.as_ref());
        info!(
            "generating {days}-day plan for {} via {}",
            request.destinations.join(", "),
            generator.name()
        );
        let raw = generator.generate(&prompt).await?;

        let value = extract_json(&raw).map_err(|err| invalid_output(err, &raw))?;
        let mut plan = GeneratedPlan::try_from(value).map_err(|err| invalid_output(err, &raw))?;
        let links = attach_map_links(plan.as_map_mut());
        info!("plan parsed, {links} map links attached");

        let record = TripRecord::plan(
            owner.user_id.clone(),
            owner.email.clone(),
            &request,
            &plan,
            breakdown,
        );
        let trip_id = self.persist_or_warn(record).await;

        Ok(PlanResponse {
            trip_id,
            plan,
            calculated_budget: breakdown.map(|b| b.total),
            budget_breakdown: breakdown,
            provider: generator.name(),
        })
    }

    pub async fn suggest(
        &self,
        owner: &TripOwner,
        request: &SuggestRequest,
    ) -> Result<SuggestResponse, ApiError> {
        let request = request
            .validated()
            .map_err(|err| ApiError::bad_request(err.to_string()))?;
        let days = request
            .trip_days()
            .map_err(|err| ApiError::bad_request(err.to_string()))?;
        let travelers = request
            .traveler_count()
            .map_err(|err| ApiError::bad_request(err.to_string()))?;
        let generator = self.generator()?;

        let prompt = suggest_prompt(&request, days, travelers);
        info!("generating destination suggestions via {}", generator.name());
        let raw = generator.generate(&prompt).await?;

        let value = extract_json(&raw).map_err(|err| invalid_output(err, &raw))?;
        let suggestions =
            GeneratedSuggestions::try_from(value).map_err(|err| invalid_output(err, &raw))?;

        let record = TripRecord::suggestion(
            owner.user_id.clone(),
            owner.email.clone(),
            &request,
            &suggestions,
        );
        let trip_id = self.persist_or_warn(record).await;

        Ok(SuggestResponse {
            trip_id,
            suggestions: suggestions
                .as_map()
                .get("suggestions")
                .cloned()
                .unwrap_or(Value::Array(Vec::new())),
            provider: generator.name(),
        })
    }

    /// Append-only insert of a generated trip.
    pub async fn persist(&self, record: TripRecord) -> Result<ObjectId, StoreError> {
        self.trips.insert(record).await
    }

    // A failed write never fails the request; the caller just gets no id.
    async fn persist_or_warn(&self, record: TripRecord) -> Option<String> {
        match self.persist(record).await {
            Ok(id) => Some(id.to_hex()),
            Err(err) => {
                warn!("failed to persist generated trip: {err}");
                None
            }
        }
    }

    pub async fn list_for_owner(&self, owner_id: &str) -> Result<Vec<TripSummary>, ApiError> {
        let records = self
            .trips
            .find(
                Filter::all()
                    .eq("ownerId", owner_id)
                    .sort("createdAt", SortOrder::Descending),
            )
            .await?;
        Ok(records.into_iter().map(TripSummary::from).collect())
    }

    /// A trip owned by someone else is reported as missing.
    pub async fn get_for_owner(&self, id: &ObjectId, owner_id: &str) -> Result<TripSummary, ApiError> {
        match self.trips.get(id).await? {
            Some(record) if record.owner_id == owner_id => Ok(record.into()),
            _ => Err(ApiError::NotFound("Trip")),
        }
    }
}
