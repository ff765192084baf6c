use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::db::store::{Filter, SortOrder};
use crate::error::ApiError;
use crate::routes::parse_id;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct EventQuery {
    city: Option<String>,
    tag: Option<String>,
}

fn normalized(value: Option<&str>) -> Option<String> {
    value
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty())
}

/// Active events by start date, optionally narrowed to a city or tag.
pub async fn list_active(
    state: web::Data<AppState>,
    query: web::Query<EventQuery>,
) -> Result<HttpResponse, ApiError> {
    let mut filter = Filter::all()
        .eq("isActive", true)
        .sort("startDate", SortOrder::Ascending);
    if let Some(city) = normalized(query.city.as_deref()) {
        filter = filter.eq("cityLower", city);
    }

    let mut events = state.events.find(filter).await?;
    if let Some(tag) = normalized(query.tag.as_deref()) {
        events.retain(|event| event.tags.contains(&tag));
    }
    Ok(HttpResponse::Ok().json(events))
}

/// Inactive events are hidden from the public lookup.
pub async fn get_by_id(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_id(&path)?;
    match state.events.get(&id).await? {
        Some(event) if event.is_active => Ok(HttpResponse::Ok().json(event)),
        _ => Err(ApiError::NotFound("Event")),
    }
}
