use actix_web::{web, HttpResponse};
use chrono::Utc;
use log::info;

use crate::db::store::{Filter, SortOrder};
use crate::error::ApiError;
use crate::models::event::Event;
use crate::routes::parse_id;
use crate::state::AppState;

/// Every event, inactive ones included.
pub async fn list(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let events = state
        .events
        .find(Filter::all().sort("startDate", SortOrder::Ascending))
        .await?;
    Ok(HttpResponse::Ok().json(events))
}

pub async fn create(
    state: web::Data<AppState>,
    body: web::Json<Event>,
) -> Result<HttpResponse, ApiError> {
    let mut event = body.into_inner();
    event.prepare().map_err(ApiError::BadRequest)?;
    let now = Utc::now();
    event.id = None;
    event.created_at = Some(now);
    event.updated_at = Some(now);

    let id = state.events.insert(event.clone()).await?;
    event.id = Some(id);
    info!("created event {} ({})", event.title, id.to_hex());
    Ok(HttpResponse::Created().json(event))
}

pub async fn get_by_id(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_id(&path)?;
    state
        .events
        .get(&id)
        .await?
        .map(|event| HttpResponse::Ok().json(event))
        .ok_or(ApiError::NotFound("Event"))
}

pub async fn replace(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<Event>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_id(&path)?;
    let existing = state
        .events
        .get(&id)
        .await?
        .ok_or(ApiError::NotFound("Event"))?;

    let mut event = body.into_inner();
    event.prepare().map_err(ApiError::BadRequest)?;
    event.id = Some(id);
    event.created_at = existing.created_at;
    event.updated_at = Some(Utc::now());

    if !state.events.replace(&id, event.clone()).await? {
        return Err(ApiError::NotFound("Event"));
    }
    Ok(HttpResponse::Ok().json(event))
}

pub async fn delete(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_id(&path)?;
    if state.events.delete(&id).await? {
        info!("deleted event {}", id.to_hex());
        Ok(HttpResponse::NoContent().finish())
    } else {
        Err(ApiError::NotFound("Event"))
    }
}
