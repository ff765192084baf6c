use actix_web::{web, HttpResponse};
use chrono::Utc;
use log::info;

use crate::db::store::{Filter, SortOrder};
use crate::error::ApiError;
use crate::models::hotel::PartnerHotel;
use crate::routes::parse_id;
use crate::state::AppState;

pub async fn list(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let hotels = state
        .hotels
        .find(Filter::all().sort("name", SortOrder::Ascending))
        .await?;
    Ok(HttpResponse::Ok().json(hotels))
}

pub async fn create(
    state: web::Data<AppState>,
    body: web::Json<PartnerHotel>,
) -> Result<HttpResponse, ApiError> {
    let mut hotel = body.into_inner();
    hotel.prepare().map_err(ApiError::BadRequest)?;
    let now = Utc::now();
    hotel.id = None;
    hotel.created_at = Some(now);
    hotel.updated_at = Some(now);

    let id = state.hotels.insert(hotel.clone()).await?;
    hotel.id = Some(id);
    info!("created partner hotel {} ({})", hotel.name, id.to_hex());
    Ok(HttpResponse::Created().json(hotel))
}

pub async fn get_by_id(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_id(&path)?;
    state
        .hotels
        .get(&id)
        .await?
        .map(|hotel| HttpResponse::Ok().json(hotel))
        .ok_or(ApiError::NotFound("Hotel"))
}

/// Full replacement. `createdAt` is carried over from the stored document.
pub async fn replace(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<PartnerHotel>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_id(&path)?;
    let existing = state
        .hotels
        .get(&id)
        .await?
        .ok_or(ApiError::NotFound("Hotel"))?;

    let mut hotel = body.into_inner();
    hotel.prepare().map_err(ApiError::BadRequest)?;
    hotel.id = Some(id);
    hotel.created_at = existing.created_at;
    hotel.updated_at = Some(Utc::now());

    if !state.hotels.replace(&id, hotel.clone()).await? {
        return Err(ApiError::NotFound("Hotel"));
    }
    Ok(HttpResponse::Ok().json(hotel))
}

pub async fn delete(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_id(&path)?;
    if state.hotels.delete(&id).await? {
        info!("deleted partner hotel {}", id.to_hex());
        Ok(HttpResponse::NoContent().finish())
    } else {
        Err(ApiError::NotFound("Hotel"))
    }
}
