use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::db::store::Filter;
use crate::error::ApiError;
use crate::models::hotel::Coordinates;
use crate::routes::parse_id;
use crate::services::hotel_search_service::HotelSearchService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct HotelQuery {
    city: Option<String>,
    lat: Option<f64>,
    lng: Option<f64>,
    radius: Option<f64>,
}

enum HotelSearch {
    City(String),
    Near { origin: Coordinates, radius_km: f64 },
}

impl HotelQuery {
    fn into_search(self, default_radius_km: f64) -> Result<HotelSearch, ApiError> {
        if let Some(city) = self.city.filter(|city| !city.trim().is_empty()) {
            return Ok(HotelSearch::City(city));
        }

        let (Some(lat), Some(lng)) = (self.lat, self.lng) else {
            return Err(ApiError::bad_request("Provide either city or lat and lng"));
        };
        let origin = Coordinates { lat, lng };
        if !origin.is_valid() {
            return Err(ApiError::bad_request(
                "lat must be within ±90 and lng within ±180",
            ));
        }
        let radius_km = self.radius.unwrap_or(default_radius_km);
        if !radius_km.is_finite() || radius_km <= 0.0 {
            return Err(ApiError::bad_request("radius must be a positive number"));
        }

        Ok(HotelSearch::Near { origin, radius_km })
    }
}

pub async fn search(
    state: web::Data<AppState>,
    query: web::Query<HotelQuery>,
) -> Result<HttpResponse, ApiError> {
    let search = query
        .into_inner()
        .into_search(state.config.hotel_default_radius_km)?;
    let hotels = state.hotels.find(Filter::all()).await?;

    let matches = match search {
        HotelSearch::City(city) => HotelSearchService::by_city(&hotels, &city),
        HotelSearch::Near { origin, radius_km } => {
            HotelSearchService::within_radius(&hotels, origin, radius_km)
        }
    };
    Ok(HttpResponse::Ok().json(matches))
}

pub async fn get_by_id(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_id(&path)?;
    match state.hotels.get(&id).await? {
        Some(hotel) => Ok(HttpResponse::Ok().json(hotel)),
        None => Err(ApiError::NotFound("Hotel")),
    }
}
