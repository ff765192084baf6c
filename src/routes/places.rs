use actix_web::{web, HttpRequest, HttpResponse};
use log::debug;
use serde::Deserialize;

use crate::error::ApiError;
use crate::models::hotel::Coordinates;
use crate::models::place::PlaceImage;
use crate::services::geo_service::client_ip;
use crate::services::place_cache::coordinate_key;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ReverseQuery {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Deserialize)]
pub struct ImageQuery {
    q: Option<String>,
}

pub async fn reverse(
    state: web::Data<AppState>,
    query: web::Query<ReverseQuery>,
) -> Result<HttpResponse, ApiError> {
    let at = Coordinates {
        lat: query.lat,
        lng: query.lng,
    };
    if !at.is_valid() {
        return Err(ApiError::bad_request(
            "lat must be within ±90 and lng within ±180",
        ));
    }

    let key = coordinate_key(at.lat, at.lng);
    if let Some(place) = state.place_cache.get(&key) {
        debug!("place cache hit for {key}");
        return Ok(HttpResponse::Ok().json(place));
    }

    let place = state.geo.reverse_geocode(at).await;
    if !place.is_empty() {
        state.place_cache.put(key, place.clone());
    }
    Ok(HttpResponse::Ok().json(place))
}

pub async fn ip_lookup(state: web::Data<AppState>, req: HttpRequest) -> HttpResponse {
    let forwarded = req
        .headers()
        .get("X-Forwarded-For")
        .and_then(|value| value.to_str().ok());
    let peer = req.peer_addr().map(|addr| addr.to_string());

    let place = state
        .geo
        .locate_ip(client_ip(forwarded, peer.as_deref()))
        .await;
    HttpResponse::Ok().json(place)
}

pub async fn image(
    state: web::Data<AppState>,
    query: web::Query<ImageQuery>,
) -> Result<HttpResponse, ApiError> {
    let Some(q) = query.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) else {
        return Err(ApiError::bad_request("q is required"));
    };
    let image_url = state.geo.wiki_image(q).await;
    Ok(HttpResponse::Ok().json(PlaceImage { image_url }))
}
