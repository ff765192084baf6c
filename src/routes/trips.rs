use actix_web::{web, HttpResponse};

use crate::error::ApiError;
use crate::middleware::auth_context::AuthenticatedUser;
use crate::models::trip::{PlanRequest, SuggestRequest};
use crate::routes::parse_id;
use crate::state::AppState;

pub async fn plan(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    body: web::Json<PlanRequest>,
) -> Result<HttpResponse, ApiError> {
    let response = state.trips.plan(&user.as_owner(), &body).await?;
    Ok(HttpResponse::Ok().json(response))
}

pub async fn suggest(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    body: web::Json<SuggestRequest>,
) -> Result<HttpResponse, ApiError> {
    let response = state.trips.suggest(&user.as_owner(), &body).await?;
    Ok(HttpResponse::Ok().json(response))
}

pub async fn list(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let trips = state.trips.list_for_owner(&user.user_id).await?;
    Ok(HttpResponse::Ok().json(trips))
}

pub async fn get_by_id(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_id(&path)?;
    let trip = state.trips.get_for_owner(&id, &user.user_id).await?;
    Ok(HttpResponse::Ok().json(trip))
}
