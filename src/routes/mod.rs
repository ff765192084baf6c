use actix_web::web;
use bson::oid::ObjectId;

use crate::error::ApiError;
use crate::middleware::auth::AuthMiddleware;

pub mod admin;
pub mod events;
pub mod health;
pub mod hotels;
pub mod places;
pub mod trips;

pub(crate) fn parse_id(raw: &str) -> Result<ObjectId, ApiError> {
    ObjectId::parse_str(raw.trim()).map_err(|_| ApiError::bad_request("Invalid id"))
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(256 * 1024)
        .error_handler(|err, _req| ApiError::bad_request(err.to_string()).into())
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req| ApiError::bad_request(err.to_string()).into())
}

/// Registers every route. Shared by the server and the integration tests.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(query_config())
        .route("/health", web::get().to(health::health_check))
        .service(
            web::scope("/api")
                .configure(admin::config)
                .service(
                    web::scope("/trips")
                        .wrap(AuthMiddleware)
                        .route("", web::get().to(trips::list))
                        .route("/plan", web::post().to(trips::plan))
                        .route("/suggest", web::post().to(trips::suggest))
                        .route("/{id}", web::get().to(trips::get_by_id)),
                )
                .service(
                    web::scope("/hotels")
                        .route("", web::get().to(hotels::search))
                        .route("/{id}", web::get().to(hotels::get_by_id)),
                )
                .service(
                    web::scope("/events")
                        .route("", web::get().to(events::list_active))
                        .route("/{id}", web::get().to(events::get_by_id)),
                )
                .service(
                    web::scope("/places")
                        .route("/reverse", web::get().to(places::reverse))
                        .route("/ip", web::get().to(places::ip_lookup))
                        .route("/image", web::get().to(places::image)),
                ),
        );
}
