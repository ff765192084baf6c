use actix_web::web;

use crate::middleware::auth::AuthMiddleware;
use crate::middleware::role_auth::RequireAdmin;

pub mod events;
pub mod hotels;

// The last `wrap` runs first, so authentication precedes the admin check.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .wrap(RequireAdmin)
            .wrap(AuthMiddleware)
            .service(
                web::scope("/hotels")
                    .route("", web::get().to(hotels::list))
                    .route("", web::post().to(hotels::create))
                    .route("/{id}", web::get().to(hotels::get_by_id))
                    .route("/{id}", web::put().to(hotels::replace))
                    .route("/{id}", web::delete().to(hotels::delete)),
            )
            .service(
                web::scope("/events")
                    .route("", web::get().to(events::list))
                    .route("", web::post().to(events::create))
                    .route("/{id}", web::get().to(events::get_by_id))
                    .route("/{id}", web::put().to(events::replace))
                    .route("/{id}", web::delete().to(events::delete)),
            ),
    );
}
