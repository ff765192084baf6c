use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use log::{info, warn};

use crate::error::ApiError;
use crate::middleware::auth::{reject, Claims};
use crate::state::AppState;

const ADMIN_ROLE: &str = "admin";

/// Admits callers listed in the admin configuration or carrying the admin
/// role. Must run inside [`AuthMiddleware`](crate::middleware::auth::AuthMiddleware).
pub struct RequireAdmin;

impl<S, B> Transform<S, ServiceRequest> for RequireAdmin
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = RequireAdminService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireAdminService { service }))
    }
}

pub struct RequireAdminService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for RequireAdminService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let claims = req.extensions().get::<Claims>().cloned();
        let Some(claims) = claims else {
            return Box::pin(ready(Ok(reject(req, ApiError::Unauthorized))));
        };

        let allowed = claims.role.as_deref() == Some(ADMIN_ROLE)
            || req
                .app_data::<web::Data<AppState>>()
                .is_some_and(|state| state.config.is_admin(&claims.sub, claims.email.as_deref()));

        if allowed {
            info!("admin access granted to {} for {}", claims.sub, req.path());
            let fut = self.service.call(req);
            Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
        } else {
            warn!("admin access denied to {} for {}", claims.sub, req.path());
            Box::pin(ready(Ok(reject(req, ApiError::Forbidden))))
        }
    }
}
