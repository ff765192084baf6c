use actix_web::{web, HttpResponse, Responder};
use log::error;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthStatus {
    status: &'static str,
    store: ServiceStatus,
    llm_provider: Option<&'static str>,
    version: &'static str,
}

#[derive(Serialize)]
struct ServiceStatus {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

pub async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let store = match state.trip_store.ping().await {
        Ok(()) => ServiceStatus {
            status: "ok",
            details: None,
        },
        Err(e) => {
            error!("store health check failed: {e}");
            ServiceStatus {
                status: "error",
                details: Some(e.to_string()),
            }
        }
    };

    // A missing provider only affects generation, so it degrades rather than fails.
    let llm_provider = state.provider_name();
    let status = if store.status == "ok" && llm_provider.is_some() {
        "ok"
    } else {
        "degraded"
    };

    HttpResponse::Ok().json(HealthStatus {
        status,
        store,
        llm_provider,
        version: env!("CARGO_PKG_VERSION"),
    })
}
