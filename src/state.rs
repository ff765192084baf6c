use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::store::DocumentStore;
use crate::models::event::Event;
use crate::models::hotel::PartnerHotel;
use crate::models::place::Place;
use crate::models::trip::TripRecord;
use crate::services::geo_service::GeoService;
use crate::services::llm_service::TextGenerator;
use crate::services::place_cache::TtlCache;
use crate::services::trip_service::TripService;

/// Everything a handler needs, shared across workers through `web::Data`.
pub struct AppState {
    pub config: AppConfig,
    pub generator: Option<Arc<dyn TextGenerator>>,
    pub trip_store: Arc<dyn DocumentStore<TripRecord>>,
    pub trips: TripService,
    pub hotels: Arc<dyn DocumentStore<PartnerHotel>>,
    pub events: Arc<dyn DocumentStore<Event>>,
    pub geo: GeoService,
    pub place_cache: TtlCache<String, Place>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        generator: Option<Arc<dyn TextGenerator>>,
        trip_store: Arc<dyn DocumentStore<TripRecord>>,
        hotels: Arc<dyn DocumentStore<PartnerHotel>>,
        events: Arc<dyn DocumentStore<Event>>,
        geo: GeoService,
    ) -> Self {
        let place_cache = TtlCache::new(config.place_cache_ttl, config.place_cache_capacity);
        let trips = TripService::new(generator.clone(), trip_store.clone());
        Self {
            config,
            generator,
            trip_store,
            trips,
            hotels,
            events,
            geo,
            place_cache,
        }
    }

    pub fn provider_name(&self) -> Option<&'static str> {
        self.generator.as_ref().map(|generator| generator.name())
    }
}
