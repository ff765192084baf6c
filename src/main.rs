use std::{io, sync::Arc};

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;
use log::{info, warn};

use trip_planner_api::{
    config::AppConfig,
    db::{
        mongo::create_mongo_client,
        store::{DocumentStore, MemoryStore, MongoStore},
    },
    models::{event::Event, hotel::PartnerHotel, trip::TripRecord},
    routes,
    services::{geo_service::GeoService, llm_service::generator_from_config},
    state::AppState,
};

const TRIPS_COLLECTION: &str = "trips";
const HOTELS_COLLECTION: &str = "partner_hotels";
const EVENTS_COLLECTION: &str = "events";

type Stores = (
    Arc<dyn DocumentStore<TripRecord>>,
    Arc<dyn DocumentStore<PartnerHotel>>,
    Arc<dyn DocumentStore<Event>>,
);

async fn open_stores(config: &AppConfig) -> io::Result<Stores> {
    let Some(uri) = &config.mongodb_uri else {
        warn!("MONGODB_URI not set, using in-memory stores; data is lost on restart");
        let trips: Arc<dyn DocumentStore<TripRecord>> = Arc::new(MemoryStore::new());
        let hotels: Arc<dyn DocumentStore<PartnerHotel>> = Arc::new(MemoryStore::new());
        let events: Arc<dyn DocumentStore<Event>> = Arc::new(MemoryStore::new());
        return Ok((trips, hotels, events));
    };

    let client = create_mongo_client(uri, &config.database)
        .await
        .map_err(io::Error::other)?;
    let trips: Arc<dyn DocumentStore<TripRecord>> = Arc::new(MongoStore::new(
        client.clone(),
        &config.database,
        TRIPS_COLLECTION,
    ));
    let hotels: Arc<dyn DocumentStore<PartnerHotel>> = Arc::new(MongoStore::new(
        client.clone(),
        &config.database,
        HOTELS_COLLECTION,
    ));
    let events: Arc<dyn DocumentStore<Event>> =
        Arc::new(MongoStore::new(client, &config.database, EVENTS_COLLECTION));
    Ok((trips, hotels, events))
}

fn cors(origins: &[String]) -> Cors {
    if origins.is_empty() {
        return Cors::permissive();
    }
    origins
        .iter()
        .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
        .allow_any_method()
        .allow_any_header()
        .max_age(3600)
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    if cfg!(debug_assertions) {
        dotenv::dotenv().ok();
    }
    env_logger::init_from_env(Env::default().default_filter_or("info"));
    info!("Application starting...");

    let config = AppConfig::from_env().map_err(io::Error::other)?;
    let generator = generator_from_config(&config).map_err(io::Error::other)?;
    match &generator {
        Some(generator) => info!("Using {} for generation", generator.name()),
        None => warn!("No AI provider configured; plan and suggest requests will fail"),
    }

    let (trips, hotels, events) = open_stores(&config).await?;
    let geo = GeoService::new().map_err(io::Error::other)?;

    let host = config.host.clone();
    let port = config.port;
    let cors_origins = config.cors_allowed_origins.clone();
    let state = web::Data::new(AppState::new(config, generator, trips, hotels, events, geo));

    info!("Starting HTTP server on {}:{}", host, port);
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(cors(&cors_origins))
            .app_data(state.clone())
            .configure(routes::config)
    })
    .bind((host, port))?
    .run()
    .await
}
