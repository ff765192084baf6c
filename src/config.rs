use std::{env, fmt::Display, str::FromStr, time::Duration};

use log::{info, warn};

const HOST: &str = "0.0.0.0";
const PORT: u16 = 8080;
const DATABASE: &str = "TripPlanner";
const DEV_JWT_SECRET: &str = "dev_secret";
const GROQ_MODEL: &str = "llama-3.3-70b-versatile";
const GEMINI_MODEL: &str = "gemini-1.5-flash";
const LLM_TIMEOUT_SECS: u64 = 60;
const PLACE_CACHE_TTL_SECS: u64 = 300; // 5 minutes
const PLACE_CACHE_CAPACITY: usize = 1024;
const HOTEL_DEFAULT_RADIUS_KM: f64 = 50.0;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{key} must be set")]
    Missing { key: &'static str },
    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct ProviderCredentials {
    pub api_key: String,
    pub model: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub mongodb_uri: Option<String>,
    pub database: String,
    pub jwt_secret: String,
    pub admin_emails: Vec<String>,
    pub admin_user_ids: Vec<String>,
    pub groq: Option<ProviderCredentials>,
    pub gemini: Option<ProviderCredentials>,
    pub llm_timeout: Duration,
    pub place_cache_ttl: Duration,
    pub place_cache_capacity: usize,
    pub hotel_default_radius_km: f64,
    pub cors_allowed_origins: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: HOST.to_string(),
            port: PORT,
            mongodb_uri: None,
            database: DATABASE.to_string(),
            jwt_secret: DEV_JWT_SECRET.to_string(),
            admin_emails: Vec::new(),
            admin_user_ids: Vec::new(),
            groq: None,
            gemini: None,
            llm_timeout: Duration::from_secs(LLM_TIMEOUT_SECS),
            place_cache_ttl: Duration::from_secs(PLACE_CACHE_TTL_SECS),
            place_cache_capacity: PLACE_CACHE_CAPACITY,
            hotel_default_radius_km: HOTEL_DEFAULT_RADIUS_KM,
            cors_allowed_origins: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from the process environment. Missing keys fall
    /// back to defaults; present but unparsable values are an error.
    pub fn from_env() -> Result<Self, ConfigError> {
        let jwt_secret = match var("JWT_SECRET") {
            Some(secret) => secret,
            None if cfg!(debug_assertions) => {
                warn!("JWT_SECRET not set, using development secret");
                DEV_JWT_SECRET.to_string()
            }
            None => return Err(ConfigError::Missing { key: "JWT_SECRET" }),
        };

        Ok(Self {
            host: var("HOST").unwrap_or_else(|| HOST.to_string()),
            port: parse_or("PORT", PORT)?,
            mongodb_uri: var("MONGODB_URI"),
            database: var("MONGODB_DATABASE").unwrap_or_else(|| DATABASE.to_string()),
            jwt_secret,
            admin_emails: list("ADMIN_EMAILS")
                .into_iter()
                .map(|email| email.to_lowercase())
                .collect(),
            admin_user_ids: list("ADMIN_USER_IDS"),
            groq: credentials("GROQ_API_KEY", "GROQ_MODEL", GROQ_MODEL),
            gemini: credentials("GEMINI_API_KEY", "GEMINI_MODEL", GEMINI_MODEL),
            llm_timeout: Duration::from_secs(parse_or("LLM_TIMEOUT_SECS", LLM_TIMEOUT_SECS)?),
            place_cache_ttl: Duration::from_secs(parse_or(
                "PLACE_CACHE_TTL_SECS",
                PLACE_CACHE_TTL_SECS,
            )?),
            place_cache_capacity: parse_or("PLACE_CACHE_CAPACITY", PLACE_CACHE_CAPACITY)?,
            hotel_default_radius_km: parse_or("HOTEL_DEFAULT_RADIUS_KM", HOTEL_DEFAULT_RADIUS_KM)?,
            cors_allowed_origins: list("CORS_ALLOWED_ORIGINS"),
        })
    }

    pub fn is_admin(&self, user_id: &str, email: Option<&str>) -> bool {
        if self.admin_user_ids.iter().any(|id| id == user_id) {
            return true;
        }
        email
            .map(|email| email.trim().to_lowercase())
            .is_some_and(|email| self.admin_emails.contains(&email))
    }
}

fn var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_or<T>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr + Display,
    T::Err: Display,
{
    match var(key) {
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
        }),
        None => {
            info!("{key} not set, using default: {default}");
            Ok(default)
        }
    }
}

fn list(key: &str) -> Vec<String> {
    var(key)
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn credentials(key: &str, model_key: &str, default_model: &str) -> Option<ProviderCredentials> {
    var(key).map(|api_key| ProviderCredentials {
        api_key,
        model: var(model_key).unwrap_or_else(|| default_model.to_string()),
    })
}
