use crate::consts::{
    DEFAULT_PORT, DEFAULT_STRIPE_BASE_URL, DEFAULT_STRIPE_PRICE_ID, DEFAULT_VAPI_BASE_URL,
};
use crate::error::AppError;

use std::env;
use tracing::warn;

/// Settings read from the process environment (after `.env` has been loaded).
#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub vapi_api_key: String,
    pub vapi_base_url: String,
    pub stripe_secret_key: String,
    pub stripe_price_id: String,
    pub stripe_base_url: String,
    /// When unset, documents are kept in process memory.
    pub database_url: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup.  Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let port = match get("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|e| AppError::Config(format!("invalid PORT '{raw}': {e}")))?,
            None => DEFAULT_PORT,
        };

        // Missing credentials only show up once an upstream call is rejected.
        let vapi_api_key = get("VAPI_API_KEY").unwrap_or_else(|| {
            warn!("VAPI_API_KEY not set; voice platform calls will be rejected");
            String::new()
        });
        let stripe_secret_key = get("STRIPE_SECRET_KEY").unwrap_or_else(|| {
            warn!("STRIPE_SECRET_KEY not set; billing calls will be rejected");
            String::new()
        });

        Ok(Self {
            port,
            vapi_api_key,
            vapi_base_url: get("VAPI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_VAPI_BASE_URL.to_string()),
            stripe_secret_key,
            stripe_price_id: get("STRIPE_PRICE_ID")
                .unwrap_or_else(|| DEFAULT_STRIPE_PRICE_ID.to_string()),
            stripe_base_url: get("STRIPE_BASE_URL")
                .unwrap_or_else(|| DEFAULT_STRIPE_BASE_URL.to_string()),
            database_url: get("DATABASE_URL"),
        })
    }
}
