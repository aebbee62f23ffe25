mod analytics;
mod config;
mod db_types;
mod error;
mod handlers;
mod store;
mod stripe;
mod stripe_types;
#[cfg(test)]
mod test_utils;
mod types;
mod vapi;
mod vapi_types;

use crate::config::Config;
use crate::store::{DocumentStore, MemoryStore, PgStore};
use crate::stripe::StripeClient;
use crate::types::AppState;
use crate::vapi::VapiClient;

use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::prelude::*;

pub mod consts {
    pub const SERVICE_NAME: &str = "Orla AI Receptionist";
    pub const DEFAULT_PORT: u16 = 5001;
    pub const DEFAULT_VAPI_BASE_URL: &str = "https://api.vapi.ai";
    pub const DEFAULT_STRIPE_BASE_URL: &str = "https://api.stripe.com";
    // $97/month
    pub const DEFAULT_STRIPE_PRICE_ID: &str = "price_1234";
    pub const DEFAULT_PLAN: &str = "starter";
    pub const DEFAULT_BUSINESS_HOURS: &str = "9 AM - 5 PM";
    pub const DEFAULT_BUSINESS_SERVICES: &str = "General business services";
    pub const ASSISTANT_MODEL_PROVIDER: &str = "openai";
    pub const ASSISTANT_MODEL: &str = "gpt-3.5-turbo";
    pub const ASSISTANT_VOICE_PROVIDER: &str = "11labs";
    pub const ASSISTANT_VOICE_ID: &str = "rachel";
    pub const PHONE_NUMBER_PROVIDER: &str = "twilio";
    pub const ANALYTICS_FETCH_LIMIT: i64 = 100;
    pub const RECENT_CALLS: usize = 10;
}

#[tokio::main]
async fn main() {
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("no .env loaded: {e}");
    }
    let subscriber = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_file(true)
                .with_line_number(true),
        )
        .with(tracing_subscriber::filter::Targets::new().with_targets([
            ("hyper", tracing_subscriber::filter::LevelFilter::OFF),
            ("sqlx", tracing_subscriber::filter::LevelFilter::WARN),
            ("orla_rs", tracing_subscriber::filter::LevelFilter::DEBUG),
        ]));
    tracing::subscriber::set_global_default(subscriber).unwrap();

    let config = Config::from_env().expect("invalid configuration");

    let store: Arc<dyn DocumentStore> = match &config.database_url {
        Some(url) => Arc::new(
            PgStore::connect(url)
                .await
                .expect("failed to connect to document database"),
        ),
        None => {
            warn!("DATABASE_URL not set; documents are kept in memory and lost on exit");
            Arc::new(MemoryStore::new())
        }
    };
    let http_client = reqwest::Client::new();
    let voice = Arc::new(VapiClient::new(
        http_client.clone(),
        config.vapi_api_key.clone(),
        config.vapi_base_url.clone(),
    ));
    let payments = Arc::new(StripeClient::new(
        http_client,
        config.stripe_secret_key.clone(),
        config.stripe_price_id.clone(),
        config.stripe_base_url.clone(),
    ));

    let app_state = Arc::new(AppState {
        voice,
        payments,
        store,
    });
    let app = handlers::router(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!(%addr, "listening");
    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await
        .unwrap();
}
