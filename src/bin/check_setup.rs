//! Connectivity check for a fresh deployment: reports which credentials are present and whether
//! the document database and the voice platform accept them.

use sqlx::postgres::PgPoolOptions;
use std::env;

const REQUIRED_VARS: &[&str] = &[
    "VAPI_API_KEY",
    "EDEN_AI_API_KEY",
    "STRIPE_SECRET_KEY",
    "DATABASE_URL",
];
const RULE: &str = "----------------------------------------";

fn mark(ok: bool) -> &'static str {
    if ok {
        "✓"
    } else {
        "✗"
    }
}

async fn check_database(url: Option<&str>) -> Result<(), String> {
    let url = url.ok_or("DATABASE_URL not set")?;
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(url)
        .await
        .map_err(|e| e.to_string())?;
    sqlx::query("SELECT 1")
        .execute(&pool)
        .await
        .map_err(|e| e.to_string())?;
    pool.close().await;
    Ok(())
}

async fn check_vapi(base_url: &str, api_key: Option<&str>) -> Result<(), String> {
    let resp = reqwest::Client::new()
        .get(format!("{}/assistant", base_url.trim_end_matches('/')))
        .bearer_auth(api_key.unwrap_or_default())
        .send()
        .await
        .map_err(|e| e.to_string())?;
    match resp.status().as_u16() {
        200 | 201 => Ok(()),
        status => Err(format!("Status {status}")),
    }
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    println!("Testing The Suite Setup...");
    println!("{RULE}");

    let get = |key: &str| env::var(key).ok().filter(|v| !v.is_empty());
    for key in REQUIRED_VARS {
        let present = get(key).is_some();
        let state = if present { "Set" } else { "Missing" };
        println!("{} {key}: {state}", mark(present));
    }

    println!("{RULE}");

    let database_url = get("DATABASE_URL");
    match check_database(database_url.as_deref()).await {
        Ok(()) => println!("{} Database: Connected", mark(true)),
        Err(e) => println!("{} Database: {e}", mark(false)),
    }

    let vapi_base_url = get("VAPI_BASE_URL").unwrap_or_else(|| "https://api.vapi.ai".to_string());
    let vapi_api_key = get("VAPI_API_KEY");
    match check_vapi(&vapi_base_url, vapi_api_key.as_deref()).await {
        Ok(()) => println!("{} Vapi: Connected", mark(true)),
        Err(e) => println!("{} Vapi: {e}", mark(false)),
    }

    println!("{RULE}");
    println!("Setup test complete!");
}
