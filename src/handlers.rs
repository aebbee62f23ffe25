use crate::analytics::summarize;
use crate::consts::{ANALYTICS_FETCH_LIMIT, DEFAULT_PLAN, SERVICE_NAME};
use crate::db_types::{Business, CallRecord, SubscriptionPatch, TranscriptRecord};
use crate::error::AppError;
use crate::store::{Collection, StoreError};
use crate::types::{
    AppState, BusinessDescriptor, CallAnalytics, CreateBusinessResponse, SubscriptionRequest,
    SubscriptionResponse,
};
use crate::vapi_types::{business_id, VapiEvent};

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use time::OffsetDateTime;
use tracing::{debug, info, warn};

pub fn router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/webhook/vapi", post(vapi_webhook))
        .route("/api/create-business", post(create_business))
        .route(
            "/api/billing/create-subscription",
            post(create_subscription),
        )
        .route("/api/analytics/:business_id", get(get_analytics))
        .with_state(app_state)
}

pub async fn home() -> Json<Value> {
    Json(json!({
        "service": SERVICE_NAME,
        "status": "active",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Record a call lifecycle event.  Every delivery is stored as-is; redeliveries duplicate.
pub async fn vapi_webhook(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<Value>,
) -> Result<Json<Value>, AppError> {
    let event = VapiEvent::from_payload(&payload);
    let now = OffsetDateTime::now_utc();

    match event {
        VapiEvent::CallStarted { call_id } => {
            let record = CallRecord {
                timestamp: now,
                event: "call-started".to_string(),
                business_id: business_id(&payload),
                data: payload,
                duration: None,
                recording_url: None,
            };
            add(&app_state, Collection::Calls, &record).await?;
            info!(call_id = ?call_id, "call started");
        }
        VapiEvent::CallEnded {
            call_id,
            duration,
            recording_url,
        } => {
            let record = CallRecord {
                timestamp: now,
                event: "call-ended".to_string(),
                business_id: business_id(&payload),
                data: payload,
                duration,
                recording_url,
            };
            add(&app_state, Collection::Calls, &record).await?;
            info!(call_id = ?call_id, duration = ?record.duration, "call ended");
        }
        VapiEvent::TranscriptReady {
            call_id,
            transcript,
        } => {
            let record = TranscriptRecord {
                call_id,
                transcript,
                timestamp: now,
            };
            add(&app_state, Collection::Transcripts, &record).await?;
            debug!(call_id = ?record.call_id, "transcript stored");
        }
        VapiEvent::Unrecognized => {
            debug!(event_type = ?payload.get("type"), "ignoring vapi event");
        }
    }

    Ok(Json(json!({ "status": "received" })))
}

/// Onboard a business: assistant first, then a number bound to it, then the record.  A failure
/// part way through leaves whatever was already created upstream.
pub async fn create_business(
    State(app_state): State<Arc<AppState>>,
    Json(business): Json<BusinessDescriptor>,
) -> Result<Json<CreateBusinessResponse>, AppError> {
    let assistant = app_state.voice.create_assistant(&business).await?;
    debug!(assistant_id=%assistant.id, "created assistant");

    let phone = app_state
        .voice
        .create_phone_number(&assistant.id, business.phone_number.as_deref())
        .await?;
    debug!(number=%phone.number, "provisioned phone number");

    let record = Business {
        name: business.name,
        email: business.email,
        assistant_id: assistant.id.clone(),
        phone_number: phone.number.clone(),
        created: OffsetDateTime::now_utc(),
        status: "active".to_string(),
        plan: business.plan.unwrap_or_else(|| DEFAULT_PLAN.to_string()),
    };
    add(&app_state, Collection::Businesses, &record).await?;
    info!(name=%record.name, assistant_id=%record.assistant_id, "onboarded business");

    Ok(Json(CreateBusinessResponse {
        status: "success".to_string(),
        phone_number: phone.number,
        assistant_id: assistant.id,
    }))
}

pub async fn create_subscription(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<SubscriptionRequest>,
) -> Result<Json<SubscriptionResponse>, AppError> {
    debug!(email=%request.email, plan=?request.plan, "creating subscription");
    let customer = app_state
        .payments
        .create_customer(&request.email, &request.token)
        .await?;
    let subscription = app_state.payments.create_subscription(&customer.id).await?;

    let patch = SubscriptionPatch {
        stripe_customer_id: customer.id,
        subscription_id: subscription.id.clone(),
        subscription_status: subscription.status,
    };
    let matched = app_state
        .store
        .update_eq(
            Collection::Businesses,
            "email",
            &request.email,
            serde_json::to_value(&patch).map_err(StoreError::from)?,
        )
        .await?;
    if matched == 0 {
        warn!(
            email=%request.email,
            subscription_id=%subscription.id,
            "no business record for subscriber"
        );
    } else {
        info!(
            email=%request.email,
            matched,
            subscription_id=%subscription.id,
            "subscription created"
        );
    }

    Ok(Json(SubscriptionResponse {
        status: "success".to_string(),
        subscription_id: subscription.id,
    }))
}

pub async fn get_analytics(
    State(app_state): State<Arc<AppState>>,
    Path(business_id): Path<String>,
) -> Result<Json<CallAnalytics>, AppError> {
    let calls = app_state
        .store
        .find_eq(
            Collection::Calls,
            "business_id",
            &business_id,
            ANALYTICS_FETCH_LIMIT,
        )
        .await?;
    debug!(business_id=%business_id, fetched = calls.len(), "computing call analytics");
    Ok(Json(summarize(calls)))
}

async fn add(
    app_state: &AppState,
    collection: Collection,
    record: &impl serde::Serialize,
) -> Result<(), AppError> {
    let body = serde_json::to_value(record).map_err(StoreError::from)?;
    app_state.store.add(collection, body).await?;
    Ok(())
}
