use crate::store::DocumentStore;
use crate::stripe::PaymentProcessor;
use crate::vapi::VoicePlatform;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Client handles built once at startup and shared by every request.
pub struct AppState {
    pub voice: Arc<dyn VoicePlatform>,
    pub payments: Arc<dyn PaymentProcessor>,
    pub store: Arc<dyn DocumentStore>,
}

/// Body of `POST /api/create-business`.
#[derive(Deserialize, Clone, Debug)]
pub struct BusinessDescriptor {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub hours: Option<String>,
    #[serde(default)]
    pub services: Option<String>,
    #[serde(default)]
    pub plan: Option<String>,
    /// Specific number to request from the platform instead of letting it pick one.
    #[serde(default)]
    pub phone_number: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct CreateBusinessResponse {
    pub status: String,
    pub phone_number: String,
    pub assistant_id: String,
}

/// Body of `POST /api/billing/create-subscription`.
#[derive(Deserialize, Clone, Debug)]
pub struct SubscriptionRequest {
    pub email: String,
    pub token: String,
    // Every plan currently bills against the single configured price.
    #[serde(default)]
    pub plan: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct SubscriptionResponse {
    pub status: String,
    pub subscription_id: String,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct CallAnalytics {
    pub total_calls: usize,
    pub total_duration_minutes: f64,
    pub average_duration: f64,
    pub calls: Vec<Value>,
}
