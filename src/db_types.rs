use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use time::OffsetDateTime;

/// An onboarded tenant, stored in the `businesses` collection.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Business {
    pub name: String,
    pub email: String,
    pub assistant_id: String,
    pub phone_number: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created: OffsetDateTime,
    pub status: String,
    pub plan: String,
}

/// Billing fields merged into every business matching the subscriber's email.
#[derive(Serialize, Debug)]
pub struct SubscriptionPatch {
    pub stripe_customer_id: String,
    pub subscription_id: String,
    pub subscription_status: String,
}

/// One webhook delivery in the `calls` collection.  `data` is the raw payload.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct CallRecord {
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub event: String,
    pub data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recording_url: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct TranscriptRecord {
    pub call_id: Option<String>,
    pub transcript: Option<Value>,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}
