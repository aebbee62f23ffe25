use crate::consts::{
    ASSISTANT_MODEL, ASSISTANT_MODEL_PROVIDER, ASSISTANT_VOICE_ID, ASSISTANT_VOICE_PROVIDER,
    DEFAULT_BUSINESS_HOURS, DEFAULT_BUSINESS_SERVICES, PHONE_NUMBER_PROVIDER,
};
use crate::types::BusinessDescriptor;
use crate::vapi_types::{
    Assistant, AssistantModel, AssistantVoice, CreateAssistantPayload, CreatePhoneNumberPayload,
    ModelMessage, PhoneNumber,
};

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::{debug, error};

#[derive(Debug, thiserror::Error)]
pub enum VapiError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// The hosted voice platform that owns assistants and phone numbers.
#[async_trait]
pub trait VoicePlatform: Send + Sync {
    async fn create_assistant(&self, business: &BusinessDescriptor) -> Result<Assistant, VapiError>;

    async fn create_phone_number(
        &self,
        assistant_id: &str,
        number: Option<&str>,
    ) -> Result<PhoneNumber, VapiError>;
}

pub struct VapiClient {
    http_client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl VapiClient {
    pub fn new(http_client: reqwest::Client, api_key: String, base_url: String) -> Self {
        Self {
            http_client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl serde::Serialize,
    ) -> Result<T, VapiError> {
        let resp = self
            .http_client
            .post(format!("{}{path}", self.base_url))
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                error!(error=%e, path, "failed to send request to vapi");
                e
            })?;
        decode(resp).await
    }
}

async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, VapiError> {
    let status = resp.status();
    let body = resp.text().await?;
    debug!(%status, body=%body, "vapi response");
    if status != StatusCode::OK && status != StatusCode::CREATED {
        return Err(VapiError::Status {
            status: status.as_u16(),
            body,
        });
    }
    Ok(serde_json::from_str(&body)?)
}

#[async_trait]
impl VoicePlatform for VapiClient {
    async fn create_assistant(
        &self,
        business: &BusinessDescriptor,
    ) -> Result<Assistant, VapiError> {
        self.post("/assistant", &assistant_payload(business)).await
    }

    async fn create_phone_number(
        &self,
        assistant_id: &str,
        number: Option<&str>,
    ) -> Result<PhoneNumber, VapiError> {
        let payload = CreatePhoneNumberPayload {
            assistant_id: assistant_id.to_string(),
            provider: PHONE_NUMBER_PROVIDER.to_string(),
            number: number.map(str::to_string),
        };
        self.post("/phone-number", &payload).await
    }
}

/// Receptionist assistant configuration templated from the business descriptor.
pub fn assistant_payload(business: &BusinessDescriptor) -> CreateAssistantPayload {
    let name = &business.name;
    let hours = business.hours.as_deref().unwrap_or(DEFAULT_BUSINESS_HOURS);
    let services = business
        .services
        .as_deref()
        .unwrap_or(DEFAULT_BUSINESS_SERVICES);
    let prompt = format!(
        "You are a professional receptionist for {name}.\n\
         Handle calls professionally, take messages, schedule appointments, and answer FAQs.\n\
         Business hours: {hours}\n\
         Services: {services}"
    );

    CreateAssistantPayload {
        name: format!("{name} Receptionist"),
        model: AssistantModel {
            provider: ASSISTANT_MODEL_PROVIDER.to_string(),
            model: ASSISTANT_MODEL.to_string(),
            messages: vec![ModelMessage {
                role: "system".to_string(),
                content: prompt,
            }],
        },
        voice: AssistantVoice {
            provider: ASSISTANT_VOICE_PROVIDER.to_string(),
            voice_id: ASSISTANT_VOICE_ID.to_string(),
        },
        first_message: format!("Thank you for calling {name}. How may I assist you today?"),
    }
}
