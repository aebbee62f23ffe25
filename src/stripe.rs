use crate::stripe_types::{
    CreateCustomerForm, CreateSubscriptionForm, Customer, ErrorEnvelope, Subscription,
};

use async_trait::async_trait;
use reqwest::header;
use serde::de::DeserializeOwned;
use tracing::{debug, error};

#[derive(Debug, thiserror::Error)]
pub enum StripeError {
    /// Rejected by the API; `message` is what the caller gets to see.
    #[error("{message}")]
    Api {
        status: u16,
        message: String,
        kind: Option<String>,
        code: Option<String>,
    },
    #[error("could not reach payment processor: {0}")]
    Connection(#[from] reqwest::Error),
    #[error("could not encode request: {0}")]
    Encode(#[from] serde_urlencoded::ser::Error),
}

#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    async fn create_customer(&self, email: &str, source: &str) -> Result<Customer, StripeError>;

    /// Subscribe a customer to the configured price.
    async fn create_subscription(&self, customer_id: &str) -> Result<Subscription, StripeError>;
}

pub struct StripeClient {
    http_client: reqwest::Client,
    secret_key: String,
    price_id: String,
    base_url: String,
}

impl StripeClient {
    pub fn new(
        http_client: reqwest::Client,
        secret_key: String,
        price_id: String,
        base_url: String,
    ) -> Self {
        Self {
            http_client,
            secret_key,
            price_id,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn post_form<T: DeserializeOwned>(
        &self,
        path: &str,
        form: &impl serde::Serialize,
    ) -> Result<T, StripeError> {
        let body = serde_urlencoded::to_string(form)?;
        let resp = self
            .http_client
            .post(format!("{}{path}", self.base_url))
            .basic_auth(&self.secret_key, None::<&str>)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await
            .map_err(|e| {
                error!(error=%e, path, "failed to send request to stripe");
                e
            })?;

        let status = resp.status();
        if status.is_success() {
            return Ok(resp.json().await?);
        }

        let raw = resp.text().await?;
        debug!(%status, body=%raw, "stripe error response");
        let (message, kind, code) = match serde_json::from_str::<ErrorEnvelope>(&raw) {
            Ok(envelope) => (
                envelope
                    .error
                    .message
                    .unwrap_or_else(|| format!("request failed with status {status}")),
                envelope.error.kind,
                envelope.error.code,
            ),
            Err(_) => (format!("request failed with status {status}"), None, None),
        };
        Err(StripeError::Api {
            status: status.as_u16(),
            message,
            kind,
            code,
        })
    }
}

#[async_trait]
impl PaymentProcessor for StripeClient {
    async fn create_customer(&self, email: &str, source: &str) -> Result<Customer, StripeError> {
        self.post_form("/v1/customers", &CreateCustomerForm { email, source })
            .await
    }

    async fn create_subscription(&self, customer_id: &str) -> Result<Subscription, StripeError> {
        let form = CreateSubscriptionForm {
            customer: customer_id,
            price: &self.price_id,
        };
        self.post_form("/v1/subscriptions", &form).await
    }
}
