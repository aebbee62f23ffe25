use crate::store::StoreError;
use crate::stripe::StripeError;
use crate::vapi::VapiError;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{error, warn};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("voice platform: {0}")]
    Vapi(#[from] VapiError),
    #[error("payment processor: {0}")]
    Payment(#[from] StripeError),
    #[error("document store: {0}")]
    Store(#[from] StoreError),
    #[error("configuration: {0}")]
    Config(String),
}

/// Payment failures are the only client-facing errors; everything else is an opaque 500.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Payment(e) => {
                match &e {
                    StripeError::Api {
                        status, kind, code, ..
                    } => warn!(
                        error=%e,
                        status,
                        ?kind,
                        ?code,
                        "payment processor rejected request"
                    ),
                    _ => error!(error=%e, "payment processor request failed"),
                }
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "error": e.to_string() })),
                )
                    .into_response()
            }
            e => {
                error!(error=%e, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn payment_errors_become_bad_request_with_message() {
        let err = AppError::Payment(StripeError::Api {
            status: 402,
            message: "Your card was declined.".to_string(),
            kind: Some("card_error".to_string()),
            code: Some("card_declined".to_string()),
        });
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = hyper::body::to_bytes(response.into_body()).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["error"], "Your card was declined.");
    }

    #[test]
    fn other_errors_are_internal() {
        let err = AppError::Vapi(VapiError::Status {
            status: 401,
            body: "unauthorized".to_string(),
        });
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
