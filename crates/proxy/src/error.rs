//! Unified error handling with Sentry integration.
//!
//! Provides the `AppError` type every API handler returns. Client-side
//! failures (no active cart, missing input, business errors from Rye) are
//! answered with 400 and their detail; upstream failures are logged, captured
//! to Sentry, and answered with 500 and a static message only.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rye_cart_core::{BusinessError, BusinessErrorResponse, ErrorResponse};
use thiserror::Error;

use crate::payment::PaymentTokenError;
use crate::rye::RyeError;

/// Application-level error type for the proxy API.
#[derive(Debug, Error)]
pub enum AppError {
    /// The operation needs an active cart and none exists.
    #[error("{0}")]
    NoActiveCart(&'static str),

    /// Rye refused the mutation.
    #[error("Rejected by Rye: {}", format_business_errors(.0))]
    Business(Vec<BusinessError>),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Talking to Rye failed. `message` is all the client sees.
    #[error("{message}: {source}")]
    Upstream {
        message: &'static str,
        #[source]
        source: RyeError,
    },

    /// No payment token could be obtained for submission.
    #[error("{message}: {source}")]
    Payment {
        message: &'static str,
        #[source]
        source: PaymentTokenError,
    },
}

impl AppError {
    /// Wrap a Rye failure with the static message shown to the client.
    #[must_use]
    pub const fn upstream(message: &'static str, source: RyeError) -> Self {
        Self::Upstream { message, source }
    }
}

fn format_business_errors(errors: &[BusinessError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.code, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            Self::Business(errors) => {
                tracing::info!(count = errors.len(), "Rye rejected mutation");
                (
                    StatusCode::BAD_REQUEST,
                    Json(BusinessErrorResponse { errors }),
                )
                    .into_response()
            }
            Self::NoActiveCart(message) => error_response(StatusCode::BAD_REQUEST, message),
            Self::BadRequest(message) => error_response(StatusCode::BAD_REQUEST, &message),
            Self::Upstream { message, .. } | Self::Payment { message, .. } => {
                // Capture server errors to Sentry; the detail never reaches the client
                let event_id = sentry::capture_error(&self);
                tracing::error!(
                    error = %self,
                    sentry_event_id = %event_id,
                    "Request error"
                );
                error_response(StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        }
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
        .into_response()
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::to_bytes;
    use serde_json::{Value, json};

    use super::*;

    async fn render(err: AppError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NoActiveCart("No cart exists yet!");
        assert_eq!(err.to_string(), "No cart exists yet!");

        let err = AppError::BadRequest("productId is required".to_string());
        assert_eq!(err.to_string(), "Bad request: productId is required");
    }

    #[tokio::test]
    async fn test_no_active_cart_body() {
        let (status, body) = render(AppError::NoActiveCart("No cart exists yet!")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "No cart exists yet!" }));
    }

    #[tokio::test]
    async fn test_business_errors_are_relayed_verbatim() {
        let errors = vec![BusinessError {
            code: "INVALID_PRODUCT".to_string(),
            message: "Product B000 not found".to_string(),
        }];
        let (status, body) = render(AppError::Business(errors)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({ "errors": [{ "code": "INVALID_PRODUCT", "message": "Product B000 not found" }] })
        );
    }

    #[tokio::test]
    async fn test_upstream_error_hides_detail() {
        let source = RyeError::Status {
            status: 503,
            body: "secret upstream diagnostics".to_string(),
        };
        let (status, body) = render(AppError::upstream("Error creating cart", source)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "Error creating cart" }));
    }

    #[tokio::test]
    async fn test_payment_error_hides_detail() {
        let err = AppError::Payment {
            message: "Error submitting cart",
            source: PaymentTokenError::Unavailable("vault offline".to_string()),
        };
        let (status, body) = render(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "Error submitting cart" }));
    }
}
