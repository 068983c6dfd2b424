//! Thin HTTP client for the proxy's cart API.

use reqwest::StatusCode;
use rye_cart_core::{BusinessErrorResponse, ErrorResponse};
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;
use url::Url;

/// Errors from talking to the proxy.
#[derive(Debug, Error)]
pub enum CliError {
    /// The proxy could not be reached or its body could not be read.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The base URL cannot be joined with an API path.
    #[error("Invalid base URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The proxy answered with a non-success status.
    #[error("proxy returned HTTP {status}: {message}")]
    Rejected { status: u16, message: String },
}

/// Client for `POST /api/*` on a running proxy.
pub struct ProxyClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ProxyClient {
    /// Create a client for the proxy at `base_url`.
    ///
    /// A path prefix in `base_url` is kept, with or without a trailing slash.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(mut base_url: Url) -> Result<Self, CliError> {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let http = reqwest::Client::builder()
            .user_agent(concat!("rye-cli/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http, base_url })
    }

    /// Post `body` to `path`, relative to the base URL, and decode the
    /// success body as `T`.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Rejected`] for any non-2xx status, carrying the
    /// proxy's `error` message or its business errors.
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, CliError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.base_url.join(path.trim_start_matches('/'))?;
        tracing::debug!(%url, "POST");

        let response = self.http.post(url).json(body).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let text = response.text().await?;
        Err(CliError::Rejected {
            status: status.as_u16(),
            message: describe_failure(status, &text),
        })
    }
}

/// Summarize a failed response body.
fn describe_failure(status: StatusCode, body: &str) -> String {
    if let Ok(ErrorResponse { error }) = serde_json::from_str(body) {
        return error;
    }
    if let Ok(BusinessErrorResponse { errors }) = serde_json::from_str(body) {
        return errors
            .iter()
            .map(|e| format!("[{}] {}", e.code, e.message))
            .collect::<Vec<_>>()
            .join("; ");
    }
    if body.trim().is_empty() {
        return status.canonical_reason().unwrap_or("no body").to_string();
    }
    body.chars().take(200).collect()
}
