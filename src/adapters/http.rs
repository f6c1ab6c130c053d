//! HTTP adapter for the prediction service (reqwest, blocking).
//!
//! Contract:
//! - `POST {base_url}{predict_path}` with a JSON [`RequestPayload`]
//! - success status: body parsed as [`PredictionResult`]
//! - any other status: only the numeric code is surfaced, the body is dropped
//! - `GET {base_url}{health_path}` is bounded by [`HEALTH_TIMEOUT`] even when
//!   predictions are not

use std::error::Error as _;
use std::time::Duration;

use crate::config::ClientConfig;
use crate::domain::{PredictionError, PredictionResult, RequestPayload, ServiceHealth};
use crate::ports::PredictionApi;

/// Upper bound on a health check, independent of the request timeout.
pub const HEALTH_TIMEOUT: Duration = Duration::from_secs(3);

/// Errors raised while setting up the client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}

/// Prediction service client over HTTP/JSON.
pub struct HttpPredictionClient {
    client: reqwest::blocking::Client,
    predict_url: String,
    health_url: String,
}

impl HttpPredictionClient {
    /// Create a client for the configured service.
    ///
    /// # Errors
    /// Returns error if the TLS backend cannot be initialized.
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("glycoscreen/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            predict_url: config.predict_url(),
            health_url: config.health_url(),
        })
    }

    #[must_use]
    pub fn predict_url(&self) -> &str {
        &self.predict_url
    }

    /// Read the body of a success response, or map the status to an error.
    fn success_body(response: reqwest::blocking::Response) -> Result<String, PredictionError> {
        let status = response.status();
        if !status.is_success() {
            tracing::warn!("Prediction service answered with status {}", status.as_u16());
            return Err(PredictionError::Status(status.as_u16()));
        }
        response.text().map_err(transport_error)
    }
}

/// Flatten a reqwest error and its causes into one readable line.
fn transport_error(err: reqwest::Error) -> PredictionError {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    tracing::warn!("Prediction service unreachable: {}", message);
    PredictionError::Transport(message)
}

impl PredictionApi for HttpPredictionClient {
    fn predict(&self, payload: &RequestPayload) -> Result<PredictionResult, PredictionError> {
        tracing::debug!("POST {}", self.predict_url);

        let response = self
            .client
            .post(&self.predict_url)
            .json(payload)
            .send()
            .map_err(transport_error)?;

        let body = Self::success_body(response)?;
        let result = PredictionResult::parse(&body)?;

        tracing::info!(
            "Prediction received: prediction={}, confidence={:.1}%, risk={}",
            result.prediction,
            result.confidence * 100.0,
            result.risk_level
        );

        Ok(result)
    }

    fn health(&self) -> Result<ServiceHealth, PredictionError> {
        tracing::debug!("GET {}", self.health_url);

        let response = self
            .client
            .get(&self.health_url)
            .timeout(HEALTH_TIMEOUT)
            .send()
            .map_err(transport_error)?;

        let body = Self::success_body(response)?;
        ServiceHealth::parse(&body)
    }
}
