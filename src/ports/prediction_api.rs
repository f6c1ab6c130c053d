//! Prediction service port: Trait for the remote diabetes-risk model.
//!
//! This trait abstracts the transport (HTTP today) from the form controller,
//! so the controller can be driven by an in-process fake in tests.

use crate::domain::{PredictionError, PredictionResult, RequestPayload, ServiceHealth};

/// Trait for prediction service operations.
///
/// Calls are blocking; the controller runs them on a worker thread.
pub trait PredictionApi: Send + Sync {
    /// Submit one symptom record and return the assessment.
    ///
    /// # Errors
    /// - `PredictionError::Transport` if the service cannot be reached
    /// - `PredictionError::Status` on a non-success status code
    /// - `PredictionError::MalformedResponse` if the body is not an assessment
    /// - `PredictionError::Rejected` if the service reports `success: false`
    fn predict(&self, payload: &RequestPayload) -> Result<PredictionResult, PredictionError>;

    /// Query the service's health endpoint.
    ///
    /// # Errors
    /// Same mapping as [`PredictionApi::predict`].
    fn health(&self) -> Result<ServiceHealth, PredictionError>;
}
