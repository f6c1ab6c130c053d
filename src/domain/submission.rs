//! Submission lifecycle.

use super::prediction::PredictionResult;

/// Where the current assessment stands. Exactly one variant holds at a time.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SubmissionState {
    /// Nothing submitted yet, or reset
    #[default]
    Idle,
    /// A request is in flight
    Loading,
    /// The service returned an assessment
    Success(PredictionResult),
    /// Validation or request failure, with the user-facing message
    Failure(String),
}

impl SubmissionState {
    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    #[must_use]
    pub fn result(&self) -> Option<&PredictionResult> {
        match self {
            Self::Success(result) => Some(result),
            _ => None,
        }
    }

    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Failure(message) => Some(message),
            _ => None,
        }
    }
}
