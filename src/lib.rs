//! # Glycoscreen
//!
//! Diabetes symptom intake for a remote risk-prediction service.
//!
//! This crate provides:
//! - A form controller that collects 16 symptom indicators, validates them,
//!   submits them, and derives the result view from the response
//! - An HTTP client for the prediction service
//! - Terminal UI for clinic front desks
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Core business types (form, payload, prediction, view)
//! - `ports`: Trait definitions for external operations
//! - `adapters`: Concrete implementations (reqwest, log redaction)
//! - `application`: The form controller and its submission worker
//! - `config`: Service location, injected at construction
//! - `tui`: Terminal user interface

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod tui;

pub use application::FormController;
pub use config::ClientConfig;
pub use domain::{FieldName, FormState, PredictionResult, SubmissionState};

/// Result type for Glycoscreen operations
pub type Result<T> = std::result::Result<T, GlycoscreenError>;

/// Main error type for Glycoscreen
#[derive(Debug, thiserror::Error)]
pub enum GlycoscreenError {
    #[error("HTTP client setup failed: {0}")]
    Client(#[from] adapters::ClientError),

    #[error("Invalid form data: {0}")]
    Validation(#[from] domain::ValidationError),

    #[error("Prediction failed: {0}")]
    Prediction(#[from] domain::PredictionError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
