//! Adapters layer: Concrete implementations of ports.
//!
//! - `http`: reqwest client for the prediction service
//! - `sanitize`: identifier redaction for logs

pub mod http;
pub mod sanitize;

pub use http::{ClientError, HttpPredictionClient, HEALTH_TIMEOUT};
