//! Ports layer: Trait definitions for external operations.
//!
//! Following Hexagonal Architecture, these traits define the boundary
//! between the form controller and the remote prediction service.

mod prediction_api;

pub use crate::domain::PredictionError;
pub use prediction_api::PredictionApi;
