//! Application layer: Use cases and services.
//!
//! The form controller orchestrates the domain types with the prediction
//! port; the worker keeps the network call off the UI thread.

mod controller;
mod worker;

pub use controller::{FormController, Snapshot, SubmitOutcome, PREDICTION_ERROR_PREFIX};
pub use worker::{SubmissionHandle, SubmissionOutcome, SubmissionWorker};
