//! Form-submission controller.
//!
//! Owns the form values and the submission lifecycle:
//! `Idle → Loading → Success | Failure`, with validation failures going
//! straight to `Failure` without a request.
//!
//! Invariants:
//! - at most one request in flight; `submit()` while `Loading` is refused
//! - `Loading` always settles to `Success` or `Failure`
//! - an outcome from a submission abandoned by `reset()` is never applied

use std::sync::mpsc::{Receiver, RecvTimeoutError, TryRecvError};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

use crate::domain::view::{self, ResultView};
use crate::domain::{
    FieldName, FormState, PredictionError, ServiceHealth, SubmissionState, ValidationError,
};
use crate::ports::PredictionApi;

use super::worker::{SubmissionHandle, SubmissionOutcome, SubmissionWorker};

/// Prefix of every request failure message.
pub const PREDICTION_ERROR_PREFIX: &str = "Erreur lors de la prédiction: ";

/// What `submit()` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Request sent; state is `Loading`
    Dispatched,
    /// Form rejected; state is `Failure`, no request sent
    Invalid,
    /// A request is already in flight; nothing changed
    Busy,
}

/// Read-only view of the controller for rendering.
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    pub form: &'a FormState,
    pub state: &'a SubmissionState,
}

/// Controller for the symptom intake form.
pub struct FormController<A: PredictionApi> {
    api: Arc<A>,
    form: FormState,
    state: SubmissionState,
    pending: Option<SubmissionHandle>,
    /// Bumped on every submission and reset
    generation: u64,
    completed_at: Option<DateTime<Utc>>,
}

impl<A: PredictionApi + 'static> FormController<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            form: FormState::new(),
            state: SubmissionState::Idle,
            pending: None,
            generation: 0,
            completed_at: None,
        }
    }

    /// Overwrite one field. No validation until submit.
    pub fn set_field(&mut self, field: FieldName, value: impl Into<String>) {
        self.form.set(field, value);
    }

    /// Overwrite one field addressed by its wire key.
    ///
    /// # Errors
    /// Returns `ValidationError::UnknownField` if `name` is not one of the 16 keys.
    pub fn set_field_by_name(
        &mut self,
        name: &str,
        value: impl Into<String>,
    ) -> Result<(), ValidationError> {
        let field: FieldName = name.parse()?;
        self.set_field(field, value);
        Ok(())
    }

    #[must_use]
    pub fn field(&self, field: FieldName) -> &str {
        self.form.get(field)
    }

    #[must_use]
    pub fn form(&self) -> &FormState {
        &self.form
    }

    #[must_use]
    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    #[must_use]
    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            form: &self.form,
            state: &self.state,
        }
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    #[must_use]
    pub fn result_view(&self) -> ResultView {
        ResultView::derive(&self.state)
    }

    #[must_use]
    pub fn submit_label(&self) -> &'static str {
        view::submit_label(&self.state)
    }

    /// When the current `Success` was received.
    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Fill the form with the example patient.
    pub fn load_sample(&mut self) {
        self.form = FormState::sample();
    }

    /// Validate the form and, if valid, send it to the prediction service.
    pub fn submit(&mut self) -> SubmitOutcome {
        if self.state.is_loading() {
            tracing::debug!("Submit ignored: a request is already in flight");
            return SubmitOutcome::Busy;
        }

        let payload = match self.form.validate() {
            Ok(payload) => payload,
            Err(e) => {
                log_rejection(&e);
                self.state = SubmissionState::Failure(e.to_string());
                self.completed_at = None;
                return SubmitOutcome::Invalid;
            }
        };

        self.generation += 1;
        self.state = SubmissionState::Loading;
        self.completed_at = None;

        tracing::info!("Submitting assessment #{}", self.generation);
        self.pending = Some(SubmissionWorker::spawn(
            Arc::clone(&self.api),
            payload,
            self.generation,
        ));

        SubmitOutcome::Dispatched
    }

    /// Apply the outcome of the in-flight request if it has settled.
    ///
    /// Returns `true` if the state changed.
    pub fn poll(&mut self) -> bool {
        let Some(handle) = self.pending.as_ref() else {
            return false;
        };

        match handle.try_recv() {
            Ok(outcome) => self.apply(outcome),
            Err(TryRecvError::Empty) => false,
            Err(TryRecvError::Disconnected) => {
                self.worker_lost();
                true
            }
        }
    }

    /// Block until the in-flight request settles or `timeout` elapses.
    ///
    /// Returns `true` if nothing is left in flight.
    pub fn wait(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;

        while let Some(handle) = self.pending.as_ref() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match handle.recv_timeout(remaining) {
                Ok(outcome) => {
                    self.apply(outcome);
                }
                Err(RecvTimeoutError::Timeout) => return false,
                Err(RecvTimeoutError::Disconnected) => self.worker_lost(),
            }
        }

        !self.state.is_loading()
    }

    /// Start over: empty form, `Idle`, and any in-flight request abandoned.
    pub fn reset(&mut self) {
        if self.pending.take().is_some() {
            tracing::info!("Abandoning in-flight assessment #{}", self.generation);
        }
        self.generation += 1;
        self.form.clear();
        self.state = SubmissionState::Idle;
        self.completed_at = None;
    }

    /// Query the service's health endpoint (blocking).
    ///
    /// # Errors
    /// Returns the transport/status/shape error from the service.
    pub fn check_health(&self) -> Result<ServiceHealth, PredictionError> {
        self.api.health()
    }

    /// Query the service's health endpoint on a background thread.
    pub fn check_health_in_background(&self) -> Receiver<Result<ServiceHealth, PredictionError>> {
        SubmissionWorker::spawn_health(Arc::clone(&self.api))
    }

    fn apply(&mut self, outcome: SubmissionOutcome) -> bool {
        if outcome.generation != self.generation {
            tracing::debug!("Discarding stale outcome of assessment #{}", outcome.generation);
            if self
                .pending
                .as_ref()
                .is_some_and(|handle| handle.generation() == outcome.generation)
            {
                self.pending = None;
            }
            return false;
        }

        self.pending = None;
        match outcome.result {
            Ok(result) => {
                tracing::info!("Assessment #{} succeeded", outcome.generation);
                self.completed_at = Some(Utc::now());
                self.state = SubmissionState::Success(result);
            }
            Err(e) => {
                tracing::warn!("Assessment #{} failed: {}", outcome.generation, e);
                self.state = SubmissionState::Failure(format!("{PREDICTION_ERROR_PREFIX}{e}"));
            }
        }
        true
    }

    fn worker_lost(&mut self) {
        tracing::error!("Submission worker for assessment #{} stopped without answering", self.generation);
        self.pending = None;
        self.state = SubmissionState::Failure(format!(
            "{PREDICTION_ERROR_PREFIX}la requête a été interrompue"
        ));
    }
}

/// Log why a form was refused, naming fields but never their values.
fn log_rejection(err: &ValidationError) {
    match err {
        ValidationError::MissingFields(fields) => {
            let names: Vec<&str> = fields.iter().map(FieldName::as_str).collect();
            tracing::info!("Form incomplete, missing: {}", names.join(", "));
        }
        ValidationError::InvalidAge(_) => tracing::info!("Form rejected: invalid age"),
        ValidationError::InvalidChoice { field, .. } => {
            tracing::info!("Form rejected: invalid value for {}", field);
        }
        ValidationError::UnknownField(name) => {
            tracing::info!("Form rejected: unknown field {}", name);
        }
    }
}
