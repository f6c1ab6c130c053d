//! Domain layer: Core business types and logic.
//!
//! Pure types with no I/O: the intake form, the request body, the service
//! response, the submission lifecycle and the view derived from it.

mod form;
mod payload;
mod prediction;
mod submission;
pub mod view;

pub use form::{FieldKind, FieldName, FormState, ValidationError, AGE_RANGE, MISSING_FIELDS_MESSAGE};
pub use payload::RequestPayload;
pub use prediction::{PredictionError, PredictionResult, Probabilities, ServiceHealth, NO_PATIENT_ID};
pub use submission::SubmissionState;
pub use view::{Advisory, AssessmentView, ProbabilityBar, ResultView};
