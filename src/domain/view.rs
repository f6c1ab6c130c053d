//! Result view derived from the submission state.
//!
//! Pure functions only: the TUI and the headless binary both render from
//! [`ResultView`], never from the raw response.

use super::prediction::PredictionResult;
use super::submission::SubmissionState;

/// Submit control caption while a request is in flight.
pub const SUBMIT_LABEL_LOADING: &str = "Analyse en cours...";

/// Submit control caption otherwise.
pub const SUBMIT_LABEL_DEFAULT: &str = "Évaluer le Risque de Diabète";

/// Format a [0, 1] value as a percentage with one decimal (`0.87` → `"87.0%"`).
#[must_use]
pub fn format_percent(value: f64) -> String {
    format!("{:.1}%", value * 100.0)
}

#[must_use]
pub fn submit_label(state: &SubmissionState) -> &'static str {
    if state.is_loading() {
        SUBMIT_LABEL_LOADING
    } else {
        SUBMIT_LABEL_DEFAULT
    }
}

/// Advice displayed under an assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advisory {
    /// Positive prediction: see a clinician promptly
    Urgent,
    /// Any other prediction value
    Reassuring,
}

impl Advisory {
    /// Binary branch on the raw prediction: only `1` is urgent.
    #[must_use]
    pub fn for_prediction(prediction: i64) -> Self {
        if prediction == 1 {
            Self::Urgent
        } else {
            Self::Reassuring
        }
    }

    #[must_use]
    pub fn title(&self) -> &'static str {
        match self {
            Self::Urgent => "Recommandation importante",
            Self::Reassuring => "Résultat rassurant",
        }
    }

    #[must_use]
    pub fn body(&self) -> &'static str {
        match self {
            Self::Urgent => {
                "Les symptômes indiquent un risque élevé de diabète. Il est fortement recommandé \
                 de consulter un professionnel de santé dans les plus brefs délais pour des \
                 examens complémentaires (glycémie, HbA1c)."
            }
            Self::Reassuring => {
                "Selon l'analyse des symptômes, le risque de diabète semble faible. Continuez à \
                 maintenir un mode de vie sain et consultez régulièrement votre médecin pour des \
                 bilans préventifs."
            }
        }
    }
}

/// One probability bar. Width is `value * 100`, neither clamped nor normalized
/// against the other bar.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbabilityBar {
    pub width: f64,
    pub label: String,
}

impl ProbabilityBar {
    #[must_use]
    pub fn new(value: f64) -> Self {
        Self {
            width: value * 100.0,
            label: format_percent(value),
        }
    }
}

/// Everything shown for a successful assessment.
#[derive(Debug, Clone, PartialEq)]
pub struct AssessmentView {
    pub prediction_label: String,
    pub risk_level: String,
    pub confidence: String,
    pub no_diabetes: ProbabilityBar,
    pub diabetes: ProbabilityBar,
    pub patient_id: Option<String>,
    pub advisory: Advisory,
}

impl AssessmentView {
    #[must_use]
    pub fn from_result(result: &PredictionResult) -> Self {
        Self {
            prediction_label: result.prediction_label.clone(),
            risk_level: result.risk_level.clone(),
            confidence: format_percent(result.confidence),
            no_diabetes: ProbabilityBar::new(result.probabilities.no_diabetes),
            diabetes: ProbabilityBar::new(result.probabilities.diabetes),
            patient_id: result.displayable_patient_id().map(str::to_string),
            advisory: Advisory::for_prediction(result.prediction),
        }
    }
}

/// What the result section shows.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultView {
    /// Idle, loading, or an unsuccessful result
    Nothing,
    Error(String),
    Assessment(AssessmentView),
}

impl ResultView {
    #[must_use]
    pub fn derive(state: &SubmissionState) -> Self {
        match state {
            SubmissionState::Failure(message) => Self::Error(message.clone()),
            SubmissionState::Success(result) if result.success => {
                Self::Assessment(AssessmentView::from_result(result))
            }
            SubmissionState::Success(_) | SubmissionState::Idle | SubmissionState::Loading => {
                Self::Nothing
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::prediction::Probabilities;

    fn result(prediction: i64, confidence: f64) -> PredictionResult {
        PredictionResult {
            success: true,
            prediction,
            prediction_label: "Risque de diabète".to_string(),
            risk_level: "Élevé".to_string(),
            confidence,
            probabilities: Probabilities {
                no_diabetes: 0.13,
                diabetes: 0.87,
            },
            patient_id: Some("N/A".to_string()),
        }
    }

    #[test]
    fn test_positive_assessment_view() {
        let view = ResultView::derive(&SubmissionState::Success(result(1, 0.87)));
        let ResultView::Assessment(view) = view else {
            panic!("expected an assessment");
        };

        assert_eq!(view.confidence, "87.0%");
        assert_eq!(view.diabetes.label, "87.0%");
        assert!((view.diabetes.width - 87.0).abs() < 1e-9);
        assert_eq!(view.no_diabetes.label, "13.0%");
        assert_eq!(view.patient_id, None);
        assert_eq!(view.advisory, Advisory::Urgent);
    }

    #[test]
    fn test_non_one_predictions_are_reassuring() {
        for prediction in [0, 2, -1] {
            let view = AssessmentView::from_result(&result(prediction, 0.99));
            assert_eq!(view.advisory, Advisory::Reassuring);
        }
    }

    #[test]
    fn test_bars_are_not_normalized() {
        let mut r = result(0, 0.6);
        r.probabilities = Probabilities {
            no_diabetes: 0.6,
            diabetes: 0.6,
        };
        let view = AssessmentView::from_result(&r);
        assert_eq!(view.no_diabetes.label, "60.0%");
        assert_eq!(view.diabetes.label, "60.0%");
    }

    #[test]
    fn test_patient_id_shown_when_real() {
        let mut r = result(0, 0.7);
        r.patient_id = Some("P-17".to_string());
        assert_eq!(
            AssessmentView::from_result(&r).patient_id.as_deref(),
            Some("P-17")
        );
    }

    #[test]
    fn test_other_states_render_nothing_or_error() {
        assert_eq!(ResultView::derive(&SubmissionState::Idle), ResultView::Nothing);
        assert_eq!(ResultView::derive(&SubmissionState::Loading), ResultView::Nothing);

        let mut unsuccessful = result(1, 0.5);
        unsuccessful.success = false;
        assert_eq!(
            ResultView::derive(&SubmissionState::Success(unsuccessful)),
            ResultView::Nothing
        );

        assert_eq!(
            ResultView::derive(&SubmissionState::Failure("boom".to_string())),
            ResultView::Error("boom".to_string())
        );
    }

    #[test]
    fn test_submit_label_tracks_loading() {
        assert_eq!(submit_label(&SubmissionState::Loading), SUBMIT_LABEL_LOADING);
        assert_eq!(submit_label(&SubmissionState::Idle), SUBMIT_LABEL_DEFAULT);
        assert_eq!(
            submit_label(&SubmissionState::Failure(String::new())),
            SUBMIT_LABEL_DEFAULT
        );
    }
}
