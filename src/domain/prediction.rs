//! Prediction service response types.
//!
//! The service answers with either a full assessment or a
//! `{success: false, error, message}` rejection. Bodies are parsed into an
//! all-optional envelope first so that shape mismatches become a typed
//! [`PredictionError::MalformedResponse`] instead of a rendering failure.

use serde::{Deserialize, Serialize};

/// Errors surfaced by a prediction round-trip.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PredictionError {
    /// Connection refused, DNS failure, timeout, interrupted body...
    #[error("{0}")]
    Transport(String),

    /// Non-success HTTP status. The body is not read.
    #[error("Erreur HTTP: {0}")]
    Status(u16),

    /// Success status, but the body is not a valid assessment.
    #[error("Réponse invalide du service: {0}")]
    MalformedResponse(String),

    /// The service answered `success: false`.
    #[error("Prédiction refusée par le service: {0}")]
    Rejected(String),
}

/// Class probabilities as returned by the service. Not normalized here.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Probabilities {
    pub no_diabetes: f64,
    pub diabetes: f64,
}

/// A successful assessment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    pub success: bool,
    /// 1 = diabetes predicted; anything else is treated as negative
    pub prediction: i64,
    pub prediction_label: String,
    pub risk_level: String,
    /// Confidence in [0, 1]
    pub confidence: f64,
    pub probabilities: Probabilities,
    /// Absent when the service reports no identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<String>,
}

/// Placeholder the service sends when no patient id is known.
pub const NO_PATIENT_ID: &str = "N/A";

#[derive(Deserialize)]
struct Envelope {
    success: Option<bool>,
    prediction: Option<i64>,
    prediction_label: Option<String>,
    risk_level: Option<String>,
    confidence: Option<f64>,
    probabilities: Option<Probabilities>,
    patient_id: Option<serde_json::Value>,
    error: Option<String>,
    message: Option<String>,
}

fn required<T>(value: Option<T>, name: &str) -> Result<T, PredictionError> {
    value.ok_or_else(|| PredictionError::MalformedResponse(format!("champ manquant: {name}")))
}

impl PredictionResult {
    /// Parse a success-status response body.
    ///
    /// # Errors
    /// - [`PredictionError::MalformedResponse`] if the body is not JSON or a
    ///   required field is absent or mistyped
    /// - [`PredictionError::Rejected`] if the service reported `success: false`
    pub fn parse(body: &str) -> Result<Self, PredictionError> {
        let envelope: Envelope = serde_json::from_str(body)
            .map_err(|e| PredictionError::MalformedResponse(e.to_string()))?;

        if !required(envelope.success, "success")? {
            let reason = envelope
                .error
                .or(envelope.message)
                .unwrap_or_else(|| "raison inconnue".to_string());
            return Err(PredictionError::Rejected(reason));
        }

        let patient_id = match envelope.patient_id {
            None | Some(serde_json::Value::Null) => None,
            Some(serde_json::Value::String(id)) => Some(id),
            Some(other) => Some(other.to_string()),
        };

        Ok(Self {
            success: true,
            prediction: required(envelope.prediction, "prediction")?,
            prediction_label: required(envelope.prediction_label, "prediction_label")?,
            risk_level: required(envelope.risk_level, "risk_level")?,
            confidence: required(envelope.confidence, "confidence")?,
            probabilities: required(envelope.probabilities, "probabilities")?,
            patient_id,
        })
    }

    /// Patient id worth displaying: present and not the `"N/A"` placeholder.
    #[must_use]
    pub fn displayable_patient_id(&self) -> Option<&str> {
        self.patient_id
            .as_deref()
            .filter(|id| !id.is_empty() && *id != NO_PATIENT_ID)
    }
}

/// Service status as reported by `GET /health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceHealth {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub model_info: Option<serde_json::Value>,
}

impl ServiceHealth {
    /// Parse a `/health` response body.
    ///
    /// # Errors
    /// Returns [`PredictionError::MalformedResponse`] if the body does not match.
    pub fn parse(body: &str) -> Result<Self, PredictionError> {
        serde_json::from_str(body).map_err(|e| PredictionError::MalformedResponse(e.to_string()))
    }

    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }

    /// Model type reported by the service, if any.
    #[must_use]
    pub fn model_type(&self) -> Option<&str> {
        self.model_info
            .as_ref()
            .and_then(|info| info.get("model_type"))
            .and_then(serde_json::Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SERVICE_BODY: &str = r#"{
        "success": true,
        "patient_id": "N/A",
        "prediction": 1,
        "prediction_label": "Diabète détecté",
        "probabilities": {"no_diabetes": 0.13, "diabetes": 0.87},
        "confidence": 0.87,
        "risk_level": "Très élevé",
        "input_data": {"age": 45}
    }"#;

    #[test]
    fn test_parse_full_assessment() {
        let result = PredictionResult::parse(SERVICE_BODY).expect("Should parse");
        assert!(result.success);
        assert_eq!(result.prediction, 1);
        assert_eq!(result.risk_level, "Très élevé");
        assert!((result.probabilities.diabetes - 0.87).abs() < f64::EPSILON);
        assert_eq!(result.patient_id.as_deref(), Some("N/A"));
        assert_eq!(result.displayable_patient_id(), None);
    }

    #[test]
    fn test_rejection_is_surfaced() {
        let body = r#"{"success": false, "error": "Champ manquant: age", "message": "Erreur lors de la prédiction"}"#;
        assert_eq!(
            PredictionResult::parse(body),
            Err(PredictionError::Rejected("Champ manquant: age".to_string()))
        );

        let body = r#"{"success": false}"#;
        assert!(matches!(
            PredictionResult::parse(body),
            Err(PredictionError::Rejected(_))
        ));
    }

    #[test]
    fn test_missing_field_is_malformed() {
        let body = r#"{"success": true, "prediction": 0, "prediction_label": "x", "risk_level": "Faible", "confidence": 0.9}"#;
        match PredictionResult::parse(body) {
            Err(PredictionError::MalformedResponse(msg)) => assert!(msg.contains("probabilities")),
            other => panic!("expected malformed response, got {other:?}"),
        }
    }

    #[test]
    fn test_non_json_is_malformed() {
        assert!(matches!(
            PredictionResult::parse("<html>502</html>"),
            Err(PredictionError::MalformedResponse(_))
        ));
        assert!(matches!(
            PredictionResult::parse(r#"{"success": true, "confidence": "high"}"#),
            Err(PredictionError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_patient_id_display_rules() {
        let mut result = PredictionResult::parse(SERVICE_BODY).expect("Should parse");
        result.patient_id = Some("P-0042".to_string());
        assert_eq!(result.displayable_patient_id(), Some("P-0042"));
        result.patient_id = None;
        assert_eq!(result.displayable_patient_id(), None);
    }

    #[test]
    fn test_health_parsing() {
        let body = r#"{"status": "healthy", "model_info": {"model_type": "RandomForestClassifier"}, "message": "API et modèle opérationnels"}"#;
        let health = ServiceHealth::parse(body).expect("Should parse");
        assert!(health.is_healthy());
        assert_eq!(health.model_type(), Some("RandomForestClassifier"));
    }
}
