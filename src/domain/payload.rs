//! Request body sent to the prediction service.

use serde::{Deserialize, Serialize};

use super::form::{FieldName, FormState};

/// Validated symptom record, ready to be JSON-encoded.
///
/// Only built by [`FormState::validate`], so every field is non-empty and
/// `age` is always an integer.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestPayload {
    pub age: u8,
    pub gender: String,
    pub polyuria: String,
    pub polydipsia: String,
    pub sudden_weight_loss: String,
    pub weakness: String,
    pub polyphagia: String,
    pub genital_thrush: String,
    pub visual_blurring: String,
    pub itching: String,
    pub irritability: String,
    pub delayed_healing: String,
    pub partial_paresis: String,
    pub muscle_stiffness: String,
    pub alopecia: String,
    pub obesity: String,
}

impl std::fmt::Debug for RequestPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("RequestPayload { .. }")
    }
}

impl RequestPayload {
    pub(crate) fn from_validated(age: u8, form: &FormState) -> Self {
        let value = |field: FieldName| form.get(field).to_string();
        Self {
            age,
            gender: value(FieldName::Gender),
            polyuria: value(FieldName::Polyuria),
            polydipsia: value(FieldName::Polydipsia),
            sudden_weight_loss: value(FieldName::SuddenWeightLoss),
            weakness: value(FieldName::Weakness),
            polyphagia: value(FieldName::Polyphagia),
            genital_thrush: value(FieldName::GenitalThrush),
            visual_blurring: value(FieldName::VisualBlurring),
            itching: value(FieldName::Itching),
            irritability: value(FieldName::Irritability),
            delayed_healing: value(FieldName::DelayedHealing),
            partial_paresis: value(FieldName::PartialParesis),
            muscle_stiffness: value(FieldName::MuscleStiffness),
            alopecia: value(FieldName::Alopecia),
            obesity: value(FieldName::Obesity),
        }
    }

    /// JSON body as sent on the wire.
    ///
    /// # Errors
    /// Returns error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_age_is_encoded_as_json_number() {
        let payload = FormState::sample().validate().expect("sample is valid");
        let json: serde_json::Value =
            serde_json::from_str(&payload.to_json().expect("serializes")).expect("parses");

        assert_eq!(json["age"], serde_json::json!(25));
        assert!(json["age"].is_u64());
    }

    #[test]
    fn test_other_fields_copy_form_strings() {
        let form = FormState::sample();
        let payload = form.validate().expect("sample is valid");
        let json = serde_json::to_value(&payload).expect("serializes");
        let object = json.as_object().expect("object");

        assert_eq!(object.len(), FieldName::COUNT);
        for (field, value) in form.iter().skip(1) {
            assert_eq!(object[field.as_str()], serde_json::json!(value));
        }
    }
}
