//! Symptom intake form: the 16 fixed fields and their validation.
//!
//! Field order matches the prediction service's feature columns.

use std::fmt;
use std::str::FromStr;

use zeroize::Zeroize;

use super::payload::RequestPayload;

/// Message shown when at least one field is left empty.
pub const MISSING_FIELDS_MESSAGE: &str = "Veuillez remplir tous les champs du formulaire.";

/// Accepted age range (years, inclusive).
pub const AGE_RANGE: std::ops::RangeInclusive<u8> = 0..=120;

/// The kind of value a field accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Integer number of years
    Age,
    /// "Male" or "Female"
    Gender,
    /// "Yes" or "No"
    YesNo,
}

impl FieldKind {
    /// Allowed values for categorical kinds. Empty for `Age`.
    #[must_use]
    pub fn choices(&self) -> &'static [&'static str] {
        match self {
            Self::Age => &[],
            Self::Gender => &["Male", "Female"],
            Self::YesNo => &["Yes", "No"],
        }
    }

    /// French caption for a wire value, as displayed next to the choice.
    #[must_use]
    pub fn caption(value: &str) -> &str {
        match value {
            "Male" => "Homme",
            "Female" => "Femme",
            "Yes" => "Oui",
            "No" => "Non",
            other => other,
        }
    }
}

/// One of the 16 fixed form keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldName {
    Age,
    Gender,
    Polyuria,
    Polydipsia,
    SuddenWeightLoss,
    Weakness,
    Polyphagia,
    GenitalThrush,
    VisualBlurring,
    Itching,
    Irritability,
    DelayedHealing,
    PartialParesis,
    MuscleStiffness,
    Alopecia,
    Obesity,
}

impl FieldName {
    /// Number of form fields.
    pub const COUNT: usize = 16;

    /// All fields in wire order.
    pub const ALL: [FieldName; Self::COUNT] = [
        Self::Age,
        Self::Gender,
        Self::Polyuria,
        Self::Polydipsia,
        Self::SuddenWeightLoss,
        Self::Weakness,
        Self::Polyphagia,
        Self::GenitalThrush,
        Self::VisualBlurring,
        Self::Itching,
        Self::Irritability,
        Self::DelayedHealing,
        Self::PartialParesis,
        Self::MuscleStiffness,
        Self::Alopecia,
        Self::Obesity,
    ];

    /// JSON key used by the prediction service.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Age => "age",
            Self::Gender => "gender",
            Self::Polyuria => "polyuria",
            Self::Polydipsia => "polydipsia",
            Self::SuddenWeightLoss => "sudden_weight_loss",
            Self::Weakness => "weakness",
            Self::Polyphagia => "polyphagia",
            Self::GenitalThrush => "genital_thrush",
            Self::VisualBlurring => "visual_blurring",
            Self::Itching => "itching",
            Self::Irritability => "irritability",
            Self::DelayedHealing => "delayed_healing",
            Self::PartialParesis => "partial_paresis",
            Self::MuscleStiffness => "muscle_stiffness",
            Self::Alopecia => "alopecia",
            Self::Obesity => "obesity",
        }
    }

    /// Label displayed in the form.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Age => "Âge",
            Self::Gender => "Genre",
            Self::Polyuria => "Polyurie (miction excessive)",
            Self::Polydipsia => "Polydipsie (soif excessive)",
            Self::SuddenWeightLoss => "Perte de poids soudaine",
            Self::Weakness => "Faiblesse",
            Self::Polyphagia => "Polyphagie (faim excessive)",
            Self::GenitalThrush => "Candidose génitale",
            Self::VisualBlurring => "Vision floue",
            Self::Itching => "Démangeaisons",
            Self::Irritability => "Irritabilité",
            Self::DelayedHealing => "Cicatrisation retardée",
            Self::PartialParesis => "Parésie partielle",
            Self::MuscleStiffness => "Raideur musculaire",
            Self::Alopecia => "Alopécie (perte de cheveux)",
            Self::Obesity => "Obésité",
        }
    }

    #[must_use]
    pub fn kind(&self) -> FieldKind {
        match self {
            Self::Age => FieldKind::Age,
            Self::Gender => FieldKind::Gender,
            _ => FieldKind::YesNo,
        }
    }

    /// Position of this field in [`FieldName::ALL`].
    #[must_use]
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldName {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownField(s.to_string()))
    }
}

/// Reasons a form cannot be turned into a request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Veuillez remplir tous les champs du formulaire.")]
    MissingFields(Vec<FieldName>),

    #[error("Âge invalide : « {0} » (entier entre 0 et 120 attendu)")]
    InvalidAge(String),

    #[error("Valeur invalide pour {field} : « {value} »")]
    InvalidChoice { field: FieldName, value: String },

    #[error("Champ inconnu : {0}")]
    UnknownField(String),
}

/// Current values of the 16 form fields. Every key is always present.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct FormState {
    values: [String; FieldName::COUNT],
}

impl fmt::Debug for FormState {
    // Values are patient data; only report which fields are filled.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let filled = self.values.iter().filter(|v| !v.is_empty()).count();
        f.debug_struct("FormState")
            .field("filled", &filled)
            .field("total", &FieldName::COUNT)
            .finish()
    }
}

impl FormState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Example patient from the prediction service's schema.
    #[must_use]
    pub fn sample() -> Self {
        let mut form = Self::new();
        let values = [
            "25", "Male", "No", "No", "Yes", "No", "No", "No", "Yes", "No", "No", "No", "No",
            "Yes", "No", "Yes",
        ];
        for (field, value) in FieldName::ALL.iter().zip(values) {
            form.set(*field, value);
        }
        form
    }

    #[must_use]
    pub fn get(&self, field: FieldName) -> &str {
        &self.values[field.index()]
    }

    /// Overwrite a single field. No validation happens here.
    pub fn set(&mut self, field: FieldName, value: impl Into<String>) {
        let slot = &mut self.values[field.index()];
        slot.zeroize();
        *slot = value.into();
    }

    /// Wipe every value and leave all 16 keys empty.
    pub fn clear(&mut self) {
        for value in self.values.iter_mut() {
            value.zeroize();
        }
    }

    /// Fields that currently hold the empty string, in wire order.
    #[must_use]
    pub fn empty_fields(&self) -> Vec<FieldName> {
        FieldName::ALL
            .iter()
            .copied()
            .filter(|field| self.get(*field).is_empty())
            .collect()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.values.iter().all(|v| !v.is_empty())
    }

    pub fn iter(&self) -> impl Iterator<Item = (FieldName, &str)> {
        FieldName::ALL
            .iter()
            .copied()
            .zip(self.values.iter().map(String::as_str))
    }

    /// Validate the form and build the request body.
    ///
    /// Emptiness is checked first so that an incomplete form always yields
    /// [`ValidationError::MissingFields`].
    ///
    /// # Errors
    /// Returns the first validation failure found.
    pub fn validate(&self) -> Result<RequestPayload, ValidationError> {
        let missing = self.empty_fields();
        if !missing.is_empty() {
            return Err(ValidationError::MissingFields(missing));
        }

        let raw_age = self.get(FieldName::Age);
        let age = raw_age
            .trim()
            .parse::<u8>()
            .ok()
            .filter(|age| AGE_RANGE.contains(age))
            .ok_or_else(|| ValidationError::InvalidAge(raw_age.to_string()))?;

        for (field, value) in self.iter().skip(1) {
            if !field.kind().choices().contains(&value) {
                return Err(ValidationError::InvalidChoice {
                    field,
                    value: value.to_string(),
                });
            }
        }

        Ok(RequestPayload::from_validated(age, self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_key_starts_empty() {
        let form = FormState::new();
        assert_eq!(form.empty_fields().len(), FieldName::COUNT);
        assert!(!form.is_complete());
    }

    #[test]
    fn test_set_touches_only_one_key() {
        for field in FieldName::ALL {
            let mut form = FormState::sample();
            let before = form.clone();
            form.set(field, "changed");

            assert_eq!(form.get(field), "changed");
            for other in FieldName::ALL.iter().filter(|f| **f != field) {
                assert_eq!(form.get(*other), before.get(*other));
            }
        }
    }

    #[test]
    fn test_field_names_round_trip_wire_keys() {
        for field in FieldName::ALL {
            assert_eq!(field.as_str().parse::<FieldName>(), Ok(field));
        }
        assert!(matches!(
            "glucose".parse::<FieldName>(),
            Err(ValidationError::UnknownField(_))
        ));
    }

    #[test]
    fn test_missing_fields_reported_before_anything_else() {
        let mut form = FormState::sample();
        form.set(FieldName::Age, "abc");
        form.set(FieldName::Obesity, "");

        let err = form.validate().unwrap_err();
        assert_eq!(err, ValidationError::MissingFields(vec![FieldName::Obesity]));
        assert_eq!(err.to_string(), MISSING_FIELDS_MESSAGE);
    }

    #[test]
    fn test_age_must_be_integer_in_range() {
        for bad in ["abc", "121", "-1", "45.5"] {
            let mut form = FormState::sample();
            form.set(FieldName::Age, bad);
            assert_eq!(
                form.validate().unwrap_err(),
                ValidationError::InvalidAge(bad.to_string())
            );
        }

        let mut form = FormState::sample();
        form.set(FieldName::Age, " 120 ");
        assert_eq!(form.validate().expect("valid").age, 120);
    }

    #[test]
    fn test_categorical_values_checked_against_domain() {
        let mut form = FormState::sample();
        form.set(FieldName::Gender, "Yes");
        assert!(matches!(
            form.validate(),
            Err(ValidationError::InvalidChoice {
                field: FieldName::Gender,
                ..
            })
        ));

        let mut form = FormState::sample();
        form.set(FieldName::Itching, "yes");
        assert!(matches!(
            form.validate(),
            Err(ValidationError::InvalidChoice {
                field: FieldName::Itching,
                ..
            })
        ));
    }

    #[test]
    fn test_clear_empties_all_keys() {
        let mut form = FormState::sample();
        assert!(form.is_complete());
        form.clear();
        assert_eq!(form, FormState::new());
    }

    #[test]
    fn test_debug_does_not_leak_values() {
        let form = FormState::sample();
        let rendered = format!("{form:?}");
        assert!(!rendered.contains("Male"));
        assert!(rendered.contains("filled: 16"));
    }
}
