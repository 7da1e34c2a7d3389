//! Input validation for patient records.
//!
//! Validation happens in two passes: presence of every required field, then
//! per-field type/range rules in canonical order. The first failing rule
//! decides the outcome.

use serde::{Deserialize, Serialize};

use super::patient::{FieldValue, PatientRecord, RequiredField};

/// Why a record was rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Missing required fields: {}", join_names(.0))]
    MissingFields(Vec<RequiredField>),

    #[error("Invalid value for {field}: {value}")]
    InvalidValue {
        field: RequiredField,
        value: FieldValue,
    },

    #[error("Validation error: {0}")]
    Internal(String),
}

fn join_names(fields: &[RequiredField]) -> String {
    fields
        .iter()
        .map(|f| f.name())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Outcome of validating a record, as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub message: String,
}

impl ValidationResult {
    pub const VALID_MESSAGE: &'static str = "Valid input data";
}

impl From<Result<(), ValidationError>> for ValidationResult {
    fn from(result: Result<(), ValidationError>) -> Self {
        match result {
            Ok(()) => Self {
                is_valid: true,
                message: Self::VALID_MESSAGE.to_string(),
            },
            Err(e) => Self {
                is_valid: false,
                message: e.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Rule {
    /// Numeric and within the closed interval.
    Range(f64, f64),
    /// Exactly 0 or 1.
    Binary,
}

impl Rule {
    fn accepts(self, value: &FieldValue) -> bool {
        match self {
            Self::Range(lo, hi) => value.as_number().is_some_and(|x| (lo..=hi).contains(&x)),
            Self::Binary => matches!(value.as_number(), Some(x) if x == 0.0 || x == 1.0),
        }
    }
}

/// Value rules in evaluation order. Gender only needs to be present.
const RULES: [(RequiredField, Rule); 7] = [
    (RequiredField::Age, Rule::Range(0.0, 120.0)),
    (RequiredField::Bmi, Rule::Range(10.0, 50.0)),
    (RequiredField::Smoking, Rule::Binary),
    (RequiredField::PhysicalActivity, Rule::Range(0.0, 10.0)),
    (RequiredField::DietQuality, Rule::Range(0.0, 10.0)),
    (RequiredField::SleepQuality, Rule::Range(0.0, 10.0)),
    (RequiredField::PollutionExposure, Rule::Range(0.0, 10.0)),
];

/// Checks patient records before they reach a classifier.
pub struct InputValidator;

impl InputValidator {
    /// Check a record, returning the first problem found.
    ///
    /// # Errors
    /// Returns [`ValidationError::MissingFields`] listing every absent
    /// required field, or [`ValidationError::InvalidValue`] for the first
    /// field that fails its rule.
    pub fn check(record: &PatientRecord) -> Result<(), ValidationError> {
        let missing = record.missing_fields();
        if !missing.is_empty() {
            return Err(ValidationError::MissingFields(missing));
        }

        for (field, rule) in RULES {
            if let Some(value) = record.get(field) {
                if !rule.accepts(value) {
                    return Err(ValidationError::InvalidValue {
                        field,
                        value: value.clone(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Validate a typed record.
    #[must_use]
    pub fn validate(record: &PatientRecord) -> ValidationResult {
        Self::check(record).into()
    }

    /// Validate an arbitrary JSON payload.
    ///
    /// Payloads that cannot be read as a record at all (anything but a JSON
    /// object) are reported as a validation error rather than propagated.
    #[must_use]
    pub fn validate_json(payload: &serde_json::Value) -> ValidationResult {
        match PatientRecord::from_json_value(payload) {
            Ok(record) => Self::validate(&record),
            Err(e) => {
                tracing::error!(error = %e, "Error validating asthma input data");
                ValidationResult::from(Err::<(), _>(ValidationError::Internal(e.to_string())))
            }
        }
    }
}
