//! Assessment service: Orchestrates one severity assessment.
//!
//! This service coordinates:
//! - Input validation
//! - Risk factor derivation (display only)
//! - Feature extraction and classifier call
//! - Interpretation of the prediction
//!
//! The domain components never call each other; the ordering lives here.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::domain::{
    InputValidator, PatientFeatures, PatientRecord, RiskFactorCalculator, RiskFactors,
    SeverityInterpretation, SeverityInterpreter, ValidationError, ValidationResult,
};
use crate::ports::{Prediction, SeverityClassifier};
use crate::AsthmaError;

/// Complete assessment record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assessment {
    /// Unique identifier, for correlating logs with output
    pub id: String,

    /// Derived lifestyle indicators
    pub risk_factors: RiskFactors,

    /// Raw classifier output
    pub prediction: Prediction,

    /// User-facing interpretation of `prediction`
    pub interpretation: SeverityInterpretation,

    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Validation and risk factors only, for when no model is loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Screening {
    pub validation: ValidationResult,

    /// Present only when validation passed
    pub risk_factors: Option<RiskFactors>,
}

/// Validate a record and, if it passes, derive its risk factors.
#[must_use]
pub fn screen(record: &PatientRecord) -> Screening {
    let validation = InputValidator::validate(record);
    let risk_factors = validation
        .is_valid
        .then(|| RiskFactorCalculator::calculate(record));
    Screening {
        validation,
        risk_factors,
    }
}

/// [`screen`] over an untyped JSON payload.
#[must_use]
pub fn screen_json(payload: &serde_json::Value) -> Screening {
    let validation = InputValidator::validate_json(payload);
    let risk_factors = if validation.is_valid {
        PatientRecord::from_json_value(payload)
            .ok()
            .map(|record| RiskFactorCalculator::calculate(&record))
    } else {
        None
    };
    Screening {
        validation,
        risk_factors,
    }
}

/// Service for running severity assessments against a classifier.
pub struct AssessmentService<C>
where
    C: SeverityClassifier,
{
    classifier: Arc<C>,
}

impl<C> AssessmentService<C>
where
    C: SeverityClassifier,
{
    /// Create a new assessment service.
    pub fn new(classifier: Arc<C>) -> Self {
        Self { classifier }
    }

    #[must_use]
    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    /// Run the full assessment pipeline on a typed record.
    ///
    /// # Errors
    /// Returns `AsthmaError::Validation` if the record is rejected, or a
    /// feature/model error if the classifier cannot evaluate it.
    pub fn assess(&self, record: &PatientRecord) -> Result<Assessment, AsthmaError> {
        if let Err(e) = InputValidator::check(record) {
            log_rejection(&e);
            return Err(AsthmaError::Validation(e.to_string()));
        }

        let risk_factors = RiskFactorCalculator::calculate(record);

        let features = PatientFeatures::try_from(record)?;
        tracing::debug!("Running classifier: {}", self.classifier.describe());
        let prediction = self.classifier.predict(&features)?;

        let interpretation =
            SeverityInterpreter::interpret(prediction.class_id(), prediction.probability);

        let assessment = Assessment {
            id: uuid_v4(),
            risk_factors,
            prediction,
            interpretation,
            created_at: chrono::Utc::now(),
        };

        tracing::info!(
            "Assessment {} complete: severity={}, confidence={}, lifestyle_risk={}",
            assessment.id,
            assessment.interpretation.severity_level,
            assessment.interpretation.confidence_score,
            assessment.risk_factors.risk_category
        );

        Ok(assessment)
    }

    /// Run the full assessment pipeline on an untyped JSON payload.
    ///
    /// # Errors
    /// Same as [`Self::assess`]; payloads that are not records are rejected
    /// as `AsthmaError::Validation`.
    pub fn assess_json(&self, payload: &serde_json::Value) -> Result<Assessment, AsthmaError> {
        let validation = InputValidator::validate_json(payload);
        if !validation.is_valid {
            return Err(AsthmaError::Validation(validation.message));
        }
        let record = PatientRecord::from_json_value(payload)?;
        self.assess(&record)
    }
}

/// Log which rule rejected a record without echoing patient values.
fn log_rejection(error: &ValidationError) {
    match error {
        ValidationError::MissingFields(fields) => {
            tracing::warn!("Rejected record: {} required field(s) missing", fields.len());
        }
        ValidationError::InvalidValue { field, .. } => {
            tracing::warn!("Rejected record: invalid value for {}", field);
        }
        ValidationError::Internal(_) => {
            tracing::warn!("Rejected record: unreadable input");
        }
    }
}

/// Generate a random UUID v4 from a CSPRNG.
fn uuid_v4() -> String {
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha20Rng;

    let mut rng = ChaCha20Rng::from_entropy();
    let mut bytes: [u8; 16] = rng.gen();
    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;

    let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
    format!(
        "{}-{}-{}-{}-{}",
        &hex[0..8],
        &hex[8..12],
        &hex[12..16],
        &hex[16..20],
        &hex[20..32]
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::LogisticModel;
    use crate::domain::{ConfidenceTier, RequiredField, RiskCategory, SeverityLevel};
    use crate::ports::ModelError;
    use serde_json::json;
    use std::path::Path;

    /// Always returns the same class and probability.
    struct FixedClassifier {
        class_index: usize,
        probability: f64,
    }

    impl SeverityClassifier for FixedClassifier {
        fn predict(&self, _features: &PatientFeatures) -> Result<Prediction, ModelError> {
            let mut probabilities = vec![0.0; usize::max(3, self.class_index + 1)];
            probabilities[self.class_index] = self.probability;
            Ok(Prediction {
                class_index: self.class_index,
                probability: self.probability,
                probabilities,
            })
        }

        fn describe(&self) -> String {
            "fixed".to_string()
        }
    }

    fn service(class_index: usize, probability: f64) -> AssessmentService<FixedClassifier> {
        AssessmentService::new(Arc::new(FixedClassifier {
            class_index,
            probability,
        }))
    }

    fn valid_record() -> PatientRecord {
        PatientRecord::default()
            .with(RequiredField::Age, 45)
            .with(RequiredField::Gender, "Male")
            .with(RequiredField::Bmi, 28.0)
            .with(RequiredField::Smoking, 1)
            .with(RequiredField::PhysicalActivity, 3)
            .with(RequiredField::DietQuality, 5)
            .with(RequiredField::SleepQuality, 5)
            .with(RequiredField::PollutionExposure, 7)
    }

    #[test]
    fn test_assess_pipeline() {
        let assessment = service(2, 0.92).assess(&valid_record()).expect("Should assess");

        assert_eq!(assessment.interpretation.severity_level, SeverityLevel::Severe);
        assert_eq!(assessment.interpretation.confidence, ConfidenceTier::High);
        assert_eq!(assessment.interpretation.confidence_score, "92.0%");
        assert_eq!(assessment.risk_factors.risk_category, RiskCategory::High);
        assert_eq!(assessment.id.len(), 36);
    }

    #[test]
    fn test_assess_rejects_invalid_record() {
        let record = valid_record().with(RequiredField::Age, 150);
        match service(0, 0.9).assess(&record) {
            Err(AsthmaError::Validation(msg)) => assert_eq!(msg, "Invalid value for Age: 150"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_assess_unknown_class_from_model() {
        let assessment = service(5, 0.5).assess(&valid_record()).expect("Should assess");
        assert_eq!(assessment.interpretation.severity_level, SeverityLevel::Unknown);
        assert_eq!(
            assessment.interpretation.recommendations,
            vec!["Consult healthcare provider"]
        );
    }

    #[test]
    fn test_assess_reports_unencodable_gender() {
        let record = valid_record().with(RequiredField::Gender, "unspecified");
        assert!(matches!(
            service(0, 0.9).assess(&record),
            Err(AsthmaError::Features(_))
        ));
    }

    #[test]
    fn test_assess_json_rejects_non_object() {
        match service(0, 0.9).assess_json(&json!("not a record")) {
            Err(AsthmaError::Validation(msg)) => assert!(msg.starts_with("Validation error: ")),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_assess_with_sample_model() {
        let model = LogisticModel::load(
            &Path::new(env!("CARGO_MANIFEST_DIR")).join("models/asthma_severity_model.json"),
        )
        .expect("Sample model should load");
        let service = AssessmentService::new(Arc::new(model));

        let payload = json!({
            "Age": 35, "Gender": 1, "BMI": 25.0, "Smoking": 0,
            "PhysicalActivity": 7, "DietQuality": 8, "SleepQuality": 7,
            "PollutionExposure": 3
        });
        let assessment = service.assess_json(&payload).expect("Should assess");
        assert_eq!(assessment.interpretation.severity_level, SeverityLevel::Mild);
        assert_eq!(assessment.interpretation.confidence, ConfidenceTier::High);
    }

    #[test]
    fn test_screen_valid_and_invalid() {
        let screening = screen(&valid_record());
        assert!(screening.validation.is_valid);
        assert_eq!(
            screening.risk_factors.map(|r| r.risk_category),
            Some(RiskCategory::High)
        );

        let screening = screen(&valid_record().without(RequiredField::Bmi));
        assert!(!screening.validation.is_valid);
        assert!(screening.risk_factors.is_none());
    }

    #[test]
    fn test_screen_json() {
        let screening = screen_json(&json!([1, 2]));
        assert!(!screening.validation.is_valid);
        assert!(screening.risk_factors.is_none());

        let screening = screen_json(&json!({
            "Age": 30, "Gender": 0, "BMI": 22.0, "Smoking": 0,
            "PhysicalActivity": 8, "DietQuality": 6, "SleepQuality": 6,
            "PollutionExposure": 2
        }));
        assert!(screening.validation.is_valid);
        assert_eq!(
            screening.risk_factors.map(|r| r.risk_category),
            Some(RiskCategory::Low)
        );
    }

    #[test]
    fn test_uuid_generation() {
        let id1 = uuid_v4();
        let id2 = uuid_v4();
        assert_ne!(id1, id2);
        assert_eq!(id1.len(), 36);
        assert_eq!(&id1[14..15], "4");
    }
}
