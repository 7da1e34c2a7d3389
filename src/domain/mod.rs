//! Domain layer: Core screening types and logic.
//!
//! Everything here is a pure function of its input: no I/O, no shared
//! state. Failures are returned as values; the only side effect is a
//! `tracing` event on the fallback paths.

mod patient;
mod risk;
mod severity;
mod validation;

pub use patient::{
    FeatureError, FieldValue, PatientFeatures, PatientRecord, RequiredField, FEATURE_NAMES,
};
pub use risk::{
    lifestyle_risk_score, AgeRiskGroup, BmiCategory, RiskCategory, RiskError, RiskFactorCalculator,
    RiskFactors, SmokingStatus, LIFESTYLE_SCORE_CAP,
};
pub use severity::{
    ConfidenceTier, SeverityClass, SeverityInterpretation, SeverityInterpreter, SeverityLevel,
    FALLBACK_RECOMMENDATION,
};
pub use validation::{InputValidator, ValidationError, ValidationResult};
