//! # asthma_severity
//!
//! Asthma severity screening helpers for a prediction front-end.
//!
//! This crate provides:
//! - Validation of submitted patient records
//! - Derived lifestyle risk indicators for display
//! - Interpretation of classifier output into severity, confidence and
//!   recommendations
//! - Evaluation of an exported logistic regression model
//!
//! ## Architecture
//!
//! - `domain`: Patient records and the three pure components
//!   (`InputValidator`, `RiskFactorCalculator`, `SeverityInterpreter`)
//! - `ports`: Trait for the external classifier
//! - `adapters`: JSON-exported logistic regression model
//! - `application`: The assessment use case
//! - `config`: Environment configuration for the binary

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

pub use domain::{
    InputValidator, PatientRecord, RiskFactorCalculator, RiskFactors, SeverityInterpretation,
    SeverityInterpreter, ValidationResult,
};

/// Result type for crate operations
pub type Result<T> = std::result::Result<T, AsthmaError>;

/// Main error type
#[derive(Debug, thiserror::Error)]
pub enum AsthmaError {
    #[error("Invalid patient data: {0}")]
    Validation(String),

    #[error("Feature extraction failed: {0}")]
    Features(#[from] domain::FeatureError),

    #[error("Model error: {0}")]
    Model(#[from] ports::ModelError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
