//! Classifier port: Trait for the externally trained severity model.
//!
//! The application only needs a class index and its probability; how the
//! model was trained or serialized is the adapter's business.

use crate::domain::PatientFeatures;

/// Errors raised while loading or evaluating a model.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Failed to read model: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse model: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid model: {0}")]
    Invalid(String),

    #[error("Model expects unknown feature: {0}")]
    FeatureMismatch(String),
}

/// Raw classifier output.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Prediction {
    /// Index of the predicted class (0 = mild, 1 = moderate, 2 = severe)
    pub class_index: usize,

    /// Probability of the predicted class (0.0 to 1.0)
    pub probability: f64,

    /// Probability of every class, indexed like `class_index`
    pub probabilities: Vec<f64>,
}

impl Prediction {
    /// Build a prediction from per-class probabilities.
    ///
    /// The highest probability wins; ties go to the lowest index.
    ///
    /// # Errors
    /// Returns `ModelError::Invalid` if `probabilities` is empty or contains
    /// a non-finite value.
    pub fn from_probabilities(probabilities: Vec<f64>) -> Result<Self, ModelError> {
        if probabilities.iter().any(|p| !p.is_finite()) {
            return Err(ModelError::Invalid("non-finite class probability".into()));
        }

        let (class_index, probability) = probabilities
            .iter()
            .copied()
            .enumerate()
            .fold(None, |best: Option<(usize, f64)>, (i, p)| match best {
                Some((_, bp)) if bp >= p => best,
                _ => Some((i, p)),
            })
            .ok_or_else(|| ModelError::Invalid("model produced no classes".into()))?;

        Ok(Self {
            class_index,
            probability,
            probabilities,
        })
    }

    /// Class index in the signed form taken by the interpreter.
    #[must_use]
    pub fn class_id(&self) -> i64 {
        i64::try_from(self.class_index).unwrap_or(i64::MAX)
    }
}

/// Trait for severity classifiers.
///
/// Implementations must be pure with respect to their input: the same
/// features always produce the same prediction.
pub trait SeverityClassifier: Send + Sync {
    /// Predict the severity class for one patient.
    ///
    /// # Errors
    /// Returns `ModelError` if the model cannot evaluate these features.
    fn predict(&self, features: &PatientFeatures) -> Result<Prediction, ModelError>;

    /// Short human-readable description (name, fingerprint).
    fn describe(&self) -> String;
}
