//! Logistic regression adapter: Implementation of SeverityClassifier.
//!
//! Evaluates a standard-scaler + logistic-regression pipeline that was
//! trained elsewhere and exported as JSON. Nothing here fits a model.
//!
//! # Model format
//!
//! ```json
//! {
//!   "feature_names": ["Age", "Gender", "BMI", ...],
//!   "classes": ["Mild", "Moderate", "Severe"],
//!   "scaler_mean": [...],
//!   "scaler_scale": [...],
//!   "coefficients": [[...], [...], [...]],
//!   "intercepts": [...]
//! }
//! ```
//!
//! The position of a class in `classes` is its severity index. A binary
//! model carries a single coefficient row and two classes, and is evaluated
//! with a sigmoid instead of a softmax.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::domain::{PatientFeatures, RequiredField};
use crate::ports::{ModelError, Prediction, SeverityClassifier};

/// Model parameters as exported by the training pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedLogisticModel {
    pub feature_names: Vec<String>,
    pub classes: Vec<String>,
    pub scaler_mean: Vec<f64>,
    pub scaler_scale: Vec<f64>,
    pub coefficients: Vec<Vec<f64>>,
    pub intercepts: Vec<f64>,
}

impl ExportedLogisticModel {
    fn is_binary(&self) -> bool {
        self.classes.len() == 2 && self.coefficients.len() == 1
    }

    fn validate(&self) -> Result<(), ModelError> {
        let n = self.feature_names.len();
        if n == 0 {
            return Err(ModelError::Invalid("model has no features".into()));
        }
        if let Some(name) = self
            .feature_names
            .iter()
            .find(|name| RequiredField::from_name(name).is_none())
        {
            return Err(ModelError::FeatureMismatch(name.clone()));
        }
        if self.classes.len() < 2 {
            return Err(ModelError::Invalid(format!(
                "expected at least 2 classes, got {}",
                self.classes.len()
            )));
        }
        if self.scaler_mean.len() != n || self.scaler_scale.len() != n {
            return Err(ModelError::Invalid(format!(
                "scaler length mismatch: {} features, mean {}, scale {}",
                n,
                self.scaler_mean.len(),
                self.scaler_scale.len()
            )));
        }

        let rows = self.coefficients.len();
        if rows != self.classes.len() && !self.is_binary() {
            return Err(ModelError::Invalid(format!(
                "expected {} coefficient rows, got {}",
                self.classes.len(),
                rows
            )));
        }
        if let Some(row) = self.coefficients.iter().find(|row| row.len() != n) {
            return Err(ModelError::Invalid(format!(
                "coefficient row has {} entries, expected {}",
                row.len(),
                n
            )));
        }
        if self.intercepts.len() != rows {
            return Err(ModelError::Invalid(format!(
                "expected {} intercepts, got {}",
                rows,
                self.intercepts.len()
            )));
        }

        let all_finite = self
            .scaler_mean
            .iter()
            .chain(&self.scaler_scale)
            .chain(self.coefficients.iter().flatten())
            .chain(&self.intercepts)
            .all(|v| v.is_finite());
        if !all_finite {
            return Err(ModelError::Invalid("model contains non-finite parameters".into()));
        }

        Ok(())
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    Sha256::digest(bytes).iter().map(|b| format!("{b:02x}")).collect()
}

/// A loaded, validated logistic regression model.
#[derive(Debug, Clone)]
pub struct LogisticModel {
    params: ExportedLogisticModel,
    fingerprint: String,
}

impl LogisticModel {
    /// Load a model from a JSON file.
    ///
    /// # Errors
    /// Returns `ModelError` if the file cannot be read, parsed or fails
    /// validation.
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        tracing::info!("Loading severity model from {}", path.display());
        let bytes = fs::read(path)?;
        let model = Self::from_bytes(&bytes)?;
        tracing::info!(
            "Loaded {}-class model over {} features (sha256 {})",
            model.params.classes.len(),
            model.params.feature_names.len(),
            &model.fingerprint[..12]
        );
        Ok(model)
    }

    /// Parse and validate a model from JSON bytes.
    ///
    /// # Errors
    /// Returns `ModelError` if the bytes are not a valid model.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ModelError> {
        let params: ExportedLogisticModel = serde_json::from_slice(bytes)?;
        params.validate()?;
        Ok(Self {
            params,
            fingerprint: sha256_hex(bytes),
        })
    }

    /// Wrap in-memory parameters.
    ///
    /// # Errors
    /// Returns `ModelError` if the parameters fail validation.
    pub fn from_exported(params: ExportedLogisticModel) -> Result<Self, ModelError> {
        params.validate()?;
        let fingerprint = sha256_hex(&serde_json::to_vec(&params)?);
        Ok(Self { params, fingerprint })
    }

    /// SHA-256 of the model as loaded (hex).
    #[must_use]
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    #[must_use]
    pub fn classes(&self) -> &[String] {
        &self.params.classes
    }

    /// Pick and standardize the model's inputs. A zero scale is treated as 1,
    /// matching how constant columns are handled at training time.
    fn standardized_inputs(&self, features: &PatientFeatures) -> Result<Vec<f64>, ModelError> {
        let p = &self.params;
        p.feature_names
            .iter()
            .zip(p.scaler_mean.iter().zip(&p.scaler_scale))
            .map(|(name, (mean, scale))| -> Result<f64, ModelError> {
                let x = features
                    .get(name)
                    .ok_or_else(|| ModelError::FeatureMismatch(name.clone()))?;
                let scale = if *scale == 0.0 { 1.0 } else { *scale };
                Ok((x - mean) / scale)
            })
            .collect()
    }

    fn logits(&self, z: &[f64]) -> Vec<f64> {
        self.params
            .coefficients
            .iter()
            .zip(&self.params.intercepts)
            .map(|(row, b)| row.iter().zip(z).map(|(w, x)| w * x).sum::<f64>() + b)
            .collect()
    }

    fn softmax(logits: &[f64]) -> Vec<f64> {
        let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let exps: Vec<f64> = logits.iter().map(|l| (l - max).exp()).collect();
        let total: f64 = exps.iter().sum();
        exps.into_iter().map(|e| e / total).collect()
    }

    fn sigmoid(x: f64) -> f64 {
        1.0 / (1.0 + (-x).exp())
    }
}

impl SeverityClassifier for LogisticModel {
    fn predict(&self, features: &PatientFeatures) -> Result<Prediction, ModelError> {
        let z = self.standardized_inputs(features)?;
        let logits = self.logits(&z);

        let probabilities = if self.params.is_binary() {
            let p = Self::sigmoid(logits[0]);
            vec![1.0 - p, p]
        } else {
            Self::softmax(&logits)
        };

        let prediction = Prediction::from_probabilities(probabilities)?;
        tracing::debug!(
            "Model predicted class {} ({:.1}%)",
            prediction.class_index,
            prediction.probability * 100.0
        );
        Ok(prediction)
    }

    fn describe(&self) -> String {
        format!(
            "logistic regression [{}] sha256:{}",
            self.params.classes.join(", "),
            &self.fingerprint[..12]
        )
    }
}
