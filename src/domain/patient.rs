//! Patient record types for asthma severity screening.
//!
//! A [`PatientRecord`] is what a front-end submits: every field is optional
//! and may hold any JSON scalar, so that validation can report exactly which
//! field is missing or malformed. [`PatientFeatures`] is the canonical,
//! all-numeric view handed to a classifier once the record has passed
//! validation.

use serde::{Deserialize, Deserializer, Serialize};

/// Canonical feature names, in the order a classifier expects them.
pub const FEATURE_NAMES: [&str; 8] = [
    "Age",
    "Gender",
    "BMI",
    "Smoking",
    "PhysicalActivity",
    "DietQuality",
    "SleepQuality",
    "PollutionExposure",
];

/// A single submitted field value.
///
/// Booleans count as numbers (`true` = 1, `false` = 0), so a form that sends
/// `"Smoking": true` is treated the same as `"Smoking": 1`. Arrays and
/// objects are kept as [`FieldValue::Other`] and are never numeric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Null,
    Other(serde_json::Value),
}

impl FieldValue {
    /// Numeric view of the value, if it has one.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            Self::Text(_) | Self::Null | Self::Other(_) => None,
        }
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool(true) => write!(f, "True"),
            Self::Bool(false) => write!(f, "False"),
            Self::Int(i) => write!(f, "{i}"),
            // Whole floats keep a trailing ".0" so 25.0 and 25 stay distinguishable.
            Self::Float(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e16 => {
                write!(f, "{v:.1}")
            }
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(s) => write!(f, "{s}"),
            Self::Null => write!(f, "None"),
            Self::Other(v) => write!(f, "{v}"),
        }
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

/// The fields every record must carry, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequiredField {
    Age,
    Gender,
    Bmi,
    Smoking,
    PhysicalActivity,
    DietQuality,
    SleepQuality,
    PollutionExposure,
}

impl RequiredField {
    pub const ALL: [Self; 8] = [
        Self::Age,
        Self::Gender,
        Self::Bmi,
        Self::Smoking,
        Self::PhysicalActivity,
        Self::DietQuality,
        Self::SleepQuality,
        Self::PollutionExposure,
    ];

    /// Field name as it appears in submitted records.
    #[must_use]
    pub fn name(self) -> &'static str {
        FEATURE_NAMES[self as usize]
    }

    /// Look up a field by its submitted name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }
}

impl std::fmt::Display for RequiredField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Keeps an explicit JSON `null` as a present value instead of folding it
/// into "absent".
fn present<'de, D>(deserializer: D) -> Result<Option<FieldValue>, D::Error>
where
    D: Deserializer<'de>,
{
    FieldValue::deserialize(deserializer).map(Some)
}

/// Raw patient data as submitted by a front-end.
///
/// `None` means the field was not submitted at all. Unrecognised keys are
/// ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    #[serde(
        rename = "Age",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub age: Option<FieldValue>,

    #[serde(
        rename = "Gender",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub gender: Option<FieldValue>,

    #[serde(
        rename = "BMI",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub bmi: Option<FieldValue>,

    /// 0 = non-smoker, 1 = smoker
    #[serde(
        rename = "Smoking",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub smoking: Option<FieldValue>,

    /// 0-10 scale
    #[serde(
        rename = "PhysicalActivity",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub physical_activity: Option<FieldValue>,

    /// 0-10 scale
    #[serde(
        rename = "DietQuality",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub diet_quality: Option<FieldValue>,

    /// 0-10 scale
    #[serde(
        rename = "SleepQuality",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub sleep_quality: Option<FieldValue>,

    /// 0-10 scale
    #[serde(
        rename = "PollutionExposure",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub pollution_exposure: Option<FieldValue>,
}

impl PatientRecord {
    /// Parse a record from a JSON document.
    ///
    /// # Errors
    /// Returns an error if the document is not a JSON object.
    pub fn from_json_str(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    /// Build a record from an already-parsed JSON value.
    ///
    /// # Errors
    /// Returns an error if the value is not a JSON object.
    pub fn from_json_value(value: &serde_json::Value) -> Result<Self, serde_json::Error> {
        Self::deserialize(value)
    }

    /// Builder-style setter.
    #[must_use]
    pub fn with(mut self, field: RequiredField, value: impl Into<FieldValue>) -> Self {
        *self.slot_mut(field) = Some(value.into());
        self
    }

    /// Remove a field, as if it had never been submitted.
    #[must_use]
    pub fn without(mut self, field: RequiredField) -> Self {
        *self.slot_mut(field) = None;
        self
    }

    #[must_use]
    pub fn get(&self, field: RequiredField) -> Option<&FieldValue> {
        match field {
            RequiredField::Age => self.age.as_ref(),
            RequiredField::Gender => self.gender.as_ref(),
            RequiredField::Bmi => self.bmi.as_ref(),
            RequiredField::Smoking => self.smoking.as_ref(),
            RequiredField::PhysicalActivity => self.physical_activity.as_ref(),
            RequiredField::DietQuality => self.diet_quality.as_ref(),
            RequiredField::SleepQuality => self.sleep_quality.as_ref(),
            RequiredField::PollutionExposure => self.pollution_exposure.as_ref(),
        }
    }

    fn slot_mut(&mut self, field: RequiredField) -> &mut Option<FieldValue> {
        match field {
            RequiredField::Age => &mut self.age,
            RequiredField::Gender => &mut self.gender,
            RequiredField::Bmi => &mut self.bmi,
            RequiredField::Smoking => &mut self.smoking,
            RequiredField::PhysicalActivity => &mut self.physical_activity,
            RequiredField::DietQuality => &mut self.diet_quality,
            RequiredField::SleepQuality => &mut self.sleep_quality,
            RequiredField::PollutionExposure => &mut self.pollution_exposure,
        }
    }

    /// Required fields that were not submitted, in canonical order.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<RequiredField> {
        RequiredField::ALL
            .into_iter()
            .filter(|f| self.get(*f).is_none())
            .collect()
    }
}

/// Errors raised while turning a record into a feature vector.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FeatureError {
    #[error("Missing feature: {0}")]
    Missing(RequiredField),

    #[error("Feature {0} is not numeric")]
    NotNumeric(RequiredField),

    #[error("Unsupported gender encoding")]
    UnsupportedGender,
}

/// Canonical numeric features for classifier input.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PatientFeatures {
    pub age: f64,
    /// 0 = male, 1 = female
    pub gender: f64,
    pub bmi: f64,
    pub smoking: f64,
    pub physical_activity: f64,
    pub diet_quality: f64,
    pub sleep_quality: f64,
    pub pollution_exposure: f64,
}

impl PatientFeatures {
    /// Features in [`FEATURE_NAMES`] order.
    #[must_use]
    pub fn to_vec(&self) -> Vec<f64> {
        vec![
            self.age,
            self.gender,
            self.bmi,
            self.smoking,
            self.physical_activity,
            self.diet_quality,
            self.sleep_quality,
            self.pollution_exposure,
        ]
    }

    /// Look up a feature by canonical name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<f64> {
        let field = RequiredField::from_name(name)?;
        Some(self.to_vec()[field as usize])
    }

    fn numeric(record: &PatientRecord, field: RequiredField) -> Result<f64, FeatureError> {
        record
            .get(field)
            .ok_or(FeatureError::Missing(field))?
            .as_number()
            .ok_or(FeatureError::NotNumeric(field))
    }

    fn gender(record: &PatientRecord) -> Result<f64, FeatureError> {
        match record.get(RequiredField::Gender) {
            None => Err(FeatureError::Missing(RequiredField::Gender)),
            Some(FieldValue::Text(s)) => match s.trim().to_ascii_lowercase().as_str() {
                "male" | "m" => Ok(0.0),
                "female" | "f" => Ok(1.0),
                _ => Err(FeatureError::UnsupportedGender),
            },
            Some(other) => other
                .as_number()
                .ok_or(FeatureError::NotNumeric(RequiredField::Gender)),
        }
    }
}

impl TryFrom<&PatientRecord> for PatientFeatures {
    type Error = FeatureError;

    fn try_from(record: &PatientRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            age: Self::numeric(record, RequiredField::Age)?,
            gender: Self::gender(record)?,
            bmi: Self::numeric(record, RequiredField::Bmi)?,
            smoking: Self::numeric(record, RequiredField::Smoking)?,
            physical_activity: Self::numeric(record, RequiredField::PhysicalActivity)?,
            diet_quality: Self::numeric(record, RequiredField::DietQuality)?,
            sleep_quality: Self::numeric(record, RequiredField::SleepQuality)?,
            pollution_exposure: Self::numeric(record, RequiredField::PollutionExposure)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> PatientRecord {
        PatientRecord::default()
            .with(RequiredField::Age, 35)
            .with(RequiredField::Gender, 1)
            .with(RequiredField::Bmi, 25.0)
            .with(RequiredField::Smoking, 0)
            .with(RequiredField::PhysicalActivity, 7)
            .with(RequiredField::DietQuality, 8)
            .with(RequiredField::SleepQuality, 7)
            .with(RequiredField::PollutionExposure, 3)
    }

    #[test]
    fn test_parse_distinguishes_null_from_absent() {
        let record = PatientRecord::from_json_str(r#"{"Age": null, "BMI": 22.5}"#)
            .expect("Should parse");
        assert_eq!(record.age, Some(FieldValue::Null));
        assert_eq!(record.bmi, Some(FieldValue::Float(22.5)));
        assert!(record.gender.is_none());
    }

    #[test]
    fn test_parse_ignores_unknown_keys() {
        let record = PatientRecord::from_json_str(r#"{"Age": 40, "Tiredness": 1}"#)
            .expect("Should parse");
        assert_eq!(record.age, Some(FieldValue::Int(40)));
    }

    #[test]
    fn test_parse_rejects_non_object() {
        assert!(PatientRecord::from_json_str("[1, 2, 3]").is_err());
    }

    #[test]
    fn test_missing_fields_in_canonical_order() {
        let record = PatientRecord::default()
            .with(RequiredField::Age, 35)
            .with(RequiredField::Bmi, 25.0);
        let missing: Vec<&str> = record.missing_fields().iter().map(|f| f.name()).collect();
        assert_eq!(
            missing,
            vec![
                "Gender",
                "Smoking",
                "PhysicalActivity",
                "DietQuality",
                "SleepQuality",
                "PollutionExposure"
            ]
        );
    }

    #[test]
    fn test_field_value_display() {
        assert_eq!(FieldValue::Int(150).to_string(), "150");
        assert_eq!(FieldValue::Float(25.0).to_string(), "25.0");
        assert_eq!(FieldValue::Float(18.5).to_string(), "18.5");
        assert_eq!(FieldValue::from("abc").to_string(), "abc");
        assert_eq!(FieldValue::Null.to_string(), "None");
        assert_eq!(FieldValue::Bool(true).to_string(), "True");
        assert_eq!(FieldValue::Bool(false).to_string(), "False");
    }

    #[test]
    fn test_parse_keeps_nested_values() {
        let record = PatientRecord::from_json_str(r#"{"Age": [35], "BMI": {"x": 1}}"#)
            .expect("Should parse");
        let age = record.age.expect("Age present");
        assert_eq!(age.as_number(), None);
        assert_eq!(age.to_string(), "[35]");
        assert_eq!(record.bmi.expect("BMI present").to_string(), r#"{"x":1}"#);
        assert!(record.gender.is_none());
    }

    #[test]
    fn test_features_from_record() {
        let features = PatientFeatures::try_from(&sample_record()).expect("Should convert");
        let v = features.to_vec();
        assert_eq!(v.len(), FEATURE_NAMES.len());
        assert!((v[0] - 35.0).abs() < f64::EPSILON);
        assert_eq!(features.get("PollutionExposure"), Some(3.0));
        assert_eq!(features.get("Height"), None);
    }

    #[test]
    fn test_gender_text_encoding() {
        let record = sample_record().with(RequiredField::Gender, "Female");
        let features = PatientFeatures::try_from(&record).expect("Should convert");
        assert!((features.gender - 1.0).abs() < f64::EPSILON);

        let record = sample_record().with(RequiredField::Gender, "other");
        assert_eq!(
            PatientFeatures::try_from(&record),
            Err(FeatureError::UnsupportedGender)
        );
    }

    #[test]
    fn test_features_require_numeric_fields() {
        let record = sample_record().with(RequiredField::Bmi, "heavy");
        assert_eq!(
            PatientFeatures::try_from(&record),
            Err(FeatureError::NotNumeric(RequiredField::Bmi))
        );

        let record = sample_record().without(RequiredField::SleepQuality);
        assert_eq!(
            PatientFeatures::try_from(&record),
            Err(FeatureError::Missing(RequiredField::SleepQuality))
        );
    }
}
