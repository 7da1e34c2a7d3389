//! Derived risk indicators for display alongside a prediction.
//!
//! These are simple banded heuristics over the raw record; they do not feed
//! the classifier.

use serde::{Deserialize, Serialize};

use super::patient::{PatientRecord, RequiredField};

/// Upper bound of the lifestyle risk score.
pub const LIFESTYLE_SCORE_CAP: f64 = 100.0;

const SMOKING_WEIGHT: f64 = 30.0;
const INACTIVITY_WEIGHT: f64 = 4.0;
const POLLUTION_WEIGHT: f64 = 3.0;
const ACTIVITY_CEILING: f64 = 10.0;

/// Age band relevant to asthma risk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgeRiskGroup {
    #[serde(rename = "Child/Adolescent Risk")]
    ChildAdolescent,
    Adult,
    #[serde(rename = "Senior Risk")]
    Senior,
    Unknown,
}

impl AgeRiskGroup {
    #[must_use]
    pub fn classify(age: f64) -> Self {
        if age < 18.0 {
            Self::ChildAdolescent
        } else if age < 65.0 {
            Self::Adult
        } else {
            Self::Senior
        }
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::ChildAdolescent => "Child/Adolescent Risk",
            Self::Adult => "Adult",
            Self::Senior => "Senior Risk",
            Self::Unknown => "Unknown",
        }
    }
}

/// WHO adult BMI bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
    Unknown,
}

impl BmiCategory {
    #[must_use]
    pub fn classify(bmi: f64) -> Self {
        if bmi < 18.5 {
            Self::Underweight
        } else if bmi < 25.0 {
            Self::Normal
        } else if bmi < 30.0 {
            Self::Overweight
        } else {
            Self::Obese
        }
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Underweight => "Underweight",
            Self::Normal => "Normal",
            Self::Overweight => "Overweight",
            Self::Obese => "Obese",
            Self::Unknown => "Unknown",
        }
    }
}

/// Banding of the lifestyle risk score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskCategory {
    #[serde(rename = "Low Risk")]
    Low,
    #[serde(rename = "Moderate Risk")]
    Moderate,
    #[serde(rename = "High Risk")]
    High,
    Unknown,
}

impl RiskCategory {
    #[must_use]
    pub fn classify(score: f64) -> Self {
        if score < 30.0 {
            Self::Low
        } else if score < 60.0 {
            Self::Moderate
        } else {
            Self::High
        }
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "Low Risk",
            Self::Moderate => "Moderate Risk",
            Self::High => "High Risk",
            Self::Unknown => "Unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SmokingStatus {
    Smoker,
    #[serde(rename = "Non-smoker")]
    NonSmoker,
    Unknown,
}

impl SmokingStatus {
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Smoker => "Smoker",
            Self::NonSmoker => "Non-smoker",
            Self::Unknown => "Unknown",
        }
    }
}

macro_rules! display_via_label {
    ($($ty:ty),*) => {
        $(impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.label())
            }
        })*
    };
}

display_via_label!(AgeRiskGroup, BmiCategory, RiskCategory, SmokingStatus);

/// Risk indicators derived from a patient record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskFactors {
    pub age_risk_group: AgeRiskGroup,
    pub bmi_category: BmiCategory,
    /// 0-100, one decimal place
    pub lifestyle_risk_score: f64,
    pub risk_category: RiskCategory,
    pub smoking_status: SmokingStatus,
}

impl RiskFactors {
    /// Neutral record shown when derivation fails.
    #[must_use]
    pub fn unknown() -> Self {
        Self {
            age_risk_group: AgeRiskGroup::Unknown,
            bmi_category: BmiCategory::Unknown,
            lifestyle_risk_score: 0.0,
            risk_category: RiskCategory::Unknown,
            smoking_status: SmokingStatus::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RiskError {
    #[error("{0} is not numeric")]
    NotNumeric(RequiredField),

    #[error("lifestyle risk score is not a number")]
    NonFiniteScore,
}

/// Lifestyle risk score before rounding.
///
/// Only the final sum is capped at [`LIFESTYLE_SCORE_CAP`]; the individual
/// terms are not clamped, so out-of-range exposure can push the score to the
/// cap on its own and negative inputs can pull it below zero.
#[must_use]
pub fn lifestyle_risk_score(smoking: f64, physical_activity: f64, pollution_exposure: f64) -> f64 {
    let raw = smoking * SMOKING_WEIGHT
        + (ACTIVITY_CEILING - physical_activity).max(0.0) * INACTIVITY_WEIGHT
        + pollution_exposure * POLLUTION_WEIGHT;
    // NaN must survive the cap so callers can detect it; f64::min would hide it.
    if raw > LIFESTYLE_SCORE_CAP {
        LIFESTYLE_SCORE_CAP
    } else {
        raw
    }
}

/// Rounds to one decimal, ties to even on the exact binary value.
fn round1(x: f64) -> f64 {
    format!("{x:.1}").parse().unwrap_or(x)
}

/// Derives [`RiskFactors`] from raw record values.
pub struct RiskFactorCalculator;

impl RiskFactorCalculator {
    /// Absent fields count as 0; present non-numeric fields are an error.
    fn value_or_zero(record: &PatientRecord, field: RequiredField) -> Result<f64, RiskError> {
        match record.get(field) {
            None => Ok(0.0),
            Some(v) => v.as_number().ok_or(RiskError::NotNumeric(field)),
        }
    }

    /// Derive risk factors, surfacing failures.
    ///
    /// # Errors
    /// Returns [`RiskError`] if a present field is not numeric or the score
    /// cannot be computed.
    pub fn try_calculate(record: &PatientRecord) -> Result<RiskFactors, RiskError> {
        let age = Self::value_or_zero(record, RequiredField::Age)?;
        let bmi = Self::value_or_zero(record, RequiredField::Bmi)?;
        let smoking = Self::value_or_zero(record, RequiredField::Smoking)?;
        let activity = Self::value_or_zero(record, RequiredField::PhysicalActivity)?;
        let pollution = Self::value_or_zero(record, RequiredField::PollutionExposure)?;

        let score = lifestyle_risk_score(smoking, activity, pollution);
        if score.is_nan() {
            return Err(RiskError::NonFiniteScore);
        }

        Ok(RiskFactors {
            age_risk_group: AgeRiskGroup::classify(age),
            bmi_category: BmiCategory::classify(bmi),
            lifestyle_risk_score: round1(score),
            risk_category: RiskCategory::classify(score),
            smoking_status: if smoking != 0.0 {
                SmokingStatus::Smoker
            } else {
                SmokingStatus::NonSmoker
            },
        })
    }

    /// Derive risk factors, falling back to [`RiskFactors::unknown`] on
    /// failure.
    #[must_use]
    pub fn calculate(record: &PatientRecord) -> RiskFactors {
        Self::try_calculate(record).unwrap_or_else(|e| {
            tracing::error!(error = %e, "Error calculating risk factors");
            RiskFactors::unknown()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FieldValue;

    fn record(age: f64, bmi: f64, smoking: i64, activity: f64, pollution: f64) -> PatientRecord {
        PatientRecord::default()
            .with(RequiredField::Age, age)
            .with(RequiredField::Bmi, bmi)
            .with(RequiredField::Smoking, smoking)
            .with(RequiredField::PhysicalActivity, activity)
            .with(RequiredField::PollutionExposure, pollution)
    }

    #[test]
    fn test_smoker_profile() {
        let risk = RiskFactorCalculator::calculate(&record(45.0, 28.0, 1, 3.0, 7.0));
        assert_eq!(risk.age_risk_group, AgeRiskGroup::Adult);
        assert_eq!(risk.bmi_category, BmiCategory::Overweight);
        assert_eq!(risk.smoking_status, SmokingStatus::Smoker);
        // 30 + 7*4 + 7*3
        assert!((risk.lifestyle_risk_score - 79.0).abs() < 1e-9);
        assert!(risk.lifestyle_risk_score > 50.0);
        assert_eq!(risk.risk_category, RiskCategory::High);
    }

    #[test]
    fn test_healthy_profile() {
        let risk = RiskFactorCalculator::calculate(&record(30.0, 22.0, 0, 8.0, 2.0));
        assert_eq!(risk.age_risk_group, AgeRiskGroup::Adult);
        assert_eq!(risk.bmi_category, BmiCategory::Normal);
        assert_eq!(risk.smoking_status, SmokingStatus::NonSmoker);
        assert!(risk.lifestyle_risk_score < 30.0);
        assert_eq!(risk.risk_category, RiskCategory::Low);
    }

    #[test]
    fn test_age_bands() {
        assert_eq!(AgeRiskGroup::classify(17.9), AgeRiskGroup::ChildAdolescent);
        assert_eq!(AgeRiskGroup::classify(18.0), AgeRiskGroup::Adult);
        assert_eq!(AgeRiskGroup::classify(64.9), AgeRiskGroup::Adult);
        assert_eq!(AgeRiskGroup::classify(65.0), AgeRiskGroup::Senior);
    }

    #[test]
    fn test_bmi_bands() {
        assert_eq!(BmiCategory::classify(18.4), BmiCategory::Underweight);
        assert_eq!(BmiCategory::classify(18.5), BmiCategory::Normal);
        assert_eq!(BmiCategory::classify(25.0), BmiCategory::Overweight);
        assert_eq!(BmiCategory::classify(30.0), BmiCategory::Obese);
    }

    #[test]
    fn test_risk_category_bands() {
        assert_eq!(RiskCategory::classify(29.9), RiskCategory::Low);
        assert_eq!(RiskCategory::classify(30.0), RiskCategory::Moderate);
        assert_eq!(RiskCategory::classify(59.9), RiskCategory::Moderate);
        assert_eq!(RiskCategory::classify(60.0), RiskCategory::High);
    }

    #[test]
    fn test_score_cap() {
        let at_cap = RiskFactorCalculator::calculate(&record(40.0, 22.0, 1, 0.0, 10.0));
        assert!((at_cap.lifestyle_risk_score - 100.0).abs() < 1e-9);

        let over = RiskFactorCalculator::calculate(&record(40.0, 22.0, 1, 0.0, 100.0));
        assert!((over.lifestyle_risk_score - 100.0).abs() < 1e-9);
        assert_eq!(over.risk_category, RiskCategory::High);
    }

    #[test]
    fn test_activity_above_ceiling_adds_nothing() {
        assert!((lifestyle_risk_score(0.0, 12.0, 0.0)).abs() < 1e-9);
    }

    #[test]
    fn test_score_rounded_to_one_decimal() {
        let risk = RiskFactorCalculator::calculate(&record(40.0, 22.0, 0, 9.0, 1.1111));
        // 1*4 + 3.3333
        assert!((risk.lifestyle_risk_score - 7.3).abs() < 1e-9);
    }

    #[test]
    fn test_score_ties_round_to_even() {
        // 0.75 * 3 = 2.25 exactly
        let risk = RiskFactorCalculator::calculate(&record(40.0, 22.0, 0, 10.0, 0.75));
        assert!((risk.lifestyle_risk_score - 2.2).abs() < 1e-9);

        // 1.25 * 3 = 3.75 exactly
        let risk = RiskFactorCalculator::calculate(&record(40.0, 22.0, 0, 10.0, 1.25));
        assert!((risk.lifestyle_risk_score - 3.8).abs() < 1e-9);

        assert!((round1(0.25) - 0.2).abs() < 1e-9);
        assert!((round1(-0.25) + 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_absent_fields_default_to_zero() {
        let risk = RiskFactorCalculator::calculate(&PatientRecord::default());
        assert_eq!(risk.age_risk_group, AgeRiskGroup::ChildAdolescent);
        assert_eq!(risk.bmi_category, BmiCategory::Underweight);
        assert_eq!(risk.smoking_status, SmokingStatus::NonSmoker);
        // inactivity alone: 10 * 4
        assert!((risk.lifestyle_risk_score - 40.0).abs() < 1e-9);
        assert_eq!(risk.risk_category, RiskCategory::Moderate);
    }

    #[test]
    fn test_non_numeric_field_falls_back_to_unknown() {
        let bad = record(40.0, 22.0, 0, 5.0, 5.0).with(RequiredField::Age, "forty");
        assert_eq!(
            RiskFactorCalculator::try_calculate(&bad),
            Err(RiskError::NotNumeric(RequiredField::Age))
        );
        assert_eq!(RiskFactorCalculator::calculate(&bad), RiskFactors::unknown());

        let null = record(40.0, 22.0, 0, 5.0, 5.0).with(RequiredField::Smoking, FieldValue::Null);
        assert_eq!(RiskFactorCalculator::calculate(&null), RiskFactors::unknown());
    }

    #[test]
    fn test_nan_score_falls_back_to_unknown() {
        let bad = record(40.0, 22.0, 0, 5.0, f64::NAN);
        assert_eq!(
            RiskFactorCalculator::try_calculate(&bad),
            Err(RiskError::NonFiniteScore)
        );
        assert_eq!(RiskFactorCalculator::calculate(&bad), RiskFactors::unknown());
    }

    #[test]
    fn test_labels_serialize_verbatim() {
        let risk = RiskFactorCalculator::calculate(&record(70.0, 22.0, 0, 10.0, 0.0));
        let json = serde_json::to_value(risk).expect("Should serialize");
        assert_eq!(json["age_risk_group"], "Senior Risk");
        assert_eq!(json["risk_category"], "Low Risk");
        assert_eq!(json["smoking_status"], "Non-smoker");
        assert_eq!(AgeRiskGroup::ChildAdolescent.to_string(), "Child/Adolescent Risk");
    }

    #[test]
    fn test_calculation_is_repeatable() {
        let r = record(45.0, 28.0, 1, 3.0, 7.0);
        assert_eq!(
            RiskFactorCalculator::calculate(&r),
            RiskFactorCalculator::calculate(&r)
        );
    }
}
