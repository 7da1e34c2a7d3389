//! Interpretation of classifier output.
//!
//! Turns a raw class index and probability into the severity label,
//! confidence tier and recommendation list shown to the user.

use serde::{Deserialize, Serialize};

/// Recommendation used when the class index is not recognised.
pub const FALLBACK_RECOMMENDATION: &str = "Consult healthcare provider";

static MILD_RECOMMENDATIONS: [&str; 4] = [
    "Continue regular exercise and healthy lifestyle",
    "Monitor symptoms and maintain medication as prescribed",
    "Avoid known triggers and maintain good air quality",
    "Regular check-ups with healthcare provider",
];

static MODERATE_RECOMMENDATIONS: [&str; 4] = [
    "Increased monitoring of symptoms and peak flow",
    "Review medication plan with healthcare provider",
    "Consider environmental modifications to reduce triggers",
    "Maintain consistent sleep schedule and stress management",
];

static SEVERE_RECOMMENDATIONS: [&str; 4] = [
    "Immediate consultation with specialist required",
    "Strict adherence to medication regimen essential",
    "Environmental control measures critical",
    "Consider action plan for severe symptom management",
];

/// Severity classes produced by the classifier (0, 1, 2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeverityClass {
    Mild = 0,
    Moderate = 1,
    Severe = 2,
}

impl SeverityClass {
    #[must_use]
    pub fn from_index(index: i64) -> Option<Self> {
        match index {
            0 => Some(Self::Mild),
            1 => Some(Self::Moderate),
            2 => Some(Self::Severe),
            _ => None,
        }
    }

    #[must_use]
    pub fn recommendations(self) -> &'static [&'static str; 4] {
        match self {
            Self::Mild => &MILD_RECOMMENDATIONS,
            Self::Moderate => &MODERATE_RECOMMENDATIONS,
            Self::Severe => &SEVERE_RECOMMENDATIONS,
        }
    }
}

/// User-facing severity label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeverityLevel {
    #[serde(rename = "Mild Asthma")]
    Mild,
    #[serde(rename = "Moderate Asthma")]
    Moderate,
    #[serde(rename = "Severe Asthma")]
    Severe,
    Unknown,
}

impl SeverityLevel {
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Mild => "Mild Asthma",
            Self::Moderate => "Moderate Asthma",
            Self::Severe => "Severe Asthma",
            Self::Unknown => "Unknown",
        }
    }
}

impl From<Option<SeverityClass>> for SeverityLevel {
    fn from(class: Option<SeverityClass>) -> Self {
        match class {
            Some(SeverityClass::Mild) => Self::Mild,
            Some(SeverityClass::Moderate) => Self::Moderate,
            Some(SeverityClass::Severe) => Self::Severe,
            None => Self::Unknown,
        }
    }
}

impl std::fmt::Display for SeverityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Coarse bucket of prediction confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfidenceTier {
    High,
    Moderate,
    Low,
}

impl ConfidenceTier {
    /// Both thresholds are exclusive: exactly 0.8 is Moderate, exactly 0.6
    /// is Low.
    #[must_use]
    pub fn classify(probability: f64) -> Self {
        if probability > 0.8 {
            Self::High
        } else if probability > 0.6 {
            Self::Moderate
        } else {
            Self::Low
        }
    }
}

impl std::fmt::Display for ConfidenceTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::High => write!(f, "High"),
            Self::Moderate => write!(f, "Moderate"),
            Self::Low => write!(f, "Low"),
        }
    }
}

/// Interpreted prediction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityInterpretation {
    pub severity_level: SeverityLevel,
    pub confidence: ConfidenceTier,
    pub recommendations: Vec<String>,
    /// Probability as a percentage with one decimal, e.g. "85.0%"
    pub confidence_score: String,
}

pub struct SeverityInterpreter;

impl SeverityInterpreter {
    #[must_use]
    pub fn interpret(predicted_class: i64, probability: f64) -> SeverityInterpretation {
        let class = SeverityClass::from_index(predicted_class);

        let recommendations = match class {
            Some(c) => c.recommendations().iter().map(|s| (*s).to_string()).collect(),
            None => vec![FALLBACK_RECOMMENDATION.to_string()],
        };

        SeverityInterpretation {
            severity_level: class.into(),
            confidence: ConfidenceTier::classify(probability),
            recommendations,
            confidence_score: format!("{:.1}%", probability * 100.0),
        }
    }
}
