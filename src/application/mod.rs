//! Application layer: Use cases.
//!
//! This module orchestrates the domain components with the classifier port.

mod assessment;

pub use assessment::{screen, screen_json, Assessment, AssessmentService, Screening};
