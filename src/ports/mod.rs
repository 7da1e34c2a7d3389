//! Ports layer: Trait definitions for external collaborators.
//!
//! The trained model lives outside this crate; the application talks to it
//! only through [`SeverityClassifier`].

mod classifier;

pub use classifier::{ModelError, Prediction, SeverityClassifier};
