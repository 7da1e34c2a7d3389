//! Adapters layer: Concrete implementations of ports.
//!
//! - `logistic`: exported scaler + logistic regression pipeline (JSON)

pub mod logistic;

pub use logistic::{ExportedLogisticModel, LogisticModel};
