//! Vascular Age Inference
//!
//! Adapts a black-box sequence classifier (ONNX through tract, or any [`Classifier`]) into a
//! vascular-age estimate. The classifier is loaded lazily, once, on the blocking pool.

mod classifier;
mod config;
mod estimator;
mod onnx;

pub use classifier::{Classifier, ClassifierError, ClassifierLoader};
pub use config::{softmax, AgeCalibration, InferenceConfig, OutputActivation};
pub use estimator::{VascularAgeEstimate, VascularAgeEstimator};
pub use onnx::OnnxClassifier;

use thiserror::Error;

/// Errors during inference
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Classifier unavailable: {0}")]
    ModelUnavailable(String),
    #[error("Inference failed: {0}")]
    Inference(#[source] ClassifierError),
    #[error("Invalid classifier output: {0}")]
    InvalidOutput(String),
    #[error("Inference timeout after {0}ms")]
    Timeout(u64),
    #[error("Cannot run inference on an empty series")]
    EmptyInput,
    #[error("Invalid inference config: {0}")]
    InvalidConfig(String),
}
