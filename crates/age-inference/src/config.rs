//! Inference Configuration and Output Decoding

use crate::InferenceError;
use serde::{Deserialize, Serialize};
use signal_prep::DEFAULT_TARGET_LENGTH;

/// Tolerance when deciding whether a row already sums to one
const PROBABILITY_SUM_TOLERANCE: f64 = 1e-3;

/// How to interpret classifier outputs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputActivation {
    /// Probabilities if every value is in [0, 1] and the row sums to one, logits otherwise
    #[default]
    Auto,
    Logits,
    Probabilities,
}

impl OutputActivation {
    /// Turn one output row into class probabilities
    pub fn probabilities(&self, row: &[f64]) -> Vec<f64> {
        let already_normalized = match self {
            OutputActivation::Probabilities => true,
            OutputActivation::Logits => false,
            OutputActivation::Auto => {
                row.iter().all(|v| (0.0..=1.0).contains(v))
                    && (row.iter().sum::<f64>() - 1.0).abs() <= PROBABILITY_SUM_TOLERANCE
            }
        };
        if already_normalized {
            row.to_vec()
        } else {
            softmax(row)
        }
    }
}

/// Numerically stable softmax
pub fn softmax(logits: &[f64]) -> Vec<f64> {
    let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = logits.iter().map(|v| (v - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Linear mapping from predicted class to vascular age
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgeCalibration {
    /// Age of class 0
    pub base_age: f64,
    /// Age span covered by classes 0 through `max_class`
    pub span: f64,
    /// Class mapped to `base_age + span`
    pub max_class: f64,
}

impl Default for AgeCalibration {
    fn default() -> Self {
        Self {
            base_age: 20.0,
            span: 60.0,
            max_class: 9.0,
        }
    }
}

impl AgeCalibration {
    /// Vascular age for a class, rounded to whole years
    pub fn age_for_class(&self, class: usize) -> u32 {
        let age = self.base_age + class as f64 * self.span / self.max_class;
        age.round() as u32
    }

    pub fn validate(&self) -> Result<(), InferenceError> {
        let finite = self.base_age.is_finite() && self.span.is_finite();
        if !finite || !self.max_class.is_finite() || self.max_class <= 0.0 {
            return Err(InferenceError::InvalidConfig(format!(
                "age calibration must be finite with max_class > 0, got {self:?}"
            )));
        }
        Ok(())
    }
}

/// Classifier adapter configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// Sequence length an ONNX model is loaded with
    pub input_length: usize,
    /// Optional per-call inference timeout
    pub timeout_ms: Option<u64>,
    pub activation: OutputActivation,
    pub calibration: AgeCalibration,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            input_length: DEFAULT_TARGET_LENGTH,
            timeout_ms: None,
            activation: OutputActivation::Auto,
            calibration: AgeCalibration::default(),
        }
    }
}

impl InferenceConfig {
    pub fn validate(&self) -> Result<(), InferenceError> {
        if self.input_length == 0 {
            return Err(InferenceError::InvalidConfig(
                "input_length must be positive".to_string(),
            ));
        }
        if self.timeout_ms == Some(0) {
            return Err(InferenceError::InvalidConfig(
                "timeout_ms must be positive when set".to_string(),
            ));
        }
        self.calibration.validate()
    }
}
