//! Stage and Grade Classification

use crate::GradingError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lower score bounds of stages 0 through 4; anything below the last is stage 5
const STAGE_THRESHOLDS: [f64; 5] = [0.9, 0.75, 0.6, 0.45, 0.3];

/// Vascular aging stage, 0 (best) to 5 (worst)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Stage(u8);

impl Stage {
    pub const BEST: Stage = Stage(0);
    pub const WORST: Stage = Stage(5);

    pub fn new(value: u8) -> Option<Self> {
        (value <= Self::WORST.0).then_some(Self(value))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Stage for a score; non-finite scores are the worst stage
    pub fn from_score(score: f64) -> Self {
        STAGE_THRESHOLDS
            .iter()
            .position(|&threshold| score >= threshold)
            .map_or(Self::WORST, |stage| Self(stage as u8))
    }
}

impl TryFrom<u8> for Stage {
    type Error = GradingError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(GradingError::InvalidStage(value))
    }
}

impl From<Stage> for u8 {
    fn from(stage: Stage) -> Self {
        stage.0
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reliability grade of a stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "+++")]
    High,
    #[serde(rename = "++")]
    Medium,
    #[serde(rename = "+")]
    Low,
}

impl Grade {
    /// Grade for a confidence; non-finite confidences are `Low`
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence >= 0.8 {
            Grade::High
        } else if confidence >= 0.6 {
            Grade::Medium
        } else {
            Grade::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::High => "+++",
            Grade::Medium => "++",
            Grade::Low => "+",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a score and confidence onto a stage and grade
pub fn classify(score: f64, confidence: f64) -> (Stage, Grade) {
    (Stage::from_score(score), Grade::from_confidence(confidence))
}

/// Wave type label, e.g. `3+`
pub fn wave_type(stage: Stage, grade: Grade) -> String {
    format!("{stage}{grade}")
}
