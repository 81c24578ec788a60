//! Vascular Grading
//!
//! Rule-based path from APG landmarks to a staged vascular-health grade: amplitude ratios,
//! calibrated weighted score, stage/grade thresholds and the advisory table.

mod advisory;
mod grader;
mod ratios;
mod score;
mod stage;

pub use advisory::{advise, lifestyle_tips, Advisory, HIGH_RISK_AGE, UNCLASSIFIABLE};
pub use grader::{Grader, Grading};
pub use ratios::{compute_ratios, RatioSet, REQUIRED_LANDMARKS};
pub use score::{
    compute_score, ExpectedRanges, IntervalPolicy, RatioRange, ScoreCard, ScoreConfig,
    ScoreWeights, DEFAULT_OUT_OF_RANGE_PENALTY,
};
pub use stage::{classify, wave_type, Grade, Stage};

use landmark_engine::LandmarkRole;
use thiserror::Error;

/// Errors on the rule-based grading path
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GradingError {
    #[error("Insufficient landmarks for ratio computation: missing {missing:?}")]
    IncompleteLandmarks { missing: Vec<LandmarkRole> },
    #[error("Degenerate amplitude: landmark A at index {index} is zero")]
    DegenerateAmplitude { index: usize },
    #[error("Score weights must be non-negative and sum to 1 (got AB={ab}, CA={ca}, DA={da})")]
    InvalidWeights { ab: f64, ca: f64, da: f64 },
    #[error("Calibrated range for {ratio} is invalid: [{min}, {max}]")]
    InvalidRange { ratio: &'static str, min: f64, max: f64 },
    #[error("{name} must lie in [0, 1], got {value}")]
    InvalidParameter { name: &'static str, value: f64 },
    #[error("Stage {0} is outside 0..=5")]
    InvalidStage(u8),
}
