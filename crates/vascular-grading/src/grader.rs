//! Rule-Based Grader
//!
//! Chains ratios, score, optional interval blending and classification into one call.

use crate::advisory::{advise, Advisory};
use crate::ratios::{compute_ratios, RatioSet};
use crate::score::{IntervalPolicy, ScoreCard, ScoreConfig};
use crate::stage::{classify, wave_type, Grade, Stage};
use crate::GradingError;
use landmark_engine::LandmarkSet;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

/// Outcome of grading one landmark set
#[derive(Debug, Clone, Serialize)]
pub struct Grading {
    pub ratios: RatioSet,
    pub card: ScoreCard,
    pub stage: Stage,
    pub grade: Grade,
    pub wave_type: String,
    pub advisory: &'static Advisory,
}

/// Rule-based grading engine
#[derive(Clone)]
pub struct Grader {
    config: ScoreConfig,
    interval_policy: Option<Arc<dyn IntervalPolicy>>,
}

impl Grader {
    /// Create a grader, validating weights and ranges up front
    pub fn new(config: ScoreConfig) -> Result<Self, GradingError> {
        config.validate()?;
        info!(
            weights = ?config.weights,
            ranges = ?config.ranges,
            "Grader initialized"
        );
        Ok(Self {
            config,
            interval_policy: None,
        })
    }

    /// Blend inter-landmark intervals into the score with `policy`
    pub fn with_interval_policy(mut self, policy: Arc<dyn IntervalPolicy>) -> Self {
        self.interval_policy = Some(policy);
        self
    }

    pub fn config(&self) -> &ScoreConfig {
        &self.config
    }

    /// Grade a landmark set. `intervals` are only consulted when a policy is installed.
    pub fn grade(
        &self,
        landmarks: &LandmarkSet,
        intervals: &[f64],
    ) -> Result<Grading, GradingError> {
        let ratios = compute_ratios(landmarks)?;
        let mut card = self.config.score(&ratios)?;
        if let Some(policy) = &self.interval_policy {
            card = card.blend_intervals(intervals, policy.as_ref(), self.config.interval_base_weight);
        }

        let (stage, grade) = classify(card.score, card.confidence);
        debug!(
            ab = ratios.ab,
            ca = ratios.ca,
            da = ratios.da,
            score = card.score,
            confidence = card.confidence,
            %stage,
            %grade,
            "Graded landmark set"
        );

        Ok(Grading {
            ratios,
            card,
            stage,
            grade,
            wave_type: wave_type(stage, grade),
            advisory: advise(i64::from(stage.value())),
        })
    }
}

impl Default for Grader {
    fn default() -> Self {
        Self {
            config: ScoreConfig::default(),
            interval_policy: None,
        }
    }
}

impl std::fmt::Debug for Grader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Grader")
            .field("config", &self.config)
            .field("interval_policy", &self.interval_policy.is_some())
            .finish()
    }
}
