//! Weighted Vascular Score
//!
//! Each ratio is normalized against its calibrated range and clipped to [0, 1]; the score is
//! the weighted sum. Confidence drops for every ratio that falls outside its range.

use crate::ratios::RatioSet;
use crate::GradingError;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Confidence contribution of a ratio outside its calibrated range
pub const DEFAULT_OUT_OF_RANGE_PENALTY: f64 = 0.5;

/// Tolerance on the weight sum
const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Calibrated `[min, max]` range of one ratio
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatioRange {
    pub min: f64,
    pub max: f64,
}

impl RatioRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Position of `ratio` inside the range, clipped to [0, 1]
    pub fn normalize(&self, ratio: f64) -> f64 {
        ((ratio - self.min) / (self.max - self.min)).clamp(0.0, 1.0)
    }

    /// Inclusive containment
    pub fn contains(&self, ratio: f64) -> bool {
        (self.min..=self.max).contains(&ratio)
    }

    fn validate(&self, ratio: &'static str) -> Result<(), GradingError> {
        if !self.min.is_finite() || !self.max.is_finite() || self.max <= self.min {
            return Err(GradingError::InvalidRange {
                ratio,
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

/// Expected ranges for healthy vessels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpectedRanges {
    pub ab: RatioRange,
    pub ca: RatioRange,
    pub da: RatioRange,
}

impl Default for ExpectedRanges {
    fn default() -> Self {
        Self {
            ab: RatioRange::new(0.8, 2.5),
            ca: RatioRange::new(0.2, 0.7),
            da: RatioRange::new(0.1, 0.5),
        }
    }
}

impl ExpectedRanges {
    pub fn validate(&self) -> Result<(), GradingError> {
        self.ab.validate("AB")?;
        self.ca.validate("CA")?;
        self.da.validate("DA")
    }
}

/// Per-ratio score weights
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub ab: f64,
    pub ca: f64,
    pub da: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            ab: 0.5,
            ca: 0.3,
            da: 0.2,
        }
    }
}

impl ScoreWeights {
    /// Weights must be non-negative and sum to 1
    pub fn validate(&self) -> Result<(), GradingError> {
        let all_valid = [self.ab, self.ca, self.da]
            .iter()
            .all(|w| w.is_finite() && *w >= 0.0);
        let sum = self.ab + self.ca + self.da;
        if !all_valid || (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(GradingError::InvalidWeights {
                ab: self.ab,
                ca: self.ca,
                da: self.da,
            });
        }
        Ok(())
    }
}

/// Scoring configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreConfig {
    pub ranges: ExpectedRanges,
    pub weights: ScoreWeights,
    /// Confidence indicator for an out-of-range ratio
    pub out_of_range_penalty: f64,
    /// Weight kept by the rule score when an interval policy is blended in
    pub interval_base_weight: f64,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            ranges: ExpectedRanges::default(),
            weights: ScoreWeights::default(),
            out_of_range_penalty: DEFAULT_OUT_OF_RANGE_PENALTY,
            interval_base_weight: 0.8,
        }
    }
}

impl ScoreConfig {
    pub fn validate(&self) -> Result<(), GradingError> {
        self.ranges.validate()?;
        self.weights.validate()?;
        unit_interval("out_of_range_penalty", self.out_of_range_penalty)?;
        unit_interval("interval_base_weight", self.interval_base_weight)
    }

    /// Score a ratio set with this configuration
    pub fn score(&self, ratios: &RatioSet) -> Result<ScoreCard, GradingError> {
        self.validate()?;
        Ok(score_unchecked(
            ratios,
            &self.ranges,
            &self.weights,
            self.out_of_range_penalty,
        ))
    }
}

fn unit_interval(name: &'static str, value: f64) -> Result<(), GradingError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(GradingError::InvalidParameter { name, value });
    }
    Ok(())
}

/// Score and confidence of one ratio set
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreCard {
    /// Weighted normalized score in [0, 1], higher is healthier
    pub score: f64,
    /// Share of ratios inside their calibrated range, in [0, 1]
    pub confidence: f64,
}

impl ScoreCard {
    /// Blend an interval-derived score into the rule score.
    ///
    /// The policy output is clamped to [0, 1]. A non-finite output leaves the card unchanged.
    pub fn blend_intervals(
        self,
        intervals: &[f64],
        policy: &dyn IntervalPolicy,
        base_weight: f64,
    ) -> ScoreCard {
        let interval_score = policy.score(intervals);
        if !interval_score.is_finite() {
            warn!(interval_score, "Interval policy returned a non-finite score, ignoring");
            return self;
        }
        let base_weight = base_weight.clamp(0.0, 1.0);
        ScoreCard {
            score: base_weight * self.score + (1.0 - base_weight) * interval_score.clamp(0.0, 1.0),
            confidence: self.confidence,
        }
    }
}

/// Pluggable scoring of inter-landmark time intervals
pub trait IntervalPolicy: Send + Sync {
    /// Score in [0, 1] for the given intervals (seconds)
    fn score(&self, intervals: &[f64]) -> f64;
}

impl<F> IntervalPolicy for F
where
    F: Fn(&[f64]) -> f64 + Send + Sync,
{
    fn score(&self, intervals: &[f64]) -> f64 {
        self(intervals)
    }
}

/// Score a ratio set against calibrated ranges with the default out-of-range penalty
pub fn compute_score(
    ratios: &RatioSet,
    ranges: &ExpectedRanges,
    weights: &ScoreWeights,
) -> Result<ScoreCard, GradingError> {
    ranges.validate()?;
    weights.validate()?;
    Ok(score_unchecked(
        ratios,
        ranges,
        weights,
        DEFAULT_OUT_OF_RANGE_PENALTY,
    ))
}

fn score_unchecked(
    ratios: &RatioSet,
    ranges: &ExpectedRanges,
    weights: &ScoreWeights,
    penalty: f64,
) -> ScoreCard {
    let pairs = [
        (ratios.ab, &ranges.ab, weights.ab),
        (ratios.ca, &ranges.ca, weights.ca),
        (ratios.da, &ranges.da, weights.da),
    ];

    // Weights may sum to 1 within WEIGHT_SUM_TOLERANCE
    let score = pairs
        .iter()
        .map(|(ratio, range, weight)| weight * range.normalize(*ratio))
        .sum::<f64>()
        .clamp(0.0, 1.0);
    let confidence = pairs
        .iter()
        .map(|(ratio, range, _)| if range.contains(*ratio) { 1.0 } else { penalty })
        .sum::<f64>()
        / pairs.len() as f64;

    ScoreCard { score, confidence }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ratios(ab: f64, ca: f64, da: f64) -> RatioSet {
        RatioSet { ab, ca, da }
    }

    fn default_score(r: &RatioSet) -> ScoreCard {
        compute_score(r, &ExpectedRanges::default(), &ScoreWeights::default()).unwrap()
    }

    #[test]
    fn test_in_range_score() {
        let card = default_score(&ratios(1.5, 0.5, 0.3));
        let expected = 0.5 * (0.7 / 1.7) + 0.3 * 0.6 + 0.2 * 0.5;
        assert!((card.score - expected).abs() < 1e-12);
        assert_eq!(card.confidence, 1.0);
    }

    #[test]
    fn test_out_of_range_ratios_are_clipped_and_penalized() {
        let card = default_score(&ratios(5.0, 0.0, 0.3));
        // AB clipped to 1, CA clipped to 0
        assert!((card.score - (0.5 + 0.2 * 0.5)).abs() < 1e-12);
        assert!((card.confidence - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_range_bounds_are_inclusive() {
        let card = default_score(&ratios(2.5, 0.2, 0.1));
        assert_eq!(card.confidence, 1.0);
        assert!((card.score - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_weights_rejected() {
        for weights in [
            ScoreWeights { ab: 0.5, ca: 0.5, da: 0.5 },
            ScoreWeights { ab: 1.2, ca: -0.1, da: -0.1 },
            ScoreWeights { ab: f64::NAN, ca: 0.5, da: 0.5 },
        ] {
            assert!(matches!(
                compute_score(&ratios(1.0, 0.5, 0.2), &ExpectedRanges::default(), &weights),
                Err(GradingError::InvalidWeights { .. })
            ));
        }
        let nearly_one = ScoreWeights { ab: 0.5, ca: 0.3, da: 0.2 + 5e-7 };
        assert!(nearly_one.validate().is_ok());
    }

    #[test]
    fn test_tolerated_weight_sum_keeps_score_bounded() {
        let heavy = ScoreWeights { ab: 0.5, ca: 0.3, da: 0.2 + 9e-7 };
        assert!(heavy.validate().is_ok());
        let card = compute_score(&ratios(10.0, 10.0, 10.0), &ExpectedRanges::default(), &heavy)
            .unwrap();
        assert_eq!(card.score, 1.0);
    }

    #[test]
    fn test_invalid_range_rejected() {
        let ranges = ExpectedRanges {
            ca: RatioRange::new(0.7, 0.7),
            ..Default::default()
        };
        assert_eq!(
            compute_score(&ratios(1.0, 0.5, 0.2), &ranges, &ScoreWeights::default()).unwrap_err(),
            GradingError::InvalidRange { ratio: "CA", min: 0.7, max: 0.7 }
        );
    }

    #[test]
    fn test_config_penalty() {
        let config = ScoreConfig {
            out_of_range_penalty: 0.0,
            ..Default::default()
        };
        let card = config.score(&ratios(5.0, 5.0, 5.0)).unwrap();
        assert_eq!(card.confidence, 0.0);
        assert_eq!(card.score, 1.0);

        let bad = ScoreConfig {
            interval_base_weight: 1.5,
            ..Default::default()
        };
        assert!(matches!(
            bad.validate(),
            Err(GradingError::InvalidParameter { name: "interval_base_weight", .. })
        ));
    }

    #[test]
    fn test_blend_intervals() {
        let card = ScoreCard { score: 0.5, confidence: 0.9 };
        let blended = card.blend_intervals(&[0.2, 0.3], &|_: &[f64]| 1.0, 0.8);
        assert!((blended.score - 0.6).abs() < 1e-12);
        assert_eq!(blended.confidence, 0.9);

        // Out-of-range policy output is clamped
        let clamped = card.blend_intervals(&[], &|_: &[f64]| -3.0, 0.5);
        assert!((clamped.score - 0.25).abs() < 1e-12);

        let ignored = card.blend_intervals(&[], &|_: &[f64]| f64::NAN, 0.5);
        assert_eq!(ignored, card);
    }

    #[test]
    fn test_policy_sees_intervals() {
        struct MeanInterval;
        impl IntervalPolicy for MeanInterval {
            fn score(&self, intervals: &[f64]) -> f64 {
                intervals.iter().sum::<f64>() / intervals.len().max(1) as f64
            }
        }
        let card = ScoreCard { score: 0.0, confidence: 1.0 };
        let blended = card.blend_intervals(&[0.2, 0.4], &MeanInterval, 0.0);
        assert!((blended.score - 0.3).abs() < 1e-12);
    }

    proptest! {
        #[test]
        fn test_score_and_confidence_bounded(
            ab in 0.0f64..10.0,
            ca in 0.0f64..10.0,
            da in 0.0f64..10.0,
        ) {
            let card = default_score(&ratios(ab, ca, da));
            prop_assert!((0.0..=1.0).contains(&card.score));
            prop_assert!((0.5..=1.0).contains(&card.confidence));
        }
    }
}
