//! Amplitude Scaling for Classifier Input

use crate::error::PrepError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Spread below which a series counts as constant
const MIN_SPREAD: f64 = 1e-12;

/// Scaling method applied to the classifier input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scaling {
    /// Leave amplitudes unchanged
    None,
    /// Rescale into [0, 1]
    MinMax,
    /// Zero mean, unit (population) variance
    #[default]
    ZScore,
}

impl Scaling {
    /// Scale a whole series. Constant series map to all zeros.
    pub fn apply(&self, values: &[f64]) -> Vec<f64> {
        if values.is_empty() {
            return Vec::new();
        }

        match self {
            Scaling::None => values.to_vec(),
            Scaling::MinMax => {
                let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
                let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
                // Half-range stays finite for any finite pair
                let half_range = max / 2.0 - min / 2.0;
                if !half_range.is_finite() || half_range < MIN_SPREAD / 2.0 {
                    return vec![0.0; values.len()];
                }
                values
                    .iter()
                    .map(|v| (v / 2.0 - min / 2.0) / half_range)
                    .collect()
            }
            Scaling::ZScore => {
                // Moments in units of the largest magnitude so sums cannot overflow
                let scale = values.iter().fold(0.0f64, |m, v| m.max(v.abs()));
                if !scale.is_finite() || scale == 0.0 {
                    return vec![0.0; values.len()];
                }
                let n = values.len() as f64;
                let mean = values.iter().map(|v| v / scale).sum::<f64>() / n;
                let variance = values
                    .iter()
                    .map(|v| (v / scale - mean).powi(2))
                    .sum::<f64>()
                    / n;
                let std_dev = variance.sqrt();
                if std_dev * scale < MIN_SPREAD {
                    return vec![0.0; values.len()];
                }
                values.iter().map(|v| (v / scale - mean) / std_dev).collect()
            }
        }
    }

    /// Configuration name
    pub fn as_str(&self) -> &'static str {
        match self {
            Scaling::None => "none",
            Scaling::MinMax => "minmax",
            Scaling::ZScore => "zscore",
        }
    }
}

impl fmt::Display for Scaling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scaling {
    type Err = PrepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Scaling::None),
            "minmax" => Ok(Scaling::MinMax),
            "zscore" => Ok(Scaling::ZScore),
            other => Err(PrepError::UnknownScaling(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_zscore_scaling() {
        let scaled = Scaling::ZScore.apply(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        // mean 5, population std 2
        assert!((scaled[0] + 1.5).abs() < 1e-12);
        assert!((scaled[7] - 2.0).abs() < 1e-12);
        let mean: f64 = scaled.iter().sum::<f64>() / scaled.len() as f64;
        assert!(mean.abs() < 1e-12);
    }

    #[test]
    fn test_minmax_scaling() {
        let scaled = Scaling::MinMax.apply(&[0.0, 100.0, 50.0]);
        assert_eq!(scaled, vec![0.0, 1.0, 0.5]);
    }

    #[test]
    fn test_constant_series_scales_to_zero() {
        assert_eq!(Scaling::MinMax.apply(&[3.0; 4]), vec![0.0; 4]);
        assert_eq!(Scaling::ZScore.apply(&[3.0; 4]), vec![0.0; 4]);
        assert_eq!(Scaling::None.apply(&[3.0; 4]), vec![3.0; 4]);
    }

    #[test]
    fn test_huge_amplitudes_scale_finite() {
        let scaled = Scaling::ZScore.apply(&[1e308, 1e308, -1e308]);
        assert!(scaled.iter().all(|v| v.is_finite()));
        // mean 1/3, population std sqrt(8)/3 in units of 1e308
        let expected = 1.0 / 2f64.sqrt();
        assert!((scaled[0] - expected).abs() < 1e-9);
        assert!((scaled[2] + 2.0 * expected).abs() < 1e-9);

        let scaled = Scaling::MinMax.apply(&[f64::MAX, -f64::MAX, 0.0]);
        assert_eq!(scaled, vec![1.0, 0.0, 0.5]);
    }

    #[test]
    fn test_parse_and_serde_names() {
        assert_eq!("minmax".parse::<Scaling>().unwrap(), Scaling::MinMax);
        assert_eq!(" ZScore ".parse::<Scaling>().unwrap(), Scaling::ZScore);
        assert_eq!("none".parse::<Scaling>().unwrap(), Scaling::None);
        assert!(matches!(
            "robust".parse::<Scaling>(),
            Err(PrepError::UnknownScaling(_))
        ));

        assert_eq!(serde_json::to_string(&Scaling::MinMax).unwrap(), "\"minmax\"");
        let parsed: Scaling = serde_json::from_str("\"zscore\"").unwrap();
        assert_eq!(parsed, Scaling::ZScore);
    }

    proptest! {
        #[test]
        fn test_scaling_is_idempotent(values in prop::collection::vec(-1000.0f64..1000.0, 2..64)) {
            for scaling in [Scaling::None, Scaling::MinMax, Scaling::ZScore] {
                let once = scaling.apply(&values);
                let twice = scaling.apply(&once);
                for (a, b) in once.iter().zip(&twice) {
                    prop_assert!((a - b).abs() < 1e-6);
                }
            }
        }

        #[test]
        fn test_scaling_full_range_is_finite(
            values in prop::collection::vec(
                prop::num::f64::POSITIVE
                    | prop::num::f64::NEGATIVE
                    | prop::num::f64::NORMAL
                    | prop::num::f64::SUBNORMAL
                    | prop::num::f64::ZERO,
                1..64,
            )
        ) {
            for scaling in [Scaling::None, Scaling::MinMax, Scaling::ZScore] {
                prop_assert!(scaling.apply(&values).iter().all(|v| v.is_finite()));
            }
        }

        #[test]
        fn test_minmax_bounds(values in prop::collection::vec(-1e6f64..1e6, 1..64)) {
            for v in Scaling::MinMax.apply(&values) {
                prop_assert!((0.0..=1.0).contains(&v));
            }
        }
    }
}
