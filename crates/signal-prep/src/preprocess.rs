//! Waveform Preprocessing

use crate::error::PrepError;
use crate::filter::{SavitzkyGolay, SmoothingConfig};
use crate::normalizer::Scaling;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Nominal APG capture length in samples
pub const DEFAULT_TARGET_LENGTH: usize = 200;

/// Preprocessing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    /// Output length in samples (truncate or zero-pad)
    pub target_length: usize,
    /// Optional smoothing applied to the landmark series
    pub smoothing: Option<SmoothingConfig>,
    /// Scaling applied to the classifier input only
    pub scaling: Scaling,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            target_length: DEFAULT_TARGET_LENGTH,
            smoothing: None,
            scaling: Scaling::ZScore,
        }
    }
}

impl PreprocessConfig {
    /// Config for device-captured data (smoothing enabled)
    pub fn noisy() -> Self {
        Self {
            smoothing: Some(SmoothingConfig::default()),
            ..Default::default()
        }
    }

    /// Check lengths and smoothing window
    pub fn validate(&self) -> Result<(), PrepError> {
        if self.target_length == 0 {
            return Err(PrepError::ZeroTargetLength);
        }
        if let Some(smoothing) = &self.smoothing {
            smoothing.validate()?;
        }
        Ok(())
    }
}

/// Preprocessed waveform, split by consumer
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedWave {
    /// Imputed, length-fitted samples before smoothing or scaling
    pub raw: Vec<f64>,
    /// Unscaled (optionally smoothed) series for the landmark search
    pub wave: Vec<f64>,
    /// Scaled series for the external classifier
    pub model_input: Vec<f64>,
}

/// Replace non-finite samples with the mean of the finite ones
pub fn impute_missing(series: &[f64]) -> Result<Vec<f64>, PrepError> {
    // Running mean: a plain sum overflows for samples near f64::MAX
    let (mean, count) = series
        .iter()
        .filter(|v| v.is_finite())
        .fold((0.0, 0usize), |(mean, count), v| {
            let k = (count + 1) as f64;
            (mean + (v / k - mean / k), count + 1)
        });

    if count == 0 {
        return Err(PrepError::EmptyInput { len: series.len() });
    }

    if count < series.len() {
        debug!(
            "Imputing {} missing samples with mean {:.4}",
            series.len() - count,
            mean
        );
    }

    Ok(series
        .iter()
        .map(|&v| if v.is_finite() { v } else { mean })
        .collect())
}

/// Truncate to `target_length`, or right-pad with zeros
pub fn fit_length(series: &[f64], target_length: usize) -> Vec<f64> {
    let mut fitted: Vec<f64> = series.iter().take(target_length).copied().collect();
    fitted.resize(target_length, 0.0);
    fitted
}

/// Impute missing samples and reconcile the length
pub fn preprocess(series: &[f64], target_length: usize) -> Result<Vec<f64>, PrepError> {
    if target_length == 0 {
        return Err(PrepError::ZeroTargetLength);
    }
    let imputed = impute_missing(series)?;
    Ok(fit_length(&imputed, target_length))
}

/// Configured preprocessor producing both landmark and classifier inputs
#[derive(Debug, Clone)]
pub struct Preprocessor {
    config: PreprocessConfig,
    smoother: Option<SavitzkyGolay>,
}

impl Preprocessor {
    /// Create a new preprocessor, validating the config
    pub fn new(config: PreprocessConfig) -> Result<Self, PrepError> {
        config.validate()?;
        let smoother = config.smoothing.map(SavitzkyGolay::new).transpose()?;
        Ok(Self { config, smoother })
    }

    /// Active configuration
    pub fn config(&self) -> &PreprocessConfig {
        &self.config
    }

    /// Prepare a raw series.
    ///
    /// Smoothing only touches `wave`; scaling only touches `model_input`. `raw` keeps the
    /// samples amplitudes are read from.
    pub fn prepare(&self, series: &[f64]) -> Result<PreparedWave, PrepError> {
        let fitted = preprocess(series, self.config.target_length)?;
        let model_input = self.config.scaling.apply(&fitted);
        let wave = match &self.smoother {
            Some(sg) => sg.smooth(&fitted),
            None => fitted.clone(),
        };

        debug!(
            "Prepared wave: {} raw samples -> {} (scaling={}, smoothed={})",
            series.len(),
            wave.len(),
            self.config.scaling,
            self.smoother.is_some()
        );

        Ok(PreparedWave {
            raw: fitted,
            wave,
            model_input,
        })
    }
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self {
            config: PreprocessConfig::default(),
            smoother: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_missing_values_use_series_mean() {
        let imputed = impute_missing(&[1.0, f64::NAN, 3.0, f64::INFINITY]).unwrap();
        assert_eq!(imputed, vec![1.0, 2.0, 3.0, 2.0]);
    }

    #[test]
    fn test_huge_samples_impute_finite_mean() {
        let imputed = preprocess(&[1e308, 1e308, f64::NAN], 3).unwrap();
        assert_eq!(imputed, vec![1e308, 1e308, 1e308]);

        let imputed = impute_missing(&[f64::MAX, -f64::MAX, f64::NAN]).unwrap();
        assert!(imputed[2].is_finite());
        assert!(imputed[2].abs() < 1e300);
    }

    #[test]
    fn test_prepare_huge_samples_stay_finite() {
        for config in [PreprocessConfig::default(), PreprocessConfig::noisy()] {
            let preprocessor = Preprocessor::new(PreprocessConfig {
                target_length: 40,
                ..config
            })
            .unwrap();
            let series: Vec<f64> = (0..40)
                .map(|i| match i % 3 {
                    0 => f64::MAX,
                    1 => -f64::MAX,
                    _ => f64::NAN,
                })
                .collect();
            let prepared = preprocessor.prepare(&series).unwrap();
            assert!(prepared.raw.iter().all(|v| v.is_finite()));
            assert!(prepared.wave.iter().all(|v| v.is_finite()));
            assert!(prepared.model_input.iter().all(|v| v.is_finite()));
        }
    }

    #[test]
    fn test_no_valid_samples() {
        assert_eq!(
            impute_missing(&[f64::NAN, f64::NAN]).unwrap_err(),
            PrepError::EmptyInput { len: 2 }
        );
        assert_eq!(
            preprocess(&[], 200).unwrap_err(),
            PrepError::EmptyInput { len: 0 }
        );
    }

    #[test]
    fn test_truncate_and_pad() {
        assert_eq!(fit_length(&[1.0, 2.0, 3.0], 2), vec![1.0, 2.0]);
        assert_eq!(fit_length(&[1.0, 2.0], 4), vec![1.0, 2.0, 0.0, 0.0]);
        assert_eq!(preprocess(&[1.0; 300], 200).unwrap().len(), 200);
    }

    #[test]
    fn test_zero_target_length() {
        assert_eq!(preprocess(&[1.0], 0).unwrap_err(), PrepError::ZeroTargetLength);
        let config = PreprocessConfig {
            target_length: 0,
            ..Default::default()
        };
        assert!(Preprocessor::new(config).is_err());
    }

    #[test]
    fn test_prepare_keeps_wave_unscaled() {
        let preprocessor = Preprocessor::new(PreprocessConfig {
            target_length: 5,
            smoothing: None,
            scaling: Scaling::MinMax,
        })
        .unwrap();
        let prepared = preprocessor.prepare(&[2.0, 4.0, f64::NAN]).unwrap();
        assert_eq!(prepared.wave, vec![2.0, 4.0, 3.0, 0.0, 0.0]);
        assert_eq!(prepared.raw, prepared.wave);
        assert_eq!(prepared.model_input, vec![0.5, 1.0, 0.75, 0.0, 0.0]);
    }

    #[test]
    fn test_prepare_smooths_wave_only() {
        let preprocessor = Preprocessor::new(PreprocessConfig {
            target_length: 40,
            ..PreprocessConfig::noisy()
        })
        .unwrap();
        let raw: Vec<f64> = (0..40)
            .map(|i| if i % 2 == 0 { 1.0 } else { -1.0 })
            .collect();
        let prepared = preprocessor.prepare(&raw).unwrap();
        assert_ne!(prepared.wave, raw);
        assert_eq!(prepared.raw, raw);
        assert_eq!(prepared.model_input, Scaling::ZScore.apply(&raw));
    }

    #[test]
    fn test_config_rejects_bad_window() {
        let config = PreprocessConfig {
            smoothing: Some(SmoothingConfig {
                window: 4,
                poly_order: 2,
            }),
            ..Default::default()
        };
        assert!(matches!(
            Preprocessor::new(config),
            Err(PrepError::InvalidWindow { .. })
        ));
    }

    proptest! {
        #[test]
        fn test_preprocess_idempotent(values in prop::collection::vec(-10.0f64..10.0, 200)) {
            let once = preprocess(&values, 200).unwrap();
            let twice = preprocess(&once, 200).unwrap();
            prop_assert_eq!(&once, &values);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn test_preprocess_output_is_finite(
            values in prop::collection::vec(prop_oneof![Just(f64::NAN), -5.0f64..5.0], 1..300),
            target in 1usize..256,
        ) {
            match preprocess(&values, target) {
                Ok(out) => {
                    prop_assert_eq!(out.len(), target);
                    prop_assert!(out.iter().all(|v| v.is_finite()));
                }
                Err(PrepError::EmptyInput { len }) => {
                    prop_assert_eq!(len, values.len());
                    prop_assert!(values.iter().all(|v| v.is_nan()));
                }
                Err(e) => prop_assert!(false, "unexpected error {e}"),
            }
        }

        #[test]
        fn test_full_range_samples_stay_finite(
            values in prop::collection::vec(
                prop_oneof![
                    Just(f64::NAN),
                    prop::num::f64::POSITIVE
                        | prop::num::f64::NEGATIVE
                        | prop::num::f64::NORMAL
                        | prop::num::f64::SUBNORMAL
                        | prop::num::f64::ZERO,
                ],
                1..120,
            ),
            target in 1usize..150,
            smoothed in any::<bool>(),
            scaling in prop_oneof![Just(Scaling::None), Just(Scaling::MinMax), Just(Scaling::ZScore)],
        ) {
            prop_assume!(values.iter().any(|v| v.is_finite()));
            let out = preprocess(&values, target).unwrap();
            prop_assert!(out.iter().all(|v| v.is_finite()));

            let preprocessor = Preprocessor::new(PreprocessConfig {
                target_length: target,
                smoothing: smoothed.then(SmoothingConfig::default),
                scaling,
            })
            .unwrap();
            let prepared = preprocessor.prepare(&values).unwrap();
            prop_assert!(prepared.raw.iter().all(|v| v.is_finite()));
            prop_assert!(prepared.wave.iter().all(|v| v.is_finite()));
            prop_assert!(prepared.model_input.iter().all(|v| v.is_finite()));
        }
    }
}
