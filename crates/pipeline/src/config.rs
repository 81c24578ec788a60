//! Pipeline Configuration
//!
//! Defaults, overlaid by an optional file (format from its extension), overlaid by
//! `APG__`-prefixed environment variables, e.g. `APG__SCORE__WEIGHTS__AB=0.6`.

use crate::PipelineError;
use ::config::{Config, Environment, File};
use age_inference::InferenceConfig;
use landmark_engine::ExtractorConfig;
use serde::{Deserialize, Serialize};
use signal_prep::PreprocessConfig;
use std::path::{Path, PathBuf};
use tracing::info;
use vascular_grading::ScoreConfig;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "APG";

/// Configuration of every pipeline stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub preprocess: PreprocessConfig,
    pub extractor: ExtractorConfig,
    pub score: ScoreConfig,
    pub inference: InferenceConfig,
    /// Sampling rate used to turn landmark gaps into seconds
    pub sample_rate_hz: f64,
    /// ONNX classifier; without one the report carries no vascular age
    pub model_path: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            preprocess: PreprocessConfig::default(),
            extractor: ExtractorConfig::default(),
            score: ScoreConfig::default(),
            inference: InferenceConfig::default(),
            sample_rate_hz: 100.0,
            model_path: None,
        }
    }
}

impl PipelineConfig {
    /// Config for device captures: the noise-robust extractor.
    ///
    /// The extractor smooths its own search copy, so preprocessing stays unsmoothed and the
    /// wave is filtered once.
    pub fn noisy() -> Self {
        Self {
            preprocess: PreprocessConfig::default(),
            extractor: ExtractorConfig::noise_robust(),
            ..Default::default()
        }
    }

    /// Load defaults, then `path`, then environment overrides
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PipelineError> {
        Self::layered(Some(path.as_ref()))
    }

    /// Load defaults, then environment overrides
    pub fn from_env() -> Result<Self, PipelineError> {
        Self::layered(None)
    }

    fn layered(path: Option<&Path>) -> Result<Self, PipelineError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            info!("Loading configuration from {}", path.display());
            builder = builder.add_source(File::from(path));
        }
        let config: PipelineConfig = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Check every stage's parameters
    pub fn validate(&self) -> Result<(), PipelineError> {
        self.preprocess.validate()?;
        self.extractor.validate()?;
        self.score.validate()?;
        self.inference.validate()?;
        if !self.sample_rate_hz.is_finite() || self.sample_rate_hz <= 0.0 {
            return Err(PipelineError::InvalidConfig(format!(
                "sample_rate_hz must be positive, got {}",
                self.sample_rate_hz
            )));
        }
        Ok(())
    }
}
