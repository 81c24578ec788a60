//! Pipeline Facade

use crate::config::PipelineConfig;
use crate::report::{Advice, AnalysisReport};
use crate::PipelineError;
use age_inference::VascularAgeEstimator;
use landmark_engine::{peak_summary, LandmarkExtractor};
use signal_prep::Preprocessor;
use std::sync::Arc;
use tracing::{debug, info, warn};
use vascular_grading::{lifestyle_tips, Grader, IntervalPolicy, UNCLASSIFIABLE};

/// End-to-end APG analysis: rule-based grading plus the model-based age estimate
pub struct ApgPipeline {
    config: PipelineConfig,
    preprocessor: Preprocessor,
    extractor: LandmarkExtractor,
    grader: Grader,
    estimator: VascularAgeEstimator,
}

impl ApgPipeline {
    /// Build every stage from `config`. The ONNX model, if any, loads on first use.
    pub fn new(config: PipelineConfig) -> Result<Self, PipelineError> {
        let estimator = match &config.model_path {
            Some(path) => VascularAgeEstimator::from_onnx_path(config.inference.clone(), path)?,
            None => {
                info!("No classifier model configured, vascular age will be unavailable");
                VascularAgeEstimator::unavailable(config.inference.clone())
            }
        };
        Self::with_estimator(config, estimator)
    }

    /// Build with an injected estimator
    pub fn with_estimator(
        config: PipelineConfig,
        estimator: VascularAgeEstimator,
    ) -> Result<Self, PipelineError> {
        config.validate()?;
        let preprocessor = Preprocessor::new(config.preprocess.clone())?;
        let extractor = LandmarkExtractor::new(config.extractor)?;
        let grader = Grader::new(config.score.clone())?;

        info!(
            target_length = config.preprocess.target_length,
            variant = ?config.extractor.variant,
            "APG pipeline ready"
        );
        Ok(Self {
            config,
            preprocessor,
            extractor,
            grader,
            estimator,
        })
    }

    /// Blend inter-landmark intervals into the grading score
    pub fn with_interval_policy(mut self, policy: Arc<dyn IntervalPolicy>) -> Self {
        self.grader = self.grader.with_interval_policy(policy);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Analyse one raw waveform.
    ///
    /// Fails only when the series has no usable samples.
    pub async fn analyze(&self, series: &[f64]) -> Result<AnalysisReport, PipelineError> {
        let prepared = self.preprocessor.prepare(series)?;
        // Search the (possibly smoothed) wave, report amplitudes of the raw samples
        let landmarks = self.extractor.extract(&prepared.wave).resampled(&prepared.raw);
        let summary = peak_summary(&prepared.wave);
        debug!(
            present = landmarks.present().count(),
            positive = summary.positive.len(),
            negative = summary.negative.len(),
            "Landmarks extracted"
        );

        let mut report = AnalysisReport::with_landmarks(&landmarks, &UNCLASSIFIABLE);

        let intervals = landmarks.intervals(self.config.sample_rate_hz);
        match self.grader.grade(&landmarks, &intervals) {
            Ok(grading) => {
                report.ratios = Some(grading.ratios);
                report.score = Some(grading.card.score);
                report.confidence = Some(grading.card.confidence);
                report.stage = Some(grading.stage);
                report.grade = Some(grading.grade);
                report.advice = Advice::new(Some(grading.wave_type.clone()), grading.advisory);
                report.wave_type = Some(grading.wave_type);
            }
            Err(e) => {
                warn!("Rule-based grading failed: {}", e);
                report.warnings.push(format!("grading: {e}"));
            }
        }

        match self.estimator.estimate(&prepared.model_input).await {
            Ok(estimate) => {
                report.predicted_class = Some(estimate.predicted_class);
                report.probability = Some(estimate.probability);
                report.vascular_age = Some(estimate.vascular_age);
            }
            Err(e) => {
                warn!("Vascular age estimate failed: {}", e);
                report.warnings.push(format!("inference: {e}"));
            }
        }

        report.lifestyle_tips = lifestyle_tips(report.vascular_age);
        report.positive_peaks = summary.positive;
        report.negative_peaks = summary.negative;
        report.apg_wave = prepared.raw;

        info!(
            stage = ?report.stage.map(|s| s.value()),
            vascular_age = ?report.vascular_age,
            warnings = report.warnings.len(),
            "Analysis complete"
        );
        Ok(report)
    }
}
