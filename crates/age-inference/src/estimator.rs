//! Vascular Age Estimator
//!
//! Holds the injected classifier loader and resolves it at most once. A failed load is
//! remembered, so later calls report `ModelUnavailable` without retrying.

use crate::classifier::{Classifier, ClassifierLoader};
use crate::config::InferenceConfig;
use crate::onnx::OnnxClassifier;
use crate::InferenceError;
use ndarray::{Array2, Array3};
use serde::{Deserialize, Serialize};
use signal_prep::fit_length;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::OnceCell;
use tokio::time::{timeout, Duration};
use tracing::{debug, error, info, warn};

/// Model-based estimate for one waveform
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VascularAgeEstimate {
    /// Most probable class
    pub predicted_class: usize,
    /// Probability of that class
    pub probability: f64,
    /// Vascular age in years
    pub vascular_age: u32,
}

/// Classifier adapter producing vascular-age estimates
pub struct VascularAgeEstimator {
    config: InferenceConfig,
    loader: Option<Arc<dyn ClassifierLoader>>,
    classifier: OnceCell<Option<Arc<dyn Classifier>>>,
}

impl VascularAgeEstimator {
    /// Estimator that loads its classifier with `loader` on first use
    pub fn new(
        config: InferenceConfig,
        loader: Arc<dyn ClassifierLoader>,
    ) -> Result<Self, InferenceError> {
        config.validate()?;
        info!(timeout_ms = ?config.timeout_ms, activation = ?config.activation, "Creating vascular age estimator");
        Ok(Self {
            config,
            loader: Some(loader),
            classifier: OnceCell::new(),
        })
    }

    /// Estimator around an already constructed classifier
    pub fn with_classifier(
        config: InferenceConfig,
        classifier: Arc<dyn Classifier>,
    ) -> Result<Self, InferenceError> {
        config.validate()?;
        Ok(Self {
            config,
            loader: None,
            classifier: OnceCell::new_with(Some(Some(classifier))),
        })
    }

    /// Estimator without a classifier; every estimate is `ModelUnavailable`
    pub fn unavailable(config: InferenceConfig) -> Self {
        Self {
            config,
            loader: None,
            classifier: OnceCell::new_with(Some(None)),
        }
    }

    /// Estimator backed by an ONNX model file, loaded on first use
    pub fn from_onnx_path(
        config: InferenceConfig,
        path: impl Into<PathBuf>,
    ) -> Result<Self, InferenceError> {
        let path = path.into();
        let input_length = config.input_length;
        info!("Creating estimator with model: {}", path.display());
        let loader = move || -> Result<Arc<dyn Classifier>, crate::ClassifierError> {
            Ok(Arc::new(OnnxClassifier::load(&path, input_length)?))
        };
        Self::new(config, Arc::new(loader))
    }

    pub fn config(&self) -> &InferenceConfig {
        &self.config
    }

    /// Whether a classifier has been resolved successfully
    pub fn is_loaded(&self) -> bool {
        matches!(self.classifier.get(), Some(Some(_)))
    }

    /// Resolve the classifier, loading it on the blocking pool on first use
    async fn classifier(&self) -> Result<Arc<dyn Classifier>, InferenceError> {
        let resolved = self
            .classifier
            .get_or_try_init(|| load_classifier(self.loader.clone()))
            .await?;

        resolved
            .clone()
            .ok_or_else(|| InferenceError::ModelUnavailable("no classifier loaded".to_string()))
    }

    /// Estimate the vascular age of one (already scaled) waveform
    pub async fn estimate(&self, series: &[f64]) -> Result<VascularAgeEstimate, InferenceError> {
        if series.is_empty() {
            return Err(InferenceError::EmptyInput);
        }
        let classifier = self.classifier().await?;

        let length = classifier.input_length();
        if series.len() != length {
            debug!(from = series.len(), to = length, "Reconciling series length for classifier");
        }
        let input = to_model_input(series, length)?;

        let start = Instant::now();
        let task = tokio::task::spawn_blocking(move || classifier.predict(&input));
        let joined = match self.config.timeout_ms {
            Some(ms) => timeout(Duration::from_millis(ms), task).await.map_err(|_| {
                warn!(timeout_ms = ms, "Inference timed out");
                InferenceError::Timeout(ms)
            })?,
            None => task.await,
        };
        let output = joined
            .map_err(|e| InferenceError::Inference(Box::new(e)))?
            .map_err(InferenceError::Inference)?;
        debug!("Inference completed in {}ms", start.elapsed().as_millis());

        self.decode(&output)
    }

    /// Pick the most probable class of the first output row
    fn decode(&self, output: &Array2<f32>) -> Result<VascularAgeEstimate, InferenceError> {
        let row: Vec<f64> = output
            .rows()
            .into_iter()
            .next()
            .map(|r| r.iter().map(|&v| f64::from(v)).collect())
            .unwrap_or_default();
        if row.is_empty() {
            return Err(InferenceError::InvalidOutput(format!(
                "empty output of shape {:?}",
                output.shape()
            )));
        }
        if row.iter().any(|v| !v.is_finite()) {
            return Err(InferenceError::InvalidOutput(
                "non-finite class score".to_string(),
            ));
        }

        let probabilities = self.config.activation.probabilities(&row);
        let (predicted_class, probability) = probabilities
            .iter()
            .copied()
            .enumerate()
            .max_by(|(i, a), (j, b)| a.total_cmp(b).then(j.cmp(i)))
            .ok_or_else(|| InferenceError::InvalidOutput("no classes".to_string()))?;

        Ok(VascularAgeEstimate {
            predicted_class,
            probability,
            vascular_age: self.config.calibration.age_for_class(predicted_class),
        })
    }
}

/// Run the loader once. A loader error resolves to `None` so it is not retried.
async fn load_classifier(
    loader: Option<Arc<dyn ClassifierLoader>>,
) -> Result<Option<Arc<dyn Classifier>>, InferenceError> {
    let Some(loader) = loader else {
        return Ok(None);
    };
    let start = Instant::now();
    let loaded = tokio::task::spawn_blocking(move || loader.load())
        .await
        .map_err(|e| InferenceError::ModelUnavailable(e.to_string()))?;
    match loaded {
        Ok(classifier) => {
            info!(
                input_length = classifier.input_length(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Classifier loaded"
            );
            Ok(Some(classifier))
        }
        Err(e) => {
            error!("Classifier load failed: {}", e);
            Ok(None)
        }
    }
}

/// Shape a series as a `[1, length, 1]` batch, truncating or zero-padding
fn to_model_input(series: &[f64], length: usize) -> Result<Array3<f32>, InferenceError> {
    let values: Vec<f32> = fit_length(series, length)
        .into_iter()
        .map(|v| v as f32)
        .collect();
    Array3::from_shape_vec((1, length, 1), values)
        .map_err(|e| InferenceError::Inference(Box::new(e)))
}

impl std::fmt::Debug for VascularAgeEstimator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VascularAgeEstimator")
            .field("config", &self.config)
            .field("has_loader", &self.loader.is_some())
            .field("loaded", &self.is_loaded())
            .finish()
    }
}
