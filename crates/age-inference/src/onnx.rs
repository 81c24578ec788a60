//! ONNX Classifier Backed by tract

use crate::classifier::{Classifier, ClassifierError};
use ndarray::{Array2, Array3};
use std::path::Path;
use tracing::info;
use tract_onnx::prelude::*;

/// Sequence classifier loaded from an ONNX file.
///
/// The runnable plan is optimized once for a `[1, input_length, 1]` f32 input.
pub struct OnnxClassifier {
    plan: TypedRunnableModel<TypedModel>,
    input_length: usize,
}

impl OnnxClassifier {
    /// Load and optimize the model. Runs synchronously; call from the blocking pool.
    pub fn load(path: impl AsRef<Path>, input_length: usize) -> TractResult<Self> {
        let path = path.as_ref();
        info!("Loading ONNX model: {}", path.display());
        let plan = tract_onnx::onnx()
            .model_for_path(path)?
            .with_input_fact(0, f32::fact([1, input_length, 1]).into())?
            .into_optimized()?
            .into_runnable()?;
        Ok(Self { plan, input_length })
    }
}

impl Classifier for OnnxClassifier {
    fn input_length(&self) -> usize {
        self.input_length
    }

    fn predict(&self, input: &Array3<f32>) -> Result<Array2<f32>, ClassifierError> {
        let data: Vec<f32> = input.iter().copied().collect();
        let tensor = Tensor::from_shape(input.shape(), &data)?;
        let outputs = self.plan.run(tvec!(tensor.into()))?;

        let output = outputs[0].to_array_view::<f32>()?;
        let classes = output.shape().last().copied().unwrap_or(0);
        let values: Vec<f32> = output.iter().copied().collect();
        let rows = if classes == 0 { 0 } else { values.len() / classes };
        Ok(Array2::from_shape_vec((rows, classes), values)?)
    }
}

impl std::fmt::Debug for OnnxClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxClassifier")
            .field("input_length", &self.input_length)
            .finish()
    }
}
