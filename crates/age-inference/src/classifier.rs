//! Classifier Collaborator Contract

use ndarray::{Array2, Array3};
use std::sync::Arc;

/// Error type returned by classifiers and loaders
pub type ClassifierError = Box<dyn std::error::Error + Send + Sync>;

/// A sequence classifier mapping `[batch, length, 1]` inputs to `[batch, classes]` outputs.
///
/// Outputs may be logits or probabilities; see [`crate::OutputActivation`].
pub trait Classifier: Send + Sync {
    /// Sequence length the classifier expects
    fn input_length(&self) -> usize;

    /// Run the classifier. Called from the blocking pool.
    fn predict(&self, input: &Array3<f32>) -> Result<Array2<f32>, ClassifierError>;
}

/// Produces the classifier on first use
pub trait ClassifierLoader: Send + Sync {
    fn load(&self) -> Result<Arc<dyn Classifier>, ClassifierError>;
}

impl<F> ClassifierLoader for F
where
    F: Fn() -> Result<Arc<dyn Classifier>, ClassifierError> + Send + Sync,
{
    fn load(&self) -> Result<Arc<dyn Classifier>, ClassifierError> {
        self()
    }
}
