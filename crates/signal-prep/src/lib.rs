//! Signal Preprocessing
//!
//! Turns raw, variable-length APG sample sequences into fixed-length, finite series for
//! landmark search and for an external classifier.

mod error;
mod filter;
mod normalizer;
mod preprocess;

pub use error::PrepError;
pub use filter::{SavitzkyGolay, SmoothingConfig};
pub use normalizer::Scaling;
pub use preprocess::{
    fit_length, impute_missing, preprocess, PreparedWave, PreprocessConfig, Preprocessor,
    DEFAULT_TARGET_LENGTH,
};
