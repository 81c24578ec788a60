//! Preprocessing Error Types

use thiserror::Error;

/// Errors during waveform preprocessing
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PrepError {
    /// Series holds no finite sample to work from
    #[error("Series has no valid samples ({len} samples, all missing)")]
    EmptyInput { len: usize },

    /// Smoothing window cannot fit the requested polynomial
    #[error("Invalid smoothing window {window} for polynomial order {poly_order}: window must be odd and larger than the order")]
    InvalidWindow { window: usize, poly_order: usize },

    /// Target length of zero
    #[error("Target length must be greater than zero")]
    ZeroTargetLength,

    /// Unrecognized scaling name
    #[error("Unknown scaling method: {0} (expected none, minmax or zscore)")]
    UnknownScaling(String),
}
