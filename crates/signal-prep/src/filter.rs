//! Savitzky-Golay Smoothing for Noise Reduction
//!
//! Fits a local polynomial over an odd-length sliding window. Unlike a moving average it keeps
//! peak positions and heights close to the original, which the landmark search depends on.

use crate::error::PrepError;
use serde::{Deserialize, Serialize};

/// Smoothing window configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmoothingConfig {
    /// Window length in samples (odd, > poly_order)
    pub window: usize,
    /// Order of the fitted polynomial
    pub poly_order: usize,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            window: 11,
            poly_order: 3,
        }
    }
}

impl SmoothingConfig {
    /// Check that the window is odd and can hold the polynomial
    pub fn validate(&self) -> Result<(), PrepError> {
        if self.window == 0 || self.window % 2 == 0 || self.poly_order >= self.window {
            return Err(PrepError::InvalidWindow {
                window: self.window,
                poly_order: self.poly_order,
            });
        }
        Ok(())
    }
}

/// Savitzky-Golay smoothing filter with precomputed coefficients
#[derive(Debug, Clone)]
pub struct SavitzkyGolay {
    half_width: usize,
    coeffs: Vec<f64>,
}

impl SavitzkyGolay {
    /// Create a new filter, rejecting invalid windows
    pub fn new(config: SmoothingConfig) -> Result<Self, PrepError> {
        config.validate()?;
        let half_width = config.window / 2;
        Ok(Self {
            half_width,
            coeffs: smoothing_coefficients(half_width, config.poly_order),
        })
    }

    /// Window length in samples
    pub fn window(&self) -> usize {
        self.coeffs.len()
    }

    /// Convolution coefficients, centre sample at `window() / 2`
    pub fn coefficients(&self) -> &[f64] {
        &self.coeffs
    }

    /// Smooth a series. Edges are mirrored; series shorter than the window pass through.
    pub fn smooth(&self, data: &[f64]) -> Vec<f64> {
        let n = data.len();
        if n < self.coeffs.len() {
            return data.to_vec();
        }

        let scale = data.iter().fold(0.0f64, |m, v| m.max(v.abs()));
        (0..n as isize)
            .map(|i| {
                let y = self.convolve(data, i, 1.0);
                if y.is_finite() || !scale.is_finite() {
                    return y;
                }
                // Overflow near f64::MAX: convolve in scaled units and saturate
                (self.convolve(data, i, scale) * scale).clamp(-f64::MAX, f64::MAX)
            })
            .collect()
    }

    fn convolve(&self, data: &[f64], i: isize, scale: f64) -> f64 {
        let m = self.half_width as isize;
        self.coeffs
            .iter()
            .enumerate()
            .map(|(k, c)| c * (data[mirror(i + k as isize - m, data.len())] / scale))
            .sum::<f64>()
    }
}

/// Reflect an out-of-range index back into `0..n` without repeating the edge sample
fn mirror(j: isize, n: usize) -> usize {
    let last = n as isize - 1;
    let idx = if j < 0 {
        -j
    } else if j > last {
        2 * last - j
    } else {
        j
    };
    idx.clamp(0, last) as usize
}

/// Least-squares smoothing weights for a window of `2m+1` samples.
///
/// Solves `(JᵀJ) a = e₀` where `J[x][k] = x^k`; the weight at offset `x` is `Σ a_k x^k`.
fn smoothing_coefficients(half_width: usize, poly_order: usize) -> Vec<f64> {
    let m = half_width as i64;
    let p = poly_order + 1;

    // (JᵀJ)[r][c] = Σ x^(r+c)
    let power_sums: Vec<f64> = (0..2 * p - 1)
        .map(|e| (-m..=m).map(|x| (x as f64).powi(e as i32)).sum::<f64>())
        .collect();
    let mut system: Vec<Vec<f64>> = (0..p)
        .map(|r| {
            let mut row: Vec<f64> = (0..p).map(|c| power_sums[r + c]).collect();
            row.push(if r == 0 { 1.0 } else { 0.0 });
            row
        })
        .collect();

    let Some(a) = solve(&mut system) else {
        // Ill-conditioned fit: drop one order and retry
        return smoothing_coefficients(half_width, poly_order.saturating_sub(1));
    };

    (-m..=m)
        .map(|x| {
            let x = x as f64;
            a.iter()
                .enumerate()
                .map(|(k, ak)| ak * x.powi(k as i32))
                .sum::<f64>()
        })
        .collect()
}

/// Gauss-Jordan elimination with partial pivoting on an augmented `p × (p+1)` matrix
fn solve(aug: &mut [Vec<f64>]) -> Option<Vec<f64>> {
    let p = aug.len();
    for col in 0..p {
        let pivot_row = (col..p).max_by(|&a, &b| aug[a][col].abs().total_cmp(&aug[b][col].abs()))?;
        if aug[pivot_row][col].abs() < 1e-12 {
            return None;
        }
        aug.swap(col, pivot_row);

        let pivot = aug[col][col];
        for v in aug[col].iter_mut() {
            *v /= pivot;
        }
        for row in 0..p {
            if row != col {
                let factor = aug[row][col];
                for k in col..=p {
                    aug[row][k] -= factor * aug[col][k];
                }
            }
        }
    }
    Some(aug.iter().map(|row| row[p]).collect())
}
