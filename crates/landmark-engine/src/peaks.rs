//! Peak, Trough and Inflection Primitives
//!
//! Semantics follow the usual `find_peaks` conventions: a peak is a sample strictly above both
//! neighbours, the first and last samples never qualify, and constraints are applied in the
//! order height, distance, prominence.

use serde::{Deserialize, Serialize};

/// Constraints a local maximum must satisfy to count as a peak
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PeakCriteria {
    /// Minimum peak value
    pub height: Option<f64>,
    /// Minimum index separation between kept peaks (higher peaks win)
    pub distance: Option<usize>,
    /// Minimum prominence
    pub prominence: Option<f64>,
}

impl PeakCriteria {
    /// Only require a minimum height
    pub fn min_height(height: f64) -> Self {
        Self {
            height: Some(height),
            ..Default::default()
        }
    }
}

/// Indices of positive and negative peaks of a waveform
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeakSummary {
    /// Local maxima
    pub positive: Vec<usize>,
    /// Local minima (maxima of the negated series)
    pub negative: Vec<usize>,
}

/// Strict local maxima, ascending
pub fn local_maxima(series: &[f64]) -> Vec<usize> {
    if series.len() < 3 {
        return Vec::new();
    }
    (1..series.len() - 1)
        .filter(|&i| series[i] > series[i - 1] && series[i] > series[i + 1])
        .collect()
}

/// Local maxima satisfying `criteria`, ascending
pub fn find_peaks(series: &[f64], criteria: &PeakCriteria) -> Vec<usize> {
    let mut peaks = local_maxima(series);

    if let Some(height) = criteria.height {
        peaks.retain(|&i| series[i] >= height);
    }
    if let Some(distance) = criteria.distance {
        peaks = filter_by_distance(series, &peaks, distance);
    }
    if let Some(min_prominence) = criteria.prominence {
        peaks.retain(|&i| prominence(series, i) >= min_prominence);
    }

    peaks
}

/// Vertical distance between a peak and the higher of its two bases.
///
/// Each base is the lowest sample between the peak and the nearest strictly higher sample on
/// that side (or the series edge).
pub fn prominence(series: &[f64], peak: usize) -> f64 {
    let height = series[peak];

    let mut left_min = height;
    for &v in series[..peak].iter().rev() {
        if v > height {
            break;
        }
        left_min = left_min.min(v);
    }

    let mut right_min = height;
    for &v in &series[peak + 1..] {
        if v > height {
            break;
        }
        right_min = right_min.min(v);
    }

    height - left_min.max(right_min)
}

/// Drop peaks closer than `distance` samples to a higher kept peak
fn filter_by_distance(series: &[f64], peaks: &[usize], distance: usize) -> Vec<usize> {
    if distance <= 1 || peaks.len() < 2 {
        return peaks.to_vec();
    }

    let mut by_height: Vec<usize> = peaks.to_vec();
    // Highest first; equal heights keep the earlier peak
    by_height.sort_by(|&a, &b| series[b].total_cmp(&series[a]).then(a.cmp(&b)));

    let mut kept: Vec<usize> = Vec::with_capacity(peaks.len());
    for candidate in by_height {
        if kept.iter().all(|&k| k.abs_diff(candidate) >= distance) {
            kept.push(candidate);
        }
    }
    kept.sort_unstable();
    kept
}

/// First-derivative estimate: central differences inside, one-sided at the ends
pub fn gradient(series: &[f64]) -> Vec<f64> {
    let n = series.len();
    if n < 2 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            if i == 0 {
                series[1] - series[0]
            } else if i == n - 1 {
                series[n - 1] - series[n - 2]
            } else {
                (series[i + 1] - series[i - 1]) / 2.0
            }
        })
        .collect()
}

/// First index where the derivative turns from non-positive to positive
pub fn first_upturn(series: &[f64]) -> Option<usize> {
    let slope = gradient(series);
    (1..slope.len()).find(|&i| slope[i] > 0.0 && slope[i - 1] <= 0.0)
}

/// Index of the minimum value (earliest on ties)
pub fn argmin(series: &[f64]) -> Option<usize> {
    series
        .iter()
        .enumerate()
        .min_by(|(i, a), (j, b)| a.total_cmp(b).then(i.cmp(j)))
        .map(|(i, _)| i)
}

/// All positive and negative peaks, without constraints
pub fn peak_summary(series: &[f64]) -> PeakSummary {
    let negated: Vec<f64> = series.iter().map(|v| -v).collect();
    PeakSummary {
        positive: local_maxima(series),
        negative: local_maxima(&negated),
    }
}
