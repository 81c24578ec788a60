//! Waveform Statistics

/// Spread and roughness of a waveform
#[derive(Debug, Clone, Default)]
pub struct WaveStatistics {
    /// Population standard deviation
    pub std_dev: f64,
    /// Mean absolute sample-to-sample change
    pub rate_of_change: f64,
}

impl WaveStatistics {
    /// Compute statistics from a slice of values
    pub fn compute(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;

        let rate_of_change = if values.len() >= 2 {
            values.windows(2).map(|w| (w[1] - w[0]).abs()).sum::<f64>()
                / (values.len() - 1) as f64
        } else {
            0.0
        };

        Self {
            std_dev: variance.sqrt(),
            rate_of_change,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_std_dev_computation() {
        let stats = WaveStatistics::compute(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert!((stats.std_dev - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_constant_wave_has_no_spread() {
        let stats = WaveStatistics::compute(&[3.0; 6]);
        assert_eq!(stats.std_dev, 0.0);
        assert_eq!(stats.rate_of_change, 0.0);
    }

    #[test]
    fn test_rate_of_change() {
        let stats = WaveStatistics::compute(&[0.0, 1.0, 0.0, 1.0]);
        assert!((stats.rate_of_change - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_values() {
        let stats = WaveStatistics::compute(&[]);
        assert_eq!(stats.std_dev, 0.0);
        assert_eq!(stats.rate_of_change, 0.0);
    }
}
