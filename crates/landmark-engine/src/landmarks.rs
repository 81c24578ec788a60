//! Sequential A-E Landmark Search

use crate::peaks::{argmin, find_peaks, first_upturn, PeakCriteria};
use crate::statistics::WaveStatistics;
use serde::{Deserialize, Serialize};
use signal_prep::{PrepError, SavitzkyGolay, SmoothingConfig};
use std::fmt;
use thiserror::Error;
use tracing::debug;

/// Errors in extractor configuration
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExtractorError {
    /// Smoothing window rejected
    #[error(transparent)]
    Smoothing(#[from] PrepError),

    /// Parameter outside its allowed range
    #[error("Extractor parameter {name} = {value} is out of range")]
    InvalidParameter { name: &'static str, value: f64 },
}

/// Named APG landmark
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LandmarkRole {
    A,
    B,
    C,
    D,
    E,
}

impl LandmarkRole {
    /// All roles in search order
    pub const ALL: [LandmarkRole; 5] = [
        LandmarkRole::A,
        LandmarkRole::B,
        LandmarkRole::C,
        LandmarkRole::D,
        LandmarkRole::E,
    ];

    /// Single-letter name
    pub fn as_str(&self) -> &'static str {
        match self {
            LandmarkRole::A => "A",
            LandmarkRole::B => "B",
            LandmarkRole::C => "C",
            LandmarkRole::D => "D",
            LandmarkRole::E => "E",
        }
    }
}

impl fmt::Display for LandmarkRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Located landmark: index into the original series and the sample there
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub index: usize,
    pub value: f64,
}

/// Result of a landmark search. Absent landmarks are `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LandmarkSet {
    pub a: Option<Landmark>,
    pub b: Option<Landmark>,
    pub c: Option<Landmark>,
    pub d: Option<Landmark>,
    pub e: Option<Landmark>,
}

impl LandmarkSet {
    /// Landmark for a role
    pub fn get(&self, role: LandmarkRole) -> Option<Landmark> {
        match role {
            LandmarkRole::A => self.a,
            LandmarkRole::B => self.b,
            LandmarkRole::C => self.c,
            LandmarkRole::D => self.d,
            LandmarkRole::E => self.e,
        }
    }

    /// Roles among `required` that were not found
    pub fn missing(&self, required: &[LandmarkRole]) -> Vec<LandmarkRole> {
        required
            .iter()
            .copied()
            .filter(|role| self.get(*role).is_none())
            .collect()
    }

    /// Whether no landmark was found
    pub fn is_empty(&self) -> bool {
        LandmarkRole::ALL.iter().all(|role| self.get(*role).is_none())
    }

    /// Present landmarks in role order
    pub fn present(&self) -> impl Iterator<Item = (LandmarkRole, Landmark)> + '_ {
        LandmarkRole::ALL
            .into_iter()
            .filter_map(|role| self.get(role).map(|lm| (role, lm)))
    }

    /// Same indices with values read from `series`, e.g. the unsmoothed samples.
    /// Indices past the end of `series` keep their current value.
    pub fn resampled(&self, series: &[f64]) -> Self {
        let at = |lm: Option<Landmark>| {
            lm.map(|lm| Landmark {
                value: series.get(lm.index).copied().unwrap_or(lm.value),
                ..lm
            })
        };
        Self {
            a: at(self.a),
            b: at(self.b),
            c: at(self.c),
            d: at(self.d),
            e: at(self.e),
        }
    }

    /// Time between consecutive present landmarks (seconds)
    pub fn intervals(&self, sample_rate_hz: f64) -> Vec<f64> {
        if !(sample_rate_hz.is_finite() && sample_rate_hz > 0.0) {
            return Vec::new();
        }
        let indices: Vec<usize> = self.present().map(|(_, lm)| lm.index).collect();
        indices
            .windows(2)
            .map(|w| (w[1] - w[0]) as f64 / sample_rate_hz)
            .collect()
    }
}

/// Landmark search variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractorVariant {
    /// Plain local maxima/minima on the series as given
    #[default]
    Naive,
    /// Smoothing plus height, separation and prominence constraints
    NoiseRobust,
}

/// Parameters of the noise-robust variant
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RobustParams {
    /// Smoothing applied before the search
    pub smoothing: SmoothingConfig,
    /// Minimum A height as a multiple of the standard deviation
    pub height_std_factor: f64,
    /// Minimum peak separation as a fraction of the series length
    pub min_distance_fraction: f64,
    /// Minimum prominence as a multiple of the standard deviation
    pub prominence_std_factor: f64,
}

impl Default for RobustParams {
    fn default() -> Self {
        Self {
            smoothing: SmoothingConfig::default(),
            height_std_factor: 0.25,
            min_distance_fraction: 0.02,
            prominence_std_factor: 0.1,
        }
    }
}

/// Landmark extractor configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Which search to run
    pub variant: ExtractorVariant,
    /// Used only by [`ExtractorVariant::NoiseRobust`]
    pub robust: RobustParams,
}

impl ExtractorConfig {
    /// Noise-robust config with default parameters
    pub fn noise_robust() -> Self {
        Self {
            variant: ExtractorVariant::NoiseRobust,
            robust: RobustParams::default(),
        }
    }

    /// Check parameter ranges
    pub fn validate(&self) -> Result<(), ExtractorError> {
        let robust = &self.robust;
        robust.smoothing.validate()?;
        for (name, value) in [
            ("height_std_factor", robust.height_std_factor),
            ("prominence_std_factor", robust.prominence_std_factor),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ExtractorError::InvalidParameter { name, value });
            }
        }
        let fraction = robust.min_distance_fraction;
        if !(0.0..1.0).contains(&fraction) {
            return Err(ExtractorError::InvalidParameter {
                name: "min_distance_fraction",
                value: fraction,
            });
        }
        Ok(())
    }
}

/// Peak constraints for the A search and for the later C/E searches
struct SearchCriteria {
    primary: PeakCriteria,
    secondary: PeakCriteria,
}

/// APG landmark extractor
pub struct LandmarkExtractor {
    config: ExtractorConfig,
    smoother: Option<SavitzkyGolay>,
}

impl LandmarkExtractor {
    /// Create a new extractor, validating the config
    pub fn new(config: ExtractorConfig) -> Result<Self, ExtractorError> {
        config.validate()?;
        let smoother = match config.variant {
            ExtractorVariant::Naive => None,
            ExtractorVariant::NoiseRobust => Some(SavitzkyGolay::new(config.robust.smoothing)?),
        };
        Ok(Self { config, smoother })
    }

    /// Plain local-extremum extractor
    pub fn naive() -> Self {
        Self {
            config: ExtractorConfig::default(),
            smoother: None,
        }
    }

    /// Active configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Locate A-E.
    ///
    /// Each landmark is searched only from its predecessor's index onward; an absent
    /// predecessor leaves every later landmark absent. Indices and values always refer to
    /// `series` itself, whatever smoothing the variant applies internally.
    pub fn extract(&self, series: &[f64]) -> LandmarkSet {
        if series.len() < 3 {
            debug!("Series of {} samples too short for landmarks", series.len());
            return LandmarkSet::default();
        }

        let smoothed = self.smoother.as_ref().map(|sg| sg.smooth(series));
        let search: &[f64] = smoothed.as_deref().unwrap_or(series);
        let criteria = self.criteria(search);

        let a = find_peaks(search, &criteria.primary)
            .into_iter()
            .max_by(|&i, &j| search[i].total_cmp(&search[j]).then(j.cmp(&i)));
        let b = a.and_then(|a| argmin(&search[a..]).map(|k| k + a));
        let c = b.and_then(|b| {
            find_peaks(&search[b..], &criteria.secondary)
                .first()
                .map(|k| k + b)
        });
        let d = c.and_then(|c| first_upturn(&search[c..]).map(|k| k + c));
        let e = d.and_then(|d| {
            find_peaks(&search[d..], &criteria.secondary)
                .first()
                .map(|k| k + d)
        });

        let at = |index: Option<usize>| {
            index.map(|index| Landmark {
                index,
                value: series[index],
            })
        };
        let landmarks = LandmarkSet {
            a: at(a),
            b: at(b),
            c: at(c),
            d: at(d),
            e: at(e),
        };

        debug!(
            "Landmarks ({:?}): A={:?} B={:?} C={:?} D={:?} E={:?}",
            self.config.variant, a, b, c, d, e
        );
        landmarks
    }

    fn criteria(&self, search: &[f64]) -> SearchCriteria {
        match self.config.variant {
            ExtractorVariant::Naive => SearchCriteria {
                primary: PeakCriteria::min_height(0.0),
                secondary: PeakCriteria::min_height(0.0),
            },
            ExtractorVariant::NoiseRobust => {
                let robust = &self.config.robust;
                let stats = WaveStatistics::compute(search);
                let distance = ((robust.min_distance_fraction * search.len() as f64) as usize).max(1);
                let prominence = robust.prominence_std_factor * stats.std_dev;

                debug!(
                    "Robust search: std={:.4} roughness={:.4} distance={} prominence={:.4}",
                    stats.std_dev, stats.rate_of_change, distance, prominence
                );

                SearchCriteria {
                    primary: PeakCriteria {
                        height: Some((robust.height_std_factor * stats.std_dev).max(0.0)),
                        distance: Some(distance),
                        prominence: Some(prominence),
                    },
                    secondary: PeakCriteria {
                        height: Some(0.0),
                        distance: Some(distance),
                        prominence: Some(prominence),
                    },
                }
            }
        }
    }
}

impl Default for LandmarkExtractor {
    fn default() -> Self {
        Self::naive()
    }
}
