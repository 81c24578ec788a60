//! Analysis Report Record

use landmark_engine::{Landmark, LandmarkSet};
use serde::Serialize;
use vascular_grading::{Advisory, Grade, RatioSet, Stage};

/// One optional value per landmark role, keyed `A`..`E`
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RoleMap<T> {
    #[serde(rename = "A")]
    pub a: Option<T>,
    #[serde(rename = "B")]
    pub b: Option<T>,
    #[serde(rename = "C")]
    pub c: Option<T>,
    #[serde(rename = "D")]
    pub d: Option<T>,
    #[serde(rename = "E")]
    pub e: Option<T>,
}

impl<T> RoleMap<T> {
    fn from_landmarks(landmarks: &LandmarkSet, f: impl Fn(Landmark) -> T) -> Self {
        Self {
            a: landmarks.a.map(&f),
            b: landmarks.b.map(&f),
            c: landmarks.c.map(&f),
            d: landmarks.d.map(&f),
            e: landmarks.e.map(&f),
        }
    }
}

/// Advice block of the report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Advice {
    pub wave_type: Option<String>,
    pub description: &'static str,
    pub recommendations: &'static [&'static str],
}

impl Advice {
    pub(crate) fn new(wave_type: Option<String>, advisory: &'static Advisory) -> Self {
        Self {
            wave_type,
            description: advisory.description,
            recommendations: advisory.recommendations,
        }
    }
}

/// Full result of one pipeline run.
///
/// Fields of a failed branch are `None` (JSON `null`) and the failure is listed in `warnings`.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    /// Landmark amplitudes, read from the unsmoothed samples
    pub peaks: RoleMap<f64>,
    /// Landmark sample indices
    pub peak_indices: RoleMap<usize>,
    pub ratios: Option<RatioSet>,
    pub score: Option<f64>,
    pub confidence: Option<f64>,
    pub stage: Option<Stage>,
    pub grade: Option<Grade>,
    pub wave_type: Option<String>,
    pub advice: Advice,
    pub lifestyle_tips: Vec<&'static str>,
    pub predicted_class: Option<usize>,
    pub probability: Option<f64>,
    pub vascular_age: Option<u32>,
    /// All local maxima of the analysed wave
    pub positive_peaks: Vec<usize>,
    /// All local minima of the analysed wave
    pub negative_peaks: Vec<usize>,
    pub warnings: Vec<String>,
    /// The imputed, length-fitted input before smoothing or scaling
    pub apg_wave: Vec<f64>,
}

impl AnalysisReport {
    /// Report skeleton with landmark data and no grading or inference results
    pub(crate) fn with_landmarks(landmarks: &LandmarkSet, advisory: &'static Advisory) -> Self {
        Self {
            peaks: RoleMap::from_landmarks(landmarks, |l| l.value),
            peak_indices: RoleMap::from_landmarks(landmarks, |l| l.index),
            ratios: None,
            score: None,
            confidence: None,
            stage: None,
            grade: None,
            wave_type: None,
            advice: Advice::new(None, advisory),
            lifestyle_tips: Vec::new(),
            predicted_class: None,
            probability: None,
            vascular_age: None,
            positive_peaks: Vec::new(),
            negative_peaks: Vec::new(),
            warnings: Vec::new(),
            apg_wave: Vec::new(),
        }
    }
}
