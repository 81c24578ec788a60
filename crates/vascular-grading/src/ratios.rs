//! Inter-Landmark Amplitude Ratios

use crate::GradingError;
use landmark_engine::{LandmarkRole, LandmarkSet};
use serde::{Deserialize, Serialize};

/// Landmarks a ratio set cannot be computed without
pub const REQUIRED_LANDMARKS: [LandmarkRole; 4] = [
    LandmarkRole::A,
    LandmarkRole::B,
    LandmarkRole::C,
    LandmarkRole::D,
];

/// Amplitudes of B, C and D relative to A
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatioSet {
    /// |B| / |A|
    #[serde(rename = "AB")]
    pub ab: f64,
    /// |C| / |A|
    #[serde(rename = "CA")]
    pub ca: f64,
    /// |D| / |A|
    #[serde(rename = "DA")]
    pub da: f64,
}

/// Compute the ratio set. E is not needed.
pub fn compute_ratios(landmarks: &LandmarkSet) -> Result<RatioSet, GradingError> {
    let (Some(a), Some(b), Some(c), Some(d)) = (landmarks.a, landmarks.b, landmarks.c, landmarks.d)
    else {
        return Err(GradingError::IncompleteLandmarks {
            missing: landmarks.missing(&REQUIRED_LANDMARKS),
        });
    };

    if a.value == 0.0 {
        return Err(GradingError::DegenerateAmplitude { index: a.index });
    }

    let amplitude = a.value.abs();
    Ok(RatioSet {
        ab: b.value.abs() / amplitude,
        ca: c.value.abs() / amplitude,
        da: d.value.abs() / amplitude,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use landmark_engine::Landmark;
    use proptest::prelude::*;

    fn lm(index: usize, value: f64) -> Option<Landmark> {
        Some(Landmark { index, value })
    }

    fn landmarks(a: f64, b: f64, c: f64, d: f64) -> LandmarkSet {
        LandmarkSet {
            a: lm(10, a),
            b: lm(20, b),
            c: lm(30, c),
            d: lm(40, d),
            e: None,
        }
    }

    #[test]
    fn test_ratio_values() {
        let ratios = compute_ratios(&landmarks(2.0, -3.0, 1.0, -0.5)).unwrap();
        assert_eq!(ratios.ab, 1.5);
        assert_eq!(ratios.ca, 0.5);
        assert_eq!(ratios.da, 0.25);
    }

    #[test]
    fn test_missing_landmarks_fail() {
        let mut set = landmarks(1.0, -1.0, 0.5, -0.2);
        set.c = None;
        set.d = None;
        assert_eq!(
            compute_ratios(&set).unwrap_err(),
            GradingError::IncompleteLandmarks {
                missing: vec![LandmarkRole::C, LandmarkRole::D]
            }
        );
        assert!(matches!(
            compute_ratios(&LandmarkSet::default()),
            Err(GradingError::IncompleteLandmarks { .. })
        ));
    }

    #[test]
    fn test_zero_a_is_degenerate() {
        assert_eq!(
            compute_ratios(&landmarks(0.0, -1.0, 0.5, -0.2)).unwrap_err(),
            GradingError::DegenerateAmplitude { index: 10 }
        );
        assert!(compute_ratios(&landmarks(-0.0, -1.0, 0.5, -0.2)).is_err());
    }

    #[test]
    fn test_serialized_keys() {
        let json = serde_json::to_value(compute_ratios(&landmarks(2.0, 2.0, 1.0, 1.0)).unwrap())
            .unwrap();
        assert_eq!(json["AB"], 1.0);
        assert_eq!(json["CA"], 0.5);
        assert_eq!(json["DA"], 0.5);
    }

    proptest! {
        #[test]
        fn test_degenerate_iff_a_is_zero(
            a in prop_oneof![Just(0.0f64), -10.0f64..10.0],
            b in -10.0f64..10.0,
            c in -10.0f64..10.0,
            d in -10.0f64..10.0,
        ) {
            let result = compute_ratios(&landmarks(a, b, c, d));
            if a == 0.0 {
                prop_assert!(
                    matches!(result, Err(GradingError::DegenerateAmplitude { .. })),
                    "expected degenerate error"
                );
            } else {
                let ratios = result.unwrap();
                prop_assert!(ratios.ab >= 0.0 && ratios.ca >= 0.0 && ratios.da >= 0.0);
            }
        }
    }
}
