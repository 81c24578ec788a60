//! Advisory Reference Table
//!
//! Static text keyed by stage. Lives for the whole process and is never mutated.

use serde::Serialize;
use tracing::debug;

/// Estimated vascular age from which the high-risk lifestyle tips apply
pub const HIGH_RISK_AGE: u32 = 50;

/// Advice for one stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Advisory {
    pub stage_label: &'static str,
    pub description: &'static str,
    pub recommendations: &'static [&'static str],
}

static ADVISORIES: [Advisory; 6] = [
    Advisory {
        stage_label: "Stage 0",
        description: "Vascular condition is very good.",
        recommendations: &[
            "Keep your current regular lifestyle.",
            "Stay physically active.",
        ],
    },
    Advisory {
        stage_label: "Stage 1",
        description: "Vascular condition is good.",
        recommendations: &[
            "Keep exercising regularly.",
            "Maintain a balanced diet.",
        ],
    },
    Advisory {
        stage_label: "Stage 2",
        description: "Vascular elasticity is slightly decreased.",
        recommendations: &[
            "Reduce sodium intake.",
            "Increase aerobic exercise.",
        ],
    },
    Advisory {
        stage_label: "Stage 3",
        description: "Vascular elasticity is reduced.",
        recommendations: &[
            "Exercise aerobically at least three times a week.",
            "Keep a balanced diet low in saturated fat.",
            "Check your blood pressure regularly.",
        ],
    },
    Advisory {
        stage_label: "Stage 4",
        description: "Vascular aging is advanced.",
        recommendations: &[
            "Consult a physician for a cardiovascular check-up.",
            "Monitor blood pressure and cholesterol.",
            "Avoid smoking and excessive alcohol.",
        ],
    },
    Advisory {
        stage_label: "Stage 5",
        description: "There may be a serious vascular problem.",
        recommendations: &[
            "See a specialist as soon as possible.",
            "Follow the physician's treatment plan closely.",
        ],
    },
];

/// Advisory for stages outside the table
pub static UNCLASSIFIABLE: Advisory = Advisory {
    stage_label: "Unclassified",
    description: "No advice is available for this wave type.",
    recommendations: &[],
};

const HIGH_RISK_TIPS: [&str; 2] = [
    "Reduce saturated and trans fats in your diet.",
    "Do at least 30 minutes of aerobic exercise every day.",
];

const GENERAL_TIPS: [&str; 2] = [
    "Quit smoking to protect your blood vessels.",
    "Eat fruit and vegetables several times a day for antioxidants.",
];

/// Advisory for a stage; any value outside 0..=5 yields [`UNCLASSIFIABLE`]
pub fn advise(stage: i64) -> &'static Advisory {
    match usize::try_from(stage).ok().and_then(|i| ADVISORIES.get(i)) {
        Some(advisory) => advisory,
        None => {
            debug!(stage, "No advisory for stage");
            &UNCLASSIFIABLE
        }
    }
}

/// Lifestyle tips for an estimated vascular age.
///
/// High-risk tips come first when the age is at least [`HIGH_RISK_AGE`]; general tips always
/// follow.
pub fn lifestyle_tips(vascular_age: Option<u32>) -> Vec<&'static str> {
    let mut tips = Vec::with_capacity(HIGH_RISK_TIPS.len() + GENERAL_TIPS.len());
    if vascular_age.is_some_and(|age| age >= HIGH_RISK_AGE) {
        tips.extend(HIGH_RISK_TIPS);
    }
    tips.extend(GENERAL_TIPS);
    tips
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_table_covers_every_stage() {
        for stage in 0..=5 {
            let advisory = advise(stage);
            assert_eq!(advisory.stage_label, format!("Stage {stage}"));
            assert!(!advisory.recommendations.is_empty());
        }
    }

    #[test]
    fn test_out_of_range_is_unclassifiable() {
        assert_eq!(advise(6), &UNCLASSIFIABLE);
        assert_eq!(advise(-1), &UNCLASSIFIABLE);
        assert_eq!(advise(i64::MAX), &UNCLASSIFIABLE);
    }

    #[test]
    fn test_lifestyle_tips_by_age() {
        assert_eq!(lifestyle_tips(None), GENERAL_TIPS.to_vec());
        assert_eq!(lifestyle_tips(Some(49)), GENERAL_TIPS.to_vec());
        let older = lifestyle_tips(Some(50));
        assert_eq!(older.len(), 4);
        assert_eq!(&older[..2], &HIGH_RISK_TIPS);
    }

    proptest! {
        #[test]
        fn test_advise_total(stage in any::<i64>()) {
            let advisory = advise(stage);
            if (0..=5).contains(&stage) {
                prop_assert_ne!(advisory, &UNCLASSIFIABLE);
            } else {
                prop_assert_eq!(advisory, &UNCLASSIFIABLE);
            }
        }
    }
}
