// Corner/straight classification of centerline segments

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::config::BaselineConfig;

/// Classification of the segment between two consecutive centerline points.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SegmentClass {
    Straight,
    Corner,
}

impl SegmentClass {
    pub fn opposite(self) -> Self {
        match self {
            SegmentClass::Straight => SegmentClass::Corner,
            SegmentClass::Corner => SegmentClass::Straight,
        }
    }
}

/// A segment is a corner when the mean curvature of its two endpoints reaches `threshold`.
pub fn classify_segments(curvature: &[f64], threshold: f64) -> Vec<SegmentClass> {
    curvature
        .windows(2)
        .map(|pair| {
            if (pair[0] + pair[1]) / 2.0 >= threshold {
                SegmentClass::Corner
            } else {
                SegmentClass::Straight
            }
        })
        .collect()
}

/// Maximal runs of consecutive segments with class `target`, as segment index ranges.
pub fn runs_of(classes: &[SegmentClass], target: SegmentClass) -> Vec<Range<usize>> {
    let mut runs = Vec::new();
    let mut start = None;
    for (i, class) in classes.iter().enumerate() {
        match (start, *class == target) {
            (None, true) => start = Some(i),
            (Some(s), false) => {
                runs.push(s..i);
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        runs.push(s..classes.len());
    }
    runs
}

/// Flips every run of `target` whose arc length is below `min_length_m` to the opposite class.
pub fn absorb_short_runs(
    classes: &mut [SegmentClass],
    lengths: &[f64],
    target: SegmentClass,
    min_length_m: f64,
) {
    for run in runs_of(classes, target) {
        let run_length: f64 = lengths[run.clone()].iter().sum();
        if run_length < min_length_m {
            classes[run].fill(target.opposite());
        }
    }
}

/// Classifies segments and removes short runs: spurious corner spikes first, then brief
/// straights that fragment one corner.
pub fn classify_with_hysteresis(
    curvature: &[f64],
    lengths: &[f64],
    config: &BaselineConfig,
) -> Vec<SegmentClass> {
    let mut classes = classify_segments(curvature, config.corner_curvature);
    absorb_short_runs(
        &mut classes,
        lengths,
        SegmentClass::Corner,
        config.min_corner_length_m,
    );
    absorb_short_runs(
        &mut classes,
        lengths,
        SegmentClass::Straight,
        config.min_straight_length_m,
    );
    classes
}

#[cfg(test)]
mod tests {
    use super::*;
    use SegmentClass::{Corner as C, Straight as S};
    use proptest::prelude::*;

    #[test]
    fn test_classification_uses_endpoint_mean() {
        let classes = classify_segments(&[0.0, 0.05, 0.05, 0.02, 0.0], 0.03);
        assert_eq!(classes, vec![S, C, C, S]);
    }

    #[test]
    fn test_runs_of_target() {
        let classes = [S, C, C, S, S, C];
        assert_eq!(runs_of(&classes, C), vec![1..3, 5..6]);
        assert_eq!(runs_of(&classes, S), vec![0..1, 3..5]);
        assert!(runs_of(&[], C).is_empty());
    }

    #[test]
    fn test_short_corner_spike_becomes_straight() {
        let mut classes = vec![S, S, C, C, S, S];
        absorb_short_runs(&mut classes, &[5.0; 6], C, 10.0 + 1e-9);
        assert_eq!(classes, vec![S; 6]);
    }

    #[test]
    fn test_corner_at_min_length_survives() {
        let mut classes = vec![S, C, C, S];
        absorb_short_runs(&mut classes, &[5.0; 4], C, 10.0);
        assert_eq!(classes, vec![S, C, C, S]);
    }

    #[test]
    fn test_brief_straight_inside_hairpin_merged() {
        // two 18 m corner runs split by a 3 m straight
        let curvature = [0.1, 0.1, 0.1, 0.1, 0.0, 0.0, 0.1, 0.1, 0.1, 0.1];
        let lengths = [5.0, 5.0, 5.0, 3.0, 3.0, 3.0, 5.0, 5.0, 5.0];
        let classes = classify_with_hysteresis(&curvature, &lengths, &BaselineConfig::default());
        assert_eq!(classes, vec![C; 9]);
    }

    #[test]
    fn test_long_straight_is_kept() {
        let curvature = [0.1, 0.1, 0.1, 0.0, 0.0, 0.0, 0.0, 0.1, 0.1, 0.1];
        let lengths = [6.0, 6.0, 6.0, 8.0, 8.0, 8.0, 6.0, 6.0, 6.0];
        let classes = classify_with_hysteresis(&curvature, &lengths, &BaselineConfig::default());
        assert_eq!(classes, vec![C, C, C, S, S, S, C, C, C]);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_no_short_corner_survives_first_pass(
            segments in prop::collection::vec((any::<bool>(), 0.1f64..15.0), 1..100),
        ) {
            let mut classes: Vec<SegmentClass> =
                segments.iter().map(|(c, _)| if *c { C } else { S }).collect();
            let lengths: Vec<f64> = segments.iter().map(|(_, l)| *l).collect();
            absorb_short_runs(&mut classes, &lengths, C, 10.0);
            for run in runs_of(&classes, C) {
                prop_assert!(lengths[run].iter().sum::<f64>() >= 10.0);
            }
        }
    }
}
