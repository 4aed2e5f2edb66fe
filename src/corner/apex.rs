// Apex and exit detection inside a lap's candidate window

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::{config::FeatureConfig, geometry::PlanarPoint};

/// Lap-local indices of the apex and the exit, `apex < exit`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApexExit {
    pub apex: usize,
    pub exit: usize,
}

impl ApexExit {
    /// Inclusive apex to exit sample range.
    pub fn window(&self) -> Range<usize> {
        self.apex..self.exit + 1
    }
}

/// Index of the slowest sample in `window`. The first minimum wins.
pub fn find_apex(speed: &[f64], window: Range<usize>) -> Option<usize> {
    let window = window.start..window.end.min(speed.len());
    window
        .into_iter()
        .min_by(|a, b| speed[*a].total_cmp(&speed[*b]))
}

/// First index after `apex` where the distance travelled from the apex reaches
/// `exit_distance_m`. Stops at the end of the lookahead or the lap.
pub fn find_exit(
    points: &[PlanarPoint],
    apex: usize,
    exit_distance_m: f64,
    lookahead_samples: usize,
) -> usize {
    let limit = points.len().min(apex.saturating_add(lookahead_samples));
    let mut travelled = 0.0;
    for i in apex + 1..limit {
        travelled += points[i].distance_to(&points[i - 1]);
        if travelled >= exit_distance_m {
            return i;
        }
    }
    limit.saturating_sub(1).max(apex)
}

/// Apex and exit of a candidate window, `None` when the apex to exit window holds
/// fewer than two samples.
pub fn detect_apex_exit(
    points: &[PlanarPoint],
    speed: &[f64],
    window: Range<usize>,
    config: &FeatureConfig,
) -> Option<ApexExit> {
    let apex = find_apex(speed, window)?;
    let exit = find_exit(
        points,
        apex,
        config.exit_distance_m,
        config.exit_lookahead_samples,
    );
    (exit > apex).then_some(ApexExit { apex, exit })
}
