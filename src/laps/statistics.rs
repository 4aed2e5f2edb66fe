use serde::{Deserialize, Serialize};

use crate::{
    stats::{mean, std_dev},
    telemetry::Lap,
};

/// Lap-time summary of a session.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LapStatistics {
    pub lap_times_s: Vec<f64>,
    pub best_lap_s: f64,
    pub average_lap_s: f64,
    /// Population standard deviation of the lap times
    pub regularity_s: f64,
    /// Average minus two standard deviations
    pub theoretical_lap_s: f64,
}

impl LapStatistics {
    pub fn from_laps(laps: &[Lap]) -> Self {
        let lap_times_s: Vec<f64> = laps.iter().map(Lap::duration_s).collect();
        if lap_times_s.is_empty() {
            return Self::default();
        }
        let best_lap_s = lap_times_s.iter().copied().fold(f64::INFINITY, f64::min);
        let average_lap_s = mean(&lap_times_s);
        let regularity_s = std_dev(&lap_times_s);
        Self {
            best_lap_s,
            average_lap_s,
            regularity_s,
            theoretical_lap_s: average_lap_s - 2.0 * regularity_s,
            lap_times_s,
        }
    }
}
