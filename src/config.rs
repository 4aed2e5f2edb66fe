// Analysis configuration: every threshold the engine uses, with on-disk persistence

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::TracklineError;

const CONFIG_DIR_NAME: &str = "trackline";
const CONFIG_FILE_NAME: &str = "config.json";

/// Thresholds used to split a session into laps.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SegmentationConfig {
    /// Laps not longer than this are pit entry/exit noise (seconds)
    pub min_lap_duration_s: f64,
    /// Radius around the first sample treated as the start/finish line (meters)
    pub crossing_radius_m: f64,
    /// Index gap that separates two passes through the start/finish area
    pub crossing_gap_samples: usize,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            min_lap_duration_s: 20.0,
            crossing_radius_m: 20.0,
            crossing_gap_samples: 200,
        }
    }
}

/// Parameters of the reference-lap geometry.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct BaselineConfig {
    /// Only laps longer than this are candidates for the reference lap (seconds)
    pub min_reference_lap_s: f64,
    /// Smoothing window length in samples, odd
    pub smoothing_window: usize,
    /// Order of the local polynomial fitted inside the smoothing window
    pub smoothing_order: usize,
    /// Segments with mean curvature at or above this are corners (1/m)
    pub corner_curvature: f64,
    /// Corner runs shorter than this become straight (meters)
    pub min_corner_length_m: f64,
    /// Straight runs shorter than this become corner (meters)
    pub min_straight_length_m: f64,
    /// Distance between the left and right boundary curves (meters)
    pub track_width_m: f64,
}

impl Default for BaselineConfig {
    fn default() -> Self {
        Self {
            min_reference_lap_s: 30.0,
            smoothing_window: 11,
            smoothing_order: 3,
            corner_curvature: 0.03,
            min_corner_length_m: 10.0,
            min_straight_length_m: 20.0,
            track_width_m: 8.0,
        }
    }
}

/// Parameters for mapping a spatial query onto every lap.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct MatchingConfig {
    /// Arc-length half-width of the apex search window (meters)
    pub search_radius_m: f64,
    /// Laps whose closest point is further than this are off-line (meters)
    pub max_offline_distance_m: f64,
    /// Laps with fewer samples are ignored
    pub min_lap_samples: usize,
    /// Candidate windows with fewer samples are ignored
    pub min_window_samples: usize,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            search_radius_m: 30.0,
            max_offline_distance_m: 20.0,
            min_lap_samples: 10,
            min_window_samples: 5,
        }
    }
}

/// Parameters of the apex to exit window and the features computed over it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct FeatureConfig {
    /// Distance travelled after the apex that marks the exit (meters)
    pub exit_distance_m: f64,
    /// Maximum number of samples scanned after the apex
    pub exit_lookahead_samples: usize,
    /// Minimum |RPM gain| for longitudinal efficiency to be defined
    pub min_rpm_delta: f64,
    /// Standardized residual magnitude that flags an RPM anomaly
    pub anomaly_z_score: f64,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            exit_distance_m: 20.0,
            exit_lookahead_samples: 400,
            min_rpm_delta: 10.0,
            anomaly_z_score: 3.0,
        }
    }
}

/// Thresholds of the whole-session circuit descriptors, in SI units.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct CircuitConfig {
    /// Longitudinal acceleration below this is braking (m/s^2)
    pub braking_accel_mps2: f64,
    /// Longitudinal acceleration above this is power-on (m/s^2)
    pub power_accel_mps2: f64,
    /// Lateral acceleration magnitude above this is cornering (m/s^2)
    pub cornering_accel_mps2: f64,
    /// Speed below which a corner counts as low speed (m/s)
    pub low_speed_mps: f64,
    /// Maximum points in the down-sampled track outline
    pub outline_points: usize,
}

impl Default for CircuitConfig {
    fn default() -> Self {
        Self {
            braking_accel_mps2: -0.8,
            power_accel_mps2: 0.3,
            cornering_accel_mps2: 2.0,
            low_speed_mps: 22.0,
            outline_points: 200,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct AnalysisConfig {
    pub segmentation: SegmentationConfig,
    pub baseline: BaselineConfig,
    pub matching: MatchingConfig,
    pub features: FeatureConfig,
    pub circuit: CircuitConfig,
}

impl AnalysisConfig {
    /// Loads the user's config file, if one has been saved.
    pub fn from_local_file() -> Result<Option<Self>, TracklineError> {
        let Some(config_dir) = dirs::config_dir() else {
            return Ok(None);
        };
        let config_path = config_dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME);
        if config_path.exists() {
            Self::from_path(&config_path).map(Some)
        } else {
            Ok(None)
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, TracklineError> {
        let file =
            std::fs::File::open(path).map_err(|e| TracklineError::ConfigIOError { source: e })?;
        let config: Self = serde_json::from_reader(file)
            .map_err(|e| TracklineError::ConfigSerializeError { source: e })?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<(), TracklineError> {
        let config_path = dirs::config_dir()
            .ok_or(TracklineError::NoConfigDir)?
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME);
        self.save_to(&config_path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), TracklineError> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| TracklineError::ConfigIOError { source: e })?;
            }
        }

        let file =
            std::fs::File::create(path).map_err(|e| TracklineError::ConfigIOError { source: e })?;
        serde_json::to_writer_pretty(file, self)
            .map_err(|e| TracklineError::ConfigSerializeError { source: e })
    }

    /// Rejects values the algorithms cannot work with.
    pub fn validate(&self) -> Result<(), TracklineError> {
        let baseline = &self.baseline;
        if baseline.smoothing_window % 2 == 0 {
            return Err(invalid("baseline.smoothing_window", "must be odd"));
        }
        if baseline.smoothing_window <= baseline.smoothing_order {
            return Err(invalid(
                "baseline.smoothing_window",
                "must be larger than baseline.smoothing_order",
            ));
        }
        if baseline.track_width_m <= 0.0 {
            return Err(invalid("baseline.track_width_m", "must be positive"));
        }
        if baseline.corner_curvature <= 0.0 {
            return Err(invalid("baseline.corner_curvature", "must be positive"));
        }
        if self.segmentation.min_lap_duration_s < 0.0 {
            return Err(invalid(
                "segmentation.min_lap_duration_s",
                "must not be negative",
            ));
        }
        if self.segmentation.crossing_radius_m <= 0.0 {
            return Err(invalid("segmentation.crossing_radius_m", "must be positive"));
        }
        if self.matching.search_radius_m <= 0.0 {
            return Err(invalid("matching.search_radius_m", "must be positive"));
        }
        if self.matching.max_offline_distance_m <= 0.0 {
            return Err(invalid(
                "matching.max_offline_distance_m",
                "must be positive",
            ));
        }
        if self.features.exit_distance_m <= 0.0 {
            return Err(invalid("features.exit_distance_m", "must be positive"));
        }
        if self.features.exit_lookahead_samples < 2 {
            return Err(invalid(
                "features.exit_lookahead_samples",
                "must be at least 2",
            ));
        }
        if self.features.anomaly_z_score <= 0.0 {
            return Err(invalid("features.anomaly_z_score", "must be positive"));
        }
        Ok(())
    }
}

fn invalid(field: &str, reason: &str) -> TracklineError {
    TracklineError::InvalidConfig {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}
