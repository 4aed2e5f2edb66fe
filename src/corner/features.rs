// Kinematic features of the apex to exit window

use serde::{Deserialize, Serialize};

use crate::{
    config::FeatureConfig,
    stats::{linear_regression, mean, pearson, std_dev},
};

/// Standard deviations of the residuals below this mean the fit is exact
const MIN_RESIDUAL_STD: f64 = 1e-6;

/// Channel values over one apex to exit window, all the same length.
#[derive(Clone, Copy, Debug)]
pub struct CornerWindow<'a> {
    pub time_s: &'a [f64],
    pub speed_kmh: &'a [f64],
    pub engine_rpm: &'a [f64],
    pub lat_accel_g: &'a [f64],
}

impl CornerWindow<'_> {
    pub fn len(&self) -> usize {
        self.time_s.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time_s.is_empty()
    }
}

/// Regression and statistical features of one window.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct KinematicFeatures {
    /// RPM per second
    pub rpm_slope: f64,
    /// Exit speed minus apex speed, km/h
    pub speed_gain_kmh: f64,
    /// Time from apex to exit, seconds
    pub elapsed_s: f64,
    pub rpm_speed_corr: f64,
    /// Slope of |lateral g| against time, g per second
    pub lat_g_decay: f64,
    /// Speed gain per RPM gain, 0 when the RPM gain is too small
    pub long_efficiency: f64,
    /// RPM departed from its linear trend somewhere in the window
    pub rpm_anomaly: bool,
}

/// The features of one lap at one spatial query.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CornerFeature {
    pub lap_number: u32,
    /// Baseline corner containing the query, when it falls inside one
    pub corner_number: Option<u32>,
    /// Apex index within the lap's samples
    pub apex_index: usize,
    pub apex_speed_kmh: f64,
    /// Apex position in the baseline's planar frame
    pub apex_x: f64,
    pub apex_y: f64,
    #[serde(flatten)]
    pub kinematics: KinematicFeatures,
}

pub fn extract_features(window: &CornerWindow<'_>, config: &FeatureConfig) -> KinematicFeatures {
    let n = window.len();
    if n == 0 {
        return KinematicFeatures::default();
    }
    let last = n - 1;

    let rpm_fit = linear_regression(window.time_s, window.engine_rpm);
    let speed_gain_kmh = window.speed_kmh[last] - window.speed_kmh[0];
    let rpm_gain = window.engine_rpm[last] - window.engine_rpm[0];

    let rpm_speed_corr = if n > 2 {
        pearson(window.engine_rpm, window.speed_kmh)
    } else {
        0.0
    };

    let abs_lat_g: Vec<f64> = window.lat_accel_g.iter().map(|g| g.abs()).collect();
    let lat_g_decay = linear_regression(window.time_s, &abs_lat_g).slope;

    let long_efficiency = if rpm_gain.abs() > config.min_rpm_delta {
        speed_gain_kmh / rpm_gain
    } else {
        0.0
    };

    KinematicFeatures {
        rpm_slope: rpm_fit.slope,
        speed_gain_kmh,
        elapsed_s: window.time_s[last] - window.time_s[0],
        rpm_speed_corr,
        lat_g_decay,
        long_efficiency,
        rpm_anomaly: has_outlier(
            &rpm_fit.residuals(window.time_s, window.engine_rpm),
            config.anomaly_z_score,
        ),
    }
}

/// True when any standardized residual exceeds `z_threshold` in magnitude. Needs more
/// than two residuals with a non-zero spread.
pub fn has_outlier(residuals: &[f64], z_threshold: f64) -> bool {
    if residuals.len() <= 2 {
        return false;
    }
    let spread = std_dev(residuals);
    if spread <= MIN_RESIDUAL_STD {
        return false;
    }
    let center = mean(residuals);
    residuals
        .iter()
        .any(|r| ((r - center) / spread).abs() > z_threshold)
}
