// Corner template of the fastest lap

use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::{
    apex::detect_apex_exit,
    features::{CornerFeature, CornerWindow, extract_features},
};
use crate::{
    TracklineError,
    config::AnalysisConfig,
    laps::segment_laps,
    telemetry::{Channel, TelemetrySession},
    track::{TrackCorner, baseline::fastest_valid_lap, build_baseline_for_lap},
};

/// Corners spanning fewer segments are too short to analyze
const MIN_CORNER_SEGMENTS: usize = 3;

/// Features of every corner of the fastest lap, used as the comparison template.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReferenceLap {
    pub lap_number: u32,
    pub lap_time_s: f64,
    pub corners: Vec<CornerFeature>,
}

fn is_analyzable(corner: &TrackCorner) -> bool {
    corner.points.len().saturating_sub(1) >= MIN_CORNER_SEGMENTS
}

/// Sessions with fewer than two samples have no laps and yield an empty reference.
pub fn reference_corners(
    session: &TelemetrySession,
    config: &AnalysisConfig,
) -> Result<ReferenceLap, TracklineError> {
    if session.len() < 2 {
        return Ok(ReferenceLap {
            lap_number: 0,
            lap_time_s: 0.0,
            corners: Vec::new(),
        });
    }

    let laps = segment_laps(session, &config.segmentation)?;
    let min_duration = config.baseline.min_reference_lap_s;
    let lap = fastest_valid_lap(&laps, min_duration).ok_or_else(|| {
        TracklineError::NoReferenceLap {
            reason: format!("no lap longer than {min_duration}s"),
        }
    })?;

    let mut reference = ReferenceLap {
        lap_number: lap.number,
        lap_time_s: lap.duration_s(),
        corners: Vec::new(),
    };
    if lap.sample_count() < 2 {
        return Ok(reference);
    }

    let baseline = build_baseline_for_lap(session, config, lap.number)?;
    let centerline = baseline.centerline();
    let samples = lap.samples.clone();
    let time = session.series(Channel::Time, samples.clone());
    let speed = session.series(Channel::Speed, samples.clone());
    let rpm = session.series(Channel::EngineRpm, samples.clone());
    let lat_g = session.series(Channel::LateralAccel, samples);

    for corner in baseline.corners() {
        if !is_analyzable(&corner) {
            debug!("Skipping corner {}: too short", corner.number);
            continue;
        }
        let Some(found) =
            detect_apex_exit(centerline, &speed, corner.points.clone(), &config.features)
        else {
            continue;
        };
        let span = found.window();
        let kinematics = extract_features(
            &CornerWindow {
                time_s: &time[span.clone()],
                speed_kmh: &speed[span.clone()],
                engine_rpm: &rpm[span.clone()],
                lat_accel_g: &lat_g[span],
            },
            &config.features,
        );
        let apex = centerline[found.apex];
        reference.corners.push(CornerFeature {
            lap_number: lap.number,
            corner_number: Some(corner.number),
            apex_index: found.apex,
            apex_speed_kmh: speed[found.apex],
            apex_x: apex.x,
            apex_y: apex.y,
            kinematics,
        });
    }

    info!(
        "Reference lap {} ({:.2}s): {} corners analyzed",
        reference.lap_number,
        reference.lap_time_s,
        reference.corners.len()
    );
    Ok(reference)
}
