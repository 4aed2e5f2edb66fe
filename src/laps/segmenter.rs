// Splits a continuous session into laps

use log::{debug, info, warn};

use super::grouping::{group_by_gap, min_per_group};
use crate::{
    TracklineError,
    config::SegmentationConfig,
    geometry::{Projector, sample_position},
    telemetry::{Channel, Lap, LapSource, TelemetrySession},
};

/// Splits the session into laps: beacon pairs first, start/finish GPS crossings when
/// fewer than two beacons are usable, and the whole session when neither yields a lap.
///
/// Sessions with fewer than two samples have no laps.
pub fn segment_laps(
    session: &TelemetrySession,
    config: &SegmentationConfig,
) -> Result<Vec<Lap>, TracklineError> {
    if session.len() < 2 {
        debug!("Session has {} samples, no laps", session.len());
        return Ok(Vec::new());
    }
    session.require(Channel::Time)?;
    let times = session.full_series(Channel::Time);

    let beacons = session.usable_beacons();
    let laps = if beacons.len() >= 2 {
        let laps = laps_from_beacons(&times, &beacons, config);
        info!(
            "Beacon segmentation: {} valid laps from {} markers",
            laps.len(),
            beacons.len()
        );
        laps
    } else if session.has_channel(Channel::Latitude) && session.has_channel(Channel::Longitude)
    {
        let laps = laps_from_crossings(session, &times, config)?;
        info!("GPS crossing segmentation: {} valid laps", laps.len());
        laps
    } else {
        warn!("No beacon markers and no GPS position, cannot delimit laps");
        Vec::new()
    };

    if laps.is_empty() {
        warn!("No valid lap found, treating the whole session as one lap");
        return Ok(vec![Lap {
            number: 1,
            start_s: times[0],
            end_s: times[times.len() - 1],
            samples: 0..times.len(),
            source: LapSource::WholeSession,
        }]);
    }
    Ok(laps)
}

/// Laps between consecutive beacon timestamps. A lap owns the samples in `[start, end)`.
fn laps_from_beacons(times: &[f64], beacons: &[f64], config: &SegmentationConfig) -> Vec<Lap> {
    beacons
        .windows(2)
        .enumerate()
        .filter_map(|(i, pair)| {
            let (start_s, end_s) = (pair[0], pair[1]);
            let duration = end_s - start_s;
            if duration <= config.min_lap_duration_s {
                debug!("Discarding beacon lap {} ({:.2}s)", i + 1, duration);
                return None;
            }
            let first = times.partition_point(|t| *t < start_s);
            let last = times.partition_point(|t| *t < end_s);
            if first >= last {
                debug!("Beacon lap {} has no samples", i + 1);
                return None;
            }
            Some(Lap {
                number: (i + 1) as u32,
                start_s,
                end_s,
                samples: first..last,
                source: LapSource::Beacon,
            })
        })
        .collect()
}

/// Laps between passes through the area around the first sample, which stands in for
/// the start/finish line.
fn laps_from_crossings(
    session: &TelemetrySession,
    times: &[f64],
    config: &SegmentationConfig,
) -> Result<Vec<Lap>, TracklineError> {
    let Some(origin) = sample_position(session, 0) else {
        return Ok(Vec::new());
    };
    let points = Projector::new(origin).project_range(session, 0..session.len())?;
    let distance_sq: Vec<f64> = points.iter().map(|p| p.x * p.x + p.y * p.y).collect();

    let radius_sq = config.crossing_radius_m.powi(2);
    let near_start: Vec<usize> = distance_sq
        .iter()
        .enumerate()
        .filter(|(_, d)| **d < radius_sq)
        .map(|(i, _)| i)
        .collect();

    let groups = group_by_gap(&near_start, config.crossing_gap_samples);
    let mut crossings = vec![0];
    crossings.extend(
        min_per_group(&groups, |i| distance_sq[i])
            .into_iter()
            .filter(|i| *i != 0),
    );
    debug!("Start/finish crossings at samples {:?}", crossings);

    Ok(crossings
        .windows(2)
        .enumerate()
        .filter_map(|(i, pair)| {
            let (first, last) = (pair[0], pair[1]);
            let duration = times[last] - times[first];
            if duration <= config.min_lap_duration_s {
                debug!("Discarding crossing lap {} ({:.2}s)", i + 1, duration);
                return None;
            }
            Some(Lap {
                number: (i + 1) as u32,
                start_s: times[first],
                end_s: times[last],
                samples: first..last,
                source: LapSource::GpsCrossing,
            })
        })
        .collect())
}
