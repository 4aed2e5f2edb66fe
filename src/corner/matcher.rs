// Maps a spatial query onto every lap of the session

use std::{
    collections::HashMap,
    hash::{DefaultHasher, Hash, Hasher},
    ops::Range,
};

use log::{debug, info};

use super::{
    apex::detect_apex_exit,
    features::{CornerFeature, CornerWindow, extract_features},
};
use crate::{
    TracklineError,
    config::AnalysisConfig,
    geometry::{GeoPoint, Nearest, PlanarPoint, PointIndex, Projector, cumulative_arc_length},
    telemetry::{Channel, Lap, TelemetrySession},
    track::Baseline,
};

/// A lap projected into a baseline's frame with its own arc length and spatial index.
pub struct LapTrack {
    lap_number: u32,
    samples: Range<usize>,
    origin: GeoPoint,
    fingerprint: u64,
    points: Vec<PlanarPoint>,
    arc_length: Vec<f64>,
    index: PointIndex,
}

impl LapTrack {
    pub fn build(
        session: &TelemetrySession,
        lap: &Lap,
        origin: GeoPoint,
    ) -> Result<Self, TracklineError> {
        let points = Projector::new(origin).project_range(session, lap.samples.clone())?;
        let arc_length = cumulative_arc_length(&points);
        let index = PointIndex::build(&points);
        Ok(Self {
            lap_number: lap.number,
            samples: lap.samples.clone(),
            origin,
            fingerprint: fingerprint(session, &lap.samples),
            points,
            arc_length,
            index,
        })
    }

    pub fn lap_number(&self) -> u32 {
        self.lap_number
    }

    pub fn samples(&self) -> &Range<usize> {
        &self.samples
    }

    pub fn points(&self) -> &[PlanarPoint] {
        &self.points
    }

    pub fn arc_length(&self) -> &[f64] {
        &self.arc_length
    }

    pub fn nearest(&self, query: PlanarPoint) -> Option<Nearest> {
        self.index.nearest(query)
    }

    /// Lap-local indices whose arc length lies within `radius_m` of the point at `center`.
    pub fn window_around(&self, center: usize, radius_m: f64) -> Range<usize> {
        let Some(&mid) = self.arc_length.get(center) else {
            return 0..0;
        };
        let start = self.arc_length.partition_point(|s| *s < mid - radius_m);
        let end = self.arc_length.partition_point(|s| *s <= mid + radius_m);
        start..end
    }

    fn is_current(&self, session: &TelemetrySession, lap: &Lap, origin: GeoPoint) -> bool {
        self.samples == lap.samples
            && self.origin == origin
            && self.fingerprint == fingerprint(session, &lap.samples)
    }
}

/// Hash of the positions a lap was built from.
fn fingerprint(session: &TelemetrySession, samples: &Range<usize>) -> u64 {
    let mut hasher = DefaultHasher::new();
    for sample in &session.samples[samples.clone()] {
        sample.latitude.map(f64::to_bits).hash(&mut hasher);
        sample.longitude.map(f64::to_bits).hash(&mut hasher);
    }
    hasher.finish()
}

/// Lap tracks kept between queries against one baseline, keyed by lap number.
/// Entries are rebuilt when the lap's samples, positions or the projection origin change.
#[derive(Default)]
pub struct LapTrackCache {
    tracks: HashMap<u32, LapTrack>,
}

impl LapTrackCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn contains(&self, lap_number: u32) -> bool {
        self.tracks.contains_key(&lap_number)
    }

    pub fn get_or_build(
        &mut self,
        session: &TelemetrySession,
        lap: &Lap,
        origin: GeoPoint,
    ) -> Result<&LapTrack, TracklineError> {
        let stale = self
            .tracks
            .get(&lap.number)
            .is_none_or(|track| !track.is_current(session, lap, origin));
        if stale {
            debug!("Building lap track for lap {}", lap.number);
            self.tracks
                .insert(lap.number, LapTrack::build(session, lap, origin)?);
        }
        self.tracks
            .get(&lap.number)
            .ok_or(TracklineError::UnknownLap {
                lap_number: lap.number,
            })
    }

    pub fn invalidate(&mut self, lap_number: u32) -> bool {
        self.tracks.remove(&lap_number).is_some()
    }

    pub fn clear(&mut self) {
        self.tracks.clear();
    }
}

/// Features of every lap passing within reach of `(x, y)`, in the baseline's planar frame.
/// Laps that never come close are skipped; an empty result means no lap drove there.
pub fn query_corner(
    session: &TelemetrySession,
    baseline: &Baseline,
    x: f64,
    y: f64,
    radius_m: f64,
    config: &AnalysisConfig,
) -> Result<Vec<CornerFeature>, TracklineError> {
    let Some(context) = QueryContext::new(session, baseline, x, y, radius_m, config)? else {
        return Ok(Vec::new());
    };
    let mut features = Vec::new();
    for lap in context.eligible_laps() {
        let track = LapTrack::build(session, lap, baseline.origin())?;
        features.extend(context.match_lap(&track));
    }
    context.log_result(&features);
    Ok(features)
}

/// Same as [`query_corner`], reusing and refreshing lap tracks held in `cache`.
pub fn query_corner_cached(
    session: &TelemetrySession,
    baseline: &Baseline,
    x: f64,
    y: f64,
    radius_m: f64,
    config: &AnalysisConfig,
    cache: &mut LapTrackCache,
) -> Result<Vec<CornerFeature>, TracklineError> {
    let Some(context) = QueryContext::new(session, baseline, x, y, radius_m, config)? else {
        return Ok(Vec::new());
    };
    let mut features = Vec::new();
    for lap in context.eligible_laps() {
        let track = cache.get_or_build(session, lap, baseline.origin())?;
        features.extend(context.match_lap(track));
    }
    context.log_result(&features);
    Ok(features)
}

/// Per-query state shared by every lap.
struct QueryContext<'a> {
    session: &'a TelemetrySession,
    baseline: &'a Baseline,
    config: &'a AnalysisConfig,
    query: PlanarPoint,
    radius_m: f64,
    corner_number: Option<u32>,
    time: Vec<f64>,
    speed: Vec<f64>,
    rpm: Vec<f64>,
    lat_g: Vec<f64>,
}

impl<'a> QueryContext<'a> {
    fn new(
        session: &'a TelemetrySession,
        baseline: &'a Baseline,
        x: f64,
        y: f64,
        radius_m: f64,
        config: &'a AnalysisConfig,
    ) -> Result<Option<Self>, TracklineError> {
        if session.len() < 2 {
            return Ok(None);
        }
        session.require(Channel::Latitude)?;
        session.require(Channel::Longitude)?;

        let corner_number = baseline.locate(x, y).and_then(|location| {
            debug!(
                "Query ({:.1}, {:.1}) is {:.1} m from the baseline at {:.1} m",
                x, y, location.distance_m, location.arc_length_m
            );
            if location.distance_m > config.matching.max_offline_distance_m {
                return None;
            }
            baseline
                .corners()
                .into_iter()
                .find(|c| c.points.contains(&location.index))
                .map(|c| c.number)
        });

        Ok(Some(Self {
            session,
            baseline,
            config,
            query: PlanarPoint::new(x, y),
            radius_m,
            corner_number,
            time: session.full_series(Channel::Time),
            speed: session.full_series(Channel::Speed),
            rpm: session.full_series(Channel::EngineRpm),
            lat_g: session.full_series(Channel::LateralAccel),
        }))
    }

    fn eligible_laps(&self) -> Vec<&'a Lap> {
        let min_samples = self.config.matching.min_lap_samples;
        let len = self.session.len();
        self.baseline
            .laps()
            .iter()
            .filter(|lap| {
                let usable = lap.sample_count() >= min_samples && lap.samples.end <= len;
                if !usable {
                    debug!("Skipping lap {}: {} samples", lap.number, lap.sample_count());
                }
                usable
            })
            .collect()
    }

    fn match_lap(&self, track: &LapTrack) -> Option<CornerFeature> {
        let lap_number = track.lap_number();
        let nearest = track.nearest(self.query)?;
        if nearest.distance_m > self.config.matching.max_offline_distance_m {
            debug!(
                "Lap {} is off-line here ({:.1} m away)",
                lap_number, nearest.distance_m
            );
            return None;
        }

        let window = track.window_around(nearest.index, self.radius_m);
        if window.len() < self.config.matching.min_window_samples {
            debug!(
                "Lap {} window has only {} samples",
                lap_number,
                window.len()
            );
            return None;
        }

        let offset = track.samples().start;
        let lap_speed = &self.speed[track.samples().clone()];
        let found =
            detect_apex_exit(track.points(), lap_speed, window, &self.config.features)?;
        let span = found.apex + offset..found.exit + offset + 1;
        let kinematics = extract_features(
            &CornerWindow {
                time_s: &self.time[span.clone()],
                speed_kmh: &self.speed[span.clone()],
                engine_rpm: &self.rpm[span.clone()],
                lat_accel_g: &self.lat_g[span],
            },
            &self.config.features,
        );
        let apex = track.points()[found.apex];
        Some(CornerFeature {
            lap_number,
            corner_number: self.corner_number,
            apex_index: found.apex,
            apex_speed_kmh: lap_speed[found.apex],
            apex_x: apex.x,
            apex_y: apex.y,
            kinematics,
        })
    }

    fn log_result(&self, features: &[CornerFeature]) {
        info!(
            "Query ({:.1}, {:.1}) matched {} of {} laps",
            self.query.x,
            self.query.y,
            features.len(),
            self.baseline.laps().len()
        );
    }
}
