// Reference-lap geometry: smoothed centerline, corner classification and track edges

use std::ops::Range;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use super::segments::{SegmentClass, classify_with_hysteresis, runs_of};
use crate::{
    TracklineError,
    config::{AnalysisConfig, BaselineConfig},
    geometry::{
        GeoPoint, PlanarPoint, PointIndex, Projector, SavitzkyGolay, Smoother,
        cumulative_arc_length, curvature, offset_boundaries, sample_position, segment_lengths,
    },
    laps::segment_laps,
    telemetry::{Channel, Lap, TelemetrySession},
};

/// Direction a corner turns when driven in the recorded direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnDirection {
    Left,
    Right,
}

/// A maximal run of corner segments on the baseline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrackCorner {
    /// 1-based, in driving order
    pub number: u32,
    /// Centerline point indices covered by the corner
    pub points: Range<usize>,
    pub length_m: f64,
    pub direction: TurnDirection,
    /// Highest point curvature inside the corner, 1/m
    pub peak_curvature: f64,
}

/// Nearest centerline position to a planar query.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BaselineLocation {
    pub index: usize,
    pub distance_m: f64,
    pub arc_length_m: f64,
}

/// Reference track geometry built once from a single lap. A baseline is never modified
/// after construction; its origin must be used to project every lap compared against it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Baseline {
    origin: GeoPoint,
    centerline: Vec<PlanarPoint>,
    curvature: Vec<f64>,
    segments: Vec<SegmentClass>,
    left_boundary: Vec<PlanarPoint>,
    right_boundary: Vec<PlanarPoint>,
    track_width_m: f64,
    reference_lap: u32,
    laps: Vec<Lap>,
}

impl Baseline {
    pub fn origin(&self) -> GeoPoint {
        self.origin
    }

    pub fn projector(&self) -> Projector {
        Projector::new(self.origin)
    }

    pub fn centerline(&self) -> &[PlanarPoint] {
        &self.centerline
    }

    pub fn curvature(&self) -> &[f64] {
        &self.curvature
    }

    /// One class per segment between consecutive centerline points.
    pub fn segments(&self) -> &[SegmentClass] {
        &self.segments
    }

    pub fn left_boundary(&self) -> &[PlanarPoint] {
        &self.left_boundary
    }

    pub fn right_boundary(&self) -> &[PlanarPoint] {
        &self.right_boundary
    }

    pub fn track_width_m(&self) -> f64 {
        self.track_width_m
    }

    pub fn reference_lap(&self) -> u32 {
        self.reference_lap
    }

    /// Every lap of the session the baseline was built from.
    pub fn laps(&self) -> &[Lap] {
        &self.laps
    }

    pub fn arc_length(&self) -> Vec<f64> {
        cumulative_arc_length(&self.centerline)
    }

    /// Sum of the corner and straight lengths, so the split always adds up.
    pub fn total_length_m(&self) -> f64 {
        let (corner, straight) = self.class_lengths();
        corner + straight
    }

    pub fn corner_length_m(&self) -> f64 {
        self.class_lengths().0
    }

    pub fn straight_length_m(&self) -> f64 {
        self.class_lengths().1
    }

    /// (corner, straight) meters, accumulated in a single pass over the segments.
    fn class_lengths(&self) -> (f64, f64) {
        segment_lengths(&self.centerline)
            .iter()
            .zip(&self.segments)
            .fold((0.0, 0.0), |(corner, straight), (length, class)| match class {
                SegmentClass::Corner => (corner + length, straight),
                SegmentClass::Straight => (corner, straight + length),
            })
    }

    /// Corners in driving order.
    pub fn corners(&self) -> Vec<TrackCorner> {
        let lengths = segment_lengths(&self.centerline);
        runs_of(&self.segments, SegmentClass::Corner)
            .into_iter()
            .enumerate()
            .map(|(i, run)| {
                let points = run.start..run.end + 1;
                let turning = turning_angle(&self.centerline[points.clone()]);
                TrackCorner {
                    number: (i + 1) as u32,
                    length_m: lengths[run].iter().sum(),
                    direction: if turning >= 0.0 {
                        TurnDirection::Left
                    } else {
                        TurnDirection::Right
                    },
                    peak_curvature: self.curvature[points.clone()]
                        .iter()
                        .copied()
                        .fold(0.0, f64::max),
                    points,
                }
            })
            .collect()
    }

    /// Nearest centerline point to `(x, y)` in the baseline's planar frame.
    pub fn locate(&self, x: f64, y: f64) -> Option<BaselineLocation> {
        let nearest = PointIndex::build(&self.centerline).nearest(PlanarPoint::new(x, y))?;
        let arc_length = self.arc_length();
        Some(BaselineLocation {
            index: nearest.index,
            distance_m: nearest.distance_m,
            arc_length_m: arc_length[nearest.index],
        })
    }
}

/// Net heading change along a polyline, radians, counter-clockwise positive.
fn turning_angle(points: &[PlanarPoint]) -> f64 {
    points
        .windows(3)
        .map(|w| {
            let (ax, ay) = (w[1].x - w[0].x, w[1].y - w[0].y);
            let (bx, by) = (w[2].x - w[1].x, w[2].y - w[1].y);
            (ax * by - ay * bx).atan2(ax * bx + ay * by)
        })
        .sum()
}

/// Shortest lap strictly longer than `min_duration_s`.
pub fn fastest_valid_lap(laps: &[Lap], min_duration_s: f64) -> Option<&Lap> {
    laps.iter()
        .filter(|l| l.duration_s() > min_duration_s)
        .min_by(|a, b| a.duration_s().total_cmp(&b.duration_s()))
}

/// The fastest valid lap, or the shortest lap when none is long enough.
pub fn select_reference_lap(laps: &[Lap], min_duration_s: f64) -> Option<&Lap> {
    fastest_valid_lap(laps, min_duration_s).or_else(|| {
        laps.iter()
            .min_by(|a, b| a.duration_s().total_cmp(&b.duration_s()))
    })
}

/// Builds the baseline from the automatically selected reference lap.
pub fn build_baseline(
    session: &TelemetrySession,
    config: &AnalysisConfig,
) -> Result<Baseline, TracklineError> {
    build_baseline_with(session, config, &SavitzkyGolay, None)
}

/// Builds the baseline from a given lap number.
pub fn build_baseline_for_lap(
    session: &TelemetrySession,
    config: &AnalysisConfig,
    lap_number: u32,
) -> Result<Baseline, TracklineError> {
    build_baseline_with(session, config, &SavitzkyGolay, Some(lap_number))
}

/// Builds the baseline with a custom smoother. With `lap_number` unset the reference
/// lap is selected automatically.
pub fn build_baseline_with(
    session: &TelemetrySession,
    config: &AnalysisConfig,
    smoother: &dyn Smoother,
    lap_number: Option<u32>,
) -> Result<Baseline, TracklineError> {
    if session.len() < 2 {
        return Err(TracklineError::InsufficientSamples {
            required: 2,
            actual: session.len(),
        });
    }
    session.require(Channel::Latitude)?;
    session.require(Channel::Longitude)?;

    let laps = segment_laps(session, &config.segmentation)?;
    let reference = match lap_number {
        Some(number) => laps
            .iter()
            .find(|l| l.number == number)
            .ok_or(TracklineError::UnknownLap {
                lap_number: number,
            })?,
        None => select_reference_lap(&laps, config.baseline.min_reference_lap_s).ok_or(
            TracklineError::NoReferenceLap {
                reason: "session produced no laps".to_string(),
            },
        )?,
    };
    debug!(
        "Reference lap {} ({:.2}s, {} samples)",
        reference.number,
        reference.duration_s(),
        reference.sample_count()
    );

    let samples = if reference.sample_count() < 2 {
        warn!(
            "Reference lap {} has {} samples, using the whole session",
            reference.number,
            reference.sample_count()
        );
        0..session.len()
    } else {
        reference.samples.clone()
    };

    let geometry = CenterlineGeometry::build(session, samples, &config.baseline, smoother)?;
    let (left_boundary, right_boundary) =
        offset_boundaries(&geometry.points, config.baseline.track_width_m / 2.0);

    let baseline = Baseline {
        origin: geometry.origin,
        centerline: geometry.points,
        curvature: geometry.curvature,
        segments: geometry.segments,
        left_boundary,
        right_boundary,
        track_width_m: config.baseline.track_width_m,
        reference_lap: reference.number,
        laps,
    };
    info!(
        "Built baseline from lap {}: {:.1} m, {} corners",
        baseline.reference_lap,
        baseline.total_length_m(),
        baseline.corners().len()
    );
    Ok(baseline)
}

/// Smoothed centerline of a sample range, projected around the range's first sample.
struct CenterlineGeometry {
    origin: GeoPoint,
    points: Vec<PlanarPoint>,
    curvature: Vec<f64>,
    segments: Vec<SegmentClass>,
}

impl CenterlineGeometry {
    fn build(
        session: &TelemetrySession,
        samples: Range<usize>,
        config: &BaselineConfig,
        smoother: &dyn Smoother,
    ) -> Result<Self, TracklineError> {
        let origin =
            sample_position(session, samples.start).ok_or(TracklineError::MissingData {
                channel: Channel::Latitude,
            })?;
        let raw = Projector::new(origin).project_range(session, samples)?;

        let (raw_x, raw_y): (Vec<f64>, Vec<f64>) = raw.iter().map(|p| (p.x, p.y)).unzip();
        let x = smoother.smooth(&raw_x, config.smoothing_window, config.smoothing_order);
        let y = smoother.smooth(&raw_y, config.smoothing_window, config.smoothing_order);
        let points: Vec<PlanarPoint> = x
            .into_iter()
            .zip(y)
            .map(|(x, y)| PlanarPoint::new(x, y))
            .collect();

        let curvature = curvature(&points);
        let segments =
            classify_with_hysteresis(&curvature, &segment_lengths(&points), config);

        Ok(Self {
            origin,
            points,
            curvature,
            segments,
        })
    }
}
