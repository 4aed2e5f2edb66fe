// Library interface for trackline
// Geometry and lap analysis of data-logger GPS telemetry

pub mod analyzer;
pub mod circuit;
pub mod config;
pub mod corner;
pub mod errors;
pub mod geometry;
pub mod laps;
pub mod stats;
pub mod telemetry;
pub mod track;

// Re-export commonly used types
pub use analyzer::TrackAnalyzer;
pub use circuit::{CircuitCharacteristics, compute_circuit_characteristics, track_outline};
pub use config::AnalysisConfig;
pub use corner::{
    CornerFeature, LapTrackCache, ReferenceLap, query_corner, query_corner_cached,
    reference_corners,
};
pub use errors::TracklineError;
pub use geometry::{GeoPoint, PlanarPoint, Projector};
pub use laps::{LapStatistics, segment_laps};
pub use telemetry::{Channel, Lap, LapSource, TelemetrySample, TelemetrySession};
pub use track::{
    Baseline, BaselineLocation, TrackCorner, TurnDirection, build_baseline,
    build_baseline_for_lap,
};

/// Nearest centerline position of `(x, y)`, in the baseline's planar frame.
pub fn locate_on_baseline(baseline: &Baseline, x: f64, y: f64) -> Option<BaselineLocation> {
    baseline.locate(x, y)
}
