use crate::{
    TracklineError,
    circuit::{self, CircuitCharacteristics},
    config::AnalysisConfig,
    corner::{self, CornerFeature, LapTrackCache, ReferenceLap},
    geometry::PlanarPoint,
    laps::{self, LapStatistics},
    telemetry::{Lap, TelemetrySession},
    track::{self, Baseline, BaselineLocation},
};

/// Entry point of the engine. Holds only configuration; every call is a pure function of
/// its arguments, and derived data such as a [`Baseline`] belongs to the caller.
#[derive(Clone, Debug, Default)]
pub struct TrackAnalyzer {
    config: AnalysisConfig,
}

impl TrackAnalyzer {
    pub fn new(config: AnalysisConfig) -> Result<Self, TracklineError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn segment_laps(&self, session: &TelemetrySession) -> Result<Vec<Lap>, TracklineError> {
        laps::segment_laps(session, &self.config.segmentation)
    }

    pub fn lap_statistics(
        &self,
        session: &TelemetrySession,
    ) -> Result<LapStatistics, TracklineError> {
        Ok(LapStatistics::from_laps(&self.segment_laps(session)?))
    }

    pub fn build_baseline(&self, session: &TelemetrySession) -> Result<Baseline, TracklineError> {
        track::build_baseline(session, &self.config)
    }

    pub fn build_baseline_for_lap(
        &self,
        session: &TelemetrySession,
        lap_number: u32,
    ) -> Result<Baseline, TracklineError> {
        track::build_baseline_for_lap(session, &self.config, lap_number)
    }

    pub fn locate_on_baseline(
        &self,
        baseline: &Baseline,
        x: f64,
        y: f64,
    ) -> Option<BaselineLocation> {
        baseline.locate(x, y)
    }

    /// Query with the configured search radius when `radius_m` is `None`.
    pub fn query_corner(
        &self,
        session: &TelemetrySession,
        baseline: &Baseline,
        x: f64,
        y: f64,
        radius_m: Option<f64>,
    ) -> Result<Vec<CornerFeature>, TracklineError> {
        let radius_m = radius_m.unwrap_or(self.config.matching.search_radius_m);
        corner::query_corner(session, baseline, x, y, radius_m, &self.config)
    }

    pub fn query_corner_cached(
        &self,
        session: &TelemetrySession,
        baseline: &Baseline,
        x: f64,
        y: f64,
        radius_m: Option<f64>,
        cache: &mut LapTrackCache,
    ) -> Result<Vec<CornerFeature>, TracklineError> {
        let radius_m = radius_m.unwrap_or(self.config.matching.search_radius_m);
        corner::query_corner_cached(session, baseline, x, y, radius_m, &self.config, cache)
    }

    pub fn reference_corners(
        &self,
        session: &TelemetrySession,
    ) -> Result<ReferenceLap, TracklineError> {
        corner::reference_corners(session, &self.config)
    }

    pub fn compute_circuit_characteristics(
        &self,
        session: &TelemetrySession,
    ) -> CircuitCharacteristics {
        circuit::compute_circuit_characteristics(session, &self.config.circuit)
    }

    pub fn track_outline(&self, session: &TelemetrySession) -> Vec<PlanarPoint> {
        circuit::track_outline(session, &self.config.circuit)
    }
}
