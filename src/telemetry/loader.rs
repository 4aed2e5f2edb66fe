use std::path::Path;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::{TelemetrySample, TelemetrySession};
use crate::TracklineError;

/// One line of a session file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SessionRecord {
    /// Beacon crossing timestamps; later records extend earlier ones
    Beacons(Vec<f64>),
    Sample(TelemetrySample),
}

/// Reads a JSON-lines session file.
pub fn load_session(source_file: &Path) -> Result<TelemetrySession, TracklineError> {
    if !source_file.exists() {
        return Err(TracklineError::InvalidTelemetryFile {
            path: format!("{:?}", source_file),
        });
    }

    let records = serde_jsonlines::json_lines(source_file)
        .map_err(|e| TracklineError::TelemetryLoaderError { source: e })?
        .collect::<Result<Vec<SessionRecord>, std::io::Error>>()
        .map_err(|e| TracklineError::TelemetryLoaderError { source: e })?;

    let mut session = TelemetrySession::default();
    for record in records {
        match record {
            SessionRecord::Beacons(markers) => session.beacon_markers.extend(markers),
            SessionRecord::Sample(sample) => session.samples.push(sample),
        }
    }

    info!(
        "Loaded {} samples and {} beacon markers from {:?}",
        session.samples.len(),
        session.beacon_markers.len(),
        source_file
    );
    Ok(session)
}

/// Writes a session in the format `load_session` reads.
pub fn write_session(file: &Path, session: &TelemetrySession) -> Result<(), TracklineError> {
    let beacons = std::iter::once(SessionRecord::Beacons(session.beacon_markers.clone()));
    let samples = session
        .samples
        .iter()
        .cloned()
        .map(SessionRecord::Sample);
    serde_jsonlines::write_json_lines(file, beacons.chain(samples))
        .map_err(|e| TracklineError::TelemetryLoaderError { source: e })?;
    debug!("Wrote {} samples to {:?}", session.samples.len(), file);
    Ok(())
}
