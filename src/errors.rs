// Error types for trackline

use crate::telemetry::Channel;
use snafu::Snafu;
use std::io;

#[derive(Debug, Snafu)]
pub enum TracklineError {
    // Errors for telemetry content
    #[snafu(display("Invalid telemetry: missing required channel {channel}"))]
    MissingData { channel: Channel },
    #[snafu(display("Not enough telemetry samples: need at least {required}, got {actual}"))]
    InsufficientSamples { required: usize, actual: usize },
    #[snafu(display("No valid reference lap: {reason}"))]
    NoReferenceLap { reason: String },
    #[snafu(display("Lap {lap_number} does not exist in this session"))]
    UnknownLap { lap_number: u32 },

    // Config management errors
    #[snafu(display("Invalid configuration: {field} - {reason}"))]
    InvalidConfig { field: String, reason: String },
    #[snafu(display("Could not find application data directory to save config file"))]
    NoConfigDir,
    #[snafu(display("Error writing config file"))]
    ConfigIOError { source: io::Error },
    #[snafu(display("Error serializing config file"))]
    ConfigSerializeError { source: serde_json::Error },

    // Session file errors
    #[snafu(display("Invalid telemetry file: {path}"))]
    InvalidTelemetryFile { path: String },
    #[snafu(display("Error loading telemetry file"))]
    TelemetryLoaderError { source: io::Error },
    #[snafu(display("Error writing analysis output"))]
    OutputError { source: serde_json::Error },
}
