pub mod loader;

use std::{fmt, ops::Range};

use serde::{Deserialize, Serialize};

use crate::TracklineError;

/// Logger channels the engine reads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    Time,
    Latitude,
    Longitude,
    Speed,
    LongitudinalAccel,
    LateralAccel,
    EngineRpm,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Time => write!(f, "Time"),
            Channel::Latitude => write!(f, "GPS Latitude"),
            Channel::Longitude => write!(f, "GPS Longitude"),
            Channel::Speed => write!(f, "GPS Speed"),
            Channel::LongitudinalAccel => write!(f, "GPS LonAcc"),
            Channel::LateralAccel => write!(f, "GPS LatAcc"),
            Channel::EngineRpm => write!(f, "RPM"),
        }
    }
}

/// One logger sample. A field is `None` when the logger did not record that channel.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySample {
    /// Seconds since the start of the recording
    pub time_s: Option<f64>,
    /// Latitude in decimal degrees
    pub latitude: Option<f64>,
    /// Longitude in decimal degrees
    pub longitude: Option<f64>,
    /// GPS speed, km/h
    pub speed_kmh: Option<f64>,
    /// Longitudinal acceleration, g
    pub lon_accel_g: Option<f64>,
    /// Lateral acceleration, g
    pub lat_accel_g: Option<f64>,
    /// Engine speed, rev/min
    pub engine_rpm: Option<f64>,
}

impl TelemetrySample {
    pub fn value(&self, channel: Channel) -> Option<f64> {
        match channel {
            Channel::Time => self.time_s,
            Channel::Latitude => self.latitude,
            Channel::Longitude => self.longitude,
            Channel::Speed => self.speed_kmh,
            Channel::LongitudinalAccel => self.lon_accel_g,
            Channel::LateralAccel => self.lat_accel_g,
            Channel::EngineRpm => self.engine_rpm,
        }
    }
}

/// A recorded session: time-ordered samples plus the beacon crossings reported by
/// the external timing system.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySession {
    pub samples: Vec<TelemetrySample>,
    /// Beacon crossing timestamps, seconds on the same clock as `time_s`
    pub beacon_markers: Vec<f64>,
}

impl TelemetrySession {
    pub fn new(samples: Vec<TelemetrySample>, beacon_markers: Vec<f64>) -> Self {
        Self {
            samples,
            beacon_markers,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// A channel is present when every sample carries a finite value for it.
    pub fn has_channel(&self, channel: Channel) -> bool {
        !self.samples.is_empty()
            && self
                .samples
                .iter()
                .all(|s| s.value(channel).is_some_and(f64::is_finite))
    }

    pub fn require(&self, channel: Channel) -> Result<(), TracklineError> {
        if self.has_channel(channel) {
            Ok(())
        } else {
            Err(TracklineError::MissingData { channel })
        }
    }

    /// Values of a channel over a sample range, with absent values read as zero.
    pub fn series(&self, channel: Channel, range: Range<usize>) -> Vec<f64> {
        self.samples[range]
            .iter()
            .map(|s| s.value(channel).filter(|v| v.is_finite()).unwrap_or(0.0))
            .collect()
    }

    pub fn full_series(&self, channel: Channel) -> Vec<f64> {
        self.series(channel, 0..self.samples.len())
    }

    /// Beacon markers that can delimit laps, in recording order.
    pub fn usable_beacons(&self) -> Vec<f64> {
        self.beacon_markers
            .iter()
            .copied()
            .filter(|b| b.is_finite())
            .collect()
    }
}

/// How a lap's boundaries were found.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LapSource {
    Beacon,
    GpsCrossing,
    /// No lap could be delimited; the entire session stands in for one
    WholeSession,
}

/// A contiguous time slice of a session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Lap {
    /// 1-based lap number
    pub number: u32,
    pub start_s: f64,
    pub end_s: f64,
    /// Half-open range of sample indices within the session
    pub samples: Range<usize>,
    pub source: LapSource,
}

impl Lap {
    pub fn duration_s(&self) -> f64 {
        self.end_s - self.start_s
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }
}
