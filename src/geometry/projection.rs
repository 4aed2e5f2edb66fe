// Local tangent-plane projection of GPS coordinates

use serde::{Deserialize, Serialize};

use crate::{
    TracklineError,
    telemetry::{Channel, TelemetrySession},
};

/// WGS-84 equatorial radius, meters
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Latitude/longitude pair in decimal degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Point in the local planar frame, meters east (x) and north (y) of the origin.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanarPoint {
    pub x: f64,
    pub y: f64,
}

impl PlanarPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &PlanarPoint) -> f64 {
        self.distance_sq(other).sqrt()
    }

    pub fn distance_sq(&self, other: &PlanarPoint) -> f64 {
        (self.x - other.x).powi(2) + (self.y - other.y).powi(2)
    }
}

/// Equirectangular projection around a fixed origin. Every trace compared against the
/// same reference must be projected with the same origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projector {
    origin: GeoPoint,
    cos_lat0: f64,
}

impl Projector {
    pub fn new(origin: GeoPoint) -> Self {
        Self {
            origin,
            cos_lat0: origin.latitude.to_radians().cos(),
        }
    }

    pub fn origin(&self) -> GeoPoint {
        self.origin
    }

    pub fn project(&self, point: GeoPoint) -> PlanarPoint {
        PlanarPoint {
            x: EARTH_RADIUS_M
                * self.cos_lat0
                * (point.longitude - self.origin.longitude).to_radians(),
            y: EARTH_RADIUS_M * (point.latitude - self.origin.latitude).to_radians(),
        }
    }

    /// Inverse of [`Projector::project`].
    pub fn unproject(&self, point: PlanarPoint) -> GeoPoint {
        GeoPoint {
            latitude: self.origin.latitude + (point.y / EARTH_RADIUS_M).to_degrees(),
            longitude: self.origin.longitude
                + (point.x / (EARTH_RADIUS_M * self.cos_lat0)).to_degrees(),
        }
    }

    /// Projects a range of session samples. Latitude and longitude must be present.
    pub fn project_range(
        &self,
        session: &TelemetrySession,
        range: std::ops::Range<usize>,
    ) -> Result<Vec<PlanarPoint>, TracklineError> {
        session.require(Channel::Latitude)?;
        session.require(Channel::Longitude)?;
        let latitudes = session.series(Channel::Latitude, range.clone());
        let longitudes = session.series(Channel::Longitude, range);
        Ok(latitudes
            .into_iter()
            .zip(longitudes)
            .map(|(lat, lon)| self.project(GeoPoint::new(lat, lon)))
            .collect())
    }
}

/// Geographic position of a session sample, if it has one.
pub fn sample_position(session: &TelemetrySession, index: usize) -> Option<GeoPoint> {
    let sample = session.samples.get(index)?;
    Some(GeoPoint::new(sample.latitude?, sample.longitude?))
}
