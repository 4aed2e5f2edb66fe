// Synthetic sessions shared by the integration tests and benchmarks
#![allow(dead_code)]

use std::f64::consts::PI;

use trackline::{GeoPoint, PlanarPoint, Projector, TelemetrySample, TelemetrySession};

pub const RATE_HZ: f64 = 20.0;
pub const GRAVITY: f64 = 9.81;

/// Where every synthetic session starts
pub fn origin() -> GeoPoint {
    GeoPoint::new(45.6156, 9.2811)
}

/// Two straights joined by two semicircular hairpins, driven counter-clockwise from
/// the start of the lower straight.
#[derive(Clone, Copy, Debug)]
pub struct Stadium {
    pub straight_m: f64,
    pub radius_m: f64,
    pub straight_speed_mps: f64,
    pub apex_speed_mps: f64,
}

impl Default for Stadium {
    fn default() -> Self {
        Self {
            straight_m: 300.0,
            radius_m: 15.0,
            straight_speed_mps: 20.0,
            apex_speed_mps: 8.0,
        }
    }
}

impl Stadium {
    pub fn lap_length_m(&self) -> f64 {
        2.0 * self.straight_m + 2.0 * PI * self.radius_m
    }

    fn hairpin_m(&self) -> f64 {
        PI * self.radius_m
    }

    /// Apex of the first hairpin, in the planar frame of the session start.
    pub fn first_apex(&self) -> PlanarPoint {
        PlanarPoint::new(self.straight_m + self.radius_m, self.radius_m)
    }

    /// Apex of the second hairpin.
    pub fn second_apex(&self) -> PlanarPoint {
        PlanarPoint::new(-self.radius_m, self.radius_m)
    }

    /// Position `s` meters into a lap.
    pub fn position(&self, s: f64) -> PlanarPoint {
        let (l, r, h) = (self.straight_m, self.radius_m, self.hairpin_m());
        let s = s.rem_euclid(self.lap_length_m());
        if s < l {
            PlanarPoint::new(s, 0.0)
        } else if s < l + h {
            let theta = (s - l) / r;
            PlanarPoint::new(l + r * theta.sin(), r - r * theta.cos())
        } else if s < 2.0 * l + h {
            PlanarPoint::new(l - (s - l - h), 2.0 * r)
        } else {
            let theta = (s - 2.0 * l - h) / r;
            PlanarPoint::new(-r * theta.sin(), r + r * theta.cos())
        }
    }

    /// Whether `s` meters into a lap is on a hairpin, and how far through it (0 to 1).
    fn hairpin_progress(&self, s: f64) -> Option<f64> {
        let (l, h) = (self.straight_m, self.hairpin_m());
        let s = s.rem_euclid(self.lap_length_m());
        if (l..l + h).contains(&s) {
            Some((s - l) / h)
        } else if s >= 2.0 * l + h {
            Some((s - 2.0 * l - h) / h)
        } else {
            None
        }
    }

    /// Speed `s` meters into a lap: flat out on the straights, slowing linearly to the
    /// apex speed halfway round each hairpin.
    pub fn speed(&self, s: f64) -> f64 {
        match self.hairpin_progress(s) {
            Some(u) => {
                self.apex_speed_mps
                    + (self.straight_speed_mps - self.apex_speed_mps) * (2.0 * u - 1.0).abs()
            }
            None => self.straight_speed_mps,
        }
    }

    /// Drives `laps` laps at 20 Hz, each lap at `pace` times the nominal speed (the last
    /// pace repeats). A beacon marks every start/finish crossing.
    pub fn session(&self, laps: usize, paces: &[f64]) -> TelemetrySession {
        let projector = Projector::new(origin());
        let dt = 1.0 / RATE_HZ;
        let total = laps as f64 * self.lap_length_m();
        let pace_of = |lap: usize| {
            paces
                .get(lap)
                .or(paces.last())
                .copied()
                .unwrap_or(1.0)
        };

        let mut samples = Vec::new();
        let mut beacons = vec![0.0];
        let mut s = 0.0;
        let mut t = 0.0;
        while s <= total {
            let lap = (s / self.lap_length_m()) as usize;
            let v = self.speed(s) * pace_of(lap);
            let next_s = s + v * dt;
            let next_v = self.speed(next_s) * pace_of((next_s / self.lap_length_m()) as usize);

            let lat_g = match self.hairpin_progress(s) {
                Some(_) => v * v / self.radius_m / GRAVITY,
                None => 0.0,
            };
            let position = projector.unproject(self.position(s));
            samples.push(TelemetrySample {
                time_s: Some(t),
                latitude: Some(position.latitude),
                longitude: Some(position.longitude),
                speed_kmh: Some(v * 3.6),
                lon_accel_g: Some((next_v - v) / dt / GRAVITY),
                lat_accel_g: Some(lat_g),
                engine_rpm: Some(1500.0 + 250.0 * v),
            });

            let boundary = (lap + 1) as f64 * self.lap_length_m();
            if next_s >= boundary && lap < laps {
                beacons.push(t + dt * (boundary - s) / (next_s - s));
            }
            s = next_s;
            t += dt;
        }
        TelemetrySession::new(samples, beacons)
    }
}

/// Constant-speed laps of a circle starting at its southernmost point, without beacons.
pub fn circle_session(circumference_m: f64, speed_mps: f64, samples: usize) -> TelemetrySession {
    let projector = Projector::new(origin());
    let radius = circumference_m / (2.0 * PI);
    let samples = (0..samples)
        .map(|i| {
            let t = i as f64 / RATE_HZ;
            let theta = speed_mps * t / radius;
            let position = projector.unproject(PlanarPoint::new(
                radius * theta.sin(),
                radius - radius * theta.cos(),
            ));
            TelemetrySample {
                time_s: Some(t),
                latitude: Some(position.latitude),
                longitude: Some(position.longitude),
                speed_kmh: Some(speed_mps * 3.6),
                lon_accel_g: Some(0.0),
                lat_accel_g: Some(speed_mps * speed_mps / radius / GRAVITY),
                engine_rpm: Some(1500.0 + 250.0 * speed_mps),
            }
        })
        .collect();
    TelemetrySession::new(samples, Vec::new())
}

/// Index of the slowest sample within `range`.
pub fn slowest_sample(session: &TelemetrySession, range: std::ops::Range<usize>) -> usize {
    range
        .min_by(|a, b| {
            let va = session.samples[*a].speed_kmh.unwrap_or(0.0);
            let vb = session.samples[*b].speed_kmh.unwrap_or(0.0);
            va.total_cmp(&vb)
        })
        .unwrap_or(0)
}
