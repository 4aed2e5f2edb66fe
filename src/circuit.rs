// Whole-session descriptors of what a circuit demands from the car

use log::debug;
use serde::{Deserialize, Serialize};
use uom::si::{
    acceleration::{meter_per_second_squared, standard_gravity},
    f64::{Acceleration, Velocity},
    velocity::{kilometer_per_hour, meter_per_second},
};

use crate::{
    config::CircuitConfig,
    geometry::{PlanarPoint, Projector, sample_position},
    stats::mean,
    telemetry::{Channel, TelemetrySession},
};

/// Five scalars summarizing the load a session put on the car, in SI units.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CircuitCharacteristics {
    /// Time-weighted |lateral acceleration| times speed squared, per second of session
    pub downforce: f64,
    /// Mean deceleration while braking, m/s^2
    pub braking: f64,
    /// Integrated |lateral acceleration| times speed
    pub tyre_wear: f64,
    /// Integrated |lateral acceleration| in slow, loaded corners
    pub mechanical_grip: f64,
    /// Fraction of the session spent accelerating
    pub engine: f64,
}

fn to_mps(speed_kmh: f64) -> f64 {
    Velocity::new::<kilometer_per_hour>(speed_kmh).get::<meter_per_second>()
}

fn to_mps2(accel_g: f64) -> f64 {
    Acceleration::new::<standard_gravity>(accel_g).get::<meter_per_second_squared>()
}

/// Computes the session descriptors. Sessions without time, speed or both accelerations,
/// or with fewer than two samples, describe nothing and yield all zeros.
pub fn compute_circuit_characteristics(
    session: &TelemetrySession,
    config: &CircuitConfig,
) -> CircuitCharacteristics {
    let required = [
        Channel::Time,
        Channel::Speed,
        Channel::LongitudinalAccel,
        Channel::LateralAccel,
    ];
    if let Some(missing) = required.iter().find(|c| !session.has_channel(**c)) {
        debug!("Circuit characteristics unavailable, no {} channel", missing);
        return CircuitCharacteristics::default();
    }
    if session.len() < 2 {
        return CircuitCharacteristics::default();
    }

    let time = session.full_series(Channel::Time);
    let speed: Vec<f64> = session
        .full_series(Channel::Speed)
        .into_iter()
        .map(to_mps)
        .collect();
    let ax: Vec<f64> = session
        .full_series(Channel::LongitudinalAccel)
        .into_iter()
        .map(to_mps2)
        .collect();
    let ay: Vec<f64> = session
        .full_series(Channel::LateralAccel)
        .into_iter()
        .map(to_mps2)
        .collect();

    let steps: Vec<f64> = time.windows(2).map(|w| w[1] - w[0]).collect();
    let dt = mean(&steps);
    let duration = time[time.len() - 1] - time[0];
    let per_second = |total: f64| if duration > 0.0 { total / duration } else { 0.0 };

    let downforce = per_second(
        ay.iter()
            .zip(&speed)
            .map(|(a, v)| a.abs() * v * v * dt)
            .sum(),
    );

    let braking_samples: Vec<f64> = ax
        .iter()
        .filter(|a| **a < config.braking_accel_mps2)
        .map(|a| a.abs())
        .collect();
    let braking = mean(&braking_samples);

    let tyre_wear = ay
        .iter()
        .zip(&speed)
        .map(|(a, v)| a.abs() * v * dt)
        .sum();

    let mechanical_grip = ay
        .iter()
        .zip(&speed)
        .filter(|(a, v)| **v < config.low_speed_mps && a.abs() > config.cornering_accel_mps2)
        .map(|(a, _)| a.abs() * dt)
        .sum();

    let accelerating = ax.iter().filter(|a| **a > config.power_accel_mps2).count();
    let engine = per_second(accelerating as f64 * dt);

    CircuitCharacteristics {
        downforce,
        braking,
        tyre_wear,
        mechanical_grip,
        engine,
    }
}

/// Down-sampled planar path of the session around its first sample, at most
/// `config.outline_points` points. Empty without a position.
pub fn track_outline(session: &TelemetrySession, config: &CircuitConfig) -> Vec<PlanarPoint> {
    let Some(origin) = sample_position(session, 0) else {
        return Vec::new();
    };
    let Ok(points) = Projector::new(origin).project_range(session, 0..session.len()) else {
        return Vec::new();
    };
    let stride = points.len().div_ceil(config.outline_points.max(1)).max(1);
    points.into_iter().step_by(stride).collect()
}
