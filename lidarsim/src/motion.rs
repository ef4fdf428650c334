//! Sensor motion. The sensor position is explicit state owned by the simulator and updated once
//! per frame from a motion policy, before any scan for that frame runs.

use crate::{Point3, Vector3};

/// Where the sensor is at a given time.
pub trait MotionPolicy: Send {
    fn position_at(&self, time: f64) -> Point3;
}

/// A sensor that never moves
#[derive(Debug, Clone, Copy)]
pub struct Stationary(pub Point3);

impl MotionPolicy for Stationary {
    fn position_at(&self, _time: f64) -> Point3 {
        self.0
    }
}

/// A horizontal circle around a center point, combined with a vertical sinusoidal bob.
#[derive(Debug, Clone, Copy)]
pub struct CircularPath {
    /// Center of the circle, whose height is the middle of the bob
    pub center: Point3,
    pub radius: f64,

    /// Angular speed around the circle, in radians per second
    pub angular_speed: f64,

    pub bob_amplitude: f64,

    /// Angular frequency of the bob, in radians per second
    pub bob_rate: f64,
}

impl Default for CircularPath {
    fn default() -> Self {
        Self {
            center: Point3::new(0.0, 1.5, 0.0),
            radius: 4.0,
            angular_speed: 0.5,
            bob_amplitude: 1.0,
            bob_rate: 1.1,
        }
    }
}

impl MotionPolicy for CircularPath {
    fn position_at(&self, time: f64) -> Point3 {
        let (s, c) = (time * self.angular_speed).sin_cos();
        let bob = (time * self.bob_rate).sin() * self.bob_amplitude;
        self.center + Vector3::new(c * self.radius, bob, s * self.radius)
    }
}

/// The sensor position used by the scan pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorState {
    pub position: Point3,
}

impl SensorState {
    pub fn new(position: Point3) -> Self {
        Self { position }
    }

    /// Move the sensor to where the policy puts it at `time`
    pub fn update(&mut self, policy: &dyn MotionPolicy, time: f64) {
        self.position = policy.position_at(time);
    }
}
