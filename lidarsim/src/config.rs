//! This module contains the scan configuration, which is supplied once when the simulator is
//! created. The grid resolution and field of view are fixed for the life of a simulator, only the
//! sensor position moves (see `motion`).

use crate::errors::LidarError;
use crate::sensors::BeamParams;
use crate::{Point3, Result};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// The buffer holds this many complete scans when no explicit capacity is given.
const DEFAULT_SCANS_RETAINED: usize = 100;

/// Upper bound on `horizontal_count * vertical_count`, about a 1024x1024 grid
pub const MAX_RAYS_PER_SCAN: usize = 1 << 20;

/// Upper bound on the number of point records a buffer may hold
pub const MAX_BUFFER_CAPACITY: usize = 1 << 25;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Where the sensor sits before any motion policy has been applied
    pub sensor_start: Point3,

    /// Far limit of every ray
    pub max_range: f64,

    /// Near limit of every ray, keeps rays from hitting the sensor's own geometry
    pub near: f64,

    pub horizontal_count: usize,
    pub vertical_count: usize,

    /// Horizontal field of view in radians, swept from azimuth 0 up to (not including) this value
    pub horizontal_fov: f64,

    /// Vertical field of view in radians, centered on the horizontal plane
    pub vertical_fov: f64,

    /// Scans per second
    pub scan_frequency: f64,

    /// Half of the beam's full divergence cone angle, in radians
    pub beam_half_divergence: f64,

    /// Pulse duration in nanoseconds
    pub pulse_duration: f64,

    /// Speed of light in world units per nanosecond
    pub speed_of_light: f64,

    pub point_scale: f64,

    /// Number of point records retained. Defaults to enough room for 100 full scans.
    pub buffer_capacity: Option<usize>,

    /// Cast the rays of a scan on the rayon thread pool
    pub parallel: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            sensor_start: Point3::new(0.0, 1.0, 0.0),
            max_range: 15.0,
            near: 0.01,
            horizontal_count: 50,
            vertical_count: 50,
            horizontal_fov: PI * 2.0,
            vertical_fov: PI,
            scan_frequency: 50.0,
            beam_half_divergence: (30.2_f64 / 2.0).to_radians(),
            pulse_duration: 0.01,
            speed_of_light: 0.299792458,
            point_scale: 1.0,
            buffer_capacity: None,
            parallel: false,
        }
    }
}

pub(crate) fn positive(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(LidarError::invalid(format!("{name} must be finite and positive, got {value}")))
    }
}

pub(crate) fn non_negative(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(LidarError::invalid(format!("{name} must be finite and non-negative, got {value}")))
    }
}

/// Check that a grid of `horizontal_count` by `vertical_count` rays can be built
pub(crate) fn check_ray_count(horizontal_count: usize, vertical_count: usize) -> Result<()> {
    match horizontal_count.checked_mul(vertical_count) {
        Some(n) if n <= MAX_RAYS_PER_SCAN => Ok(()),
        _ => Err(LidarError::invalid(format!(
            "{horizontal_count}x{vertical_count} rays per scan exceeds the limit of {MAX_RAYS_PER_SCAN}"
        ))),
    }
}

pub(crate) fn check_capacity(capacity: usize) -> Result<()> {
    if capacity < 1 {
        return Err(LidarError::invalid("point buffer capacity must be at least 1"));
    }
    if capacity > MAX_BUFFER_CAPACITY {
        return Err(LidarError::invalid(format!(
            "point buffer capacity {capacity} exceeds the limit of {MAX_BUFFER_CAPACITY}"
        )));
    }
    Ok(())
}

impl ScanConfig {
    /// Check every value that the scan pipeline relies on. Nothing is clamped; the first value
    /// found out of range is reported as `LidarError::InvalidConfig`.
    pub fn validate(&self) -> Result<()> {
        if self.horizontal_count < 1 {
            return Err(LidarError::invalid("horizontal ray count must be at least 1"));
        }
        if self.vertical_count < 2 {
            return Err(LidarError::invalid(format!(
                "vertical ray count must be at least 2, got {}",
                self.vertical_count
            )));
        }
        check_ray_count(self.horizontal_count, self.vertical_count)?;
        check_capacity(self.capacity())?;
        if !self.sensor_start.coords.iter().all(|c| c.is_finite()) {
            return Err(LidarError::invalid("sensor start position must be finite"));
        }

        positive("max_range", self.max_range)?;
        positive("near", self.near)?;
        positive("horizontal_fov", self.horizontal_fov)?;
        positive("vertical_fov", self.vertical_fov)?;
        positive("scan_frequency", self.scan_frequency)?;
        non_negative("pulse_duration", self.pulse_duration)?;
        non_negative("speed_of_light", self.speed_of_light)?;

        if self.near >= self.max_range {
            return Err(LidarError::invalid(format!(
                "near limit {} must be less than the max range {}",
                self.near, self.max_range
            )));
        }
        self.beam()?;

        Ok(())
    }

    /// The spatial length of one pulse, `pulse_duration * speed_of_light`
    pub fn pulse_length(&self) -> f64 {
        self.pulse_duration * self.speed_of_light
    }

    /// Minimum time in seconds between the starts of two scans
    pub fn scan_period(&self) -> f64 {
        1.0 / self.scan_frequency
    }

    /// The number of rays in one scan. Saturates instead of overflowing, `validate` rejects
    /// anything above `MAX_RAYS_PER_SCAN`.
    pub fn rays_per_scan(&self) -> usize {
        self.horizontal_count.saturating_mul(self.vertical_count)
    }

    /// The effective point buffer capacity. The default of 100 scans is limited to
    /// `MAX_BUFFER_CAPACITY`; an explicit capacity is taken as given and checked by `validate`.
    pub fn capacity(&self) -> usize {
        self.buffer_capacity.unwrap_or_else(|| {
            self.rays_per_scan()
                .saturating_mul(DEFAULT_SCANS_RETAINED)
                .min(MAX_BUFFER_CAPACITY)
        })
    }

    pub fn beam(&self) -> Result<BeamParams> {
        BeamParams::new(
            self.beam_half_divergence,
            self.pulse_length(),
            self.point_scale,
        )
    }

    /// Read a configuration from a JSON file. Missing fields take their default values, and the
    /// result is validated before being returned.
    pub fn load_json(path: &Path) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let config: ScanConfig = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_json(&self, path: &Path) -> Result<()> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }
}
