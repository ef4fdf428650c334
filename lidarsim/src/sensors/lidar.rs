//! One complete scan pass: every direction of the sampling grid is cast from the sensor position,
//! and each hit is converted into a point record.

use crate::sensors::{BeamParams, Hit, IntersectionProvider, PointRecord, SamplingGrid};
use crate::sensors::{cast_nearest, estimate_footprint};
use crate::config::positive;
use crate::errors::LidarError;
use crate::{Point3, Result, ScanConfig, UnitVec3};
use rayon::prelude::*;

/// A scanning range sensor. The scanner holds everything about the sensor that is fixed for its
/// lifetime; the position it scans from is supplied with each scan.
#[derive(Debug, Clone)]
pub struct LidarScanner {
    grid: SamplingGrid,
    near: f64,
    far: f64,
    beam: BeamParams,
    parallel: bool,
}

/// The result of one scan pass.
#[derive(Debug, Clone)]
pub struct ScanOutput {
    /// The sensor position the rays were cast from
    pub origin: Point3,

    /// One entry per ray in grid order, `None` where the ray hit nothing
    pub samples: Vec<Option<Hit>>,

    /// The footprint of each hit, in grid order
    pub records: Vec<PointRecord>,
}

impl ScanOutput {
    /// The number of rays cast, which is always the full size of the sampling grid
    pub fn rays_cast(&self) -> usize {
        self.samples.len()
    }

    pub fn hit_count(&self) -> usize {
        self.records.len()
    }

    pub fn hits(&self) -> impl Iterator<Item = &Hit> {
        self.samples.iter().flatten()
    }

    /// Line segments from the sensor to each hit, for drawing the beams
    pub fn beam_segments(&self) -> Vec<(Point3, Point3)> {
        self.hits().map(|h| (self.origin, h.position)).collect()
    }
}

impl LidarScanner {
    /// Create a scanner. Hits are accepted between `near` and `far`, where `near` must be
    /// positive and `far` must be finite and beyond `near`.
    pub fn new(
        grid: SamplingGrid,
        near: f64,
        far: f64,
        beam: BeamParams,
        parallel: bool,
    ) -> Result<Self> {
        positive("near", near)?;
        positive("max_range", far)?;
        if near >= far {
            return Err(LidarError::invalid(format!(
                "near limit {near} must be less than the max range {far}"
            )));
        }

        Ok(Self {
            grid,
            near,
            far,
            beam,
            parallel,
        })
    }

    pub fn from_config(config: &ScanConfig) -> Result<Self> {
        config.validate()?;
        Self::new(
            SamplingGrid::from_config(config)?,
            config.near,
            config.max_range,
            config.beam()?,
            config.parallel,
        )
    }

    pub fn grid(&self) -> &SamplingGrid {
        &self.grid
    }

    pub fn beam(&self) -> &BeamParams {
        &self.beam
    }

    /// Cast every ray of the grid from `origin`. In parallel mode the rays are distributed over
    /// the rayon pool, but the results are collected in grid order so the output is identical to
    /// the sequential scan.
    ///
    /// # Arguments
    ///
    /// * `origin`: the sensor position at the time of the scan
    /// * `provider`: the scene the rays are cast into
    ///
    /// returns: ScanOutput
    pub fn scan<P: IntersectionProvider + ?Sized>(&self, origin: &Point3, provider: &P) -> ScanOutput {
        let cast = |d: &UnitVec3| cast_nearest(provider, origin, d, self.near, self.far);

        let samples: Vec<Option<Hit>> = if self.parallel {
            self.grid.directions().par_iter().map(cast).collect()
        } else {
            self.grid.directions().iter().map(cast).collect()
        };

        let records = samples
            .iter()
            .flatten()
            .map(|h| estimate_footprint(h, &self.beam))
            .collect();

        ScanOutput {
            origin: *origin,
            samples,
            records,
        }
    }
}
