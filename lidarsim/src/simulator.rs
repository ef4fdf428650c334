//! The per-frame driver that ties motion, scan cadence, the scan pipeline, and accumulation
//! together.

use crate::accumulation::{DirtyRange, DisplaySink, PointRingBuffer};
use crate::motion::{MotionPolicy, SensorState, Stationary};
use crate::schedule::{PulseIndicator, ScanScheduler};
use crate::sensors::{IntersectionProvider, LidarScanner};
use crate::{Point3, Result, ScanConfig};
use log::{debug, info, trace, warn};

/// A summary of the scan that ran during a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    /// The sensor position the scan was cast from
    pub origin: Point3,
    pub rays_cast: usize,
    pub hits: usize,
    pub active_count: usize,
    pub dirty: DirtyRange,
}

pub struct LidarSimulator {
    config: ScanConfig,
    scanner: LidarScanner,
    sensor: SensorState,
    motion: Box<dyn MotionPolicy>,
    buffer: PointRingBuffer,
    scheduler: ScanScheduler,
    pulse: PulseIndicator,
    beams: Vec<(Point3, Point3)>,
}

impl LidarSimulator {
    /// Create a simulator. The configuration is validated here and any problem is reported
    /// before a single ray is cast.
    ///
    /// # Arguments
    ///
    /// * `config`: the scan configuration, fixed for the life of the simulator
    /// * `motion`: the policy that moves the sensor each frame
    ///
    /// returns: Result<LidarSimulator, LidarError>
    pub fn new(config: ScanConfig, motion: Box<dyn MotionPolicy>) -> Result<Self> {
        config.validate()?;
        let scanner = LidarScanner::from_config(&config)?;
        let buffer = PointRingBuffer::new(config.capacity())?;
        let scheduler = ScanScheduler::new(config.scan_frequency)?;

        info!(
            "Lidar simulator initialized: {}x{} rays per scan at {} Hz, point buffer size {}",
            config.horizontal_count,
            config.vertical_count,
            config.scan_frequency,
            buffer.capacity()
        );

        Ok(Self {
            sensor: SensorState::new(config.sensor_start),
            config,
            scanner,
            motion,
            buffer,
            scheduler,
            pulse: PulseIndicator::default(),
            beams: Vec::new(),
        })
    }

    /// Create a simulator whose sensor stays at the configured start position
    pub fn stationary(config: ScanConfig) -> Result<Self> {
        let motion = Box::new(Stationary(config.sensor_start));
        Self::new(config, motion)
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn scanner(&self) -> &LidarScanner {
        &self.scanner
    }

    pub fn sensor(&self) -> &SensorState {
        &self.sensor
    }

    pub fn buffer(&self) -> &PointRingBuffer {
        &self.buffer
    }

    pub fn scheduler(&self) -> &ScanScheduler {
        &self.scheduler
    }

    /// Segments from the sensor to each hit of the most recent scan
    pub fn beam_segments(&self) -> &[(Point3, Point3)] {
        &self.beams
    }

    /// Scale of the sensor marker at `now`, which pulses after each scan
    pub fn marker_scale(&self, now: f64) -> f64 {
        self.pulse.scale_at(now)
    }

    /// Advance the simulation to time `now`, in seconds since start. The sensor is moved, and
    /// if a scan is due it runs to completion, its records are ingested, and the sink is given
    /// the updated buffer. Returns a report if a scan ran during this frame.
    ///
    /// # Arguments
    ///
    /// * `now`: the frame time
    /// * `scene`: the objects the sensor can see
    /// * `sink`: the display that is notified once the scan's records are in the buffer
    ///
    /// returns: Option<FrameReport>
    pub fn frame<P, S>(&mut self, now: f64, scene: &P, sink: &mut S) -> Option<FrameReport>
    where
        P: IntersectionProvider + ?Sized,
        S: DisplaySink + ?Sized,
    {
        self.sensor.update(self.motion.as_ref(), now);

        let scanner = &self.scanner;
        let origin = self.sensor.position;
        let Some(output) = self.scheduler.tick(now, || scanner.scan(&origin, scene)) else {
            trace!("No scan due at t={now:.4}");
            return None;
        };

        if output.hit_count() > self.buffer.capacity() {
            warn!(
                "Scan produced {} points but the buffer only holds {}; older points of this scan \
                 were overwritten",
                output.hit_count(),
                self.buffer.capacity()
            );
        }

        self.beams = output.beam_segments();
        let dirty = self.buffer.ingest_all(output.records.iter().copied());
        self.pulse.trigger(now);
        sink.present(&self.buffer, dirty);

        let report = FrameReport {
            origin,
            rays_cast: output.rays_cast(),
            hits: output.hit_count(),
            active_count: self.buffer.active_count(),
            dirty,
        };

        debug!(
            "Scan {} at t={:.4}: {} rays, {} hits, {} active, dirty {:?}",
            self.scheduler.scans(),
            now,
            report.rays_cast,
            report.hits,
            report.active_count,
            dirty.segments()
        );

        Some(report)
    }

    /// Clear the point buffer and restart the scan clock at `now`. The sink is given the empty
    /// buffer so it stops drawing the discarded points. Meant for scene or configuration changes,
    /// not for normal operation.
    pub fn reset<S: DisplaySink + ?Sized>(&mut self, now: f64, sink: &mut S) {
        info!("Resetting point buffer ({} points discarded)", self.buffer.active_count());
        self.buffer.reset();
        self.scheduler.restart(now);
        self.beams.clear();
        sink.present(&self.buffer, DirtyRange::empty(self.buffer.capacity()));
    }
}
