//! Frame driven control of when a scan runs.

use crate::errors::LidarError;
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Scanning,
}

/// Decides on each frame tick whether a scan is due. A scan is due when at least one scan
/// period has elapsed since the last completed scan. Both the decision and the scan happen
/// within the tick, so a scheduler can never run more than one scan per tick.
#[derive(Debug, Clone)]
pub struct ScanScheduler {
    period: f64,
    last_scan: f64,
    state: SchedulerState,
    scans: u64,
}

impl ScanScheduler {
    /// Create a scheduler for the given scan frequency in scans per second. The clock is taken
    /// to start at zero, so the first scan runs on the first tick at or after one period.
    pub fn new(scan_frequency: f64) -> Result<Self> {
        if !scan_frequency.is_finite() || scan_frequency <= 0.0 {
            return Err(LidarError::invalid(format!(
                "scan frequency must be finite and positive, got {scan_frequency}"
            )));
        }
        Ok(Self {
            period: 1.0 / scan_frequency,
            last_scan: 0.0,
            state: SchedulerState::Idle,
            scans: 0,
        })
    }

    pub fn period(&self) -> f64 {
        self.period
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Time of the last completed scan, or zero if there has not been one
    pub fn last_scan(&self) -> f64 {
        self.last_scan
    }

    /// The number of scans completed
    pub fn scans(&self) -> u64 {
        self.scans
    }

    pub fn is_due(&self, now: f64) -> bool {
        now - self.last_scan >= self.period
    }

    /// Run `scan` if one is due at time `now`, returning its result. Otherwise nothing happens
    /// and `None` is returned.
    pub fn tick<T, F: FnOnce() -> T>(&mut self, now: f64, scan: F) -> Option<T> {
        if !self.is_due(now) {
            return None;
        }

        self.state = SchedulerState::Scanning;
        let result = scan();
        self.last_scan = now;
        self.scans += 1;
        self.state = SchedulerState::Idle;

        Some(result)
    }

    /// Return to the initial state, with the clock restarting at `now`
    pub fn restart(&mut self, now: f64) {
        self.last_scan = now;
        self.state = SchedulerState::Idle;
    }
}
