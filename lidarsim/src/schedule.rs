//! Timing: the scan cadence state machine, and the independent cosmetic pulse timer.

mod pulse;
mod scheduler;

pub use pulse::PulseIndicator;
pub use scheduler::{ScanScheduler, SchedulerState};
