//! A cosmetic one-shot timer for the sensor marker, which swells briefly whenever a scan
//! completes. It only reads the clock and never touches scan or buffer state.

#[derive(Debug, Clone)]
pub struct PulseIndicator {
    rest_scale: f64,
    peak_scale: f64,
    duration: f64,
    triggered_at: Option<f64>,
}

impl Default for PulseIndicator {
    fn default() -> Self {
        Self::new(1.0, 1.5, 0.05)
    }
}

impl PulseIndicator {
    /// # Arguments
    ///
    /// * `rest_scale`: the marker scale between pulses
    /// * `peak_scale`: the marker scale while a pulse is active
    /// * `duration`: how long a pulse lasts, in seconds
    pub fn new(rest_scale: f64, peak_scale: f64, duration: f64) -> Self {
        Self {
            rest_scale,
            peak_scale,
            duration,
            triggered_at: None,
        }
    }

    /// Start a pulse at `now`, replacing any pulse still in progress
    pub fn trigger(&mut self, now: f64) {
        self.triggered_at = Some(now);
    }

    pub fn is_active(&self, now: f64) -> bool {
        self.triggered_at
            .is_some_and(|t| now >= t && now - t < self.duration)
    }

    /// The marker scale at time `now`
    pub fn scale_at(&self, now: f64) -> f64 {
        if self.is_active(now) {
            self.peak_scale
        } else {
            self.rest_scale
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn rests_until_triggered() {
        let pulse = PulseIndicator::default();
        assert_eq!(pulse.scale_at(0.0), 1.0);
        assert_eq!(pulse.scale_at(100.0), 1.0);
    }

    #[test_case(1.0, 1.5)]
    #[test_case(1.049, 1.5)]
    #[test_case(1.05, 1.0)]
    #[test_case(2.0, 1.0)]
    #[test_case(0.9, 1.0)]
    fn pulse_lasts_fifty_milliseconds(now: f64, expected: f64) {
        let mut pulse = PulseIndicator::default();
        pulse.trigger(1.0);
        assert_eq!(pulse.scale_at(now), expected);
    }

    #[test]
    fn retrigger_extends_pulse() {
        let mut pulse = PulseIndicator::default();
        pulse.trigger(1.0);
        pulse.trigger(1.04);
        assert!(pulse.is_active(1.08));
    }
}
