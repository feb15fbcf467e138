//! Temporal filtering for noisy scalar measurements.
//!
//! Vision outputs (head angles, eye-based distance) arrive at a low rate and
//! jitter from frame to frame. Each signal is run through an exponential
//! moving average and, where the consumer cares about visual stability, a
//! dead-zone stage that freezes the output until the smoothed value has
//! moved by at least a threshold.

/// Exponential moving average
pub mod exponential;

/// Dead-zone (hysteresis) stage
pub mod dead_zone;

pub use dead_zone::{deadzone, DeadZoneFilter};
pub use exponential::{ema, ExponentialFilter};

/// Common interface for single-signal filters
pub trait ScalarFilter: Send + Sync {
    /// Feed one sample and return the filtered value
    fn apply(&mut self, value: f64) -> f64;

    /// Latest filtered value, `None` before the first sample
    fn value(&self) -> Option<f64>;

    /// Reset filter state
    fn reset(&mut self);

    /// Get filter name
    fn name(&self) -> &str;
}

/// EMA followed by a dead-zone.
///
/// The smoothed state tracks every sample; the output only follows it when
/// the difference to the previous output reaches the dead-zone threshold.
#[derive(Debug, Clone)]
pub struct SmoothedScalar {
    ema: ExponentialFilter,
    dead_zone: DeadZoneFilter,
}

impl SmoothedScalar {
    /// Create a smoothed scalar with the given EMA coefficient and dead-zone threshold
    ///
    /// # Panics
    ///
    /// Panics if alpha is not in (0, 1] or the threshold is negative
    #[must_use]
    pub fn new(alpha: f64, dead_zone: f64) -> Self {
        Self {
            ema: ExponentialFilter::new(alpha),
            dead_zone: DeadZoneFilter::new(dead_zone),
        }
    }

    /// Raw EMA state
    #[must_use]
    pub fn smoothed(&self) -> Option<f64> {
        self.ema.value()
    }

    /// Dead-zoned output
    #[must_use]
    pub fn output(&self) -> Option<f64> {
        self.dead_zone.value()
    }
}

impl ScalarFilter for SmoothedScalar {
    fn apply(&mut self, value: f64) -> f64 {
        let smoothed = self.ema.apply(value);
        self.dead_zone.apply(smoothed)
    }

    fn value(&self) -> Option<f64> {
        self.output()
    }

    fn reset(&mut self) {
        self.ema.reset();
        self.dead_zone.reset();
    }

    fn name(&self) -> &str {
        "SmoothedScalar"
    }
}
