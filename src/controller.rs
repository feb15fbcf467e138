//! Rate-limited proportional control of the elbow joint

use crate::config::ControllerConfig;

/// One controller step.
///
/// Holds the angle when the distance is unknown or within tolerance of the
/// target. Otherwise moves toward `neutral + gain * relative_error`, at most
/// `max_delta` degrees per step, inside the elbow limits.
///
/// # Panics
///
/// Panics if `elbow_min > elbow_max` or `max_delta` is negative
#[must_use]
pub fn elbow_step(current: f64, distance_cm: Option<f64>, config: &ControllerConfig) -> f64 {
    let Some(distance) = distance_cm.filter(|d| d.is_finite()) else {
        return current;
    };

    let error = distance - config.target_distance_cm;
    if error.abs() < config.tolerance_cm {
        return current;
    }

    let relative_error = error / config.target_distance_cm;
    let ideal = config
        .gain
        .mul_add(relative_error, config.neutral_angle)
        .clamp(config.elbow_min, config.elbow_max);
    let delta = (ideal - current).clamp(-config.max_delta, config.max_delta);

    (current + delta).clamp(config.elbow_min, config.elbow_max)
}

/// Persistent elbow angle driven by distance estimates
#[derive(Debug, Clone)]
pub struct ElbowController {
    config: ControllerConfig,
    angle: f64,
}

impl ElbowController {
    /// Start at the neutral angle, clamped to the elbow limits
    #[must_use]
    pub fn new(config: ControllerConfig) -> Self {
        let angle = config.neutral_angle.clamp(config.elbow_min, config.elbow_max);
        Self { config, angle }
    }

    /// Advance one tick with the latest distance and return the new angle
    pub fn update(&mut self, distance_cm: Option<f64>) -> f64 {
        let next = elbow_step(self.angle, distance_cm, &self.config);
        if (next - self.angle).abs() > f64::EPSILON {
            log::debug!("Elbow {:.2} -> {:.2} (distance {:?})", self.angle, next, distance_cm);
        }
        self.angle = next;
        next
    }

    #[must_use]
    pub const fn angle(&self) -> f64 {
        self.angle
    }

    #[must_use]
    pub const fn config(&self) -> &ControllerConfig {
        &self.config
    }
}
