use super::ScalarFilter;

/// One dead-zone step.
///
/// The candidate replaces the prior output only when it differs from it by
/// at least `threshold`.
#[must_use]
pub fn deadzone(prior_output: Option<f64>, candidate: f64, threshold: f64) -> f64 {
    match prior_output {
        Some(prior) if (candidate - prior).abs() < threshold => prior,
        _ => candidate,
    }
}

/// Dead-zone filter holding the last emitted output
#[derive(Debug, Clone)]
pub struct DeadZoneFilter {
    threshold: f64,
    output: Option<f64>,
}

impl DeadZoneFilter {
    /// # Panics
    ///
    /// Panics if the threshold is negative
    #[must_use]
    pub fn new(threshold: f64) -> Self {
        assert!(threshold >= 0.0, "Threshold must be non-negative");
        Self {
            threshold,
            output: None,
        }
    }
}

impl ScalarFilter for DeadZoneFilter {
    fn apply(&mut self, value: f64) -> f64 {
        let out = deadzone(self.output, value, self.threshold);
        self.output = Some(out);
        out
    }

    fn value(&self) -> Option<f64> {
        self.output
    }

    fn reset(&mut self) {
        self.output = None;
    }

    fn name(&self) -> &str {
        "DeadZoneFilter"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deadzone_laws() {
        assert_eq!(deadzone(None, 4.0, 0.5), 4.0);
        assert_eq!(deadzone(Some(4.0), 4.0, 0.5), 4.0);
        assert_eq!(deadzone(Some(4.0), 4.3, 0.5), 4.0);
        assert_eq!(deadzone(Some(4.0), 3.6, 0.5), 4.0);
        // Exactly at the threshold the candidate wins
        assert_eq!(deadzone(Some(4.0), 4.5, 0.5), 4.5);
        assert_eq!(deadzone(Some(4.0), 2.0, 0.5), 2.0);
    }

    #[test]
    fn test_filter_holds_until_threshold() {
        let mut filter = DeadZoneFilter::new(1.0);
        assert_eq!(filter.apply(0.0), 0.0);
        assert_eq!(filter.apply(0.4), 0.0);
        assert_eq!(filter.apply(0.9), 0.0);
        assert_eq!(filter.apply(1.2), 1.2);
        assert_eq!(filter.apply(0.5), 1.2);
    }

    #[test]
    #[should_panic(expected = "Threshold must be non-negative")]
    fn test_negative_threshold_rejected() {
        let _ = DeadZoneFilter::new(-0.1);
    }
}
