use super::ScalarFilter;

/// One exponential moving average step.
///
/// Returns `new` when there is no prior state.
#[must_use]
pub fn ema(prior: Option<f64>, new: f64, alpha: f64) -> f64 {
    match prior {
        Some(last) => (1.0 - alpha) * last + alpha * new,
        None => new,
    }
}

/// Exponential smoothing filter
#[derive(Debug, Clone)]
pub struct ExponentialFilter {
    alpha: f64,
    last: Option<f64>,
}

impl ExponentialFilter {
    /// # Panics
    ///
    /// Panics if alpha is not in the range (0, 1]
    #[must_use]
    pub fn new(alpha: f64) -> Self {
        assert!(alpha > 0.0 && alpha <= 1.0, "Alpha must be in (0, 1]");
        Self { alpha, last: None }
    }
}

impl ScalarFilter for ExponentialFilter {
    fn apply(&mut self, value: f64) -> f64 {
        let filtered = ema(self.last, value, self.alpha);
        self.last = Some(filtered);
        filtered
    }

    fn value(&self) -> Option<f64> {
        self.last
    }

    fn reset(&mut self) {
        self.last = None;
    }

    fn name(&self) -> &str {
        "ExponentialFilter"
    }
}
