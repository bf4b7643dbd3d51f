//! Exponential moving average of per-step durations.

/// Exponentially weighted moving average over a (possibly fractional) window.
///
/// The smoothing factor is `alpha = 2 / (window + 1)`, clamped to at most `1`, so a
/// window below one behaves like a window of exactly one (each sample replaces the
/// average) and the average can never turn negative.
///
/// The first non-zero sample is taken verbatim instead of being blended with the
/// initial zero.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MovingAverage {
    window: f64,
    value: f64,
}

impl MovingAverage {
    /// Creates an empty average over `window` effective samples.
    #[must_use]
    pub const fn new(window: f64) -> Self {
        Self { window, value: 0.0 }
    }

    /// The configured window.
    #[must_use]
    pub const fn window(&self) -> f64 {
        self.window
    }

    /// Replaces the window, keeping the accumulated value.
    pub const fn set_window(&mut self, window: f64) {
        self.window = window;
    }

    /// The current average, `0.0` until the first sample.
    #[must_use]
    pub const fn value(&self) -> f64 {
        self.value
    }

    /// Smoothing factor derived from the window.
    #[must_use]
    pub fn alpha(&self) -> f64 {
        (2.0 / (self.window + 1.0)).min(1.0)
    }

    /// Folds `sample` into the average and returns the new value.
    pub fn push(&mut self, sample: f64) -> f64 {
        self.value = if self.value == 0.0 {
            sample
        } else {
            let alpha = self.alpha();
            alpha.mul_add(sample, (1.0 - alpha) * self.value)
        };
        self.value
    }
}
