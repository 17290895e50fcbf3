//! Scalar smoothing.

/// Exponential moving average for a scalar signal.
///
/// `y_t = α·x_t + (1 − α)·y_{t−1}`; higher α follows the input faster.
/// The first sample after construction or [`reset`](Self::reset) passes
/// through unchanged.
#[derive(Debug, Clone)]
pub struct EmaFilter {
    alpha: f32,
    prev:  Option<f32>,
}

impl EmaFilter {
    pub const MIN_ALPHA: f32 = 0.001;

    pub fn new(alpha: f32) -> Self {
        Self {
            alpha: alpha.clamp(Self::MIN_ALPHA, 1.0),
            prev:  None,
        }
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn update(&mut self, value: f32) -> f32 {
        let y = match self.prev {
            Some(prev) => self.alpha * value + (1.0 - self.alpha) * prev,
            None => value,
        };
        self.prev = Some(y);
        y
    }

    pub fn reset(&mut self) {
        self.prev = None;
    }
}
