//! One-pole parameter smoothing.
//!
//! Every user-facing control in the instrument moves through a
//! [`SmoothedParam`] so a knob change never lands as a step in the
//! audio. The smoother is a plain exponential approach toward the
//! target, advanced once per sample.

use libm::expf;

/// Exponentially smoothed control value.
///
/// # Example
///
/// ```rust
/// use bajo_core::SmoothedParam;
///
/// let mut gain = SmoothedParam::with_config(1.0, 48000.0, 20.0);
/// gain.set_target(0.5);
/// for _ in 0..4800 {
///     let g = gain.advance();
///     // use g for processing...
/// }
/// assert!((gain.get() - 0.5).abs() < 0.01);
/// ```
#[derive(Debug, Clone)]
pub struct SmoothedParam {
    value: f32,
    target: f32,
    /// Per-sample approach fraction; 1.0 disables smoothing.
    coeff: f32,
    sample_rate: f32,
    smoothing_time_ms: f32,
}

impl SmoothedParam {
    /// An unsmoothed parameter: every `set_target` lands on the next sample.
    pub fn new(initial: f32) -> Self {
        Self {
            value: initial,
            target: initial,
            coeff: 1.0,
            sample_rate: 44100.0,
            smoothing_time_ms: 0.0,
        }
    }

    /// A smoothed parameter with an explicit time constant in milliseconds.
    pub fn with_config(initial: f32, sample_rate: f32, smoothing_time_ms: f32) -> Self {
        let mut param = Self::new(initial);
        param.sample_rate = sample_rate;
        param.smoothing_time_ms = smoothing_time_ms;
        param.update_coeff();
        param
    }

    /// The 20 ms smoothing most bus parameters use.
    pub fn standard(initial: f32, sample_rate: f32) -> Self {
        Self::with_config(initial, sample_rate, 20.0)
    }

    /// Retarget; the value approaches exponentially from wherever it is.
    #[inline]
    pub fn set_target(&mut self, target: f32) {
        self.target = target;
    }

    /// Retarget and jump there on the spot.
    #[inline]
    pub fn set_immediate(&mut self, value: f32) {
        self.target = value;
        self.value = value;
    }

    /// Rescale the time constant to a new sample rate.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.update_coeff();
    }

    /// Change the smoothing time constant in milliseconds.
    pub fn set_smoothing_time_ms(&mut self, time_ms: f32) {
        self.smoothing_time_ms = time_ms;
        self.update_coeff();
    }

    /// Step one sample toward the target and return the new value.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        self.value += self.coeff * (self.target - self.value);
        self.value
    }

    /// Current value, without stepping.
    #[inline]
    pub fn get(&self) -> f32 {
        self.value
    }

    /// Target value.
    #[inline]
    pub fn target(&self) -> f32 {
        self.target
    }

    /// True once the value sits within epsilon of the target.
    #[inline]
    pub fn is_settled(&self) -> bool {
        (self.value - self.target).abs() < 1e-6
    }

    /// Discard the remaining transition and land on the target.
    #[inline]
    pub fn snap_to_target(&mut self) {
        self.value = self.target;
    }

    // coeff = 1 - exp(-1 / (tau * sr)), tau in seconds. One tau reaches
    // 63.2% of the way; five reach 99.3%.
    fn update_coeff(&mut self) {
        if self.smoothing_time_ms <= 0.0 || self.sample_rate <= 0.0 {
            self.coeff = 1.0;
        } else {
            let samples_per_tau = self.smoothing_time_ms * 1e-3 * self.sample_rate;
            self.coeff = 1.0 - expf(-1.0 / samples_per_tau);
        }
    }
}

impl Default for SmoothedParam {
    fn default() -> Self {
        Self::new(0.0)
    }
}
