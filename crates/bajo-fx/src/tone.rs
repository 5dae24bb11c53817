//! Master tone filter: a resonant lowpass after the drive stage.

use bajo_core::{Biquad, Effect, SmoothedParam, lowpass_coefficients};

/// Dual-mono resonant lowpass with smoothed cutoff.
///
/// The cutoff follows the settings `tone` control (0..1) mapped onto
/// 500 Hz - 8 kHz; resonance comes from the filter-resonance setting.
#[derive(Debug, Clone)]
pub struct ToneFilter {
    left: Biquad,
    right: Biquad,
    cutoff: SmoothedParam,
    q: f32,
    sample_rate: f32,
    /// Samples until the next coefficient refresh while the cutoff moves.
    update_countdown: u32,
}

/// Coefficient refresh interval in samples while smoothing is in flight.
const UPDATE_INTERVAL: u32 = 32;

impl ToneFilter {
    /// Create a tone filter, fully open by default.
    pub fn new(sample_rate: f32) -> Self {
        let mut filter = Self {
            left: Biquad::new(),
            right: Biquad::new(),
            cutoff: SmoothedParam::with_config(8000.0, sample_rate, 30.0),
            q: 0.707,
            sample_rate,
            update_countdown: 0,
        };
        filter.refresh_coefficients();
        filter
    }

    /// Set the tone control in [0, 1]; 1 is fully open.
    pub fn set_tone(&mut self, tone: f32) {
        let tone = tone.clamp(0.0, 1.0);
        self.cutoff.set_target(500.0 + 7500.0 * tone);
    }

    /// Set resonance (Q), clamped to [0.5, 10].
    pub fn set_resonance(&mut self, q: f32) {
        self.q = q.clamp(0.5, 10.0);
        self.refresh_coefficients();
    }

    fn refresh_coefficients(&mut self) {
        let coeffs = lowpass_coefficients(self.cutoff.get(), self.q, self.sample_rate);
        self.left.set_coefficients(coeffs);
        self.right.set_coefficients(coeffs);
    }

    #[inline]
    fn tick_cutoff(&mut self) {
        self.cutoff.advance();
        if self.update_countdown == 0 {
            if !self.cutoff.is_settled() {
                self.refresh_coefficients();
            }
            self.update_countdown = UPDATE_INTERVAL;
        }
        self.update_countdown -= 1;
    }
}

impl Effect for ToneFilter {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        self.tick_cutoff();
        self.left.process(input)
    }

    #[inline]
    fn process_stereo(&mut self, left: f32, right: f32) -> (f32, f32) {
        self.tick_cutoff();
        (self.left.process(left), self.right.process(right))
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.cutoff.set_sample_rate(sample_rate);
        self.refresh_coefficients();
    }

    fn reset(&mut self) {
        self.left.clear();
        self.right.clear();
        self.cutoff.snap_to_target();
        self.refresh_coefficients();
    }
}
