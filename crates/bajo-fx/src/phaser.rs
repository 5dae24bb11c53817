//! Four-stage allpass phaser with a sine LFO sweep.

use bajo_core::{Effect, Lfo, SmoothedParam};
use core::f32::consts::PI;
use libm::tanf;

/// First-order allpass section with a tunable corner frequency.
///
/// Transfer function `y[n] = a*x[n] + x[n-1] - a*y[n-1]` where
/// `a = (tan(pi*f/sr) - 1) / (tan(pi*f/sr) + 1)`.
#[derive(Debug, Clone, Default)]
struct AllpassStage {
    a: f32,
    x1: f32,
    y1: f32,
}

impl AllpassStage {
    fn set_frequency(&mut self, freq: f32, sample_rate: f32) {
        let t = tanf(PI * (freq / sample_rate).clamp(0.0001, 0.49));
        self.a = (t - 1.0) / (t + 1.0);
    }

    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        let output = self.a * input + self.x1 - self.a * self.y1;
        self.x1 = input;
        self.y1 = output;
        output
    }

    fn clear(&mut self) {
        self.x1 = 0.0;
        self.y1 = 0.0;
    }
}

/// Sweep center frequency in Hz.
const CENTER_FREQ: f32 = 1000.0;
/// Sweep span above and below the center in Hz.
const SWEEP_FREQ: f32 = 600.0;
/// Number of cascaded allpass stages per channel.
const STAGES: usize = 4;

/// Classic phaser: four cascaded allpass stages swept by a sine LFO,
/// mixed equally with the dry signal at full depth.
#[derive(Debug, Clone)]
pub struct Phaser {
    stages_l: [AllpassStage; STAGES],
    stages_r: [AllpassStage; STAGES],
    lfo: Lfo,
    depth: SmoothedParam,
    sample_rate: f32,
}

impl Phaser {
    /// Create a phaser, disabled (depth 0) by default.
    pub fn new(sample_rate: f32) -> Self {
        let mut phaser = Self {
            stages_l: Default::default(),
            stages_r: Default::default(),
            lfo: Lfo::new(sample_rate, 0.5),
            depth: SmoothedParam::standard(0.0, sample_rate),
            sample_rate,
        };
        phaser.retune(CENTER_FREQ);
        phaser
    }

    /// Set sweep rate in Hz, clamped to [0.05, 10].
    pub fn set_rate(&mut self, hz: f32) {
        self.lfo.set_frequency(hz.clamp(0.05, 10.0));
    }

    /// Set effect depth in [0, 1]; 0 bypasses the wet path entirely.
    pub fn set_depth(&mut self, depth: f32) {
        self.depth.set_target(depth.clamp(0.0, 1.0));
    }

    fn retune(&mut self, freq: f32) {
        for stage in self.stages_l.iter_mut().chain(self.stages_r.iter_mut()) {
            stage.set_frequency(freq, self.sample_rate);
        }
    }
}

impl Effect for Phaser {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        self.process_stereo(input, input).0
    }

    #[inline]
    fn process_stereo(&mut self, left: f32, right: f32) -> (f32, f32) {
        let depth = self.depth.advance();
        if depth < 1e-4 {
            // Keep the LFO running so re-enabling lands mid-sweep.
            self.lfo.advance();
            return (left, right);
        }
        let freq = CENTER_FREQ + SWEEP_FREQ * self.lfo.advance();
        self.retune(freq);

        let wet_l = self.stages_l.iter_mut().fold(left, |x, s| s.process(x));
        let wet_r = self.stages_r.iter_mut().fold(right, |x, s| s.process(x));
        let wet = 0.5 * depth;
        let dry = 1.0 - wet;
        (left * dry + wet_l * wet, right * dry + wet_r * wet)
    }

    fn is_true_stereo(&self) -> bool {
        true
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.lfo.set_sample_rate(sample_rate);
        self.depth.set_sample_rate(sample_rate);
        self.retune(CENTER_FREQ);
    }

    fn reset(&mut self) {
        for stage in self.stages_l.iter_mut().chain(self.stages_r.iter_mut()) {
            stage.clear();
        }
        self.lfo.reset();
        self.depth.snap_to_target();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use libm::sinf;

    #[test]
    fn zero_depth_is_transparent() {
        let mut phaser = Phaser::new(48000.0);
        for n in 0..1000 {
            let x = sinf(n as f32 * 0.05);
            let (l, r) = phaser.process_stereo(x, x);
            assert!((l - x).abs() < 1e-6);
            assert!((r - x).abs() < 1e-6);
        }
    }

    #[test]
    fn allpass_preserves_magnitude() {
        // A single allpass stage passes a steady sine at unity gain.
        let sr = 48000.0;
        let mut stage = AllpassStage::default();
        stage.set_frequency(1000.0, sr);
        let mut peak = 0.0f32;
        for n in 0..48000 {
            let x = sinf(2.0 * PI * 440.0 * n as f32 / sr);
            let y = stage.process(x);
            if n > 24000 {
                peak = peak.max(y.abs());
            }
        }
        assert!((peak - 1.0).abs() < 0.02, "allpass gain {peak}");
    }

    #[test]
    fn full_depth_notches_the_sweep_band() {
        let sr = 48000.0;
        let mut phaser = Phaser::new(sr);
        phaser.set_depth(1.0);
        phaser.set_rate(0.5);
        let mut max_out = 0.0f32;
        for n in 0..96000 {
            let x = sinf(2.0 * PI * 1000.0 * n as f32 / sr);
            let (l, _) = phaser.process_stereo(x, x);
            if n > 48000 {
                max_out = max_out.max(l.abs());
            }
        }
        // With dry + wet mixed 50/50 the output never exceeds dry level.
        assert!(max_out <= 1.05, "phaser should not boost, got {max_out}");
    }
}
