//! Amplitude tremolo driven by a sine LFO.

use bajo_core::{Effect, Lfo, SmoothedParam};

/// Tremolo with gain swinging between `1 - depth` and 1, so the effect
/// only ever attenuates and depth 0 is bit-transparent.
#[derive(Debug, Clone)]
pub struct Tremolo {
    lfo: Lfo,
    depth: SmoothedParam,
}

impl Tremolo {
    /// Create a tremolo, disabled (depth 0) by default.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            lfo: Lfo::new(sample_rate, 4.0),
            depth: SmoothedParam::standard(0.0, sample_rate),
        }
    }

    /// Set the LFO rate in Hz, clamped to [0.1, 20].
    pub fn set_rate(&mut self, hz: f32) {
        self.lfo.set_frequency(hz.clamp(0.1, 20.0));
    }

    /// Set modulation depth in [0, 1].
    pub fn set_depth(&mut self, depth: f32) {
        self.depth.set_target(depth.clamp(0.0, 1.0));
    }

    #[inline]
    fn next_gain(&mut self) -> f32 {
        let depth = self.depth.advance();
        let lfo = self.lfo.advance_unipolar();
        1.0 - depth * (1.0 - lfo)
    }
}

impl Effect for Tremolo {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        input * self.next_gain()
    }

    #[inline]
    fn process_stereo(&mut self, left: f32, right: f32) -> (f32, f32) {
        let gain = self.next_gain();
        (left * gain, right * gain)
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.lfo.set_sample_rate(sample_rate);
        self.depth.set_sample_rate(sample_rate);
    }

    fn reset(&mut self) {
        self.lfo.reset();
        self.depth.snap_to_target();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_depth_is_transparent() {
        let mut trem = Tremolo::new(48000.0);
        for _ in 0..1000 {
            let y = trem.process(0.5);
            assert!((y - 0.5).abs() < 1e-6);
        }
    }

    #[test]
    fn gain_stays_in_depth_window() {
        let mut trem = Tremolo::new(48000.0);
        trem.set_depth(0.6);
        trem.set_rate(8.0);
        // Let the depth smoothing settle.
        for _ in 0..4800 {
            trem.process(1.0);
        }
        let mut min = f32::MAX;
        let mut max = f32::MIN;
        for _ in 0..48000 {
            let y = trem.process(1.0);
            min = min.min(y);
            max = max.max(y);
        }
        assert!(min >= 0.4 - 1e-3, "floor {min}");
        assert!(max <= 1.0 + 1e-3, "ceiling {max}");
        assert!(max - min > 0.5, "should actually modulate, span {}", max - min);
    }
}
