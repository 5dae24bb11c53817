//! The processor interface every bus stage implements.

/// Per-sample audio processor.
///
/// Stages are dual-mono by default: the stereo method mono-sums and
/// duplicates. Anything with genuinely independent channels (panned
/// sends, linked compression) overrides [`process_stereo`] and reports
/// it through [`is_true_stereo`]. Every method must be safe to call
/// from a real-time audio thread, so no method allocates.
///
/// [`process_stereo`]: Effect::process_stereo
/// [`is_true_stereo`]: Effect::is_true_stereo
pub trait Effect {
    /// Process one mono sample, nominally in [-1, 1].
    fn process(&mut self, input: f32) -> f32;

    /// Process one stereo frame.
    fn process_stereo(&mut self, left: f32, right: f32) -> (f32, f32) {
        let out = self.process((left + right) * 0.5);
        (out, out)
    }

    /// Whether left and right can genuinely differ at the output.
    fn is_true_stereo(&self) -> bool {
        false
    }

    /// Recompute rate-dependent state (coefficients, delay lengths,
    /// modulator increments) for a new sample rate.
    fn set_sample_rate(&mut self, sample_rate: f32);

    /// Flush audio history without touching parameters.
    fn reset(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Gain(f32);

    impl Effect for Gain {
        fn process(&mut self, input: f32) -> f32 {
            input * self.0
        }
        fn set_sample_rate(&mut self, _: f32) {}
        fn reset(&mut self) {}
    }

    #[test]
    fn default_stereo_mono_sums() {
        let mut gain = Gain(2.0);
        let (l, r) = gain.process_stereo(0.5, 0.1);
        assert_eq!(l, r);
        assert!((l - 0.6).abs() < 1e-6);
        assert!(!gain.is_true_stereo());
    }
}
