//! Peak amplitude tracking for the bus compressor.

use libm::expf;

/// Peak follower with asymmetric attack and release.
///
/// Rectifies the input and chases it with one of two one-pole
/// smoothers: the fast attack pole while the signal is above the
/// envelope, the slow release pole while it is below.
///
/// ```rust
/// use bajo_core::EnvelopeFollower;
///
/// let mut env = EnvelopeFollower::new(48000.0);
/// env.set_attack_ms(5.0);
/// env.set_release_ms(50.0);
/// let level = env.process(0.5);
/// ```
#[derive(Debug, Clone)]
pub struct EnvelopeFollower {
    envelope: f32,
    attack_pole: f32,
    release_pole: f32,
    sample_rate: f32,
    attack_ms: f32,
    release_ms: f32,
}

impl EnvelopeFollower {
    /// Defaults to 10 ms attack, 100 ms release.
    pub fn new(sample_rate: f32) -> Self {
        let mut follower = Self {
            envelope: 0.0,
            attack_pole: 0.0,
            release_pole: 0.0,
            sample_rate,
            attack_ms: 10.0,
            release_ms: 100.0,
        };
        follower.update_poles();
        follower
    }

    /// Attack time in milliseconds, floored at 0.1.
    pub fn set_attack_ms(&mut self, attack_ms: f32) {
        self.attack_ms = attack_ms.max(0.1);
        self.update_poles();
    }

    /// Release time in milliseconds, floored at 1.
    pub fn set_release_ms(&mut self, release_ms: f32) {
        self.release_ms = release_ms.max(1.0);
        self.update_poles();
    }

    /// Rescale both poles to a new sample rate.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.update_poles();
    }

    /// Feed one sample, returning the tracked level (always >= 0).
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let rectified = input.abs();
        let pole = if rectified > self.envelope {
            self.attack_pole
        } else {
            self.release_pole
        };
        self.envelope = rectified + pole * (self.envelope - rectified);
        self.envelope
    }

    /// Drop the tracked level back to silence.
    pub fn reset(&mut self) {
        self.envelope = 0.0;
    }

    fn update_poles(&mut self) {
        self.attack_pole = expf(-1.0 / (self.attack_ms * 1e-3 * self.sample_rate));
        self.release_pole = expf(-1.0 / (self.release_ms * 1e-3 * self.sample_rate));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn climbs_to_a_steady_signal() {
        let mut env = EnvelopeFollower::new(48000.0);
        env.set_attack_ms(1.0);
        let mut level = 0.0;
        for _ in 0..480 {
            level = env.process(1.0);
        }
        assert!(level > 0.9, "got {level}");
    }

    #[test]
    fn decays_once_the_signal_stops() {
        let mut env = EnvelopeFollower::new(48000.0);
        env.set_attack_ms(1.0);
        env.set_release_ms(50.0);
        for _ in 0..480 {
            env.process(1.0);
        }
        let mut level = 1.0;
        for _ in 0..48000 {
            level = env.process(0.0);
        }
        assert!(level < 0.01, "got {level}");
    }

    #[test]
    fn negative_input_tracks_like_positive() {
        let mut pos = EnvelopeFollower::new(48000.0);
        let mut neg = EnvelopeFollower::new(48000.0);
        for _ in 0..1000 {
            let a = pos.process(0.7);
            let b = neg.process(-0.7);
            assert!((a - b).abs() < 1e-6);
        }
    }
}
