//! Soft-knee dynamics compressor on the master bus.
//!
//! Feed-forward design: envelope follower, gain computer, gain reduction.
//! Stereo detection is linked through the mid signal so both channels get
//! the same gain and the image stays put.

use bajo_core::{Effect, EnvelopeFollower, db_to_linear, linear_to_db};

/// Gain computer implementing the soft-knee compression curve.
#[derive(Debug, Clone)]
struct GainComputer {
    threshold_db: f32,
    ratio: f32,
    knee_db: f32,
}

impl GainComputer {
    fn new() -> Self {
        Self {
            threshold_db: -12.0,
            ratio: 4.0,
            knee_db: 10.0,
        }
    }

    #[inline]
    fn compute_gain_db(&self, input_db: f32) -> f32 {
        let overshoot = input_db - self.threshold_db;
        let half_knee = self.knee_db / 2.0;

        if overshoot <= -half_knee {
            0.0
        } else if overshoot > half_knee {
            -(overshoot * (1.0 - 1.0 / self.ratio))
        } else {
            let knee_factor = (overshoot + half_knee) / self.knee_db;
            -(knee_factor * knee_factor * overshoot * (1.0 - 1.0 / self.ratio))
        }
    }
}

/// Master-bus compressor with a 10 dB soft knee.
///
/// Defaults: threshold -12 dB, ratio 4:1, 5 ms attack, 50 ms release.
#[derive(Debug, Clone)]
pub struct Compressor {
    envelope_follower: EnvelopeFollower,
    gain_computer: GainComputer,
    /// Last computed gain reduction in dB, always non-positive.
    last_gain_reduction_db: f32,
}

impl Compressor {
    /// Create a compressor with master-bus defaults.
    pub fn new(sample_rate: f32) -> Self {
        let mut envelope_follower = EnvelopeFollower::new(sample_rate);
        envelope_follower.set_attack_ms(5.0);
        envelope_follower.set_release_ms(50.0);
        Self {
            envelope_follower,
            gain_computer: GainComputer::new(),
            last_gain_reduction_db: 0.0,
        }
    }

    /// Set threshold in dB, clamped to [-60, 0].
    pub fn set_threshold_db(&mut self, threshold_db: f32) {
        self.gain_computer.threshold_db = threshold_db.clamp(-60.0, 0.0);
    }

    /// Set compression ratio, clamped to [1, 20].
    pub fn set_ratio(&mut self, ratio: f32) {
        self.gain_computer.ratio = ratio.clamp(1.0, 20.0);
    }

    /// Last computed gain reduction in dB; 0.0 means no compression.
    pub fn gain_reduction_db(&self) -> f32 {
        self.last_gain_reduction_db
    }

    #[inline]
    fn gain_for(&mut self, detect: f32) -> f32 {
        let envelope = self.envelope_follower.process(detect);
        let envelope_db = linear_to_db(envelope.max(1e-7));
        let gain_reduction_db = self.gain_computer.compute_gain_db(envelope_db);
        self.last_gain_reduction_db = gain_reduction_db;
        db_to_linear(gain_reduction_db)
    }
}

impl Effect for Compressor {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        input * self.gain_for(input)
    }

    #[inline]
    fn process_stereo(&mut self, left: f32, right: f32) -> (f32, f32) {
        // Linked detection from the mid signal.
        let gain = self.gain_for((left + right) * 0.5);
        (left * gain, right * gain)
    }

    fn is_true_stereo(&self) -> bool {
        true
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.envelope_follower.set_sample_rate(sample_rate);
    }

    fn reset(&mut self) {
        self.envelope_follower.reset();
        self.last_gain_reduction_db = 0.0;
    }
}
