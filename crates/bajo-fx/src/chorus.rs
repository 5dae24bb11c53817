//! Chorus send: a short modulated delay mixed wet-only into the bus.

use bajo_core::{Effect, InterpolatedDelay, Lfo, SmoothedParam};

/// Nominal delay center in seconds.
const CENTER_DELAY_S: f32 = 0.030;
/// Modulation span around the center in seconds.
const MOD_DEPTH_S: f32 = 0.002;
/// Modulation rate in Hz.
const MOD_RATE_HZ: f32 = 1.5;

/// Stereo chorus with opposed LFO phases per channel.
///
/// Produces the wet signal only; the caller mixes it against the dry
/// path at the send level.
#[derive(Debug, Clone)]
pub struct Chorus {
    delay_l: InterpolatedDelay,
    delay_r: InterpolatedDelay,
    lfo_l: Lfo,
    lfo_r: Lfo,
    level: SmoothedParam,
    sample_rate: f32,
}

impl Chorus {
    /// Create a chorus at the given sample rate, level 0.
    pub fn new(sample_rate: f32) -> Self {
        let max_delay = CENTER_DELAY_S + 2.0 * MOD_DEPTH_S;
        let mut lfo_r = Lfo::new(sample_rate, MOD_RATE_HZ);
        lfo_r.set_phase(0.5);
        Self {
            delay_l: InterpolatedDelay::from_time(sample_rate, max_delay),
            delay_r: InterpolatedDelay::from_time(sample_rate, max_delay),
            lfo_l: Lfo::new(sample_rate, MOD_RATE_HZ),
            lfo_r,
            level: SmoothedParam::standard(0.0, sample_rate),
            sample_rate,
        }
    }

    /// Set the send level in [0, 1].
    pub fn set_level(&mut self, level: f32) {
        self.level.set_target(level.clamp(0.0, 1.0));
    }

    /// Current send target, for bypass checks.
    pub fn level(&self) -> f32 {
        self.level.target()
    }

    #[inline]
    fn wet_sample(delay: &mut InterpolatedDelay, lfo: &mut Lfo, sr: f32, input: f32) -> f32 {
        let delay_s = CENTER_DELAY_S + MOD_DEPTH_S * lfo.advance();
        let wet = delay.read(delay_s * sr);
        delay.write(input);
        wet
    }
}

impl Effect for Chorus {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        let level = self.level.advance();
        level * Self::wet_sample(&mut self.delay_l, &mut self.lfo_l, self.sample_rate, input)
    }

    #[inline]
    fn process_stereo(&mut self, left: f32, right: f32) -> (f32, f32) {
        let level = self.level.advance();
        let sr = self.sample_rate;
        let wet_l = Self::wet_sample(&mut self.delay_l, &mut self.lfo_l, sr, left);
        let wet_r = Self::wet_sample(&mut self.delay_r, &mut self.lfo_r, sr, right);
        (level * wet_l, level * wet_r)
    }

    fn is_true_stereo(&self) -> bool {
        true
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        let max_delay = CENTER_DELAY_S + 2.0 * MOD_DEPTH_S;
        self.delay_l = InterpolatedDelay::from_time(sample_rate, max_delay);
        self.delay_r = InterpolatedDelay::from_time(sample_rate, max_delay);
        self.lfo_l.set_sample_rate(sample_rate);
        self.lfo_r.set_sample_rate(sample_rate);
        self.level.set_sample_rate(sample_rate);
    }

    fn reset(&mut self) {
        self.delay_l.clear();
        self.delay_r.clear();
        self.lfo_l.reset();
        self.lfo_r.reset();
        self.lfo_r.set_phase(0.5);
        self.level.snap_to_target();
    }
}
