//! Echo send: a feedback delay producing the wet signal only.

use bajo_core::{Effect, InterpolatedDelay, SmoothedParam, flush_denormal};

/// Shortest supported delay time in seconds.
const MIN_TIME_S: f32 = 0.05;
/// Longest supported delay time in seconds.
const MAX_TIME_S: f32 = 1.0;
/// Feedback ceiling; anything above risks runaway.
const MAX_FEEDBACK: f32 = 0.9;

/// Mono-in, stereo-out feedback echo.
///
/// The delay time is smoothed so time changes pitch-glide instead of
/// clicking. Feedback is taken from the wet output, denormal-flushed.
#[derive(Debug, Clone)]
pub struct Echo {
    delay_l: InterpolatedDelay,
    delay_r: InterpolatedDelay,
    time: SmoothedParam,
    feedback: f32,
    level: SmoothedParam,
    sample_rate: f32,
}

impl Echo {
    /// Create an echo at the given sample rate, level 0.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            delay_l: InterpolatedDelay::from_time(sample_rate, MAX_TIME_S),
            delay_r: InterpolatedDelay::from_time(sample_rate, MAX_TIME_S),
            time: SmoothedParam::with_config(0.3, sample_rate, 100.0),
            feedback: 0.3,
            level: SmoothedParam::standard(0.0, sample_rate),
            sample_rate,
        }
    }

    /// Set delay time in seconds, clamped to [0.05, 1.0].
    pub fn set_time(&mut self, seconds: f32) {
        self.time.set_target(seconds.clamp(MIN_TIME_S, MAX_TIME_S));
    }

    /// Set feedback amount, clamped to [0, 0.9].
    pub fn set_feedback(&mut self, feedback: f32) {
        self.feedback = feedback.clamp(0.0, MAX_FEEDBACK);
    }

    /// Set the send level in [0, 1].
    pub fn set_level(&mut self, level: f32) {
        self.level.set_target(level.clamp(0.0, 1.0));
    }

    /// Current send target, for bypass checks.
    pub fn level(&self) -> f32 {
        self.level.target()
    }
}

impl Effect for Echo {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        self.process_stereo(input, input).0
    }

    #[inline]
    fn process_stereo(&mut self, left: f32, right: f32) -> (f32, f32) {
        let level = self.level.advance();
        let delay_samples = self.time.advance() * self.sample_rate;

        let wet_l = self.delay_l.read(delay_samples);
        let wet_r = self.delay_r.read(delay_samples);
        self.delay_l
            .write(flush_denormal(left + wet_l * self.feedback));
        self.delay_r
            .write(flush_denormal(right + wet_r * self.feedback));
        (level * wet_l, level * wet_r)
    }

    fn is_true_stereo(&self) -> bool {
        true
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.delay_l = InterpolatedDelay::from_time(sample_rate, MAX_TIME_S);
        self.delay_r = InterpolatedDelay::from_time(sample_rate, MAX_TIME_S);
        self.time.set_sample_rate(sample_rate);
        self.level.set_sample_rate(sample_rate);
    }

    fn reset(&mut self) {
        self.delay_l.clear();
        self.delay_r.clear();
        self.time.snap_to_target();
        self.level.snap_to_target();
    }
}
