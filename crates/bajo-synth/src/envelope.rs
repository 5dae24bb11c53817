//! Per-note amplitude envelope.
//!
//! Linear attack, sustain-dependent exponential decay, exponential
//! release, and a fast hard-kill fade for voice stealing. Exponential
//! segments use a one-pole whose time constant is a third of the nominal
//! duration, so the level reaches about 95% of the way in that duration.

use libm::expf;

/// Extra ringing time after the release ramp before a voice may be
/// reclaimed, in seconds.
const TAIL_MARGIN_S: f32 = 0.1;
/// Hard-kill fade time in seconds.
const KILL_FADE_S: f32 = 0.01;
/// Teardown delay after a kill, in seconds.
const KILL_TAIL_S: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Attack,
    Sustain,
    Release,
    Kill,
    Finished,
}

/// Amplitude envelope for one voice.
///
/// Attack rises linearly from 0 to the target over `max(5 ms, attack)`.
/// When sustain < 1 the held level then decays exponentially toward
/// silence over `0.1 + 9.9 * sustain^2` seconds, imitating a plucked
/// string. [`release`](NoteEnvelope::release) ramps exponentially from
/// the current level; [`kill`](NoteEnvelope::kill) fades out in 10 ms.
#[derive(Debug, Clone)]
pub struct NoteEnvelope {
    stage: Stage,
    level: f32,
    target: f32,
    attack_step: f32,
    decay_coeff: f32,
    release_coeff: f32,
    /// Samples remaining in the current terminal stage before finishing.
    countdown: u32,
    sample_rate: f32,
}

impl NoteEnvelope {
    /// Start an envelope rising toward `target`.
    pub fn new(sample_rate: f32, target: f32, attack_s: f32, sustain: f32) -> Self {
        let attack_s = attack_s.max(0.005);
        let sustain = sustain.clamp(0.0, 1.0);
        let decay_coeff = if sustain < 1.0 {
            let decay_s = 0.1 + 9.9 * sustain * sustain;
            one_pole_coeff(decay_s / 3.0, sample_rate)
        } else {
            0.0
        };
        Self {
            stage: Stage::Attack,
            level: 0.0,
            target: target.max(0.0),
            attack_step: target.max(0.0) / (attack_s * sample_rate),
            decay_coeff,
            release_coeff: 0.0,
            countdown: 0,
            sample_rate,
        }
    }

    /// Begin the release ramp; a second call is a no-op.
    pub fn release(&mut self, release_s: f32) {
        if matches!(self.stage, Stage::Release | Stage::Kill | Stage::Finished) {
            return;
        }
        let release_s = release_s.max(0.05);
        self.release_coeff = one_pole_coeff(release_s / 3.0, self.sample_rate);
        self.countdown = ((release_s + TAIL_MARGIN_S) * self.sample_rate) as u32;
        self.stage = Stage::Release;
    }

    /// Hard stop: 10 ms fade, then finished shortly after.
    pub fn kill(&mut self) {
        if matches!(self.stage, Stage::Kill | Stage::Finished) {
            return;
        }
        self.release_coeff = one_pole_coeff(KILL_FADE_S / 3.0, self.sample_rate);
        self.countdown = (KILL_TAIL_S * self.sample_rate) as u32;
        self.stage = Stage::Kill;
    }

    /// Whether the envelope has entered release or kill.
    pub fn is_releasing(&self) -> bool {
        matches!(self.stage, Stage::Release | Stage::Kill | Stage::Finished)
    }

    /// Whether the full tail has elapsed and the voice can be reclaimed.
    pub fn is_finished(&self) -> bool {
        self.stage == Stage::Finished
    }

    /// Advance one sample, returning the current gain.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        match self.stage {
            Stage::Attack => {
                self.level += self.attack_step;
                if self.level >= self.target {
                    self.level = self.target;
                    self.stage = Stage::Sustain;
                }
            }
            Stage::Sustain => {
                // decay_coeff of 0 is an infinite sustain.
                self.level -= self.decay_coeff * self.level;
            }
            Stage::Release | Stage::Kill => {
                self.level -= self.release_coeff * self.level;
                self.countdown = self.countdown.saturating_sub(1);
                if self.countdown == 0 {
                    self.level = 0.0;
                    self.stage = Stage::Finished;
                }
            }
            Stage::Finished => {}
        }
        self.level
    }
}

fn one_pole_coeff(tau_s: f32, sample_rate: f32) -> f32 {
    1.0 - expf(-1.0 / (tau_s * sample_rate))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attack_reaches_target_linearly() {
        let sr = 48000.0;
        let mut env = NoteEnvelope::new(sr, 0.8, 0.01, 1.0);
        let half = (0.005 * sr) as usize;
        let mut level = 0.0;
        for _ in 0..half {
            level = env.advance();
        }
        assert!((level - 0.4).abs() < 0.02, "midpoint {level}");
        for _ in 0..half + 10 {
            level = env.advance();
        }
        assert!((level - 0.8).abs() < 1e-3, "peak {level}");
    }

    #[test]
    fn full_sustain_holds() {
        let mut env = NoteEnvelope::new(48000.0, 0.5, 0.005, 1.0);
        let mut level = 0.0;
        for _ in 0..96000 {
            level = env.advance();
        }
        assert!((level - 0.5).abs() < 1e-3, "held level {level}");
    }

    #[test]
    fn low_sustain_decays() {
        let mut env = NoteEnvelope::new(48000.0, 0.5, 0.005, 0.2);
        let mut level = 0.0;
        // Decay duration is 0.1 + 9.9*0.04 = 0.496 s; run 2 s.
        for _ in 0..96000 {
            level = env.advance();
        }
        assert!(level < 0.01, "should decay toward silence, got {level}");
    }

    #[test]
    fn release_is_idempotent_and_finishes_after_tail() {
        let sr = 48000.0;
        let mut env = NoteEnvelope::new(sr, 0.8, 0.005, 1.0);
        for _ in 0..2400 {
            env.advance();
        }
        env.release(0.2);
        assert!(env.is_releasing());
        env.release(5.0); // no-op, must not stretch the tail
        let tail = ((0.2 + TAIL_MARGIN_S) * sr) as usize;
        for _ in 0..tail - 10 {
            env.advance();
        }
        assert!(!env.is_finished());
        for _ in 0..20 {
            env.advance();
        }
        assert!(env.is_finished());
        assert_eq!(env.advance(), 0.0);
    }

    #[test]
    fn kill_finishes_quickly() {
        let sr = 48000.0;
        let mut env = NoteEnvelope::new(sr, 0.8, 0.005, 1.0);
        for _ in 0..2400 {
            env.advance();
        }
        env.kill();
        let mut level = 1.0;
        for _ in 0..(0.02 * sr) as usize {
            level = env.advance();
        }
        assert!(level < 0.01, "kill fade should be fast, got {level}");
        for _ in 0..(KILL_TAIL_S * sr) as usize {
            env.advance();
        }
        assert!(env.is_finished());
    }
}
