//! Modulation oscillator.
//!
//! One shared implementation drives the phaser sweep, tremolo, chorus
//! delay modulation, and the global vibrato. A plain phase accumulator
//! is plenty at modulation rates.

use core::f32::consts::TAU;
use libm::sinf;

/// Modulation shape.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LfoWaveform {
    /// Smooth sinusoid; the default for every musical modulation here.
    #[default]
    Sine,
    /// Symmetric up/down ramp.
    Triangle,
}

/// Low-frequency oscillator producing bipolar values.
///
/// ```rust
/// use bajo_core::{Lfo, LfoWaveform};
///
/// let mut lfo = Lfo::new(48000.0, 1.5);
/// lfo.set_waveform(LfoWaveform::Sine);
/// let value = lfo.advance();
/// ```
#[derive(Debug, Clone)]
pub struct Lfo {
    /// Normalized phase in [0, 1).
    phase: f32,
    step: f32,
    sample_rate: f32,
    waveform: LfoWaveform,
}

impl Lfo {
    /// A sine LFO at `freq_hz`.
    pub fn new(sample_rate: f32, freq_hz: f32) -> Self {
        Self {
            phase: 0.0,
            step: freq_hz / sample_rate,
            sample_rate,
            waveform: LfoWaveform::Sine,
        }
    }

    /// Retune without disturbing the phase.
    pub fn set_frequency(&mut self, freq_hz: f32) {
        self.step = freq_hz / self.sample_rate;
    }

    /// Current frequency in Hz.
    pub fn frequency(&self) -> f32 {
        self.step * self.sample_rate
    }

    /// Switch the modulation shape.
    pub fn set_waveform(&mut self, waveform: LfoWaveform) {
        self.waveform = waveform;
    }

    /// Rewind to phase zero.
    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    /// Jump to a normalized phase; stereo effects use this to run a
    /// half-cycle-offset pair.
    pub fn set_phase(&mut self, phase: f32) {
        self.phase = phase.clamp(0.0, 1.0);
    }

    /// Step one sample, returning a value in [-1, 1].
    #[inline]
    pub fn advance(&mut self) -> f32 {
        let out = match self.waveform {
            LfoWaveform::Sine => sinf(self.phase * TAU),
            LfoWaveform::Triangle => {
                if self.phase < 0.5 {
                    4.0 * self.phase - 1.0
                } else {
                    3.0 - 4.0 * self.phase
                }
            }
        };
        self.phase += self.step;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }
        out
    }

    /// Step one sample, rescaled into [0, 1].
    #[inline]
    pub fn advance_unipolar(&mut self) -> f32 {
        (self.advance() + 1.0) * 0.5
    }

    /// Move to a new sample rate, keeping the frequency.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        let freq = self.frequency();
        self.sample_rate = sample_rate;
        self.set_frequency(freq);
    }
}

impl Default for Lfo {
    fn default() -> Self {
        Self::new(48000.0, 1.0)
    }
}
