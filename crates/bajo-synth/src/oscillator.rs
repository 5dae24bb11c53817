//! Band-limited audio-rate oscillators.
//!
//! PolyBLEP correction keeps saw and square usable across the bass range
//! without audible aliasing; triangle integrates a corrected square.

use core::f32::consts::PI;
use libm::sinf;

/// Oscillator waveform.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OscillatorWaveform {
    /// Pure fundamental.
    Sine,
    /// Odd harmonics, soft. The default body timbre.
    #[default]
    Triangle,
    /// All harmonics, bright.
    Sawtooth,
    /// Odd harmonics, hollow.
    Square,
}

/// Phase-accumulator oscillator with PolyBLEP anti-aliasing.
///
/// # Example
///
/// ```rust
/// use bajo_synth::{Oscillator, OscillatorWaveform};
///
/// let mut osc = Oscillator::new(48000.0, OscillatorWaveform::Triangle);
/// osc.set_frequency(55.0);
/// let sample = osc.advance();
/// ```
#[derive(Debug, Clone)]
pub struct Oscillator {
    phase: f32,
    phase_inc: f32,
    frequency: f32,
    sample_rate: f32,
    waveform: OscillatorWaveform,
    /// Integrator state for the triangle.
    tri_state: f32,
}

impl Oscillator {
    /// Create an oscillator at 440 Hz with the given waveform.
    pub fn new(sample_rate: f32, waveform: OscillatorWaveform) -> Self {
        Self {
            phase: 0.0,
            phase_inc: 440.0 / sample_rate,
            frequency: 440.0,
            sample_rate,
            waveform,
            tri_state: 0.0,
        }
    }

    /// Set frequency in Hz.
    #[inline]
    pub fn set_frequency(&mut self, freq_hz: f32) {
        self.frequency = freq_hz.max(0.0);
        self.phase_inc = self.frequency / self.sample_rate;
    }

    /// Current frequency in Hz.
    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    /// Current waveform.
    pub fn waveform(&self) -> OscillatorWaveform {
        self.waveform
    }

    /// Generate the next sample in roughly [-1, 1].
    #[inline]
    pub fn advance(&mut self) -> f32 {
        let t = self.phase;
        let dt = self.phase_inc;

        let output = match self.waveform {
            OscillatorWaveform::Sine => sinf(t * 2.0 * PI),
            OscillatorWaveform::Sawtooth => 2.0 * t - 1.0 - poly_blep(t, dt),
            OscillatorWaveform::Square => blep_square(t, dt),
            OscillatorWaveform::Triangle => {
                // Leaky integration of a corrected square; the leak adapts
                // to frequency so DC cannot accumulate at the low end.
                let square = blep_square(t, dt);
                let leak = 1.0 - (self.frequency / self.sample_rate).min(0.1);
                self.tri_state = leak * self.tri_state + square * dt * 4.0;
                self.tri_state
            }
        };

        self.phase += dt;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }
        output
    }
}

#[inline]
fn blep_square(t: f32, dt: f32) -> f32 {
    let naive = if t < 0.5 { 1.0 } else { -1.0 };
    let falling = if t < 0.5 { t + 0.5 } else { t - 0.5 };
    naive + poly_blep(t, dt) - poly_blep(falling, dt)
}

/// Two-sample polynomial band-limited step correction.
///
/// Returns the residual to subtract near a downward phase-wrap
/// discontinuity; zero away from it.
#[inline]
fn poly_blep(t: f32, dt: f32) -> f32 {
    if t < dt {
        let n = t / dt;
        n + n - n * n - 1.0
    } else if t > 1.0 - dt {
        let n = (t - 1.0) / dt;
        n * n + n + n + 1.0
    } else {
        0.0
    }
}
