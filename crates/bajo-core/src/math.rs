//! Mathematical utility functions for DSP.
//!
//! Allocation-free helpers shared across the instrument: level conversion,
//! pitch ratios, panning, wet/dry mixing, and denormal protection.

use core::f32::consts::FRAC_PI_4;
use libm::{expf, logf, powf, sincosf};

/// Convert decibels to linear gain.
///
/// # Example
/// ```rust
/// use bajo_core::db_to_linear;
///
/// assert!((db_to_linear(0.0) - 1.0).abs() < 0.001);
/// assert!((db_to_linear(-6.02) - 0.5).abs() < 0.01);
/// ```
#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    const FACTOR: f32 = core::f32::consts::LN_10 / 20.0;
    expf(db * FACTOR)
}

/// Convert linear gain to decibels.
#[inline]
pub fn linear_to_db(linear: f32) -> f32 {
    const FACTOR: f32 = 20.0 / core::f32::consts::LN_10;
    logf(linear.max(1e-10)) * FACTOR
}

/// Frequency ratio for a (possibly fractional) semitone offset.
///
/// `semitone_ratio(12.0) == 2.0`, `semitone_ratio(0.0) == 1.0`.
#[inline]
pub fn semitone_ratio(semitones: f32) -> f32 {
    powf(2.0, semitones / 12.0)
}

/// Constant-power pan: returns `(left_gain, right_gain)` for a pan
/// position in [-1.0, 1.0].
///
/// Maps pan to an angle in [0, pi/2] so that
/// `left^2 + right^2 == 1` at every position, keeping perceived loudness
/// constant across the stereo field.
#[inline]
pub fn constant_power_pan(pan: f32) -> (f32, f32) {
    let angle = (pan.clamp(-1.0, 1.0) + 1.0) * FRAC_PI_4;
    let (sin_a, cos_a) = sincosf(angle);
    (cos_a, sin_a)
}

/// Blend dry and wet signals: `dry * (1 - mix) + wet * mix`.
#[inline]
pub fn wet_dry_mix(dry: f32, wet: f32, mix: f32) -> f32 {
    dry * (1.0 - mix) + wet * mix
}

/// Flush denormal values to zero.
///
/// Denormals in feedback paths (delay, reverb tails) cause severe CPU
/// spikes on some architectures.
#[inline]
pub fn flush_denormal(x: f32) -> f32 {
    if x.abs() < 1e-20 { 0.0 } else { x }
}
