//! Drive stage: tabulated nonlinear waveshaper.
//!
//! The curve is the classic arctangent-flavoured shaper
//! `f(x) = (3 + k) * x * C / (pi + k * |x|)` with `k = drive * 100` and
//! `C = 20 * pi / 180`, sampled at 44100 points over [-1, 1] and read back
//! with linear interpolation. At drive 0 the table is the identity ramp,
//! so the stage is bit-transparent when disengaged.

use bajo_core::Effect;
use core::f32::consts::PI;

/// Number of curve samples over [-1, 1].
const CURVE_POINTS: usize = 44100;

/// Curve amplitude constant (20 degrees in radians).
const CURVE_SCALE: f32 = 20.0 * PI / 180.0;

/// Evaluate the drive transfer function directly.
///
/// Exposed for tests; the audio path reads the interpolated table.
pub fn drive_curve(x: f32, drive: f32) -> f32 {
    if drive <= 0.0 {
        return x;
    }
    let k = drive * 100.0;
    (3.0 + k) * x * CURVE_SCALE / (PI + k * x.abs())
}

/// Waveshaping drive stage.
///
/// # Example
///
/// ```rust
/// use bajo_fx::Drive;
/// use bajo_core::Effect;
///
/// let mut drive = Drive::new();
/// drive.set_amount(0.4);
/// let out = drive.process(0.5);
/// assert!(out.abs() <= 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct Drive {
    curve: Vec<f32>,
    amount: f32,
}

impl Drive {
    /// Create a drive stage with the identity curve (amount 0).
    pub fn new() -> Self {
        let mut drive = Self {
            curve: vec![0.0; CURVE_POINTS],
            amount: -1.0,
        };
        drive.set_amount(0.0);
        drive
    }

    /// Set drive amount in [0, 1] and rebuild the curve table if it changed.
    pub fn set_amount(&mut self, amount: f32) {
        let amount = amount.clamp(0.0, 1.0);
        if (amount - self.amount).abs() < 1e-6 {
            return;
        }
        self.amount = amount;
        for (i, slot) in self.curve.iter_mut().enumerate() {
            let x = i as f32 * 2.0 / (CURVE_POINTS - 1) as f32 - 1.0;
            *slot = drive_curve(x, amount);
        }
    }

    /// Current drive amount.
    pub fn amount(&self) -> f32 {
        self.amount
    }

    #[inline]
    fn shape(&self, input: f32) -> f32 {
        let x = input.clamp(-1.0, 1.0);
        let pos = (x + 1.0) * 0.5 * (CURVE_POINTS - 1) as f32;
        let idx = pos as usize;
        let frac = pos - idx as f32;
        if idx + 1 >= CURVE_POINTS {
            return self.curve[CURVE_POINTS - 1];
        }
        let a = self.curve[idx];
        let b = self.curve[idx + 1];
        a + (b - a) * frac
    }
}

impl Default for Drive {
    fn default() -> Self {
        Self::new()
    }
}

impl Effect for Drive {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        self.shape(input)
    }

    #[inline]
    fn process_stereo(&mut self, left: f32, right: f32) -> (f32, f32) {
        // Memoryless nonlinearity, safe to apply per channel
        (self.shape(left), self.shape(right))
    }

    fn set_sample_rate(&mut self, _sample_rate: f32) {}

    fn reset(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn identity_at_zero_drive() {
        let mut drive = Drive::new();
        drive.set_amount(0.0);
        for i in -10..=10 {
            let x = i as f32 / 10.0;
            let y = drive.process(x);
            assert!((y - x).abs() < 1e-4, "f({x}) = {y} should be identity");
        }
    }

    #[test]
    fn rebuild_only_on_change() {
        let mut drive = Drive::new();
        drive.set_amount(0.5);
        let before = drive.curve[100];
        drive.set_amount(0.5);
        assert_eq!(drive.curve[100], before);
    }

    proptest! {
        #[test]
        fn curve_is_antisymmetric(x in -1.0f32..1.0, amount in 0.01f32..1.0) {
            let pos = drive_curve(x, amount);
            let neg = drive_curve(-x, amount);
            prop_assert!((pos + neg).abs() < 1e-5);
        }

        #[test]
        fn curve_is_monotonic(a in -1.0f32..1.0, b in -1.0f32..1.0, amount in 0.0f32..1.0) {
            if a < b {
                prop_assert!(drive_curve(a, amount) <= drive_curve(b, amount));
            }
        }
    }
}
