//! Three-band shelving equalizer with fixed corner frequencies.

use bajo_core::{
    Biquad, Effect, high_shelf_coefficients, low_shelf_coefficients, peaking_eq_coefficients,
};

/// Low-shelf corner frequency in Hz.
const LOW_FREQ: f32 = 200.0;
/// Mid peaking center frequency in Hz.
const MID_FREQ: f32 = 800.0;
/// High-shelf corner frequency in Hz.
const HIGH_FREQ: f32 = 3000.0;
/// Q of the mid peaking band.
const MID_Q: f32 = 1.0;

/// Fixed three-band EQ: low shelf at 200 Hz, peaking bell at 800 Hz,
/// high shelf at 3 kHz. Gains are in dB, clamped to +-15 dB.
#[derive(Debug, Clone)]
pub struct ShelfEq {
    bands: [(Biquad, Biquad); 3],
    gains_db: [f32; 3],
    sample_rate: f32,
}

impl ShelfEq {
    /// Create a flat EQ at the given sample rate.
    pub fn new(sample_rate: f32) -> Self {
        let mut eq = Self {
            bands: core::array::from_fn(|_| (Biquad::new(), Biquad::new())),
            gains_db: [0.0; 3],
            sample_rate,
        };
        eq.refresh_coefficients();
        eq
    }

    /// Set the low shelf gain in dB.
    pub fn set_low_db(&mut self, gain_db: f32) {
        self.gains_db[0] = gain_db.clamp(-15.0, 15.0);
        self.refresh_coefficients();
    }

    /// Set the mid bell gain in dB.
    pub fn set_mid_db(&mut self, gain_db: f32) {
        self.gains_db[1] = gain_db.clamp(-15.0, 15.0);
        self.refresh_coefficients();
    }

    /// Set the high shelf gain in dB.
    pub fn set_high_db(&mut self, gain_db: f32) {
        self.gains_db[2] = gain_db.clamp(-15.0, 15.0);
        self.refresh_coefficients();
    }

    fn refresh_coefficients(&mut self) {
        let sr = self.sample_rate;
        let coeffs = [
            low_shelf_coefficients(LOW_FREQ, self.gains_db[0], sr),
            peaking_eq_coefficients(MID_FREQ, self.gains_db[1], MID_Q, sr),
            high_shelf_coefficients(HIGH_FREQ, self.gains_db[2], sr),
        ];
        for (band, c) in self.bands.iter_mut().zip(coeffs) {
            band.0.set_coefficients(c);
            band.1.set_coefficients(c);
        }
    }
}

impl Effect for ShelfEq {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        self.bands
            .iter_mut()
            .fold(input, |x, band| band.0.process(x))
    }

    #[inline]
    fn process_stereo(&mut self, left: f32, right: f32) -> (f32, f32) {
        self.bands.iter_mut().fold((left, right), |(l, r), band| {
            (band.0.process(l), band.1.process(r))
        })
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.refresh_coefficients();
    }

    fn reset(&mut self) {
        for band in &mut self.bands {
            band.0.clear();
            band.1.clear();
        }
    }
}
