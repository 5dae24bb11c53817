//! Second-order IIR filter.
//!
//! One structure covers every filter the instrument needs: lowpass for
//! the tone and character filters, bandpass for the noise layer, and
//! shelving/peaking bands for the EQ. Coefficients follow the RBJ Audio
//! EQ Cookbook.

use core::f32::consts::PI;
use libm::{cosf, powf, sinf, sqrtf};

/// Direct Form I biquad.
///
/// ```text
/// y[n] = b0*x[n] + b1*x[n-1] + b2*x[n-2] - a1*y[n-1] - a2*y[n-2]
/// ```
#[derive(Debug, Clone, Default)]
pub struct Biquad {
    b0: f32,
    b1: f32,
    b2: f32,
    a1: f32,
    a2: f32,
    x1: f32,
    x2: f32,
    y1: f32,
    y2: f32,
}

impl Biquad {
    /// A passthrough filter (b0 = 1, everything else 0).
    pub fn new() -> Self {
        Self {
            b0: 1.0,
            ..Default::default()
        }
    }

    /// Install `(b0, b1, b2, a0, a1, a2)`, dividing through by `a0`.
    pub fn set_coefficients(&mut self, c: (f32, f32, f32, f32, f32, f32)) {
        let (b0, b1, b2, a0, a1, a2) = c;
        let norm = 1.0 / a0;
        self.b0 = b0 * norm;
        self.b1 = b1 * norm;
        self.b2 = b2 * norm;
        self.a1 = a1 * norm;
        self.a2 = a2 * norm;
    }

    /// Filter one sample.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let output = self.b0 * input + self.b1 * self.x1 + self.b2 * self.x2
            - self.a1 * self.y1
            - self.a2 * self.y2;
        self.x2 = self.x1;
        self.x1 = input;
        self.y2 = self.y1;
        self.y1 = output;
        output
    }

    /// Flush the delay state, keeping the coefficients.
    pub fn clear(&mut self) {
        self.x1 = 0.0;
        self.x2 = 0.0;
        self.y1 = 0.0;
        self.y2 = 0.0;
    }
}

/// Digital angular frequency and its trig values for a cutoff.
#[inline]
fn warp(frequency: f32, sample_rate: f32) -> (f32, f32) {
    let omega = 2.0 * PI * frequency / sample_rate;
    (cosf(omega), sinf(omega))
}

/// Lowpass. `q` of 0.707 gives the Butterworth response.
pub fn lowpass_coefficients(
    frequency: f32,
    q: f32,
    sample_rate: f32,
) -> (f32, f32, f32, f32, f32, f32) {
    let (cosw, sinw) = warp(frequency, sample_rate);
    let alpha = sinw / (2.0 * q);
    let b1 = 1.0 - cosw;
    (
        b1 / 2.0,
        b1,
        b1 / 2.0,
        1.0 + alpha,
        -2.0 * cosw,
        1.0 - alpha,
    )
}

/// Bandpass with 0 dB peak gain at the center.
pub fn bandpass_coefficients(
    frequency: f32,
    q: f32,
    sample_rate: f32,
) -> (f32, f32, f32, f32, f32, f32) {
    let (cosw, sinw) = warp(frequency, sample_rate);
    let alpha = sinw / (2.0 * q);
    (alpha, 0.0, -alpha, 1.0 + alpha, -2.0 * cosw, 1.0 - alpha)
}

/// Peaking bell: boost or cut `gain_db` around `frequency`.
pub fn peaking_eq_coefficients(
    frequency: f32,
    gain_db: f32,
    q: f32,
    sample_rate: f32,
) -> (f32, f32, f32, f32, f32, f32) {
    let a = powf(10.0, gain_db / 40.0);
    let (cosw, sinw) = warp(frequency, sample_rate);
    let alpha = sinw / (2.0 * q);
    (
        1.0 + alpha * a,
        -2.0 * cosw,
        1.0 - alpha * a,
        1.0 + alpha / a,
        -2.0 * cosw,
        1.0 - alpha / a,
    )
}

/// Low shelf with unity slope.
pub fn low_shelf_coefficients(
    frequency: f32,
    gain_db: f32,
    sample_rate: f32,
) -> (f32, f32, f32, f32, f32, f32) {
    let a = powf(10.0, gain_db / 40.0);
    let (cosw, sinw) = warp(frequency, sample_rate);
    let alpha = sinw / 2.0 * sqrtf(2.0);
    let beta = 2.0 * sqrtf(a) * alpha;
    (
        a * ((a + 1.0) - (a - 1.0) * cosw + beta),
        2.0 * a * ((a - 1.0) - (a + 1.0) * cosw),
        a * ((a + 1.0) - (a - 1.0) * cosw - beta),
        (a + 1.0) + (a - 1.0) * cosw + beta,
        -2.0 * ((a - 1.0) + (a + 1.0) * cosw),
        (a + 1.0) + (a - 1.0) * cosw - beta,
    )
}

/// High shelf with unity slope.
pub fn high_shelf_coefficients(
    frequency: f32,
    gain_db: f32,
    sample_rate: f32,
) -> (f32, f32, f32, f32, f32, f32) {
    let a = powf(10.0, gain_db / 40.0);
    let (cosw, sinw) = warp(frequency, sample_rate);
    let alpha = sinw / 2.0 * sqrtf(2.0);
    let beta = 2.0 * sqrtf(a) * alpha;
    (
        a * ((a + 1.0) + (a - 1.0) * cosw + beta),
        -2.0 * a * ((a - 1.0) + (a + 1.0) * cosw),
        a * ((a + 1.0) + (a - 1.0) * cosw - beta),
        (a + 1.0) - (a - 1.0) * cosw + beta,
        2.0 * ((a - 1.0) - (a + 1.0) * cosw),
        (a + 1.0) - (a - 1.0) * cosw - beta,
    )
}
