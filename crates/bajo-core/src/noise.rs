//! Deterministic white noise generation.
//!
//! A small xorshift PRNG used for the noise layer, the pre-rendered pluck
//! and string-noise tables, and the synthetic reverb impulse. Deterministic
//! seeding keeps table generation reproducible in tests.

/// Xorshift32 white noise generator producing samples in [-1.0, 1.0].
#[derive(Debug, Clone)]
pub struct NoiseGen {
    state: u32,
}

impl NoiseGen {
    /// Create a generator from a non-zero seed.
    pub fn new(seed: u32) -> Self {
        Self {
            state: if seed == 0 { 0x12345678 } else { seed },
        }
    }

    /// Next raw 32-bit state.
    #[inline]
    fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    /// Next white-noise sample in [-1.0, 1.0].
    #[inline]
    pub fn next(&mut self) -> f32 {
        (self.next_u32() as f32 / u32::MAX as f32) * 2.0 - 1.0
    }

    /// Next value in [0.0, 1.0).
    #[inline]
    pub fn next_unipolar(&mut self) -> f32 {
        self.next_u32() as f32 / u32::MAX as f32
    }
}

impl Default for NoiseGen {
    fn default() -> Self {
        Self::new(0x12345678)
    }
}
