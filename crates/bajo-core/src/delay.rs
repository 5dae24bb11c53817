//! Fractional delay line.
//!
//! Backs the chorus (short, LFO-modulated) and the echo send (long,
//! feedback). One circular buffer, linear interpolation on reads, no
//! reallocation after construction.

use alloc::vec;
use alloc::vec::Vec;

/// Circular delay buffer with linearly interpolated reads.
///
/// Fractional delay times let the chorus sweep its tap smoothly; the
/// write head always advances one sample per [`write`](Self::write).
///
/// ```rust
/// use bajo_core::InterpolatedDelay;
///
/// let mut delay = InterpolatedDelay::new((0.05 * 44100.0) as usize);
/// let out = delay.read(10.5);
/// delay.write(1.0);
/// ```
#[derive(Debug, Clone)]
pub struct InterpolatedDelay {
    buffer: Vec<f32>,
    write_pos: usize,
}

impl InterpolatedDelay {
    /// A delay line holding up to `max_delay_samples` samples.
    ///
    /// # Panics
    /// Panics if `max_delay_samples` is 0.
    pub fn new(max_delay_samples: usize) -> Self {
        assert!(max_delay_samples > 0, "delay buffer cannot be empty");
        Self {
            buffer: vec![0.0; max_delay_samples],
            write_pos: 0,
        }
    }

    /// Size the buffer from a maximum delay time in seconds.
    pub fn from_time(sample_rate: f32, max_seconds: f32) -> Self {
        Self::new((sample_rate * max_seconds) as usize + 1)
    }

    /// Read `delay_samples` behind the newest write, interpolating
    /// between the two neighbouring samples. Delays past the buffer end
    /// clamp to the oldest sample.
    #[inline]
    pub fn read(&self, delay_samples: f32) -> f32 {
        debug_assert!(delay_samples >= 0.0);
        let len = self.buffer.len();
        let clamped = delay_samples.min((len - 1) as f32);
        let whole = clamped as usize;
        let frac = clamped - whole as f32;

        // write_pos - 1 is the newest sample; walk back from there.
        let newer = (self.write_pos + len - whole - 1) % len;
        let older = (newer + len - 1) % len;
        let a = self.buffer[newer];
        let b = self.buffer[older];
        a + (b - a) * frac
    }

    /// Append one sample, advancing the write head.
    #[inline]
    pub fn write(&mut self, sample: f32) {
        self.buffer[self.write_pos] = sample;
        self.write_pos = (self.write_pos + 1) % self.buffer.len();
    }

    /// Zero the buffer and rewind the write head.
    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }

    /// Buffer length in samples.
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }
}
