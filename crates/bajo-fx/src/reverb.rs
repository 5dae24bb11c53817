//! Convolution reverb send driven by a synthetic stereo impulse response.
//!
//! The impulse response is 1.5 s of exponentially-shaped noise, decorrelated
//! between channels. Convolution runs as uniformly partitioned overlap-save:
//! the IR is split into block-sized partitions, each input block is FFT'd
//! once and multiplied against every partition spectrum, so cost stays flat
//! regardless of IR length.

use bajo_core::{Effect, NoiseGen, SmoothedParam};
use libm::powf;
use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;

/// Impulse response length in seconds.
const IR_SECONDS: f32 = 1.5;
/// Envelope exponent shaping the decay tail.
const DECAY_SHAPE: f32 = 2.5;
/// Convolution partition size in samples. Latency equals one partition.
const BLOCK: usize = 512;
/// FFT length for overlap-save: two partitions.
const FFT_LEN: usize = 2 * BLOCK;

/// Generate the synthetic stereo impulse response.
///
/// Each channel is independent noise under the envelope `(1 - n/N)^2.5`,
/// so the channels decorrelate and the tail widens the stereo field.
pub fn stereo_impulse_response(sample_rate: f32) -> (Vec<f32>, Vec<f32>) {
    let len = (IR_SECONDS * sample_rate) as usize;
    let mut left_noise = NoiseGen::new(0x9e3779b9);
    let mut right_noise = NoiseGen::new(0x7f4a7c15);
    let mut left = Vec::with_capacity(len);
    let mut right = Vec::with_capacity(len);
    for n in 0..len {
        let envelope = powf(1.0 - n as f32 / len as f32, DECAY_SHAPE);
        left.push(left_noise.next() * envelope);
        right.push(right_noise.next() * envelope);
    }
    (left, right)
}

/// One channel of partitioned overlap-save convolution.
struct ChannelConvolver {
    fft: Arc<dyn Fft<f32>>,
    ifft: Arc<dyn Fft<f32>>,
    /// IR partition spectra, oldest partition first.
    ir_spectra: Vec<Vec<Complex<f32>>>,
    /// Ring of past input-block spectra; `newest` indexes the latest.
    input_spectra: Vec<Vec<Complex<f32>>>,
    newest: usize,
    /// Previous input block, prepended to each FFT frame (overlap-save).
    prev_block: Vec<f32>,
    /// Incoming samples until a full partition is available.
    input_fill: Vec<f32>,
    /// Ready output samples; prefilled with one block of silence.
    output: std::collections::VecDeque<f32>,
    scratch: Vec<Complex<f32>>,
}

impl ChannelConvolver {
    fn new(impulse: &[f32], planner: &mut FftPlanner<f32>) -> Self {
        let fft = planner.plan_fft_forward(FFT_LEN);
        let ifft = planner.plan_fft_inverse(FFT_LEN);

        let partitions = impulse.len().div_ceil(BLOCK).max(1);
        let mut ir_spectra = Vec::with_capacity(partitions);
        for p in 0..partitions {
            let start = p * BLOCK;
            let end = (start + BLOCK).min(impulse.len());
            let mut frame = vec![Complex::default(); FFT_LEN];
            for (slot, &s) in frame.iter_mut().zip(&impulse[start..end]) {
                *slot = Complex::new(s, 0.0);
            }
            fft.process(&mut frame);
            ir_spectra.push(frame);
        }

        let mut output = std::collections::VecDeque::with_capacity(2 * BLOCK);
        output.extend(std::iter::repeat_n(0.0, BLOCK));

        Self {
            fft,
            ifft,
            input_spectra: vec![vec![Complex::default(); FFT_LEN]; partitions],
            ir_spectra,
            newest: 0,
            prev_block: vec![0.0; BLOCK],
            input_fill: Vec::with_capacity(BLOCK),
            output,
            scratch: vec![Complex::default(); FFT_LEN],
        }
    }

    /// Push one dry sample, pop one wet sample (one-block latency).
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        self.input_fill.push(input);
        if self.input_fill.len() == BLOCK {
            self.run_block();
        }
        self.output.pop_front().unwrap_or(0.0)
    }

    fn run_block(&mut self) {
        let partitions = self.ir_spectra.len();
        self.newest = (self.newest + 1) % partitions;

        // Overlap-save frame: previous block followed by the new one.
        let frame = &mut self.input_spectra[self.newest];
        for (slot, &s) in frame.iter_mut().zip(self.prev_block.iter()) {
            *slot = Complex::new(s, 0.0);
        }
        for (slot, &s) in frame[BLOCK..].iter_mut().zip(self.input_fill.iter()) {
            *slot = Complex::new(s, 0.0);
        }
        self.fft.process(frame);

        // Multiply each past input spectrum by its matching IR partition.
        self.scratch.fill(Complex::default());
        for (p, ir) in self.ir_spectra.iter().enumerate() {
            let src = &self.input_spectra[(self.newest + partitions - p) % partitions];
            for ((acc, &x), &h) in self.scratch.iter_mut().zip(src).zip(ir) {
                *acc += x * h;
            }
        }
        self.ifft.process(&mut self.scratch);

        // The last half of the frame is the valid overlap-save output.
        let scale = 1.0 / FFT_LEN as f32;
        for c in &self.scratch[BLOCK..] {
            self.output.push_back(c.re * scale);
        }

        self.prev_block.copy_from_slice(&self.input_fill);
        self.input_fill.clear();
    }

    fn clear(&mut self) {
        for spectrum in &mut self.input_spectra {
            spectrum.fill(Complex::default());
        }
        self.prev_block.fill(0.0);
        self.input_fill.clear();
        self.output.clear();
        self.output.extend(std::iter::repeat_n(0.0, BLOCK));
    }
}

/// Stereo convolution reverb send producing the wet signal only.
pub struct ConvolutionReverb {
    left: ChannelConvolver,
    right: ChannelConvolver,
    level: SmoothedParam,
    sample_rate: f32,
}

impl ConvolutionReverb {
    /// Build the reverb, rendering and partitioning the IR up front.
    pub fn new(sample_rate: f32) -> Self {
        let (ir_l, ir_r) = stereo_impulse_response(sample_rate);
        let mut planner = FftPlanner::new();
        Self {
            left: ChannelConvolver::new(&ir_l, &mut planner),
            right: ChannelConvolver::new(&ir_r, &mut planner),
            level: SmoothedParam::standard(0.0, sample_rate),
            sample_rate,
        }
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

impl Effect for ConvolutionReverb {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        let level = self.level.advance();
        level * self.left.process(input)
    }

    #[inline]
    fn process_stereo(&mut self, left: f32, right: f32) -> (f32, f32) {
        let level = self.level.advance();
        (
            level * self.left.process(left),
            level * self.right.process(right),
        )
    }

    fn is_true_stereo(&self) -> bool {
        true
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        if (sample_rate - self.sample_rate).abs() > f32::EPSILON {
            *self = Self::new(sample_rate);
        }
    }

    fn reset(&mut self) {
        self.left.clear();
        self.right.clear();
        self.level.snap_to_target();
    }
}
