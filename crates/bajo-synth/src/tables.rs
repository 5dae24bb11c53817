//! Pre-rendered noise tables shared by every voice.

use bajo_core::NoiseGen;
use libm::expf;
use std::sync::Arc;

/// Pluck burst length in seconds.
const PLUCK_S: f32 = 0.1;
/// Pluck envelope time constant in seconds.
const PLUCK_TAU_S: f32 = 0.02;
/// Pluck lowpass corner in Hz.
const PLUCK_CUTOFF_HZ: f32 = 3000.0;
/// Sustained string-noise loop length in seconds.
const STRING_NOISE_S: f32 = 1.0;

/// Rendered-once noise material: a decaying pluck excitation and a
/// looping string-noise bed. Built at init and shared by `Arc` so voice
/// construction never allocates audio buffers.
#[derive(Debug)]
pub struct NoiseTables {
    /// One-shot pluck transient, lowpassed below 3 kHz.
    pub pluck: Vec<f32>,
    /// Plain white noise, read as a loop by sustained noise layers.
    pub string_noise: Vec<f32>,
}

impl NoiseTables {
    /// Render both tables for the given sample rate.
    pub fn render(sample_rate: f32) -> Arc<Self> {
        let pluck_len = (PLUCK_S * sample_rate) as usize;
        let mut rng = NoiseGen::new(0x5d2a_c01b);
        let env_coeff = expf(-1.0 / (PLUCK_TAU_S * sample_rate));
        // One-pole lowpass to round the burst off below 3 kHz.
        let lp_coeff =
            1.0 - expf(-2.0 * core::f32::consts::PI * PLUCK_CUTOFF_HZ / sample_rate);

        let mut pluck = Vec::with_capacity(pluck_len);
        let mut envelope = 1.0;
        let mut lp_state = 0.0;
        for _ in 0..pluck_len {
            lp_state += lp_coeff * (rng.next() * envelope - lp_state);
            pluck.push(lp_state);
            envelope *= env_coeff;
        }

        let noise_len = (STRING_NOISE_S * sample_rate) as usize;
        let string_noise = (0..noise_len).map(|_| rng.next()).collect();

        Arc::new(Self {
            pluck,
            string_noise,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pluck_decays_to_silence() {
        let tables = NoiseTables::render(48000.0);
        let head: f32 = tables.pluck[..480].iter().map(|x| x.abs()).sum();
        let tail: f32 = tables.pluck[tables.pluck.len() - 480..]
            .iter()
            .map(|x| x.abs())
            .sum();
        assert!(tail < head * 0.05, "head {head}, tail {tail}");
    }

    #[test]
    fn tables_have_expected_lengths() {
        let tables = NoiseTables::render(44100.0);
        assert_eq!(tables.pluck.len(), 4410);
        assert_eq!(tables.string_noise.len(), 44100);
    }
}
