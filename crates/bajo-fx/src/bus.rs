//! Master effects bus: the full post-synth signal chain.

use crate::{Chorus, Compressor, ConvolutionReverb, Drive, Echo, Phaser, ShelfEq, ToneFilter, Tremolo};
use bajo_core::{Effect, SmoothedParam};

/// The complete master chain, in order:
///
/// drive, tone filter, 3-band EQ, phaser, tremolo, then the three
/// wet-only sends (chorus, echo, reverb) summed back onto the dry path,
/// then the bus compressor and master gain.
pub struct MasterBus {
    drive: Drive,
    tone: ToneFilter,
    eq: ShelfEq,
    phaser: Phaser,
    tremolo: Tremolo,
    chorus: Chorus,
    echo: Echo,
    reverb: ConvolutionReverb,
    compressor: Compressor,
    master_gain: SmoothedParam,
}

impl MasterBus {
    /// Build the bus at the given sample rate with neutral settings.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            drive: Drive::new(),
            tone: ToneFilter::new(sample_rate),
            eq: ShelfEq::new(sample_rate),
            phaser: Phaser::new(sample_rate),
            tremolo: Tremolo::new(sample_rate),
            chorus: Chorus::new(sample_rate),
            echo: Echo::new(sample_rate),
            reverb: ConvolutionReverb::new(sample_rate),
            compressor: Compressor::new(sample_rate),
            master_gain: SmoothedParam::standard(0.8, sample_rate),
        }
    }

    /// Drive amount in [0, 1].
    pub fn set_drive(&mut self, amount: f32) {
        self.drive.set_amount(amount);
    }

    /// Tone control in [0, 1]; 1 is fully open.
    pub fn set_tone(&mut self, tone: f32) {
        self.tone.set_tone(tone);
    }

    /// Tone filter resonance.
    pub fn set_filter_resonance(&mut self, q: f32) {
        self.tone.set_resonance(q);
    }

    /// EQ band gains in dB.
    pub fn set_eq_db(&mut self, low: f32, mid: f32, high: f32) {
        self.eq.set_low_db(low);
        self.eq.set_mid_db(mid);
        self.eq.set_high_db(high);
    }

    /// Phaser sweep rate in Hz and depth in [0, 1].
    pub fn set_phaser(&mut self, rate_hz: f32, depth: f32) {
        self.phaser.set_rate(rate_hz);
        self.phaser.set_depth(depth);
    }

    /// Tremolo rate in Hz and depth in [0, 1].
    pub fn set_tremolo(&mut self, rate_hz: f32, depth: f32) {
        self.tremolo.set_rate(rate_hz);
        self.tremolo.set_depth(depth);
    }

    /// Chorus send level in [0, 1].
    pub fn set_chorus_level(&mut self, level: f32) {
        self.chorus.set_level(level);
    }

    /// Echo time in seconds, feedback in [0, 0.9], send level in [0, 1].
    pub fn set_echo(&mut self, time_s: f32, feedback: f32, level: f32) {
        self.echo.set_time(time_s);
        self.echo.set_feedback(feedback);
        self.echo.set_level(level);
    }

    /// Reverb send level in [0, 1].
    pub fn set_reverb_level(&mut self, level: f32) {
        self.reverb.set_level(level);
    }

    /// Bus compressor threshold in dB and ratio.
    pub fn set_compressor(&mut self, threshold_db: f32, ratio: f32) {
        self.compressor.set_threshold_db(threshold_db);
        self.compressor.set_ratio(ratio);
    }

    /// Master output gain in [0, 1].
    pub fn set_master_gain(&mut self, gain: f32) {
        self.master_gain.set_target(gain.clamp(0.0, 1.0));
    }

    /// Process one stereo frame through the whole chain.
    #[inline]
    pub fn process_stereo(&mut self, left: f32, right: f32) -> (f32, f32) {
        let (l, r) = self.drive.process_stereo(left, right);
        let (l, r) = self.tone.process_stereo(l, r);
        let (l, r) = self.eq.process_stereo(l, r);
        let (l, r) = self.phaser.process_stereo(l, r);
        let (l, r) = self.tremolo.process_stereo(l, r);

        let (cl, cr) = self.chorus.process_stereo(l, r);
        let (el, er) = self.echo.process_stereo(l, r);
        let (rl, rr) = self.reverb.process_stereo(l, r);
        let (l, r) = (l + cl + el + rl, r + cr + er + rr);

        let (l, r) = self.compressor.process_stereo(l, r);
        let gain = self.master_gain.advance();
        (l * gain, r * gain)
    }

    /// Update the sample rate for every stage.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.drive.set_sample_rate(sample_rate);
        self.tone.set_sample_rate(sample_rate);
        self.eq.set_sample_rate(sample_rate);
        self.phaser.set_sample_rate(sample_rate);
        self.tremolo.set_sample_rate(sample_rate);
        self.chorus.set_sample_rate(sample_rate);
        self.echo.set_sample_rate(sample_rate);
        self.reverb.set_sample_rate(sample_rate);
        self.compressor.set_sample_rate(sample_rate);
        self.master_gain.set_sample_rate(sample_rate);
    }

    /// Clear all time-based state (delays, filters, envelopes).
    pub fn reset(&mut self) {
        self.drive.reset();
        self.tone.reset();
        self.eq.reset();
        self.phaser.reset();
        self.tremolo.reset();
        self.chorus.reset();
        self.echo.reset();
        self.reverb.reset();
        self.compressor.reset();
        self.master_gain.snap_to_target();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neutral_bus_passes_audio() {
        let mut bus = MasterBus::new(48000.0);
        bus.set_master_gain(1.0);
        bus.set_tone(1.0);
        let mut peak = 0.0f32;
        for n in 0..48000 {
            let x = libm::sinf(n as f32 * 0.06) * 0.3;
            let (l, r) = bus.process_stereo(x, x);
            assert!(l.is_finite() && r.is_finite());
            if n > 24000 {
                peak = peak.max(l.abs());
            }
        }
        assert!(peak > 0.1, "signal should survive the chain, got {peak}");
    }

    #[test]
    fn master_gain_scales_output() {
        let mut loud = MasterBus::new(48000.0);
        loud.set_master_gain(1.0);
        let mut quiet = MasterBus::new(48000.0);
        quiet.set_master_gain(0.0);

        let mut loud_peak = 0.0f32;
        let mut quiet_peak = 0.0f32;
        for n in 0..24000 {
            let x = libm::sinf(n as f32 * 0.06) * 0.3;
            let (l, _) = loud.process_stereo(x, x);
            let (q, _) = quiet.process_stereo(x, x);
            if n > 12000 {
                loud_peak = loud_peak.max(l.abs());
                quiet_peak = quiet_peak.max(q.abs());
            }
        }
        assert!(quiet_peak < 1e-4, "muted bus leaked {quiet_peak}");
        assert!(loud_peak > 0.05);
    }

    #[test]
    fn sends_add_energy_after_the_dry_hit() {
        let sr = 48000.0;
        let mut bus = MasterBus::new(sr);
        bus.set_master_gain(1.0);
        bus.set_tone(1.0);
        bus.set_echo(0.1, 0.3, 0.8);

        // Impulse, then listen for the echo repeat at 100 ms.
        let mut tail_energy = 0.0f32;
        for n in 0..(sr as usize / 2) {
            let x = if n == 0 { 0.8 } else { 0.0 };
            let (l, _) = bus.process_stereo(x, x);
            if n > 3000 {
                tail_energy += l * l;
            }
        }
        assert!(tail_energy > 1e-4, "echo tail missing, energy {tail_energy}");
    }
}
