//! A single playable note: layered sources under one envelope and panner.

use crate::envelope::NoteEnvelope;
use crate::oscillator::{Oscillator, OscillatorWaveform};
use crate::tables::NoiseTables;
use bajo_core::{
    Biquad, NoiseGen, SmoothedParam, bandpass_coefficients, constant_power_pan,
    lowpass_coefficients, semitone_ratio,
};
use libm::expf;
use std::sync::Arc;

/// Sub oscillator level below which the layer is omitted entirely.
const SUB_AUDIBLE: f32 = 0.01;
/// Noise level below which the layer is omitted entirely.
const NOISE_AUDIBLE: f32 = 0.01;
/// Noise gate decay length in seconds.
const NOISE_GATE_S: f32 = 0.15;
/// Character filter coefficient refresh interval in samples.
const FILTER_REFRESH: u32 = 32;

/// Role of one source inside a voice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceRole {
    /// Triangle at the fundamental; always present.
    Body,
    /// Sine one octave down; present when the sub level is audible.
    Sub,
    /// Configured waveform through the per-voice filter envelope.
    Character,
    /// Looping band-passed noise under a fast gate.
    Noise,
    /// One-shot pluck transient.
    Pluck,
    /// Triangle one octave up; present when the octave pedal is on.
    Octave,
}

/// Settings snapshot a voice needs at start time.
#[derive(Debug, Clone, Copy)]
pub struct VoiceParams {
    /// Character oscillator waveform.
    pub waveform: OscillatorWaveform,
    /// Sub oscillator level in [0, 1].
    pub sub_level: f32,
    /// Noise layer level in [0, 1].
    pub noise_level: f32,
    /// Tone control in [0, 1]; widens the character filter.
    pub tone: f32,
    /// Filter envelope amount in [0, 1].
    pub filter_env_amount: f32,
    /// Attack time in seconds.
    pub attack_s: f32,
    /// Release time in seconds.
    pub release_s: f32,
    /// Sustain level in [0, 1]; below 1 the note decays like a string.
    pub sustain: f32,
    /// Glide (portamento) time in seconds.
    pub glide_s: f32,
    /// Bus drive amount in [0, 1]; lowers the envelope target so hot
    /// notes keep headroom going into the waveshaper.
    pub drive: f32,
    /// Octave pedal: adds a doubling oscillator one octave up.
    pub octave_pedal: bool,
    /// Stereo width in [0, 1] scaling the per-string pan.
    pub stereo_width: f32,
    /// String count, for pan normalization.
    pub string_count: usize,
}

impl Default for VoiceParams {
    fn default() -> Self {
        Self {
            waveform: OscillatorWaveform::Sawtooth,
            sub_level: 0.5,
            noise_level: 0.1,
            tone: 0.5,
            filter_env_amount: 0.5,
            attack_s: 0.01,
            release_s: 0.3,
            sustain: 1.0,
            glide_s: 0.05,
            drive: 0.0,
            octave_pedal: false,
            stereo_width: 0.5,
            string_count: 4,
        }
    }
}

enum Source {
    Body {
        osc: Oscillator,
        gain: f32,
    },
    Sub {
        osc: Oscillator,
        gain: f32,
    },
    Character {
        osc: Oscillator,
        filter: Biquad,
        cutoff: f32,
        base_cutoff: f32,
        decay_coeff: f32,
        refresh_countdown: u32,
        gain: f32,
    },
    Noise {
        pos: usize,
        filter: Biquad,
        gate: f32,
        gate_coeff: f32,
        gain: f32,
    },
    Pluck {
        pos: usize,
        gain: f32,
    },
    Octave {
        osc: Oscillator,
        gain: f32,
    },
}

impl Source {
    fn role(&self) -> SourceRole {
        match self {
            Source::Body { .. } => SourceRole::Body,
            Source::Sub { .. } => SourceRole::Sub,
            Source::Character { .. } => SourceRole::Character,
            Source::Noise { .. } => SourceRole::Noise,
            Source::Pluck { .. } => SourceRole::Pluck,
            Source::Octave { .. } => SourceRole::Octave,
        }
    }

    /// Frequency multiplier relative to the voice's base pitch, if pitched.
    fn pitch_ratio(&self) -> Option<f32> {
        match self {
            Source::Body { .. } | Source::Character { .. } => Some(1.0),
            Source::Sub { .. } => Some(0.5),
            Source::Octave { .. } => Some(2.0),
            Source::Noise { .. } | Source::Pluck { .. } => None,
        }
    }
}

/// One sounding note.
///
/// Sources are built once at start from a [`VoiceParams`] snapshot; pitch
/// glides through an exponential smoother and an external vibrato value
/// (in semitones) modulates every pitched source each sample.
pub struct Voice {
    sources: Vec<Source>,
    envelope: NoteEnvelope,
    glide: SmoothedParam,
    tables: Arc<NoiseTables>,
    pan_gains: (f32, f32),
    release_s: f32,
    string_index: usize,
    sample_rate: f32,
}

impl Voice {
    /// Build and start a voice.
    ///
    /// `seed` decorrelates the randomized noise layer between voices; the
    /// caller passes the note id.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        sample_rate: f32,
        tables: Arc<NoiseTables>,
        params: &VoiceParams,
        frequency: f32,
        velocity: f32,
        string_index: usize,
        seed: u32,
    ) -> Self {
        let velocity = velocity.clamp(0.0, 1.0);
        let frequency = frequency.max(1.0);
        let mut sources = Vec::with_capacity(6);

        sources.push(Source::Body {
            osc: Oscillator::new(sample_rate, OscillatorWaveform::Triangle),
            gain: 0.5 + 0.5 * velocity,
        });

        if params.sub_level > SUB_AUDIBLE {
            sources.push(Source::Sub {
                osc: Oscillator::new(sample_rate, OscillatorWaveform::Sine),
                gain: params.sub_level * 0.6 * velocity,
            });
        }

        let base_cutoff = frequency * (1.5 + params.tone);
        let start_cutoff = base_cutoff + params.filter_env_amount * 2000.0 * velocity;
        let mut filter = Biquad::new();
        filter.set_coefficients(lowpass_coefficients(start_cutoff, 0.707, sample_rate));
        sources.push(Source::Character {
            osc: Oscillator::new(sample_rate, params.waveform),
            filter,
            cutoff: start_cutoff,
            base_cutoff,
            decay_coeff: one_pole_coeff((params.attack_s + 0.2) / 3.0, sample_rate),
            refresh_countdown: FILTER_REFRESH,
            gain: 0.5 + 0.5 * velocity,
        });

        if params.noise_level > NOISE_AUDIBLE {
            let mut rng = NoiseGen::new(seed);
            let center = 2000.0 + 1000.0 * rng.next_unipolar();
            let mut filter = Biquad::new();
            filter.set_coefficients(bandpass_coefficients(center, 1.0, sample_rate));
            // next_unipolar can round up to exactly 1.0 in f32; wrap here,
            // not at the first read.
            let noise_len = tables.string_noise.len();
            sources.push(Source::Noise {
                pos: (rng.next_unipolar() * noise_len as f32) as usize % noise_len,
                filter,
                gate: 1.0,
                gate_coeff: expf(-1.0 / (NOISE_GATE_S / 3.0 * sample_rate)),
                gain: params.noise_level * velocity,
            });
        }

        sources.push(Source::Pluck {
            pos: 0,
            gain: velocity * velocity,
        });

        if params.octave_pedal {
            sources.push(Source::Octave {
                osc: Oscillator::new(sample_rate, OscillatorWaveform::Triangle),
                gain: 0.4 * velocity,
            });
        }

        let headroom = 1.0 - 0.25 * params.drive.clamp(0.0, 1.0);
        let target = (0.2 + 0.5 * velocity) * headroom;
        let envelope = NoteEnvelope::new(sample_rate, target, params.attack_s, params.sustain);

        let glide = SmoothedParam::with_config(
            frequency,
            sample_rate,
            (params.glide_s * 1000.0).max(1.0),
        );

        let pan = pan_position(string_index, params.string_count) * params.stereo_width;
        Self {
            sources,
            envelope,
            glide,
            tables,
            pan_gains: constant_power_pan(pan.clamp(-1.0, 1.0)),
            release_s: params.release_s,
            string_index,
            sample_rate,
        }
    }

    /// Glide every pitched source toward a new base frequency.
    /// No-op while releasing.
    pub fn update_pitch(&mut self, frequency: f32) {
        if self.is_releasing() {
            return;
        }
        self.glide.set_target(frequency.max(1.0));
    }

    /// Begin the graceful release ramp. Idempotent.
    pub fn release(&mut self) {
        self.envelope.release(self.release_s);
    }

    /// Hard stop with a 10 ms fade, for voice stealing.
    pub fn kill(&mut self) {
        self.envelope.kill();
    }

    /// Whether the voice is past its stop transition.
    pub fn is_releasing(&self) -> bool {
        self.envelope.is_releasing()
    }

    /// Whether the full tail has elapsed and the voice can be dropped.
    pub fn is_finished(&self) -> bool {
        self.envelope.is_finished()
    }

    /// The frequency the glide is heading toward.
    pub fn target_frequency(&self) -> f32 {
        self.glide.target()
    }

    /// The instantaneous (smoothed) base frequency.
    pub fn current_frequency(&self) -> f32 {
        self.glide.get()
    }

    /// String lane this voice was started on.
    pub fn string_index(&self) -> usize {
        self.string_index
    }

    /// Roles of the sources this voice was built with, in layer order.
    pub fn source_roles(&self) -> impl Iterator<Item = SourceRole> + '_ {
        self.sources.iter().map(Source::role)
    }

    /// Render one stereo frame. `vibrato_semitones` is the shared vibrato
    /// LFO value, applied to every pitched source.
    #[inline]
    pub fn process(&mut self, vibrato_semitones: f32) -> (f32, f32) {
        if self.envelope.is_finished() {
            return (0.0, 0.0);
        }
        let base = self.glide.advance() * semitone_ratio(vibrato_semitones);
        let mut sum = 0.0;

        for source in &mut self.sources {
            if let Some(ratio) = source.pitch_ratio() {
                match source {
                    Source::Body { osc, .. }
                    | Source::Sub { osc, .. }
                    | Source::Character { osc, .. }
                    | Source::Octave { osc, .. } => osc.set_frequency(base * ratio),
                    _ => {}
                }
            }
            sum += match source {
                Source::Body { osc, gain } | Source::Sub { osc, gain } => osc.advance() * *gain,
                Source::Character {
                    osc,
                    filter,
                    cutoff,
                    base_cutoff,
                    decay_coeff,
                    refresh_countdown,
                    gain,
                } => {
                    *cutoff += *decay_coeff * (*base_cutoff - *cutoff);
                    *refresh_countdown -= 1;
                    if *refresh_countdown == 0 {
                        *refresh_countdown = FILTER_REFRESH;
                        filter.set_coefficients(lowpass_coefficients(
                            *cutoff,
                            0.707,
                            self.sample_rate,
                        ));
                    }
                    filter.process(osc.advance()) * *gain
                }
                Source::Noise {
                    pos,
                    filter,
                    gate,
                    gate_coeff,
                    gain,
                } => {
                    let raw = self.tables.string_noise[*pos];
                    *pos = (*pos + 1) % self.tables.string_noise.len();
                    *gate *= *gate_coeff;
                    filter.process(raw) * *gate * *gain
                }
                Source::Pluck { pos, gain } => {
                    if *pos < self.tables.pluck.len() {
                        let s = self.tables.pluck[*pos];
                        *pos += 1;
                        s * *gain
                    } else {
                        0.0
                    }
                }
                Source::Octave { osc, gain } => osc.advance() * *gain,
            };
        }

        let out = sum * self.envelope.advance();
        (out * self.pan_gains.0, out * self.pan_gains.1)
    }
}

/// Pan position in [-1, 1] from a string lane, highest string leftmost.
fn pan_position(string_index: usize, string_count: usize) -> f32 {
    if string_count < 2 {
        return 0.0;
    }
    let normalized = string_index as f32 / (string_count - 1) as f32;
    normalized * 2.0 - 1.0
}

fn one_pole_coeff(tau_s: f32, sample_rate: f32) -> f32 {
    1.0 - expf(-1.0 / (tau_s * sample_rate))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn voice(params: &VoiceParams) -> Voice {
        let tables = NoiseTables::render(48000.0);
        Voice::new(48000.0, tables, params, 110.0, 0.9, 1, 7)
    }

    #[test]
    fn layer_set_follows_params() {
        let full = voice(&VoiceParams {
            octave_pedal: true,
            ..VoiceParams::default()
        });
        let roles: Vec<_> = full.source_roles().collect();
        assert_eq!(
            roles,
            [
                SourceRole::Body,
                SourceRole::Sub,
                SourceRole::Character,
                SourceRole::Noise,
                SourceRole::Pluck,
                SourceRole::Octave,
            ]
        );

        let sparse = voice(&VoiceParams {
            sub_level: 0.0,
            noise_level: 0.0,
            ..VoiceParams::default()
        });
        let roles: Vec<_> = sparse.source_roles().collect();
        assert_eq!(
            roles,
            [SourceRole::Body, SourceRole::Character, SourceRole::Pluck]
        );
    }

    #[test]
    fn noise_start_position_wraps_at_table_end() {
        // This seed's second xorshift32 draw is u32::MAX, so the unipolar
        // value rounds to exactly 1.0 and the raw start position lands one
        // past the table. The voice must wrap it, not index with it.
        let tables = NoiseTables::render(48000.0);
        let mut v = Voice::new(
            48000.0,
            tables,
            &VoiceParams::default(),
            110.0,
            0.9,
            0,
            0xE063_F306,
        );
        for _ in 0..256 {
            let (l, r) = v.process(0.0);
            assert!(l.is_finite() && r.is_finite());
        }
    }

    #[test]
    fn drive_lowers_the_envelope_target() {
        let tables = NoiseTables::render(48000.0);
        let peak = |drive: f32| {
            let params = VoiceParams {
                drive,
                noise_level: 0.0,
                ..VoiceParams::default()
            };
            let mut v = Voice::new(48000.0, Arc::clone(&tables), &params, 110.0, 0.9, 1, 7);
            let mut peak = 0.0f32;
            for _ in 0..9600 {
                let (l, r) = v.process(0.0);
                peak = peak.max(l.abs()).max(r.abs());
            }
            peak
        };
        let clean = peak(0.0);
        let driven = peak(1.0);
        assert!(driven < clean, "driven {driven} should sit below clean {clean}");
        assert!(driven > 0.05, "driven voice must still be audible");
    }

    #[test]
    fn produces_audio_after_attack() {
        let mut v = voice(&VoiceParams::default());
        let mut peak = 0.0f32;
        for _ in 0..9600 {
            let (l, r) = v.process(0.0);
            assert!(l.is_finite() && r.is_finite());
            peak = peak.max(l.abs()).max(r.abs());
        }
        assert!(peak > 0.05, "voice should be audible, peak {peak}");
    }

    #[test]
    fn glide_moves_smoothly() {
        let mut v = voice(&VoiceParams::default());
        for _ in 0..100 {
            v.process(0.0);
        }
        v.update_pitch(220.0);
        let mut prev = v.current_frequency();
        for _ in 0..48000 {
            v.process(0.0);
            let f = v.current_frequency();
            assert!(f >= prev - 1e-3, "frequency must rise monotonically");
            assert!(f - prev < 1.0, "per-sample pitch step too large: {}", f - prev);
            prev = f;
        }
        assert!((v.current_frequency() - 220.0).abs() < 1.0);
    }

    #[test]
    fn update_pitch_is_ignored_while_releasing() {
        let mut v = voice(&VoiceParams::default());
        v.release();
        v.update_pitch(330.0);
        assert!((v.target_frequency() - 110.0).abs() < 1e-3);
    }

    #[test]
    fn release_rings_then_finishes() {
        let mut v = voice(&VoiceParams {
            release_s: 0.1,
            ..VoiceParams::default()
        });
        for _ in 0..4800 {
            v.process(0.0);
        }
        v.release();
        assert!(v.is_releasing());
        assert!(!v.is_finished());
        // 0.1 s release + 0.1 s margin.
        for _ in 0..(0.25 * 48000.0) as usize {
            v.process(0.0);
        }
        assert!(v.is_finished());
    }

    #[test]
    fn stereo_width_zero_centers_every_string() {
        let tables = NoiseTables::render(48000.0);
        let params = VoiceParams {
            stereo_width: 0.0,
            ..VoiceParams::default()
        };
        let mut v = Voice::new(48000.0, tables, &params, 98.0, 0.8, 3, 1);
        for _ in 0..4800 {
            let (l, r) = v.process(0.0);
            assert!((l - r).abs() < 1e-6);
        }
    }
}
