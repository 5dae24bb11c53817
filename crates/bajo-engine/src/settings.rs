//! The shared settings record.
//!
//! External collaborators (preset forms, UI controls) own and mutate
//! this record; the engine only reads it. Out-of-range values are
//! tolerated and clamped at the point of use, so no setter validation
//! lives here.

use bajo_synth::OscillatorWaveform;
use serde::{Deserialize, Serialize};

/// Character oscillator waveform choice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Waveform {
    /// Bright, full-spectrum timbre.
    #[default]
    Sawtooth,
    /// Hollow, reedy timbre.
    Square,
    /// Soft, flute-like timbre.
    Triangle,
}

impl From<Waveform> for OscillatorWaveform {
    fn from(waveform: Waveform) -> Self {
        match waveform {
            Waveform::Sawtooth => OscillatorWaveform::Sawtooth,
            Waveform::Square => OscillatorWaveform::Square,
            Waveform::Triangle => OscillatorWaveform::Triangle,
        }
    }
}

/// Cosmetic skin. Carried for the UI; the engine ignores it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Sunburst wood.
    #[default]
    Classic,
    /// Dark stage finish.
    Midnight,
    /// High-contrast neon.
    Neon,
    /// Worn vintage look.
    Vintage,
    /// Flat light look.
    Light,
}

/// Full instrument configuration, applied as a whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Master output volume in [0, 1].
    pub volume: f32,
    /// Drive amount in [0, 1]; 0 is a clean identity curve.
    pub distortion: f32,
    /// Low shelf gain at 200 Hz, dB.
    pub eq_low_db: f32,
    /// Mid bell gain at 800 Hz, dB.
    pub eq_mid_db: f32,
    /// High shelf gain at 3 kHz, dB.
    pub eq_high_db: f32,
    /// Bus compressor threshold, dB.
    pub compressor_threshold_db: f32,
    /// Bus compressor ratio.
    pub compressor_ratio: f32,
    /// Master tone control in [0, 1]; 1 is fully open.
    pub tone: f32,
    /// Tone filter resonance (Q).
    pub filter_resonance: f32,
    /// Per-voice filter envelope amount in [0, 1].
    pub filter_env_amount: f32,
    /// Note attack in seconds.
    pub attack: f32,
    /// Note release in seconds.
    pub release: f32,
    /// Sustain level in [0, 1]; below 1 notes decay like strings.
    pub sustain: f32,
    /// Glide (portamento) time in seconds.
    pub glide: f32,
    /// Velocity sensitivity in [0, 1].
    pub velocity_sensitivity: f32,
    /// Monophonic per-string arbitration instead of full polyphony.
    pub monophonic: bool,
    /// Character oscillator waveform.
    pub waveform: Waveform,
    /// Sub oscillator level in [0, 1].
    pub sub_level: f32,
    /// Noise layer level in [0, 1].
    pub noise_level: f32,
    /// Phaser sweep rate, Hz.
    pub phaser_rate: f32,
    /// Phaser depth in [0, 1].
    pub phaser_depth: f32,
    /// Tremolo rate, Hz.
    pub tremolo_rate: f32,
    /// Tremolo depth in [0, 1].
    pub tremolo_depth: f32,
    /// Chorus send level in [0, 1].
    pub chorus_level: f32,
    /// Reverb send level in [0, 1].
    pub reverb_level: f32,
    /// Vibrato rate, Hz.
    pub vibrato_rate: f32,
    /// Vibrato depth in semitones.
    pub vibrato_depth: f32,
    /// Echo delay time in seconds.
    pub delay_time: f32,
    /// Echo feedback in [0, 0.9].
    pub delay_feedback: f32,
    /// Echo send level in [0, 1].
    pub delay_level: f32,
    /// Stereo width in [0, 1].
    pub stereo_width: f32,
    /// Octave pedal: doubles every note one octave up.
    pub octave_pedal: bool,
    /// Whole-instrument transpose in octaves.
    pub octave_shift: i32,
    /// String count in [4, 8].
    pub string_count: usize,
    /// Fret range mapped across the neck.
    pub fret_count: usize,
    /// Cosmetic skin; ignored by the engine.
    pub theme: Theme,
    /// Haptic feedback strength in [0, 1]; ignored by the engine.
    pub haptic_intensity: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            volume: 0.8,
            distortion: 0.0,
            eq_low_db: 0.0,
            eq_mid_db: 0.0,
            eq_high_db: 0.0,
            compressor_threshold_db: -12.0,
            compressor_ratio: 4.0,
            tone: 0.7,
            filter_resonance: 1.0,
            filter_env_amount: 0.5,
            attack: 0.01,
            release: 0.3,
            sustain: 1.0,
            glide: 0.05,
            velocity_sensitivity: 0.5,
            monophonic: true,
            waveform: Waveform::Sawtooth,
            sub_level: 0.5,
            noise_level: 0.1,
            phaser_rate: 0.5,
            phaser_depth: 0.0,
            tremolo_rate: 4.0,
            tremolo_depth: 0.0,
            chorus_level: 0.0,
            reverb_level: 0.2,
            vibrato_rate: 5.0,
            vibrato_depth: 0.0,
            delay_time: 0.3,
            delay_feedback: 0.3,
            delay_level: 0.0,
            stereo_width: 0.5,
            octave_pedal: false,
            octave_shift: 0,
            string_count: 4,
            fret_count: 12,
            theme: Theme::Classic,
            haptic_intensity: 0.5,
        }
    }
}
