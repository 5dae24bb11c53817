//! The engine core: tracker, registry, and bus under one roof.

use crate::resolver::{Command, resolve};
use crate::settings::Settings;
use bajo_core::Lfo;
use bajo_fx::MasterBus;
use bajo_synth::{NoteRegistry, VoiceParams};
use bajo_touch::{NoteSeq, PointerId, TouchSample, TouchTracker, TrackerConfig};

/// The complete instrument engine.
///
/// Input events feed [`touch`](FretlessEngine::touch) and
/// [`release`](FretlessEngine::release) as they arrive; the host calls
/// [`tick`](FretlessEngine::tick) once per display frame and
/// [`render`](FretlessEngine::render) from the audio callback. All
/// mutation goes through one designated context (the output layer wraps
/// the engine in a mutex), matching the single-writer discipline the
/// audio graph needs.
pub struct FretlessEngine {
    settings: Settings,
    tracker: TouchTracker,
    seq: NoteSeq,
    registry: NoteRegistry,
    bus: MasterBus,
    vibrato: Lfo,
    input_enabled: bool,
}

impl FretlessEngine {
    /// Build an engine with default settings.
    pub fn new(sample_rate: f32) -> Self {
        let mut engine = Self {
            settings: Settings::default(),
            tracker: TouchTracker::new(),
            seq: NoteSeq::new(),
            registry: NoteRegistry::new(sample_rate),
            bus: MasterBus::new(sample_rate),
            vibrato: Lfo::new(sample_rate, 5.0),
            input_enabled: true,
        };
        engine.apply_settings(Settings::default());
        engine
    }

    /// Replace the settings record and push every derived parameter.
    ///
    /// The whole record is applied each time; collaborators send the full
    /// struct rather than deltas, so smoothed parameters simply re-target.
    pub fn apply_settings(&mut self, settings: Settings) {
        self.bus.set_master_gain(settings.volume);
        self.bus.set_drive(settings.distortion);
        self.bus.set_tone(settings.tone);
        self.bus.set_filter_resonance(settings.filter_resonance);
        self.bus
            .set_eq_db(settings.eq_low_db, settings.eq_mid_db, settings.eq_high_db);
        self.bus.set_phaser(settings.phaser_rate, settings.phaser_depth);
        self.bus
            .set_tremolo(settings.tremolo_rate, settings.tremolo_depth);
        self.bus.set_chorus_level(settings.chorus_level);
        self.bus.set_echo(
            settings.delay_time,
            settings.delay_feedback,
            settings.delay_level,
        );
        self.bus.set_reverb_level(settings.reverb_level);
        self.bus.set_compressor(
            settings.compressor_threshold_db,
            settings.compressor_ratio,
        );
        self.vibrato
            .set_frequency(settings.vibrato_rate.clamp(0.1, 20.0));
        self.settings = settings;
    }

    /// Current settings record.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Enable or disable input (menu overlay). While disabled, ticks do
    /// nothing and ringing notes are left alone.
    pub fn set_input_enabled(&mut self, enabled: bool) {
        self.input_enabled = enabled;
    }

    /// Feed one raw pointer sample. Ignored while input is disabled.
    pub fn touch(&mut self, id: PointerId, sample: TouchSample) {
        if !self.input_enabled {
            return;
        }
        self.tracker
            .update(id, sample, &self.tracker_config(), &mut self.seq);
    }

    /// A contact ended (lift, cancel, mouse leave-while-pressed).
    /// Always processed so no pointer can outlive its contact.
    pub fn release(&mut self, id: PointerId) {
        self.tracker.remove(id);
    }

    /// One reconciliation frame: settle auto-tune, resolve demand, apply.
    pub fn tick(&mut self, now_ms: f64) {
        if !self.input_enabled {
            return;
        }
        let config = self.tracker_config();
        self.tracker.settle(now_ms, &config);
        let commands = resolve(
            self.tracker.pointers(),
            &self.registry,
            self.settings.monophonic,
        );
        self.apply_commands(&commands);
    }

    fn apply_commands(&mut self, commands: &[Command]) {
        let params = self.voice_params();
        for command in commands {
            match *command {
                Command::Start {
                    key,
                    note_id,
                    frequency,
                    velocity,
                    string_index,
                } => {
                    tracing::debug!(?key, note_id, frequency, "start note");
                    self.registry
                        .start_note(key, note_id, frequency, velocity, string_index, &params);
                }
                Command::Glide { key, frequency } => {
                    self.registry.update_pitch(key, frequency);
                }
                Command::Stop { key } => {
                    tracing::debug!(?key, "stop note");
                    self.registry.stop_note(key);
                }
            }
        }
    }

    /// Render interleaved stereo frames. Called from the audio clock.
    pub fn render(&mut self, interleaved: &mut [f32]) {
        let depth = self.settings.vibrato_depth.clamp(0.0, 2.0);
        for frame in interleaved.chunks_exact_mut(2) {
            let vibrato = self.vibrato.advance() * depth;
            let (dry_l, dry_r) = self.registry.process_stereo(vibrato);
            let (l, r) = self.bus.process_stereo(dry_l, dry_r);
            frame[0] = l;
            frame[1] = r;
        }
    }

    /// Registry view, for the resolver and for tests.
    pub fn registry(&self) -> &NoteRegistry {
        &self.registry
    }

    /// Reconciled pointer states, for visual consumers.
    pub fn pointers(&self) -> &[bajo_touch::PointerState] {
        self.tracker.pointers()
    }

    fn tracker_config(&self) -> TrackerConfig {
        TrackerConfig {
            string_count: self.settings.string_count.clamp(4, 8),
            fret_count: self.settings.fret_count.clamp(1, 24),
            velocity_sensitivity: self.settings.velocity_sensitivity,
            octave_shift: self.settings.octave_shift.clamp(-2, 2),
        }
    }

    fn voice_params(&self) -> VoiceParams {
        VoiceParams {
            waveform: self.settings.waveform.into(),
            sub_level: self.settings.sub_level.clamp(0.0, 1.0),
            noise_level: self.settings.noise_level.clamp(0.0, 1.0),
            tone: self.settings.tone.clamp(0.0, 1.0),
            filter_env_amount: self.settings.filter_env_amount.clamp(0.0, 1.0),
            attack_s: self.settings.attack.clamp(0.0, 5.0),
            release_s: self.settings.release.clamp(0.0, 10.0),
            sustain: self.settings.sustain.clamp(0.0, 1.0),
            glide_s: self.settings.glide.clamp(0.0, 2.0),
            drive: self.settings.distortion.clamp(0.0, 1.0),
            octave_pedal: self.settings.octave_pedal,
            stereo_width: self.settings.stereo_width.clamp(0.0, 1.0),
            string_count: self.settings.string_count.clamp(4, 8),
        }
    }
}
