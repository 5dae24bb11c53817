//! Note registry: the keyed voice pool.
//!
//! Exactly one slot per logical key. Starting over an occupied key kills
//! the incumbent and moves its corpse to a fading pool, so teardown of a
//! replaced voice can never touch its successor. Finished voices are
//! reclaimed during audio processing, never from the control side.

use crate::tables::NoiseTables;
use crate::voice::{Voice, VoiceParams};
use std::collections::HashMap;
use std::sync::Arc;

/// Identity of a demanded sound.
///
/// Monophonic mode keys voices per string lane; polyphonic mode keys them
/// per pointer. The pointer id is the raw stable id from the input stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LogicalKey {
    /// One voice per string lane (monophonic arbitration).
    String(usize),
    /// One voice per pointer (polyphonic).
    Pointer(u64),
}

struct Slot {
    voice: Voice,
    note_id: u64,
}

/// Keyed store of active and releasing voices.
pub struct NoteRegistry {
    slots: HashMap<LogicalKey, Slot>,
    /// Killed incumbents still fading out.
    fading: Vec<Voice>,
    tables: Arc<NoiseTables>,
    sample_rate: f32,
}

impl NoteRegistry {
    /// Create an empty registry, rendering the shared noise tables.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            slots: HashMap::new(),
            fading: Vec::new(),
            tables: NoiseTables::render(sample_rate),
            sample_rate,
        }
    }

    /// Start a voice at `key`, stealing any incumbent.
    ///
    /// The incumbent (releasing or not) is hard-killed and parked in the
    /// fading pool so its tail still renders while the new voice takes
    /// the slot.
    #[allow(clippy::too_many_arguments)]
    pub fn start_note(
        &mut self,
        key: LogicalKey,
        note_id: u64,
        frequency: f32,
        velocity: f32,
        string_index: usize,
        params: &VoiceParams,
    ) {
        let voice = Voice::new(
            self.sample_rate,
            Arc::clone(&self.tables),
            params,
            frequency,
            velocity,
            string_index,
            note_id as u32 ^ (note_id >> 32) as u32,
        );
        if let Some(mut old) = self.slots.insert(key, Slot { voice, note_id }) {
            old.voice.kill();
            self.fading.push(old.voice);
        }
    }

    /// Glide the voice at `key` to a new frequency.
    /// No-op on unknown keys and on releasing voices.
    pub fn update_pitch(&mut self, key: LogicalKey, frequency: f32) {
        if let Some(slot) = self.slots.get_mut(&key) {
            slot.voice.update_pitch(frequency);
        }
    }

    /// Begin graceful release at `key`. No-op on unknown keys; idempotent.
    pub fn stop_note(&mut self, key: LogicalKey) {
        if let Some(slot) = self.slots.get_mut(&key) {
            slot.voice.release();
        }
    }

    /// Hard-kill the voice at `key`. No-op on unknown keys.
    pub fn kill_note(&mut self, key: LogicalKey) {
        if let Some(slot) = self.slots.get_mut(&key) {
            slot.voice.kill();
        }
    }

    /// Whether `key` holds a voice that has not entered release.
    pub fn is_playing(&self, key: LogicalKey) -> bool {
        self.slots
            .get(&key)
            .is_some_and(|slot| !slot.voice.is_releasing())
    }

    /// The note id bound to `key`, if a slot exists (even releasing).
    pub fn note_id(&self, key: LogicalKey) -> Option<u64> {
        self.slots.get(&key).map(|slot| slot.note_id)
    }

    /// The target frequency of the voice at `key`.
    pub fn target_frequency(&self, key: LogicalKey) -> Option<f32> {
        self.slots.get(&key).map(|slot| slot.voice.target_frequency())
    }

    /// Keys currently holding non-releasing voices, for the demand diff.
    pub fn playing_keys(&self) -> Vec<LogicalKey> {
        self.slots
            .iter()
            .filter(|(_, slot)| !slot.voice.is_releasing())
            .map(|(key, _)| *key)
            .collect()
    }

    /// Number of slots, releasing included. Test hook.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Number of killed voices still fading. Test hook.
    pub fn fading_count(&self) -> usize {
        self.fading.len()
    }

    /// Render one stereo frame: sum every voice (fading pool included)
    /// and reclaim the finished ones.
    #[inline]
    pub fn process_stereo(&mut self, vibrato_semitones: f32) -> (f32, f32) {
        let mut left = 0.0;
        let mut right = 0.0;
        for slot in self.slots.values_mut() {
            let (l, r) = slot.voice.process(vibrato_semitones);
            left += l;
            right += r;
        }
        for voice in &mut self.fading {
            let (l, r) = voice.process(vibrato_semitones);
            left += l;
            right += r;
        }
        self.slots.retain(|_, slot| !slot.voice.is_finished());
        self.fading.retain(|voice| !voice.is_finished());
        (left, right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn registry() -> NoteRegistry {
        NoteRegistry::new(48000.0)
    }

    fn run(reg: &mut NoteRegistry, samples: usize) {
        for _ in 0..samples {
            reg.process_stereo(0.0);
        }
    }

    #[test]
    fn start_then_play() {
        let mut reg = registry();
        let params = VoiceParams::default();
        reg.start_note(LogicalKey::String(0), 1, 110.0, 0.9, 0, &params);
        assert!(reg.is_playing(LogicalKey::String(0)));
        assert_eq!(reg.note_id(LogicalKey::String(0)), Some(1));
    }

    #[test]
    fn restart_keeps_exactly_one_slot() {
        let mut reg = registry();
        let params = VoiceParams::default();
        let key = LogicalKey::Pointer(42);
        reg.start_note(key, 1, 110.0, 0.9, 0, &params);
        reg.start_note(key, 2, 165.0, 0.7, 0, &params);
        assert_eq!(reg.slot_count(), 1);
        assert_eq!(reg.fading_count(), 1);
        assert_eq!(reg.note_id(key), Some(2));
        // The stolen corpse fades out and is reclaimed from the audio side.
        run(&mut reg, 48000 / 2);
        assert_eq!(reg.fading_count(), 0);
        assert!(reg.is_playing(key));
    }

    #[test]
    fn stop_is_synchronous_and_idempotent() {
        let mut reg = registry();
        let params = VoiceParams::default();
        let key = LogicalKey::String(2);
        reg.start_note(key, 7, 73.42, 0.8, 2, &params);
        run(&mut reg, 1000);
        reg.stop_note(key);
        assert!(!reg.is_playing(key), "not playing immediately after stop");
        assert_eq!(reg.slot_count(), 1, "still rings during the tail");
        reg.stop_note(key);
        assert_eq!(reg.slot_count(), 1);
    }

    #[test]
    fn released_voice_is_pruned_after_tail() {
        let mut reg = registry();
        let params = VoiceParams {
            release_s: 0.1,
            ..VoiceParams::default()
        };
        let key = LogicalKey::String(1);
        reg.start_note(key, 3, 98.0, 0.8, 1, &params);
        run(&mut reg, 4800);
        reg.stop_note(key);
        run(&mut reg, (0.25 * 48000.0) as usize);
        assert_eq!(reg.slot_count(), 0);
    }

    #[test]
    fn reuse_before_teardown_leaves_new_voice_untouched() {
        let mut reg = registry();
        let params = VoiceParams {
            release_s: 0.1,
            ..VoiceParams::default()
        };
        let key = LogicalKey::String(0);
        reg.start_note(key, 1, 110.0, 0.9, 0, &params);
        run(&mut reg, 1000);
        reg.stop_note(key);
        // Re-use the key while the old voice still rings.
        reg.start_note(key, 2, 130.81, 0.9, 0, &params);
        run(&mut reg, 48000);
        // The old voice's reclamation must not have removed the new one.
        assert_eq!(reg.note_id(key), Some(2));
        assert!(reg.is_playing(key));
    }

    #[test]
    fn unknown_keys_are_no_ops() {
        let mut reg = registry();
        let key = LogicalKey::Pointer(99);
        reg.stop_note(key);
        reg.kill_note(key);
        reg.update_pitch(key, 220.0);
        assert!(!reg.is_playing(key));
        assert_eq!(reg.slot_count(), 0);
    }

    #[test]
    fn update_pitch_glides_only_active_voices() {
        let mut reg = registry();
        let params = VoiceParams::default();
        let key = LogicalKey::String(0);
        reg.start_note(key, 1, 110.0, 0.9, 0, &params);
        reg.update_pitch(key, 220.0);
        assert_eq!(reg.target_frequency(key), Some(220.0));
        reg.stop_note(key);
        reg.update_pitch(key, 440.0);
        assert_eq!(reg.target_frequency(key), Some(220.0));
    }

    #[derive(Debug, Clone, Copy)]
    enum Op {
        Start { lane: usize, freq: f32 },
        Stop { lane: usize },
        Kill { lane: usize },
        Glide { lane: usize, freq: f32 },
        Audio { samples: usize },
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0usize..4, 40.0f32..400.0).prop_map(|(lane, freq)| Op::Start { lane, freq }),
            (0usize..4).prop_map(|lane| Op::Stop { lane }),
            (0usize..4).prop_map(|lane| Op::Kill { lane }),
            (0usize..4, 40.0f32..400.0).prop_map(|(lane, freq)| Op::Glide { lane, freq }),
            (1usize..512).prop_map(|samples| Op::Audio { samples }),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        // One slot per key no matter how starts, stops, kills, glides,
        // and audio interleave; a start always lands a playing voice and
        // a stop always silences synchronously.
        #[test]
        fn arbitrary_sequences_keep_one_slot_per_key(ops in proptest::collection::vec(op(), 1..32)) {
            let mut reg = registry();
            let params = VoiceParams {
                release_s: 0.05,
                ..VoiceParams::default()
            };
            let mut next_id = 1u64;
            for op in ops {
                match op {
                    Op::Start { lane, freq } => {
                        let key = LogicalKey::String(lane);
                        reg.start_note(key, next_id, freq, 0.8, lane, &params);
                        prop_assert!(reg.is_playing(key));
                        prop_assert_eq!(reg.note_id(key), Some(next_id));
                        next_id += 1;
                    }
                    Op::Stop { lane } => {
                        let key = LogicalKey::String(lane);
                        reg.stop_note(key);
                        prop_assert!(!reg.is_playing(key));
                    }
                    Op::Kill { lane } => reg.kill_note(LogicalKey::String(lane)),
                    Op::Glide { lane, freq } => reg.update_pitch(LogicalKey::String(lane), freq),
                    Op::Audio { samples } => {
                        for _ in 0..samples {
                            let (l, r) = reg.process_stereo(0.0);
                            prop_assert!(l.is_finite() && r.is_finite());
                        }
                    }
                }
                prop_assert!(reg.slot_count() <= 4, "at most one slot per lane");
            }
        }
    }
}
