//! Demand resolution: reconciled touches against sounding voices.
//!
//! Pure diff, no side effects: given the pointer states (insertion
//! order), a registry view, and the mode, produce the commands that make
//! the registry match demand. The engine applies them in a separate
//! step, which keeps this logic testable without an audio backend.

use bajo_synth::{LogicalKey, NoteRegistry};
use bajo_touch::PointerState;

/// Effective frequency change below which no glide is issued, Hz.
const GLIDE_EPSILON: f32 = 0.01;

/// One voice-pool mutation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Start (or forcibly restart) a voice.
    Start {
        /// Slot to occupy.
        key: LogicalKey,
        /// Identity token binding the voice to its pointer/crossing.
        note_id: u64,
        /// Initial frequency in Hz.
        frequency: f32,
        /// Velocity in [0, 1].
        velocity: f32,
        /// String lane, for panning.
        string_index: usize,
    },
    /// Glide an active voice to a new frequency.
    Glide {
        /// Slot to retune.
        key: LogicalKey,
        /// Target frequency in Hz.
        frequency: f32,
    },
    /// Gracefully release a voice no longer demanded.
    Stop {
        /// Slot to release.
        key: LogicalKey,
    },
}

/// Compute the commands reconciling `pointers` with `registry`.
///
/// Monophonic mode arbitrates one winner per string: the pointer with
/// the highest effective semitone (open string counts as -1), ties
/// going to the earlier-created pointer. Polyphonic mode demands one
/// voice per pointer. A demanded key whose registry note id differs
/// from the pointer's (a takeover or a string crossing) restarts rather
/// than glides; so does a key the registry reports as no longer
/// playing.
pub fn resolve(pointers: &[PointerState], registry: &NoteRegistry, monophonic: bool) -> Vec<Command> {
    let mut demand: Vec<(LogicalKey, &PointerState)> = Vec::with_capacity(pointers.len());
    if monophonic {
        for pointer in pointers {
            let key = LogicalKey::String(pointer.string_index);
            match demand.iter_mut().find(|(k, _)| *k == key) {
                None => demand.push((key, pointer)),
                Some((_, winner)) => {
                    // Strict comparison keeps the first-seen pointer on ties.
                    if pointer.effective_semitone() > winner.effective_semitone() {
                        *winner = pointer;
                    }
                }
            }
        }
    } else {
        for pointer in pointers {
            demand.push((LogicalKey::Pointer(pointer.pointer_id.0), pointer));
        }
    }

    let mut commands = Vec::new();

    let mut undemanded = registry.playing_keys();
    undemanded.retain(|key| !demand.iter().any(|(k, _)| k == key));
    undemanded.sort_unstable();
    commands.extend(undemanded.into_iter().map(|key| Command::Stop { key }));

    for (key, pointer) in demand {
        let bound_id = registry.note_id(key);
        let needs_start = match bound_id {
            None => true,
            Some(id) => id != pointer.note_id || !registry.is_playing(key),
        };
        if needs_start {
            commands.push(Command::Start {
                key,
                note_id: pointer.note_id,
                frequency: pointer.target_frequency,
                velocity: pointer.velocity,
                string_index: pointer.string_index,
            });
        } else if let Some(current) = registry.target_frequency(key)
            && (pointer.target_frequency - current).abs() > GLIDE_EPSILON
        {
            commands.push(Command::Glide {
                key,
                frequency: pointer.target_frequency,
            });
        }
    }

    commands
}

#[cfg(test)]
mod tests {
    use super::*;
    use bajo_touch::{OPEN_STRING, PointerId};
    use proptest::prelude::*;

    fn pointer(id: u64, string: usize, offset: f32, freq: f32, note_id: u64) -> PointerState {
        PointerState {
            pointer_id: PointerId(id),
            string_index: string,
            target_frequency: freq,
            note_id,
            quantize_offset: 0.0,
            velocity: 0.8,
            x_percent: 50.0,
            last_moved_at_ms: 0.0,
            is_quantized: true,
            raw_semitone_offset: offset,
        }
    }

    #[test]
    fn empty_inputs_produce_no_commands() {
        let registry = NoteRegistry::new(48000.0);
        assert!(resolve(&[], &registry, true).is_empty());
    }

    #[test]
    fn new_pointer_starts_a_voice() {
        let registry = NoteRegistry::new(48000.0);
        let p = pointer(1, 0, 3.0, 116.54, 10);
        let commands = resolve(std::slice::from_ref(&p), &registry, true);
        assert_eq!(
            commands,
            [Command::Start {
                key: LogicalKey::String(0),
                note_id: 10,
                frequency: 116.54,
                velocity: 0.8,
                string_index: 0,
            }]
        );
    }

    #[test]
    fn mono_highest_pitch_wins_open_string_loses() {
        let registry = NoteRegistry::new(48000.0);
        let low = pointer(1, 2, 2.0, 82.41, 1);
        let high = pointer(2, 2, 7.0, 110.0, 2);
        let open = pointer(3, 2, OPEN_STRING, 73.42, 3);
        let commands = resolve(&[low, high, open], &registry, true);
        assert_eq!(commands.len(), 1);
        assert!(matches!(
            commands[0],
            Command::Start { note_id: 2, .. }
        ));
    }

    #[test]
    fn mono_tie_goes_to_first_seen() {
        let registry = NoteRegistry::new(48000.0);
        let a = pointer(5, 1, 4.0, 123.47, 50);
        let b = pointer(6, 1, 4.0, 123.47, 60);
        let commands = resolve(&[a, b], &registry, true);
        assert!(matches!(commands[0], Command::Start { note_id: 50, .. }));
    }

    #[test]
    fn poly_demands_one_voice_per_pointer() {
        let registry = NoteRegistry::new(48000.0);
        let a = pointer(1, 0, 2.0, 110.0, 1);
        let b = pointer(2, 0, 5.0, 130.81, 2);
        let commands = resolve(&[a, b], &registry, false);
        assert_eq!(commands.len(), 2);
    }

    #[test]
    fn same_note_glides_on_material_frequency_change() {
        let mut registry = NoteRegistry::new(48000.0);
        let params = bajo_synth::VoiceParams::default();
        registry.start_note(LogicalKey::String(0), 10, 110.0, 0.8, 0, &params);

        // Unchanged frequency: no command at all.
        let held = pointer(1, 0, 0.0, 110.0, 10);
        assert!(resolve(std::slice::from_ref(&held), &registry, true).is_empty());

        // Moved: glide, not restart.
        let moved = pointer(1, 0, 1.0, 116.54, 10);
        let commands = resolve(std::slice::from_ref(&moved), &registry, true);
        assert_eq!(
            commands,
            [Command::Glide {
                key: LogicalKey::String(0),
                frequency: 116.54,
            }]
        );
    }

    #[test]
    fn note_id_mismatch_forces_restart() {
        let mut registry = NoteRegistry::new(48000.0);
        let params = bajo_synth::VoiceParams::default();
        registry.start_note(LogicalKey::String(0), 10, 110.0, 0.8, 0, &params);

        // Same string, different note instantiation (takeover or crossing).
        let taker = pointer(2, 0, 5.0, 146.83, 11);
        let commands = resolve(std::slice::from_ref(&taker), &registry, true);
        assert!(matches!(commands[0], Command::Start { note_id: 11, .. }));
    }

    #[test]
    fn undemanded_keys_are_stopped() {
        let mut registry = NoteRegistry::new(48000.0);
        let params = bajo_synth::VoiceParams::default();
        registry.start_note(LogicalKey::String(0), 1, 110.0, 0.8, 0, &params);
        registry.start_note(LogicalKey::String(3), 2, 41.2, 0.8, 3, &params);

        let p = pointer(1, 0, 0.0, 110.0, 1);
        let commands = resolve(std::slice::from_ref(&p), &registry, true);
        assert_eq!(commands, [Command::Stop { key: LogicalKey::String(3) }]);
    }

    #[test]
    fn resolver_is_pure() {
        let mut registry = NoteRegistry::new(48000.0);
        let params = bajo_synth::VoiceParams::default();
        registry.start_note(LogicalKey::String(1), 4, 98.0, 0.8, 1, &params);
        let pointers = [pointer(1, 1, 2.0, 110.0, 4), pointer(2, 0, 1.0, 104.0, 5)];
        let first = resolve(&pointers, &registry, true);
        let second = resolve(&pointers, &registry, true);
        assert_eq!(first, second);
    }

    fn demand_entry() -> impl Strategy<Value = (usize, f32, u64)> {
        (
            0usize..4,
            prop_oneof![Just(OPEN_STRING), -1.0f32..12.0],
            1u64..1000,
        )
    }

    proptest! {
        // Against an empty registry every command is a start, keys never
        // repeat, and in monophonic mode each started string carries the
        // highest effective pitch demanded on it.
        #[test]
        fn starts_are_unique_per_key(
            entries in proptest::collection::vec(demand_entry(), 0..8),
            monophonic in any::<bool>(),
        ) {
            let registry = NoteRegistry::new(48000.0);
            let pointers: Vec<_> = entries
                .iter()
                .enumerate()
                .map(|(i, &(lane, offset, note_id))| {
                    // Frequency made injective in the raw offset so the
                    // winner is identifiable from the command alone.
                    pointer(i as u64 + 1, lane, offset, 200.0 + offset, note_id)
                })
                .collect();
            let commands = resolve(&pointers, &registry, monophonic);

            let mut keys = Vec::new();
            for command in &commands {
                match *command {
                    Command::Start { key, .. } => {
                        prop_assert!(!keys.contains(&key), "duplicate key {key:?}");
                        keys.push(key);
                    }
                    _ => prop_assert!(false, "empty registry admits only starts"),
                }
            }

            if monophonic {
                prop_assert!(commands.len() <= 4);
                for command in &commands {
                    if let Command::Start { key: LogicalKey::String(lane), frequency, .. } = *command {
                        let lane_max = pointers
                            .iter()
                            .filter(|p| p.string_index == lane)
                            .map(PointerState::effective_semitone)
                            .fold(f32::NEG_INFINITY, f32::max);
                        let matched = pointers.iter().any(|p| {
                            p.string_index == lane
                                && p.target_frequency == frequency
                                && p.effective_semitone() == lane_max
                        });
                        prop_assert!(matched, "winner must carry its string's highest pitch");
                    }
                }
            } else {
                prop_assert_eq!(commands.len(), pointers.len());
            }
        }
    }
}
