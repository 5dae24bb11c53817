//! Voice engine for the bajo fretless bass.
//!
//! A played note is a [`Voice`]: a stack of correlated sources (body and
//! sub oscillators, a filtered character oscillator, noise, a pluck
//! transient, optional octave doubling) under one note envelope and a
//! constant-power panner. Voices live in the [`NoteRegistry`], keyed by
//! [`LogicalKey`], which enforces one sounding voice per key and owns
//! reclamation of released voices from the audio clock.

pub mod envelope;
pub mod oscillator;
pub mod registry;
pub mod tables;
pub mod voice;

pub use envelope::NoteEnvelope;
pub use oscillator::{Oscillator, OscillatorWaveform};
pub use registry::{LogicalKey, NoteRegistry};
pub use tables::NoiseTables;
pub use voice::{SourceRole, Voice, VoiceParams};
