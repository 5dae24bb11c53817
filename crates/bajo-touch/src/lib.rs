//! Touch-to-pitch reconciliation for the bajo fretless bass.
//!
//! Maps a stream of raw multi-pointer samples onto stable per-pointer
//! musical state: string lane, continuous pitch with glide smoothing and
//! fret quantization, string-crossing hysteresis, and velocity
//! estimation. Entirely independent of the audio engine; the demand
//! resolver reads the reconciled state each tick.

pub mod pointer;
pub mod tuning;

pub use pointer::{
    NoteSeq, OPEN_STRING, PointerId, PointerState, TouchSample, TouchTracker, TrackerConfig,
};
pub use tuning::{
    NUT_ZONE, TuningEntry, VERTICAL_PADDING, frequency, lane_position, semitone_offset_for_x,
    string_index_for_y, tuning_for,
};
