//! Per-pointer reconciliation state machine.

use crate::tuning::{frequency, lane_position, semitone_offset_for_x, string_index_for_y, tuning_for};
use libm::roundf;

/// Sentinel raw offset meaning the pointer sits in the nut zone and the
/// string sounds open.
pub const OPEN_STRING: f32 = -999.0;

/// Stillness threshold before auto-tune snaps the pitch, in ms.
const SETTLE_MS: f64 = 60.0;
/// Raw-offset change above which smoothing is bypassed entirely.
const SNAP_THRESHOLD: f32 = 0.1;
/// Smoothing factor for small same-string movement.
const SMOOTHING: f32 = 0.5;
/// Crossing margin below the current lane (moving toward higher indices).
const CROSS_DOWN: f32 = 1.25;
/// Crossing margin above the current lane (moving toward lower indices).
const CROSS_UP: f32 = 0.25;

/// Stable identity of a physical contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PointerId(pub u64);

impl PointerId {
    /// Reserved id for the synthetic mouse pointer.
    pub const MOUSE: PointerId = PointerId(u64::MAX);
}

/// One raw input sample for a pointer.
#[derive(Debug, Clone, Copy)]
pub struct TouchSample {
    /// Horizontal position normalized to [0, 1] across the fretboard.
    pub x: f32,
    /// Vertical position normalized to [0, 1].
    pub y: f32,
    /// Explicit force reading, when the device provides one.
    pub force: Option<f32>,
    /// Vendor pressure fallback; values above 1 are clamped.
    pub pressure: Option<f32>,
    /// Contact radius in pixels, the last-resort pressure proxy.
    pub radius_px: Option<f32>,
    /// Event timestamp in milliseconds.
    pub timestamp_ms: f64,
}

/// Mints note ids: a monotonic sequence composed with the event
/// timestamp, so ids stay unique across engine instances.
#[derive(Debug, Default)]
pub struct NoteSeq {
    counter: u64,
}

impl NoteSeq {
    /// Create a sequence starting at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint the next note id.
    pub fn next(&mut self, timestamp_ms: f64) -> u64 {
        self.counter += 1;
        (self.counter << 20) | (timestamp_ms as u64 & 0xf_ffff)
    }
}

/// Settings the tracker reads on every sample.
#[derive(Debug, Clone, Copy)]
pub struct TrackerConfig {
    /// Number of strings in [4, 8].
    pub string_count: usize,
    /// Fret range mapped across the neck.
    pub fret_count: usize,
    /// Velocity sensitivity in [0, 1]; 0 pins velocity to 1.
    pub velocity_sensitivity: f32,
    /// Whole-instrument transpose in octaves.
    pub octave_shift: i32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            string_count: 4,
            fret_count: 12,
            velocity_sensitivity: 0.5,
            octave_shift: 0,
        }
    }
}

/// Reconciled state of one active pointer.
#[derive(Debug, Clone, Copy)]
pub struct PointerState {
    /// The contact this state belongs to.
    pub pointer_id: PointerId,
    /// Current string lane.
    pub string_index: usize,
    /// Frequency the pointer demands, in Hz.
    pub target_frequency: f32,
    /// Identity token of the note instantiation; fresh per touch and per
    /// string crossing.
    pub note_id: u64,
    /// Correction that made the initial touch land on an integer fret.
    pub quantize_offset: f32,
    /// Estimated velocity in [0.4, 1.0].
    pub velocity: f32,
    /// Horizontal position in percent, for visual consumers only.
    pub x_percent: f32,
    /// Timestamp of the last material movement.
    pub last_moved_at_ms: f64,
    /// Whether auto-tune has already snapped this settle period.
    pub is_quantized: bool,
    /// Smoothed raw semitone offset, or [`OPEN_STRING`].
    pub raw_semitone_offset: f32,
}

impl PointerState {
    /// Effective semitone value for monophonic arbitration; the open
    /// string compares as -1.
    pub fn effective_semitone(&self) -> f32 {
        if self.raw_semitone_offset == OPEN_STRING {
            -1.0
        } else {
            self.raw_semitone_offset + self.quantize_offset
        }
    }
}

/// Multi-pointer reconciliation engine.
///
/// Pointer states keep insertion order, which is also the monophonic
/// tie-break order (first-seen wins).
#[derive(Debug, Default)]
pub struct TouchTracker {
    pointers: Vec<PointerState>,
}

impl TouchTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Active pointer states in insertion order.
    pub fn pointers(&self) -> &[PointerState] {
        &self.pointers
    }

    /// Feed one raw sample, creating or updating the pointer's state.
    pub fn update(
        &mut self,
        id: PointerId,
        sample: TouchSample,
        config: &TrackerConfig,
        seq: &mut NoteSeq,
    ) {
        let velocity = estimate_velocity(&sample, config.velocity_sensitivity);
        let raw = semitone_offset_for_x(sample.x, config.fret_count.max(1));
        let lane = lane_position(sample.y, config.string_count);

        match self.pointers.iter_mut().find(|p| p.pointer_id == id) {
            None => {
                let string_index = string_index_for_y(sample.y, config.string_count);
                let mut state = PointerState {
                    pointer_id: id,
                    string_index,
                    target_frequency: 0.0,
                    note_id: seq.next(sample.timestamp_ms),
                    quantize_offset: 0.0,
                    velocity,
                    x_percent: sample.x * 100.0,
                    last_moved_at_ms: sample.timestamp_ms,
                    is_quantized: true,
                    raw_semitone_offset: raw,
                };
                anchor_to_fret(&mut state, raw, config);
                self.pointers.push(state);
            }
            Some(state) => {
                state.velocity = velocity;
                state.x_percent = sample.x * 100.0;

                let crossed = lane > state.string_index as f32 + CROSS_DOWN
                    || lane < state.string_index as f32 - CROSS_UP;
                if crossed {
                    // A crossing is musically a new note: fresh anchor,
                    // fresh identity.
                    state.string_index = string_index_for_y(sample.y, config.string_count);
                    state.note_id = seq.next(sample.timestamp_ms);
                    state.last_moved_at_ms = sample.timestamp_ms;
                    state.raw_semitone_offset = raw;
                    anchor_to_fret(state, raw, config);
                    return;
                }

                let base = base_frequency(state.string_index, config);
                if raw == OPEN_STRING {
                    if state.raw_semitone_offset != OPEN_STRING {
                        state.last_moved_at_ms = sample.timestamp_ms;
                    }
                    state.raw_semitone_offset = OPEN_STRING;
                    state.target_frequency = base;
                    state.is_quantized = true;
                    return;
                }

                let prev = state.raw_semitone_offset;
                let smoothed = if prev == OPEN_STRING {
                    raw
                } else {
                    let delta = raw - prev;
                    let factor = if delta.abs() > SNAP_THRESHOLD {
                        1.0
                    } else {
                        SMOOTHING
                    };
                    prev + factor * delta
                };
                if (smoothed - prev).abs() > 1e-4 {
                    state.last_moved_at_ms = sample.timestamp_ms;
                    state.is_quantized = false;
                }
                state.raw_semitone_offset = smoothed;
                state.target_frequency = frequency(base, smoothed + state.quantize_offset);
            }
        }
    }

    /// Auto-tune pass: snap any pointer still for more than 60 ms to the
    /// nearest semitone, once per settle period.
    pub fn settle(&mut self, now_ms: f64, config: &TrackerConfig) {
        for state in &mut self.pointers {
            if state.is_quantized
                || state.raw_semitone_offset == OPEN_STRING
                || now_ms - state.last_moved_at_ms <= SETTLE_MS
            {
                continue;
            }
            let base = base_frequency(state.string_index, config);
            let snapped = roundf(state.raw_semitone_offset + state.quantize_offset);
            state.target_frequency = frequency(base, snapped);
            state.is_quantized = true;
        }
    }

    /// Remove a lifted or cancelled pointer. Unknown ids are no-ops.
    pub fn remove(&mut self, id: PointerId) {
        self.pointers.retain(|p| p.pointer_id != id);
    }

    /// Drop every pointer (input teardown).
    pub fn clear(&mut self) {
        self.pointers.clear();
    }
}

/// Open-string frequency of a lane, with the octave shift applied at the
/// tuning read point.
fn base_frequency(string_index: usize, config: &TrackerConfig) -> f32 {
    let tuning = tuning_for(config.string_count);
    let base = tuning[string_index.min(tuning.len() - 1)].base_frequency;
    match config.octave_shift {
        0 => base,
        n if n > 0 => base * (1 << n.min(3)) as f32,
        n => base / (1 << (-n).min(3)) as f32,
    }
}

/// Quantize the initial (or post-crossing) touch onto the nearest fret
/// and retain the correction for subsequent sliding.
fn anchor_to_fret(state: &mut PointerState, raw: f32, config: &TrackerConfig) {
    let base = base_frequency(state.string_index, config);
    if raw == OPEN_STRING {
        state.quantize_offset = 0.0;
        state.target_frequency = base;
    } else {
        let fret = roundf(raw);
        state.quantize_offset = fret - raw;
        state.target_frequency = frequency(base, fret);
    }
    state.is_quantized = true;
}

/// Velocity from the best available contact signal.
///
/// Priority: explicit force, vendor pressure (clamped to 1), contact
/// radius mapped from the empirical 8-40 px range onto [0.3, 1.0], then
/// a 0.8 default for devices with no pressure signal at all.
fn estimate_velocity(sample: &TouchSample, sensitivity: f32) -> f32 {
    let raw = if let Some(force) = sample.force {
        force.clamp(0.0, 1.0)
    } else if let Some(pressure) = sample.pressure {
        pressure.clamp(0.0, 1.0)
    } else if let Some(radius) = sample.radius_px {
        let t = ((radius - 8.0) / 32.0).clamp(0.0, 1.0);
        0.3 + 0.7 * t
    } else {
        0.8
    };
    let sensitivity = sensitivity.clamp(0.0, 1.0);
    (raw * sensitivity + (1.0 - sensitivity)).clamp(0.4, 1.0)
}
