//! Tuning pool and fretboard geometry.

use bajo_core::semitone_ratio;
use libm::floorf;

/// One string of the instrument.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TuningEntry {
    /// Display name, e.g. "E1".
    pub name: &'static str,
    /// Open-string frequency in Hz.
    pub base_frequency: f32,
}

const fn entry(name: &'static str, base_frequency: f32) -> TuningEntry {
    TuningEntry {
        name,
        base_frequency,
    }
}

/// Master pool of eight strings, highest pitch first. Every supported
/// tuning is a contiguous slice of this pool.
const STRING_POOL: [TuningEntry; 8] = [
    entry("C3", 130.81),
    entry("G2", 98.00),
    entry("D2", 73.42),
    entry("A1", 55.00),
    entry("E1", 41.20),
    entry("B0", 30.87),
    entry("F#0", 23.12),
    entry("C#0", 17.32),
];

/// Fraction of the width reserved for the nut (open-string) zone.
pub const NUT_ZONE: f32 = 0.08;
/// Fraction of the height padded above and below the playable band.
pub const VERTICAL_PADDING: f32 = 0.06;

/// Tuning for a string count in [4, 8]; out-of-range counts clamp.
///
/// Four strings give standard bass tuning G D A E; extra strings extend
/// upward to C3 first, then downward.
pub fn tuning_for(string_count: usize) -> &'static [TuningEntry] {
    match string_count.clamp(4, 8) {
        4 => &STRING_POOL[1..5],
        5 => &STRING_POOL[1..6],
        6 => &STRING_POOL[0..6],
        7 => &STRING_POOL[0..7],
        _ => &STRING_POOL[0..8],
    }
}

/// Frequency of `semitones` above an open string.
#[inline]
pub fn frequency(base_frequency: f32, semitones: f32) -> f32 {
    base_frequency * semitone_ratio(semitones)
}

/// Continuous lane position for a normalized vertical coordinate.
///
/// 0.0 is the top edge of the playable band; whole numbers are lane
/// boundaries. Unclamped, for the crossing hysteresis test.
#[inline]
pub fn lane_position(y: f32, string_count: usize) -> f32 {
    (y - VERTICAL_PADDING) / (1.0 - 2.0 * VERTICAL_PADDING) * string_count as f32
}

/// String index for a normalized vertical coordinate, clamped to range.
#[inline]
pub fn string_index_for_y(y: f32, string_count: usize) -> usize {
    let lane = floorf(lane_position(y, string_count));
    (lane.max(0.0) as usize).min(string_count - 1)
}

/// Continuous semitone offset for a normalized horizontal coordinate,
/// or [`OPEN_STRING`](crate::OPEN_STRING) inside the nut zone.
#[inline]
pub fn semitone_offset_for_x(x: f32, fret_count: usize) -> f32 {
    if x < NUT_ZONE {
        crate::OPEN_STRING
    } else {
        (x - NUT_ZONE) / (1.0 - NUT_ZONE) * fret_count as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn tunings_are_contiguous_pool_slices() {
        for count in 4..=8 {
            let tuning = tuning_for(count);
            assert_eq!(tuning.len(), count);
            // Strictly decreasing base frequency, highest string first.
            for pair in tuning.windows(2) {
                assert!(pair[0].base_frequency > pair[1].base_frequency);
            }
            // Contiguous in the master pool.
            let start = STRING_POOL
                .iter()
                .position(|e| e == &tuning[0])
                .expect("tuning entry must come from the pool");
            assert_eq!(&STRING_POOL[start..start + count], tuning);
        }
    }

    #[test]
    fn four_string_is_standard_bass() {
        let names: Vec<_> = tuning_for(4).iter().map(|e| e.name).collect();
        assert_eq!(names, ["G2", "D2", "A1", "E1"]);
    }

    #[test]
    fn out_of_range_counts_clamp() {
        assert_eq!(tuning_for(1).len(), 4);
        assert_eq!(tuning_for(20).len(), 8);
    }

    #[test]
    fn open_string_frequency_is_exact() {
        for e in tuning_for(8) {
            assert_eq!(frequency(e.base_frequency, 0.0), e.base_frequency);
        }
    }

    #[test]
    fn octave_doubles() {
        let f = frequency(55.0, 12.0);
        assert!((f - 110.0).abs() < 0.01);
    }

    #[test]
    fn nut_zone_yields_sentinel() {
        assert_eq!(semitone_offset_for_x(0.0, 12), crate::OPEN_STRING);
        assert_eq!(semitone_offset_for_x(0.079, 12), crate::OPEN_STRING);
        assert!(semitone_offset_for_x(0.081, 12) >= 0.0);
        let at_end = semitone_offset_for_x(1.0, 12);
        assert!((at_end - 12.0).abs() < 1e-4);
    }

    #[test]
    fn lanes_divide_playable_band_evenly() {
        let n = 4;
        assert_eq!(string_index_for_y(VERTICAL_PADDING + 0.01, n), 0);
        assert_eq!(string_index_for_y(0.5, n), 2);
        assert_eq!(string_index_for_y(1.0 - VERTICAL_PADDING - 0.01, n), 3);
        // Inside the padding still clamps to the nearest lane.
        assert_eq!(string_index_for_y(0.0, n), 0);
        assert_eq!(string_index_for_y(1.0, n), 3);
    }

    proptest! {
        #[test]
        fn frequency_matches_equal_temperament(s in -24.0f32..24.0, base in 17.0f32..131.0) {
            let f = frequency(base, s);
            let expected = base * libm::powf(2.0, s / 12.0);
            prop_assert!((f - expected).abs() < expected * 1e-5);
        }

        #[test]
        fn string_index_always_in_range(y in -0.5f32..1.5, n in 4usize..=8) {
            prop_assert!(string_index_for_y(y, n) < n);
        }
    }
}
