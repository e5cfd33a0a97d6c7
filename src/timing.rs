//! Millisecond to tick conversion
//!
//! Ticks per minute = BPM * PPQ, so a duration of `ms` milliseconds spans
//! `ms * bpm * ppq / 60000` ticks.

/// Largest absolute tick the compiler will produce (2^31 - 1)
pub const MAX_TICK: u32 = 0x7FFF_FFFF;

const MS_PER_MINUTE: u128 = 60_000;

/// Convert a duration in milliseconds to ticks, rounding half up
///
/// # Arguments
/// * `ms` - Duration in milliseconds
/// * `bpm` - Tempo in quarter notes per minute (20..=400)
/// * `ppq` - Ticks per quarter note (48..=9600)
///
/// The result is clamped to [`MAX_TICK`].
pub fn ticks_for(ms: u64, bpm: u16, ppq: u16) -> u32 {
    let num = ms as u128 * bpm as u128 * ppq as u128;
    let ticks = (num + MS_PER_MINUTE / 2) / MS_PER_MINUTE;
    ticks.min(MAX_TICK as u128) as u32
}

/// Microseconds per quarter note for a tempo, truncating
pub fn micros_per_quarter(bpm: u16) -> u32 {
    60_000_000 / bpm as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_duration() {
        assert_eq!(ticks_for(0, 120, 480), 0);
        assert_eq!(ticks_for(0, 400, 9600), 0);
    }

    #[test]
    fn test_rounds_half_up() {
        // 0.96 ticks
        assert_eq!(ticks_for(1, 120, 480), 1);
        // exactly 0.5 ticks: 60000 / 2 = 30000 = ms * bpm * ppq
        assert_eq!(ticks_for(1, 50, 600), 1);
        // 0.48 ticks
        assert_eq!(ticks_for(1, 60, 480), 0);
    }

    #[test]
    fn test_default_tempo_quarter_note() {
        // 500ms is one quarter at 120 bpm
        assert_eq!(ticks_for(500, 120, 480), 480);
        assert_eq!(ticks_for(200, 120, 480), 192);
    }

    #[test]
    fn test_monotonic_in_ms() {
        let mut prev = 0;
        for ms in 0..5000 {
            let t = ticks_for(ms, 97, 131);
            assert!(t >= prev, "ticks decreased at {}ms", ms);
            prev = t;
        }
    }

    #[test]
    fn test_wide_intermediate() {
        // 10000 * 400 * 9600 does not fit in 32 bits
        assert_eq!(ticks_for(10_000, 400, 9600), 640_000);
    }

    #[test]
    fn test_clamped_to_max_tick() {
        assert_eq!(ticks_for(u64::MAX, 400, 9600), MAX_TICK);
        assert_eq!(ticks_for(100_000_000, 400, 9600), MAX_TICK);
    }

    #[test]
    fn test_micros_per_quarter() {
        assert_eq!(micros_per_quarter(120), 500_000);
        assert_eq!(micros_per_quarter(90), 666_666);
        assert_eq!(micros_per_quarter(20), 3_000_000);
        assert_eq!(micros_per_quarter(400), 150_000);
    }
}
