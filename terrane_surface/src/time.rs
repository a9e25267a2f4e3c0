// Copyright 2026 the Terrane Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host clock reads for the frame pump.

use rustix::time::{ClockId, Timespec, clock_gettime};
use terrane_core::time::{FrameTime, Timebase};

const NANOS_PER_SECOND: u128 = 1_000_000_000;

/// Returns the surface-layer [`Timebase`]: host ticks are nanoseconds.
#[must_use]
pub const fn timebase() -> Timebase {
    Timebase::NANOS
}

/// Returns the current monotonic host time in nanoseconds.
///
/// Drives [`Scene::process_frame`](terrane_core::scene::Scene::process_frame)
/// and the constraint blend windows.
#[must_use]
pub fn now() -> FrameTime {
    timespec_to_frame_time(clock_gettime(ClockId::Monotonic))
}

fn timespec_to_frame_time(timespec: Timespec) -> FrameTime {
    let seconds = u64::try_from(timespec.tv_sec).unwrap_or(0);
    let nanos = u64::try_from(timespec.tv_nsec)
        .unwrap_or(0)
        .min(999_999_999);

    let ticks_u128 = u128::from(seconds)
        .saturating_mul(NANOS_PER_SECOND)
        .saturating_add(u128::from(nanos));
    let ticks = u64::try_from(ticks_u128).unwrap_or(u64::MAX);
    FrameTime(ticks)
}

#[cfg(test)]
mod tests {
    use super::{now, timebase, timespec_to_frame_time};
    use rustix::time::Timespec;
    use terrane_core::time::{FrameTime, Timebase};

    #[test]
    fn timebase_is_nanos_identity() {
        assert_eq!(timebase(), Timebase::NANOS);
    }

    #[test]
    fn now_is_monotonic_non_decreasing() {
        let first = now();
        let second = now();
        assert!(second >= first, "monotonic clock should not go backwards");
    }

    #[test]
    fn timespec_conversion_builds_nanosecond_ticks() {
        let input = Timespec {
            tv_sec: 12,
            tv_nsec: 345_678_901,
        };
        let expected = FrameTime(12 * 1_000_000_000 + 345_678_901);
        assert_eq!(timespec_to_frame_time(input), expected);
    }

    #[test]
    fn timespec_conversion_saturates_on_large_values() {
        let input = Timespec {
            tv_sec: i64::MAX,
            tv_nsec: 999_999_999,
        };
        assert_eq!(timespec_to_frame_time(input), FrameTime(u64::MAX));
    }
}
