//! Duration-composition scheduler over the platform's primitive sleeps.
//!
//! The platform can only power down for a small fixed catalog of intervals.
//! Arbitrary whole-second waits are composed by greedily subtracting the
//! largest whole-second primitive that still fits, a direct binary encoding
//! of the request over {8, 4, 2, 1}, so a decomposition never exceeds four
//! primitive calls and its sum always equals the request exactly.

use heapless::Vec;

use crate::hal::{WakeCause, WakeSleep};

/// Fixed hardware sleep lengths available from the countdown wake source.
///
/// The catalog is platform-defined and never changes at runtime. The two
/// sub-second entries exist solely for the light probe; the scheduler
/// composes requests out of the whole-second entries.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PrimitiveDuration {
    /// 15 ms, the probe's charge hold.
    Ms15,
    /// 250 ms, the probe's discharge window.
    Ms250,
    /// 1 second.
    S1,
    /// 2 seconds.
    S2,
    /// 4 seconds.
    S4,
    /// 8 seconds.
    S8,
}

impl PrimitiveDuration {
    /// Interval length in milliseconds.
    #[must_use]
    pub const fn millis(self) -> u32 {
        match self {
            PrimitiveDuration::Ms15 => 15,
            PrimitiveDuration::Ms250 => 250,
            PrimitiveDuration::S1 => 1_000,
            PrimitiveDuration::S2 => 2_000,
            PrimitiveDuration::S4 => 4_000,
            PrimitiveDuration::S8 => 8_000,
        }
    }

    /// Interval length in whole seconds; zero for the sub-second entries.
    #[must_use]
    pub const fn seconds(self) -> u8 {
        match self {
            PrimitiveDuration::Ms15 | PrimitiveDuration::Ms250 => 0,
            PrimitiveDuration::S1 => 1,
            PrimitiveDuration::S2 => 2,
            PrimitiveDuration::S4 => 4,
            PrimitiveDuration::S8 => 8,
        }
    }
}

/// Whole-second primitives, largest first, as the greedy pass consumes them.
pub const SECOND_PRIMITIVES: [PrimitiveDuration; 4] = [
    PrimitiveDuration::S8,
    PrimitiveDuration::S4,
    PrimitiveDuration::S2,
    PrimitiveDuration::S1,
];

/// Smallest composable request, in seconds.
pub const MIN_SCHEDULED_SECONDS: u8 = 1;
/// Largest composable request, in seconds.
pub const MAX_SCHEDULED_SECONDS: u8 = 15;

/// Upper bound on the primitives one request decomposes into.
pub const MAX_DECOMPOSITION_STEPS: usize = SECOND_PRIMITIVES.len();

/// Decomposes a whole-second request into ordered primitives.
///
/// Callers must keep `seconds` within 1..=15; the range is a contract, not
/// a runtime error path. A zero request decomposes into nothing, which the
/// sleeping caller treats as an immediate return.
#[must_use]
pub fn decompose_seconds(seconds: u8) -> Vec<PrimitiveDuration, MAX_DECOMPOSITION_STEPS> {
    debug_assert!(seconds <= MAX_SCHEDULED_SECONDS);

    let mut steps = Vec::new();
    let mut remaining = seconds.min(MAX_SCHEDULED_SECONDS);
    for primitive in SECOND_PRIMITIVES {
        if remaining >= primitive.seconds() {
            remaining -= primitive.seconds();
            // Four slots cover every value of the four subtraction bits.
            let _ = steps.push(primitive);
        }
    }
    debug_assert_eq!(remaining, 0);
    steps
}

/// Blocks for `seconds` by issuing one primitive sleep per decomposed step.
///
/// No primitive is split or overlapped; the board is suspended for each
/// step in turn and the call returns once the final step elapses. Any edge
/// wake observed here is ignored; the edge source is armed only inside
/// probe windows, which never issue composed sleeps.
pub fn sleep_seconds<W: WakeSleep>(board: &mut W, seconds: u8) {
    for primitive in decompose_seconds(seconds) {
        let _ = board.sleep_once(primitive);
    }
}

/// Blocks for exactly one primitive interval and reports the wake cause.
pub fn sleep_primitive<W: WakeSleep>(board: &mut W, duration: PrimitiveDuration) -> WakeCause {
    board.sleep_once(duration)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingSleeper {
        slept: std::vec::Vec<PrimitiveDuration>,
    }

    impl WakeSleep for RecordingSleeper {
        fn sleep_once(&mut self, duration: PrimitiveDuration) -> WakeCause {
            self.slept.push(duration);
            WakeCause::TimedOut
        }

        fn arm_edge_wake(&mut self, _pin: crate::hal::LedPin) {}

        fn disarm_edge_wake(&mut self, _pin: crate::hal::LedPin) {}

        fn spin_wait_millis(&mut self, _millis: u8) {}
    }

    extern crate std;

    #[test]
    fn decomposition_sums_exactly_for_every_request() {
        for seconds in MIN_SCHEDULED_SECONDS..=MAX_SCHEDULED_SECONDS {
            let steps = decompose_seconds(seconds);
            let total: u8 = steps.iter().map(|step| step.seconds()).sum();
            assert_eq!(total, seconds);
        }
    }

    #[test]
    fn decomposition_uses_minimum_primitive_count() {
        for seconds in MIN_SCHEDULED_SECONDS..=MAX_SCHEDULED_SECONDS {
            let steps = decompose_seconds(seconds);
            assert_eq!(steps.len(), seconds.count_ones() as usize);
        }
    }

    #[test]
    fn decomposition_orders_largest_first() {
        for seconds in MIN_SCHEDULED_SECONDS..=MAX_SCHEDULED_SECONDS {
            let steps = decompose_seconds(seconds);
            for pair in steps.windows(2) {
                assert!(pair[0].seconds() > pair[1].seconds());
            }
        }
    }

    #[test]
    fn decomposition_of_zero_is_empty() {
        assert!(decompose_seconds(0).is_empty());
    }

    #[test]
    fn fifteen_seconds_uses_all_four_primitives() {
        let steps = decompose_seconds(15);
        assert_eq!(steps.as_slice(), SECOND_PRIMITIVES.as_slice());
    }

    #[test]
    fn sleep_seconds_issues_one_call_per_step() {
        let mut sleeper = RecordingSleeper::default();
        sleep_seconds(&mut sleeper, 13);
        assert_eq!(
            sleeper.slept,
            [
                PrimitiveDuration::S8,
                PrimitiveDuration::S4,
                PrimitiveDuration::S1
            ]
        );
    }

    #[test]
    fn sleep_primitive_reports_wake_cause() {
        let mut sleeper = RecordingSleeper::default();
        let cause = sleep_primitive(&mut sleeper, PrimitiveDuration::Ms250);
        assert_eq!(cause, WakeCause::TimedOut);
        assert_eq!(sleeper.slept, [PrimitiveDuration::Ms250]);
    }
}
