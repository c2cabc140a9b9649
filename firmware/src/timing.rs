//! Conversions between the core's primitive catalog and embassy time.
//!
//! The core expresses every wait as a [`PrimitiveDuration`]; the board maps
//! each one onto the embassy timer driver. Kept host-portable so the
//! mapping stays testable without a cross build.

#![cfg_attr(not(target_os = "none"), allow(dead_code))]

use embassy_time::Duration;
use firefly_core::cadence::BLINK_HOLD_MILLIS;
use firefly_core::schedule::PrimitiveDuration;

/// Embassy duration matching one primitive sleep.
pub fn primitive_duration(primitive: PrimitiveDuration) -> Duration {
    Duration::from_millis(u64::from(primitive.millis()))
}

/// Embassy duration of the visible blink hold.
pub fn blink_hold() -> Duration {
    Duration::from_millis(u64::from(BLINK_HOLD_MILLIS))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitive_catalog_maps_onto_embassy_millis() {
        let catalog = [
            (PrimitiveDuration::Ms15, 15),
            (PrimitiveDuration::Ms250, 250),
            (PrimitiveDuration::S1, 1_000),
            (PrimitiveDuration::S2, 2_000),
            (PrimitiveDuration::S4, 4_000),
            (PrimitiveDuration::S8, 8_000),
        ];
        for (primitive, millis) in catalog {
            assert_eq!(primitive_duration(primitive).as_millis(), millis);
        }
    }

    #[test]
    fn blink_hold_stays_below_the_smallest_primitive() {
        assert!(blink_hold() < primitive_duration(PrimitiveDuration::Ms15));
    }
}
