#![no_std]

#[cfg(feature = "alloc")]
extern crate alloc;

// Behavioral engine for the solar firefly lantern.
//
// This crate stays portable across MCU firmware and host tooling by avoiding
// the Rust standard library and reaching all hardware through the capability
// traits in [`hal`]. Everything with algorithmic content lives here: the
// cadence state machine, the duration-composition scheduler, the LED
// charge-probe light sensor, and the pseudo-random cadence generator.

pub mod cadence;
pub mod hal;
pub mod rng;
pub mod schedule;
pub mod sensor;
pub mod trace;
