//! Capability surface the engine consumes from the platform layer.
//!
//! The core never touches hardware registers. Firmware and the host-side
//! emulator each provide one board object implementing these traits; the
//! engine owns that object and threads it through every operation. The
//! traits are infallible by contract: at this level a GPIO write or a
//! countdown sleep cannot fail on working hardware, and a wake interrupt
//! that never fires is a platform defect handled by the external watchdog,
//! not by the core.

use crate::schedule::PrimitiveDuration;

/// The two LED pins the controller drives.
///
/// The same LED is both the display actuator and the light sensor: the
/// anode is driven for blinks, and the sense (cathode) line is charged and
/// released to measure ambient light through junction photocurrent.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum LedPin {
    /// LED anode drive line; always an output.
    Anode,
    /// LED cathode/sense line; output except during probe windows.
    Sense,
}

/// Direction of a GPIO line.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PinDirection {
    Output,
    Input,
}

/// Logic level of a GPIO line.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PinLevel {
    Low,
    High,
}

/// Why a primitive sleep returned.
///
/// The probe-window race between the countdown timer and the armed edge
/// trigger surfaces here as an explicit tagged result instead of a shared
/// side-channel flag, so probe classification has a testable input.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum WakeCause {
    /// The requested interval elapsed in full.
    TimedOut,
    /// The armed sense-pin edge fired before the interval elapsed.
    EdgeTriggered,
}

/// Peripherals powered down once at startup.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Peripheral {
    Timer,
    AnalogComparator,
    Adc,
}

/// Pull-up mask value meaning every pull-up is off.
///
/// The charge probe relies on the LED's junction capacitance holding the
/// sense line; a pull-up would mask the photocurrent discharge entirely.
pub const PULLUPS_NONE: u8 = 0x00;

/// GPIO capability for the two LED pins.
pub trait Gpio {
    /// Sets the direction of a pin.
    fn set_direction(&mut self, pin: LedPin, direction: PinDirection);

    /// Drives an output pin to the requested level.
    fn set_level(&mut self, pin: LedPin, level: PinLevel);

    /// Samples the digital level of a pin.
    fn read_level(&mut self, pin: LedPin) -> PinLevel;

    /// Configures the port pull-up mask.
    fn enable_pullups(&mut self, mask: u8);
}

/// Deep-sleep capability built on the platform's periodic countdown wake.
pub trait WakeSleep {
    /// Blocks in power-down for one primitive interval.
    ///
    /// The implementation must re-arm the countdown wake before suspending,
    /// every time, so a missed re-arm can only be a platform defect covered
    /// by the independent watchdog reset. Returns early with
    /// [`WakeCause::EdgeTriggered`] only while an edge wake is armed.
    fn sleep_once(&mut self, duration: PrimitiveDuration) -> WakeCause;

    /// Arms the secondary edge-triggered wake source on a pin.
    ///
    /// Armed strictly for the duration of a probe window; left disarmed
    /// otherwise so stray transitions cannot wake the processor.
    fn arm_edge_wake(&mut self, pin: LedPin);

    /// Disarms the edge-triggered wake source.
    fn disarm_edge_wake(&mut self, pin: LedPin);

    /// Busy-waits without entering power-down.
    ///
    /// Used only for the ~1 ms blink hold, which is far below the smallest
    /// power-down primitive.
    fn spin_wait_millis(&mut self, millis: u8);
}

/// One-time peripheral power-down capability.
pub trait PowerSwitch {
    /// Removes power from an unused peripheral.
    fn disable_peripheral(&mut self, peripheral: Peripheral);
}

/// Marker for a board object providing the full capability surface.
pub trait Board: Gpio + WakeSleep + PowerSwitch {}

impl<T> Board for T where T: Gpio + WakeSleep + PowerSwitch {}
