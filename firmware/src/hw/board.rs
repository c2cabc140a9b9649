//! Board implementation of the core capability surface for the STM32G0.
//!
//! The anode is a plain push-pull output; the sense line is a
//! direction-switchable [`Flex`] pin so the probe can charge it as an
//! output and then float it as an input for the discharge window. The
//! core is synchronous by design, so each primitive sleep parks the sole
//! executor task on the embassy timer via `block_on`; during an armed
//! probe window the timer is raced against a tight poll of the sense
//! line, since the direction-switching driver cannot also own the pin's
//! EXTI channel.

use embassy_futures::block_on;
use embassy_futures::select::{Either, select};
use embassy_stm32::gpio::{Flex, Output, Pull, Speed};
use embassy_time::{Duration, Timer, block_for};

use firefly_core::hal::{
    Gpio, LedPin, Peripheral, PinDirection, PinLevel, PowerSwitch, WakeCause, WakeSleep,
};
use firefly_core::schedule::PrimitiveDuration;

use crate::timing;

/// Poll cadence for discharge detection inside an armed probe window.
const EDGE_POLL: Duration = Duration::from_micros(500);

/// The two LED pins wired as the lantern's entire I/O surface.
pub struct FireflyBoard {
    anode: Output<'static>,
    sense: Flex<'static>,
    edge_armed: bool,
}

impl FireflyBoard {
    /// Wraps the already-initialized pins. The sense line arrives as a
    /// driven-low output, its idle state between probes.
    pub fn new(anode: Output<'static>, sense: Flex<'static>) -> Self {
        Self {
            anode,
            sense,
            edge_armed: false,
        }
    }

    async fn wait_for_discharge(sense: &Flex<'static>) {
        loop {
            if sense.is_low() {
                return;
            }
            Timer::after(EDGE_POLL).await;
        }
    }
}

impl Gpio for FireflyBoard {
    fn set_direction(&mut self, pin: LedPin, direction: PinDirection) {
        match pin {
            // The anode never leaves output mode.
            LedPin::Anode => {}
            LedPin::Sense => match direction {
                PinDirection::Output => self.sense.set_as_output(Speed::Low),
                PinDirection::Input => self.sense.set_as_input(Pull::None),
            },
        }
    }

    fn set_level(&mut self, pin: LedPin, level: PinLevel) {
        match (pin, level) {
            (LedPin::Anode, PinLevel::High) => self.anode.set_high(),
            (LedPin::Anode, PinLevel::Low) => self.anode.set_low(),
            (LedPin::Sense, PinLevel::High) => self.sense.set_high(),
            (LedPin::Sense, PinLevel::Low) => self.sense.set_low(),
        }
    }

    fn read_level(&mut self, pin: LedPin) -> PinLevel {
        let high = match pin {
            LedPin::Anode => self.anode.is_set_high(),
            LedPin::Sense => self.sense.is_high(),
        };
        if high { PinLevel::High } else { PinLevel::Low }
    }

    fn enable_pullups(&mut self, _mask: u8) {
        // Pull configuration is per-pin on this part and both pins are
        // created with pulls disabled; the probe needs the sense line
        // floating, so there is nothing to switch here.
    }
}

impl WakeSleep for FireflyBoard {
    fn sleep_once(&mut self, duration: PrimitiveDuration) -> WakeCause {
        let interval = timing::primitive_duration(duration);
        if self.edge_armed {
            match block_on(select(
                Timer::after(interval),
                Self::wait_for_discharge(&self.sense),
            )) {
                Either::First(()) => WakeCause::TimedOut,
                Either::Second(()) => WakeCause::EdgeTriggered,
            }
        } else {
            block_on(Timer::after(interval));
            WakeCause::TimedOut
        }
    }

    fn arm_edge_wake(&mut self, pin: LedPin) {
        if pin == LedPin::Sense {
            self.edge_armed = true;
        }
    }

    fn disarm_edge_wake(&mut self, pin: LedPin) {
        if pin == LedPin::Sense {
            self.edge_armed = false;
        }
    }

    fn spin_wait_millis(&mut self, millis: u8) {
        block_for(Duration::from_millis(u64::from(millis)));
    }
}

impl PowerSwitch for FireflyBoard {
    fn disable_peripheral(&mut self, _peripheral: Peripheral) {
        // embassy's RCC setup leaves a peripheral unclocked until a
        // driver claims it; none of the named peripherals ever get a
        // driver in this firmware, so they stay dark from reset.
    }
}
