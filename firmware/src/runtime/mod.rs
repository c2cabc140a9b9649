use cortex_m::interrupt;
use cortex_m::register::primask;
use critical_section::{self, RawRestoreState};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_stm32 as hal;
use embassy_stm32::gpio::{Flex, Level, Output, Speed};

use crate::hw::board::FireflyBoard;
use firefly_core::cadence::FireflyEngine;

mod cadence_task;

critical_section::set_impl!(InterruptCriticalSection);

struct InterruptCriticalSection;

unsafe impl critical_section::Impl for InterruptCriticalSection {
    unsafe fn acquire() -> RawRestoreState {
        let primask = primask::read();
        interrupt::disable();
        primask.is_active()
    }

    unsafe fn release(restore_state: RawRestoreState) {
        if restore_state {
            unsafe {
                interrupt::enable();
            }
        }
    }
}

#[embassy_executor::main]
pub async fn main(spawner: Spawner) {
    let config = hal::Config::default();
    let hal::Peripherals { PA0, PA1, .. } = hal::init(config);

    let anode = Output::new(PA0, Level::Low, Speed::Low);
    let mut sense = Flex::new(PA1);
    sense.set_as_output(Speed::Low);
    sense.set_low();

    let engine = FireflyEngine::new(FireflyBoard::new(anode, sense));

    spawner
        .spawn(cadence_task::run(engine))
        .expect("failed to spawn cadence task");

    core::future::pending::<()>().await;
}
