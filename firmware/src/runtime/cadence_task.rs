use crate::hw::board::FireflyBoard;
use crate::hw::observer::DefmtObserver;
use firefly_core::cadence::FireflyEngine;

#[embassy_executor::task]
pub async fn run(mut engine: FireflyEngine<FireflyBoard>) -> ! {
    let mut observer = DefmtObserver::new();
    engine.startup(&mut observer);
    loop {
        engine.step(&mut observer);
    }
}
