//! Cadence trace forwarding to the defmt log stream.

use firefly_core::sensor::SensorReading;
use firefly_core::trace::{CadenceEvent, CadenceObserver};

/// Observer that mirrors engine events onto the RTT log.
#[derive(Copy, Clone, Debug, Default)]
pub struct DefmtObserver;

impl DefmtObserver {
    pub const fn new() -> Self {
        Self
    }
}

impl CadenceObserver for DefmtObserver {
    fn record(&mut self, event: CadenceEvent) {
        match event {
            CadenceEvent::PhaseEntered(phase) => {
                defmt::info!("cadence: entering {}", phase.name());
            }
            CadenceEvent::ProbeCompleted(reading) => {
                let label = match reading {
                    SensorReading::Night => "night",
                    SensorReading::Day => "day",
                };
                defmt::debug!("probe: {}", label);
            }
            CadenceEvent::Blink => defmt::trace!("blink"),
        }
    }
}
