//! Cadence trace events shared by firmware logging and host tooling.
//!
//! The LED is the device's only real output, so the trace exists for the
//! benefit of tests and the emulator: every phase transition, probe
//! outcome, and blink flows through a [`CadenceObserver`]. Firmware
//! forwards events to its logger; the emulator and the test suites buffer
//! them for inspection.

use heapless::HistoryBuf;

use crate::cadence::CadencePhase;
use crate::sensor::SensorReading;

/// Observable moments in the engine's execution.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CadenceEvent {
    /// The engine committed a transition into a phase.
    PhaseEntered(CadencePhase),
    /// A probe completed with the given reading.
    ProbeCompleted(SensorReading),
    /// The indicator LED was pulsed.
    Blink,
}

/// Sink for engine events.
pub trait CadenceObserver {
    /// Records one event.
    fn record(&mut self, event: CadenceEvent);
}

/// Observer that discards every event.
#[derive(Copy, Clone, Debug, Default)]
pub struct NullObserver;

impl NullObserver {
    /// Creates a new discarding observer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl CadenceObserver for NullObserver {
    fn record(&mut self, _event: CadenceEvent) {}
}

/// Default capacity for [`TraceBuffer`]; enough for several phases of a
/// simulated night without growth.
pub const DEFAULT_TRACE_CAPACITY: usize = 256;

/// Bounded in-memory event history.
///
/// Backed by a ring buffer: once full, the oldest events fall off, which is
/// the behavior long-running hosts want from a diagnostic trace.
pub struct TraceBuffer<const CAPACITY: usize = DEFAULT_TRACE_CAPACITY> {
    events: HistoryBuf<CadenceEvent, CAPACITY>,
}

impl<const CAPACITY: usize> TraceBuffer<CAPACITY> {
    /// Creates an empty trace.
    #[must_use]
    pub fn new() -> Self {
        Self {
            events: HistoryBuf::new(),
        }
    }

    /// Number of events currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns `true` when no events have been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Most recently recorded event, if any.
    #[must_use]
    pub fn latest(&self) -> Option<&CadenceEvent> {
        self.events.recent()
    }

    /// Iterates events oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &CadenceEvent> {
        self.events.oldest_ordered()
    }

    /// Counts recorded blinks.
    #[must_use]
    pub fn blink_count(&self) -> usize {
        self.iter()
            .filter(|event| matches!(event, CadenceEvent::Blink))
            .count()
    }

    /// Phases in the order they were entered.
    pub fn phases(&self) -> impl Iterator<Item = CadencePhase> + '_ {
        self.iter().filter_map(|event| match event {
            CadenceEvent::PhaseEntered(phase) => Some(*phase),
            _ => None,
        })
    }
}

impl<const CAPACITY: usize> Default for TraceBuffer<CAPACITY> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const CAPACITY: usize> CadenceObserver for TraceBuffer<CAPACITY> {
    fn record(&mut self, event: CadenceEvent) {
        self.events.write(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trace_buffer_orders_events_oldest_first() {
        let mut trace: TraceBuffer<8> = TraceBuffer::new();
        trace.record(CadenceEvent::PhaseEntered(CadencePhase::FastBurst));
        trace.record(CadenceEvent::Blink);
        trace.record(CadenceEvent::ProbeCompleted(SensorReading::Night));

        let events: heapless::Vec<&CadenceEvent, 8> = trace.iter().collect();
        assert_eq!(events.len(), 3);
        assert_eq!(
            *events[0],
            CadenceEvent::PhaseEntered(CadencePhase::FastBurst)
        );
        assert_eq!(
            trace.latest(),
            Some(&CadenceEvent::ProbeCompleted(SensorReading::Night))
        );
    }

    #[test]
    fn trace_buffer_drops_oldest_when_full() {
        let mut trace: TraceBuffer<2> = TraceBuffer::new();
        trace.record(CadenceEvent::Blink);
        trace.record(CadenceEvent::Blink);
        trace.record(CadenceEvent::PhaseEntered(CadencePhase::Monitoring));

        assert_eq!(trace.len(), 2);
        assert_eq!(trace.blink_count(), 1);
    }

    #[test]
    fn phase_iterator_skips_other_events() {
        let mut trace: TraceBuffer<8> = TraceBuffer::new();
        trace.record(CadenceEvent::PhaseEntered(CadencePhase::Monitoring));
        trace.record(CadenceEvent::Blink);
        trace.record(CadenceEvent::PhaseEntered(CadencePhase::FastBurst));

        let phases: heapless::Vec<CadencePhase, 8> = trace.phases().collect();
        assert_eq!(
            phases.as_slice(),
            [CadencePhase::Monitoring, CadencePhase::FastBurst]
        );
    }

    #[test]
    fn null_observer_ignores_everything() {
        let mut observer = NullObserver::new();
        observer.record(CadenceEvent::Blink);
    }
}
