//! Night-behavior sequencing state machine.
//!
//! The engine owns the board capability object, the cadence RNG, and the
//! current phase, and advances by running one phase body at a time. A phase
//! body blocks through the scheduler, probes where its contract says to,
//! and returns the next phase; a day reading short-circuits any probing
//! phase straight back to [`CadencePhase::Monitoring`]. Transitions happen
//! only at those return points, never mid-sleep.

use core::fmt;

use crate::hal::{Board, LedPin, Peripheral, PinDirection, PinLevel, PULLUPS_NONE};
use crate::rng::CadenceRng;
use crate::schedule::{self, PrimitiveDuration};
use crate::sensor::{self, SensorReading};
use crate::trace::{CadenceEvent, CadenceObserver};

/// Interval slept between daylight probes while waiting for dusk.
pub const MONITORING_INTERVAL: PrimitiveDuration = PrimitiveDuration::S8;
/// Interval between blinks inside the burst phases.
pub const BURST_INTERVAL: PrimitiveDuration = PrimitiveDuration::S1;
/// Interval slept during the steady and hold phases.
pub const STEADY_INTERVAL: PrimitiveDuration = PrimitiveDuration::S8;

/// Blinks committed without re-probing once night is first confirmed.
pub const FAST_BURST_BLINKS: u8 = 4;
/// Probe/blink rounds in the randomized burst phase.
pub const RANDOM_BURST_PROBES: u8 = 4;
/// Die sides for the escalating extra-gap draw in the randomized burst.
pub const EXTRA_GAP_DIE: u8 = 8;
/// Steady-cadence rounds before the display is considered served
/// (450 x 8 s, one simulated hour).
pub const STEADY_HOURLY_PROBES: u16 = 450;
/// Hold applied to the anode pin for one visible blink.
pub const BLINK_HOLD_MILLIS: u8 = 1;

/// One state of the night-behavior sequencer. Exactly one is active.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CadencePhase {
    /// Sleeping through daylight, probing for dusk.
    Monitoring,
    /// Committed burst right after night is confirmed; no probing.
    FastBurst,
    /// Burst with re-validation and an escalating chance of longer gaps.
    RandomBurst,
    /// Randomized intervals with widening bounds, settling toward 8 s.
    WideningInterval,
    /// Fixed 8 s cadence bounded to one simulated hour.
    SteadyHourly,
    /// Silent monitoring for the rest of the night; no blinks.
    AllNightHold,
}

impl CadencePhase {
    /// Short label used by logs and transcripts.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            CadencePhase::Monitoring => "monitoring",
            CadencePhase::FastBurst => "fast-burst",
            CadencePhase::RandomBurst => "random-burst",
            CadencePhase::WideningInterval => "widening-interval",
            CadencePhase::SteadyHourly => "steady-hourly",
            CadencePhase::AllNightHold => "all-night-hold",
        }
    }
}

impl fmt::Display for CadencePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Lower bound of the first widening interval, in seconds.
pub const INITIAL_LOW_SECONDS: u8 = 1;
/// Upper bound of the first widening interval, in seconds.
pub const INITIAL_HIGH_SECONDS: u8 = 2;
/// Bound value at which the widening phase has settled.
pub const WIDEST_BOUND_SECONDS: u8 = 8;
/// Iterations between upper-bound increments.
pub const WIDEN_HIGH_EVERY: u8 = 4;
/// Iterations between lower-bound increments.
pub const WIDEN_LOW_EVERY: u8 = 8;

/// Randomized interval bounds used only by the widening phase.
///
/// Holds `(low, high)` seconds with `1 <= low <= high <= 8` plus the
/// iteration counter driving the widening rule. Reset on every phase entry.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct IntervalBounds {
    low: u8,
    high: u8,
    iterations: u8,
}

impl IntervalBounds {
    /// Bounds as they stand at widening-phase entry.
    #[must_use]
    pub const fn reset() -> Self {
        Self {
            low: INITIAL_LOW_SECONDS,
            high: INITIAL_HIGH_SECONDS,
            iterations: 0,
        }
    }

    /// Current lower bound in seconds.
    #[must_use]
    pub const fn low(self) -> u8 {
        self.low
    }

    /// Current upper bound in seconds.
    #[must_use]
    pub const fn high(self) -> u8 {
        self.high
    }

    /// Iterations completed since phase entry.
    #[must_use]
    pub const fn iterations(self) -> u8 {
        self.iterations
    }

    /// Number of distinct interval lengths currently drawable.
    #[must_use]
    pub const fn span(self) -> u8 {
        self.high - self.low + 1
    }

    /// Applies one iteration of the widening rule.
    ///
    /// Every 4th iteration raises the upper bound until it reaches 8;
    /// every 8th raises the lower bound. The bounds therefore widen first
    /// and then narrow back together at 8 s.
    pub fn advance(&mut self) {
        self.iterations = self.iterations.wrapping_add(1);
        if self.iterations % WIDEN_HIGH_EVERY == 0 && self.high < WIDEST_BOUND_SECONDS {
            self.high += 1;
        }
        if self.iterations % WIDEN_LOW_EVERY == 0 && self.low < WIDEST_BOUND_SECONDS {
            self.low += 1;
        }
    }

    /// Returns `true` once the lower bound has climbed to 8 s.
    #[must_use]
    pub const fn is_settled(self) -> bool {
        self.low >= WIDEST_BOUND_SECONDS
    }
}

impl Default for IntervalBounds {
    fn default() -> Self {
        Self::reset()
    }
}

/// Top-level firefly behavior engine.
///
/// All mutable state (RNG lanes, active phase) lives here and resets to
/// its power-on value with the instance; nothing persists across a power
/// cycle. Execution is strictly single-threaded: a phase body blocks the
/// caller through the board's sleeps and returns only at a transition
/// point.
pub struct FireflyEngine<B: Board> {
    board: B,
    rng: CadenceRng,
    phase: CadencePhase,
}

impl<B: Board> FireflyEngine<B> {
    /// Creates an engine in the power-on state: `Monitoring`, fixed seed.
    pub fn new(board: B) -> Self {
        Self {
            board,
            rng: CadenceRng::seeded(),
            phase: CadencePhase::Monitoring,
        }
    }

    /// One-time power hygiene before the first monitoring sleep.
    ///
    /// Powers down the peripherals the cadence never uses, turns every
    /// pull-up off, and parks both LED pins as driven-low outputs.
    pub fn startup<O: CadenceObserver>(&mut self, observer: &mut O) {
        self.board.disable_peripheral(Peripheral::Timer);
        self.board.disable_peripheral(Peripheral::AnalogComparator);
        self.board.disable_peripheral(Peripheral::Adc);
        self.board.enable_pullups(PULLUPS_NONE);

        self.board.set_direction(LedPin::Anode, PinDirection::Output);
        self.board.set_level(LedPin::Anode, PinLevel::Low);
        self.board.set_direction(LedPin::Sense, PinDirection::Output);
        self.board.set_level(LedPin::Sense, PinLevel::Low);

        observer.record(CadenceEvent::PhaseEntered(self.phase));
    }

    /// Phase the next [`step`](Self::step) call will execute.
    #[must_use]
    pub const fn phase(&self) -> CadencePhase {
        self.phase
    }

    /// Accesses the owned board.
    pub const fn board(&self) -> &B {
        &self.board
    }

    /// Mutably accesses the owned board.
    pub const fn board_mut(&mut self) -> &mut B {
        &mut self.board
    }

    /// Runs the active phase body to its exit and commits the transition.
    ///
    /// Returns the phase that is now active. Re-entering the same phase
    /// (daylight holding the engine in `Monitoring`) records no event;
    /// every genuine transition records [`CadenceEvent::PhaseEntered`].
    pub fn step<O: CadenceObserver>(&mut self, observer: &mut O) -> CadencePhase {
        let next = match self.phase {
            CadencePhase::Monitoring => self.monitoring(observer),
            CadencePhase::FastBurst => self.fast_burst(observer),
            CadencePhase::RandomBurst => self.random_burst(observer),
            CadencePhase::WideningInterval => self.widening_interval(observer),
            CadencePhase::SteadyHourly => self.steady_hourly(observer),
            CadencePhase::AllNightHold => self.all_night_hold(observer),
        };

        if next != self.phase {
            observer.record(CadenceEvent::PhaseEntered(next));
        }
        self.phase = next;
        next
    }

    fn monitoring<O: CadenceObserver>(&mut self, observer: &mut O) -> CadencePhase {
        let _ = schedule::sleep_primitive(&mut self.board, MONITORING_INTERVAL);
        if self.probe(observer).is_night() {
            CadencePhase::FastBurst
        } else {
            CadencePhase::Monitoring
        }
    }

    // Commits to four seconds of blinking without re-checking, so one
    // borderline transient reading cannot produce a single stray flicker.
    fn fast_burst<O: CadenceObserver>(&mut self, observer: &mut O) -> CadencePhase {
        for _ in 0..FAST_BURST_BLINKS {
            let _ = schedule::sleep_primitive(&mut self.board, BURST_INTERVAL);
            self.blink(observer);
        }
        CadencePhase::RandomBurst
    }

    fn random_burst<O: CadenceObserver>(&mut self, observer: &mut O) -> CadencePhase {
        for round in 0..RANDOM_BURST_PROBES {
            let _ = schedule::sleep_primitive(&mut self.board, BURST_INTERVAL);
            // The extra-gap chance escalates round by round, easing the
            // cadence toward the widening intervals that follow.
            if self.rng.uniform(EXTRA_GAP_DIE) <= round {
                let _ = schedule::sleep_primitive(&mut self.board, BURST_INTERVAL);
            }
            if !self.probe(observer).is_night() {
                return CadencePhase::Monitoring;
            }
            self.blink(observer);
        }
        CadencePhase::WideningInterval
    }

    fn widening_interval<O: CadenceObserver>(&mut self, observer: &mut O) -> CadencePhase {
        let mut bounds = IntervalBounds::reset();
        loop {
            let jitter = self.rng.uniform(bounds.span());
            schedule::sleep_seconds(&mut self.board, bounds.low() + jitter);
            if !self.probe(observer).is_night() {
                return CadencePhase::Monitoring;
            }
            self.blink(observer);
            bounds.advance();
            if bounds.is_settled() {
                return CadencePhase::SteadyHourly;
            }
        }
    }

    fn steady_hourly<O: CadenceObserver>(&mut self, observer: &mut O) -> CadencePhase {
        for _ in 0..STEADY_HOURLY_PROBES {
            let _ = schedule::sleep_primitive(&mut self.board, STEADY_INTERVAL);
            if !self.probe(observer).is_night() {
                return CadencePhase::Monitoring;
            }
            self.blink(observer);
        }
        CadencePhase::AllNightHold
    }

    // The display purpose is served after the steady hour; keep watching
    // for dawn without spending charge on blinks.
    fn all_night_hold<O: CadenceObserver>(&mut self, observer: &mut O) -> CadencePhase {
        loop {
            let _ = schedule::sleep_primitive(&mut self.board, STEADY_INTERVAL);
            if !self.probe(observer).is_night() {
                return CadencePhase::Monitoring;
            }
        }
    }

    fn probe<O: CadenceObserver>(&mut self, observer: &mut O) -> SensorReading {
        let reading = sensor::probe(&mut self.board);
        observer.record(CadenceEvent::ProbeCompleted(reading));
        reading
    }

    // Too short to perturb the sensor's measurement window, and never
    // overlapping it in time.
    fn blink<O: CadenceObserver>(&mut self, observer: &mut O) {
        self.board.set_level(LedPin::Anode, PinLevel::High);
        self.board.spin_wait_millis(BLINK_HOLD_MILLIS);
        self.board.set_level(LedPin::Anode, PinLevel::Low);
        observer.record(CadenceEvent::Blink);
    }
}
