//! Simulated firefly runs against a virtual clock and scripted skylight.
//!
//! The emulator stands in for the physical board: every sleep advances a
//! millisecond clock, and a probe window reads whatever the active light
//! profile says the sky looks like at that instant. Each run appends a
//! timestamped transcript so behavior changes show up in review diffs.

use std::cell::Cell;
use std::fs::{self, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::rc::Rc;

use firefly_core::cadence::{CadencePhase, FireflyEngine};
use firefly_core::hal::{
    Gpio, LedPin, Peripheral, PinDirection, PinLevel, PowerSwitch, WakeCause, WakeSleep,
};
use firefly_core::schedule::PrimitiveDuration;
use firefly_core::sensor::{DISCHARGE_WINDOW, SensorReading};
use firefly_core::trace::{CadenceEvent, CadenceObserver};

/// Clock cost of a probe window terminated early by daylight.
const EARLY_WAKE_MILLIS: u64 = 40;

/// Scripted skylight timelines selectable from the command line.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LightProfile {
    /// Uninterrupted darkness; the run ends once the silent hold begins.
    ClearNight,
    /// Darkness that breaks into daylight two minutes in.
    EarlyDawn,
    /// A short burst of light mid-night, then darkness again.
    PassingHeadlights,
}

impl LightProfile {
    pub fn log_path(self) -> &'static str {
        match self {
            LightProfile::ClearNight => "transcripts/emulator-clear-night.log",
            LightProfile::EarlyDawn => "transcripts/emulator-early-dawn.log",
            LightProfile::PassingHeadlights => "transcripts/emulator-passing-headlights.log",
        }
    }

    pub fn header(self) -> &'static str {
        match self {
            LightProfile::ClearNight => "Firefly emulator clear-night transcript",
            LightProfile::EarlyDawn => "Firefly emulator early-dawn transcript",
            LightProfile::PassingHeadlights => "Firefly emulator passing-headlights transcript",
        }
    }

    pub fn from_tag(tag: &str) -> Result<Self, String> {
        if tag.eq_ignore_ascii_case("clear-night") {
            Ok(Self::ClearNight)
        } else if tag.eq_ignore_ascii_case("early-dawn") {
            Ok(Self::EarlyDawn)
        } else if tag.eq_ignore_ascii_case("passing-headlights") {
            Ok(Self::PassingHeadlights)
        } else {
            Err(format!("Unknown light profile `{tag}`"))
        }
    }

    /// Simulated time after which the run stops stepping.
    fn horizon_millis(self) -> u64 {
        match self {
            // Long enough to watch the steady hour run dry.
            LightProfile::ClearNight => 5 * 60 * 60 * 1_000,
            LightProfile::EarlyDawn => 4 * 60 * 1_000,
            LightProfile::PassingHeadlights => 5 * 60 * 1_000,
        }
    }

    fn is_dark_at(self, millis: u64) -> bool {
        match self {
            LightProfile::ClearNight => true,
            LightProfile::EarlyDawn => millis < 120_000,
            // Lit for nine seconds, longer than the widest probe gap, so
            // the sweep cannot fall between two probe windows.
            LightProfile::PassingHeadlights => !(60_000..69_000).contains(&millis),
        }
    }
}

/// Millisecond clock shared by the board and the timeline observer.
#[derive(Clone, Debug, Default)]
pub struct SharedClock(Rc<Cell<u64>>);

impl SharedClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_millis(&self) -> u64 {
        self.0.get()
    }

    fn advance(&self, millis: u64) {
        self.0.set(self.0.get() + millis);
    }
}

/// Capability implementation backed by the virtual clock and profile.
pub struct HostBoard {
    clock: SharedClock,
    profile: LightProfile,
    edge_armed: bool,
    sense_charged: bool,
    anode_high: bool,
}

impl HostBoard {
    pub fn new(clock: SharedClock, profile: LightProfile) -> Self {
        Self {
            clock,
            profile,
            edge_armed: false,
            sense_charged: false,
            anode_high: false,
        }
    }
}

impl Gpio for HostBoard {
    fn set_direction(&mut self, _pin: LedPin, _direction: PinDirection) {}

    fn set_level(&mut self, pin: LedPin, level: PinLevel) {
        match pin {
            LedPin::Anode => self.anode_high = level == PinLevel::High,
            LedPin::Sense => self.sense_charged = level == PinLevel::High,
        }
    }

    fn read_level(&mut self, pin: LedPin) -> PinLevel {
        let high = match pin {
            LedPin::Anode => self.anode_high,
            LedPin::Sense => self.sense_charged,
        };
        if high { PinLevel::High } else { PinLevel::Low }
    }

    fn enable_pullups(&mut self, _mask: u8) {}
}

impl WakeSleep for HostBoard {
    fn sleep_once(&mut self, duration: PrimitiveDuration) -> WakeCause {
        if self.edge_armed && duration == DISCHARGE_WINDOW {
            if self.profile.is_dark_at(self.clock.now_millis()) {
                self.clock.advance(u64::from(duration.millis()));
                return WakeCause::TimedOut;
            }
            self.sense_charged = false;
            self.clock.advance(EARLY_WAKE_MILLIS);
            return WakeCause::EdgeTriggered;
        }

        self.clock.advance(u64::from(duration.millis()));
        WakeCause::TimedOut
    }

    fn arm_edge_wake(&mut self, _pin: LedPin) {
        self.edge_armed = true;
    }

    fn disarm_edge_wake(&mut self, _pin: LedPin) {
        self.edge_armed = false;
    }

    fn spin_wait_millis(&mut self, millis: u8) {
        self.clock.advance(u64::from(millis));
    }
}

impl PowerSwitch for HostBoard {
    fn disable_peripheral(&mut self, _peripheral: Peripheral) {}
}

/// Observer stamping every engine event with the virtual clock.
pub struct TimelineObserver {
    clock: SharedClock,
    events: Vec<(u64, CadenceEvent)>,
}

impl TimelineObserver {
    pub fn new(clock: SharedClock) -> Self {
        Self {
            clock,
            events: Vec::new(),
        }
    }

    pub fn events(&self) -> &[(u64, CadenceEvent)] {
        &self.events
    }
}

impl CadenceObserver for TimelineObserver {
    fn record(&mut self, event: CadenceEvent) {
        self.events.push((self.clock.now_millis(), event));
    }
}

/// Aggregate results of one simulated run.
pub struct RunSummary {
    pub profile: LightProfile,
    pub simulated_millis: u64,
    pub blink_count: usize,
    pub phases_visited: Vec<CadencePhase>,
    pub final_phase: CadencePhase,
}

pub struct Session {
    profile: LightProfile,
    clock: SharedClock,
    engine: FireflyEngine<HostBoard>,
    observer: TimelineObserver,
}

impl Session {
    pub fn new(profile: LightProfile) -> Self {
        let clock = SharedClock::new();
        let board = HostBoard::new(clock.clone(), profile);
        Self {
            profile,
            clock: clock.clone(),
            engine: FireflyEngine::new(board),
            observer: TimelineObserver::new(clock),
        }
    }

    /// Steps the engine until the profile horizon or the silent hold,
    /// then writes the transcript and returns the summary.
    pub fn run(mut self) -> io::Result<RunSummary> {
        self.engine.startup(&mut self.observer);

        let horizon = self.profile.horizon_millis();
        while self.clock.now_millis() < horizon {
            if self.engine.step(&mut self.observer) == CadencePhase::AllNightHold {
                // Nothing further blinks tonight; the hold would otherwise
                // spin the simulated clock until dawn.
                break;
            }
        }

        let summary = self.summarize();
        write_transcript(self.profile, self.observer.events())?;
        Ok(summary)
    }

    fn summarize(&self) -> RunSummary {
        let events = self.observer.events();
        let blink_count = events
            .iter()
            .filter(|(_, event)| matches!(event, CadenceEvent::Blink))
            .count();
        let phases_visited = events
            .iter()
            .filter_map(|(_, event)| match event {
                CadenceEvent::PhaseEntered(phase) => Some(*phase),
                _ => None,
            })
            .collect();

        RunSummary {
            profile: self.profile,
            simulated_millis: self.clock.now_millis(),
            blink_count,
            phases_visited,
            final_phase: self.engine.phase(),
        }
    }
}

fn write_transcript(profile: LightProfile, events: &[(u64, CadenceEvent)]) -> io::Result<()> {
    let path = Path::new(profile.log_path());
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "# {}", profile.header())?;
    let mut blink_index = 0usize;
    for (millis, event) in events {
        let stamp = format!("[+{:04}.{:03}s]", millis / 1_000, millis % 1_000);
        match event {
            CadenceEvent::PhaseEntered(phase) => {
                writeln!(writer, "{stamp} phase  {phase}")?;
            }
            CadenceEvent::ProbeCompleted(reading) => {
                let label = match reading {
                    SensorReading::Night => "night",
                    SensorReading::Day => "day",
                };
                writeln!(writer, "{stamp} probe  {label}")?;
            }
            CadenceEvent::Blink => {
                blink_index += 1;
                writeln!(writer, "{stamp} blink  #{blink_index}")?;
            }
        }
    }
    writeln!(writer)?;
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_night_reaches_the_silent_hold() {
        let summary = Session::new(LightProfile::ClearNight)
            .run()
            .expect("run should write its transcript");

        assert_eq!(summary.final_phase, CadencePhase::AllNightHold);
        assert_eq!(
            summary.phases_visited,
            [
                CadencePhase::Monitoring,
                CadencePhase::FastBurst,
                CadencePhase::RandomBurst,
                CadencePhase::WideningInterval,
                CadencePhase::SteadyHourly,
                CadencePhase::AllNightHold,
            ]
        );
        // 4 burst + 4 random + 56 widening + 450 steady blinks.
        assert_eq!(summary.blink_count, 514);
    }

    #[test]
    fn early_dawn_returns_to_monitoring() {
        let summary = Session::new(LightProfile::EarlyDawn)
            .run()
            .expect("run should write its transcript");

        assert_eq!(summary.final_phase, CadencePhase::Monitoring);
        assert!(summary.phases_visited.contains(&CadencePhase::FastBurst));
        assert!(
            !summary
                .phases_visited
                .contains(&CadencePhase::SteadyHourly),
            "dawn lands well before the steady hour"
        );
    }

    #[test]
    fn passing_headlights_restart_the_night_cycle() {
        let summary = Session::new(LightProfile::PassingHeadlights)
            .run()
            .expect("run should write its transcript");

        let fast_bursts = summary
            .phases_visited
            .iter()
            .filter(|phase| **phase == CadencePhase::FastBurst)
            .count();
        assert!(
            fast_bursts >= 2,
            "the cycle should restart after the light passes"
        );
    }
}
