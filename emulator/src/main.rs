mod session;

use std::env;
use std::io;
use std::process;

use crossterm::style::Stylize;

use session::{LightProfile, RunSummary, Session};

fn main() -> io::Result<()> {
    let profile = parse_profile().unwrap_or_else(|err| {
        eprintln!("{err}");
        eprintln!(
            "Usage: firefly-emulator [--profile <clear-night|early-dawn|passing-headlights>]"
        );
        process::exit(2);
    });

    let session = Session::new(profile);
    println!(
        "Simulating the {} profile...",
        format!("{profile:?}").bold()
    );

    let summary = session.run()?;
    print_summary(&summary);
    Ok(())
}

fn print_summary(summary: &RunSummary) {
    let seconds = summary.simulated_millis / 1_000;
    println!(
        "Simulated {}m{:02}s of lantern time.",
        seconds / 60,
        seconds % 60
    );

    let phases: Vec<&str> = summary
        .phases_visited
        .iter()
        .map(|phase| phase.name())
        .collect();
    println!("Phases: {}", phases.join(" -> ").cyan());
    println!(
        "Blinks: {}  Final phase: {}",
        summary.blink_count.to_string().yellow(),
        summary.final_phase.name().green()
    );
    println!(
        "Transcript appended to {}",
        summary.profile.log_path().dark_grey()
    );
}

fn parse_profile() -> Result<LightProfile, String> {
    let mut args = env::args().skip(1);
    if let Some(arg) = args.next() {
        if let Some(value) = arg.strip_prefix("--profile=") {
            LightProfile::from_tag(value)
        } else if arg == "--profile" {
            if let Some(value) = args.next() {
                LightProfile::from_tag(&value)
            } else {
                Err("Expected value after --profile".to_string())
            }
        } else {
            LightProfile::from_tag(&arg)
        }
    } else {
        Ok(LightProfile::ClearNight)
    }
}
