use std::io;

#[allow(dead_code)]
#[path = "../session.rs"]
mod session;

use session::{LightProfile, Session};

fn main() -> io::Result<()> {
    record_profile(LightProfile::ClearNight)?;
    record_profile(LightProfile::EarlyDawn)?;
    record_profile(LightProfile::PassingHeadlights)?;
    Ok(())
}

fn record_profile(profile: LightProfile) -> io::Result<()> {
    let summary = Session::new(profile).run()?;
    println!(
        "{:?}: {} blinks over {}s, transcript at {}",
        profile,
        summary.blink_count,
        summary.simulated_millis / 1_000,
        profile.log_path()
    );
    Ok(())
}
