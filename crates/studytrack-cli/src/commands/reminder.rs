use studytrack_core::{plan_daily_reminder, Clock, Config, SystemClock};

use super::{open_profile, print_json, CliResult};

pub fn run() -> CliResult {
    let (db, profile) = open_profile()?;
    let config = Config::load()?;
    match plan_daily_reminder(&db, &profile.name, SystemClock.today(), &config.reminder) {
        Some(reminder) => print_json(&reminder)?,
        None => println!("daily reminder is disabled"),
    }
    Ok(())
}
