pub mod config;
pub mod log;
pub mod profile;
pub mod reminder;
pub mod stats;
pub mod target;

use chrono::NaiveDate;
use studytrack_core::{Clock, Database, ProfileStore, SystemClock, UserProfile};

pub type CliResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// Open the database and load the active profile.
pub fn open_profile() -> CliResult<(Database, UserProfile)> {
    let db = Database::open()?;
    let profile = ProfileStore::new(&db).require_active()?;
    Ok((db, profile))
}

/// `date`, or today when absent.
pub fn day_or_today(date: Option<NaiveDate>) -> NaiveDate {
    date.unwrap_or_else(|| SystemClock.today())
}

pub fn print_json<T: serde::Serialize>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
