use chrono::NaiveDate;
use clap::Subcommand;
use studytrack_core::progress::summarize_day;

use super::{day_or_today, open_profile, print_json, CliResult};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Completed targets and totals for one day
    Day {
        /// YYYY-MM-DD, default today
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

pub fn run(action: StatsAction) -> CliResult {
    let (db, profile) = open_profile()?;

    match action {
        StatsAction::Day { date } => {
            let summary = summarize_day(&db, &profile.name, day_or_today(date))?;
            print_json(&summary)?;
        }
    }
    Ok(())
}
