use studytrack_core::progress::study_log_page;
use studytrack_core::{Clock, SystemClock};

use super::{open_profile, print_json, CliResult};

pub fn run(page: u32) -> CliResult {
    let (db, profile) = open_profile()?;
    let page = study_log_page(&db, &profile.name, SystemClock.today(), page)?;
    print_json(&page)
}
