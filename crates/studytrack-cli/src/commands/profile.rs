use clap::Subcommand;
use studytrack_core::storage::Database;
use studytrack_core::{Clock, ProfileStore, SystemClock, UserProfile};

use super::{print_json, CliResult};

#[derive(Subcommand)]
pub enum ProfileAction {
    /// Create the active profile
    Create {
        /// Display name; scopes every stored target and log entry
        name: String,
        /// School grade (5-12)
        #[arg(long)]
        grade: u8,
        /// Replace an existing profile
        #[arg(long)]
        force: bool,
    },
    /// Print the active profile as JSON
    Show,
    /// Change the grade of the active profile
    Grade {
        grade: u8,
    },
    /// Set or clear the profile photo
    Photo {
        /// Photo URI; omit to clear
        uri: Option<String>,
    },
}

pub fn run(action: ProfileAction) -> CliResult {
    let db = Database::open()?;
    let profiles = ProfileStore::new(&db);

    match action {
        ProfileAction::Create { name, grade, force } => {
            if let Some(existing) = profiles.load_active()? {
                if !force {
                    return Err(format!(
                        "profile '{}' already exists (use --force to replace it)",
                        existing.name
                    )
                    .into());
                }
            }
            let profile = UserProfile::new(&name, grade, SystemClock.now())?;
            profiles.save(&profile)?;
            print_json(&profile)?;
        }
        ProfileAction::Show => {
            print_json(&profiles.require_active()?)?;
        }
        ProfileAction::Grade { grade } => {
            print_json(&profiles.set_grade(grade)?)?;
        }
        ProfileAction::Photo { uri } => {
            print_json(&profiles.set_photo(uri)?)?;
        }
    }
    Ok(())
}
