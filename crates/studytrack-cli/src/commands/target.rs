use std::time::Duration;

use chrono::NaiveDate;
use clap::Subcommand;
use serde::Serialize;
use studytrack_core::storage::Database;
use studytrack_core::target::add_target;
use studytrack_core::{
    Config, Event, LifecycleManager, NewTarget, SystemClock, TargetKey, TargetPhase, Ticker,
};

use super::{day_or_today, open_profile, print_json, CliResult};

type Manager = LifecycleManager<Database, SystemClock>;

#[derive(Subcommand)]
pub enum TargetAction {
    /// Plan a new target for today or a future day
    Add {
        subject: String,
        topic: String,
        /// Number of questions to solve
        #[arg(allow_negative_numbers = true)]
        count: i64,
        /// Day to plan for (YYYY-MM-DD, default today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// List the day's targets
    List {
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Start or resume the timer of a target
    Play {
        /// Position in the day's list, starting at 1
        index: usize,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Pause a running timer
    Pause {
        index: usize,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Stop a timer and record its minutes
    Stop {
        index: usize,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Mark a target completed and append it to the study log
    Complete {
        index: usize,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Revert a completion and remove its study log entry
    Uncomplete {
        index: usize,
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Confirm the change
        #[arg(long)]
        yes: bool,
    },
    /// Delete an incomplete target
    Delete {
        index: usize,
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
    /// Enter the studied minutes by hand
    Duration {
        index: usize,
        /// Whole minutes
        #[arg(allow_hyphen_values = true)]
        minutes: String,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Print the running timer every tick until it is paused or stopped
    Watch {
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TargetRow {
    index: usize,
    subject: String,
    topic: String,
    target_count: u32,
    date: NaiveDate,
    phase: TargetPhase,
    display: String,
    completed: bool,
}

fn load_manager(date: Option<NaiveDate>) -> CliResult<Manager> {
    let (db, profile) = open_profile()?;
    Ok(LifecycleManager::load(db, SystemClock, profile.name, day_or_today(date))?)
}

fn key_at(manager: &Manager, index: usize) -> CliResult<TargetKey> {
    index
        .checked_sub(1)
        .and_then(|i| manager.targets().get(i))
        .map(|t| t.key())
        .ok_or_else(|| {
            format!(
                "no target #{index} on {} ({} planned)",
                manager.day(),
                manager.targets().len()
            )
            .into()
        })
}

fn confirmed(yes: bool, what: &str) -> CliResult {
    if yes {
        Ok(())
    } else {
        Err(format!("{what} needs confirmation; pass --yes").into())
    }
}

pub fn run(action: TargetAction) -> CliResult {
    match action {
        TargetAction::Add {
            subject,
            topic,
            count,
            date,
        } => {
            let (db, profile) = open_profile()?;
            let event = add_target(
                &db,
                &SystemClock,
                &profile.name,
                NewTarget {
                    subject,
                    topic,
                    target_count: count,
                    date: day_or_today(date),
                },
            )?;
            print_json(&event)?;
        }
        TargetAction::List { date } => {
            let manager = load_manager(date)?;
            let rows: Vec<TargetRow> = manager
                .targets()
                .iter()
                .enumerate()
                .map(|(i, t)| TargetRow {
                    index: i + 1,
                    subject: t.subject.clone(),
                    topic: t.topic.clone(),
                    target_count: t.target_count,
                    date: t.date,
                    phase: t.phase(),
                    display: manager.format_duration(&t.key()).unwrap_or_default(),
                    completed: t.completed,
                })
                .collect();
            print_json(&rows)?;
        }
        TargetAction::Play { index, date } => {
            apply(date, index, |m, key| m.play(key))?;
        }
        TargetAction::Pause { index, date } => {
            apply(date, index, |m, key| m.pause(key))?;
        }
        TargetAction::Stop { index, date } => {
            apply(date, index, |m, key| m.stop(key))?;
        }
        TargetAction::Complete { index, date } => {
            apply(date, index, |m, key| m.complete(key))?;
        }
        TargetAction::Uncomplete { index, date, yes } => {
            confirmed(yes, "uncomplete")?;
            apply(date, index, |m, key| m.uncomplete(key))?;
        }
        TargetAction::Delete { index, date, yes } => {
            confirmed(yes, "delete")?;
            apply(date, index, |m, key| m.delete(key))?;
        }
        TargetAction::Duration {
            index,
            minutes,
            date,
        } => {
            apply(date, index, |m, key| m.set_manual_duration(key, &minutes))?;
        }
        TargetAction::Watch { date } => watch(date)?,
    }
    Ok(())
}

fn apply<F>(date: Option<NaiveDate>, index: usize, intent: F) -> CliResult
where
    F: FnOnce(&mut Manager, &TargetKey) -> Result<Event, studytrack_core::LifecycleError>,
{
    let mut manager = load_manager(date)?;
    let key = key_at(&manager, index)?;
    let event = intent(&mut manager, &key)?;
    print_json(&event)
}

/// Another invocation may pause or stop the timer, so the manager reloads
/// from storage before every tick.
fn watch(date: Option<NaiveDate>) -> CliResult {
    let mut manager = load_manager(date)?;
    if !manager.has_running_timer() {
        println!("no running timer");
        return Ok(());
    }
    let period = Duration::from_millis(Config::load_or_default().timer.tick_interval_ms);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;
    runtime.block_on(async move {
        let ticker = Ticker::spawn(period, move || {
            if let Err(e) = manager.reload() {
                tracing::warn!(error = %e, "reload failed; stopping watch");
                return false;
            }
            match manager.tick() {
                Some(Event::TimerTick { target, display, .. }) => {
                    println!("{} / {}  {display}", target.subject, target.topic);
                    true
                }
                _ => false,
            }
        });
        ticker.finished().await
    })?;
    println!("timer no longer running");
    Ok(())
}
