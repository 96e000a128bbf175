//! Daily study reminder.
//!
//! Only the reminder's content and time are decided here; registering it
//! with the operating system belongs to the host application. Call
//! [`plan_daily_reminder`] once at startup with the profile name.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::storage::{KeyValueStore, ReminderConfig};
use crate::target::targets_for_day;

pub const REMINDER_TITLE: &str = "Daily target reminder";
pub const BODY_TARGETS_WAITING: &str = "Your targets are waiting!";
pub const BODY_NO_TARGETS: &str = "You haven't set a target for today yet!";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyReminder {
    pub hour: u32,
    pub minute: u32,
    pub title: String,
    pub body: String,
    pub repeats: bool,
}

/// The repeating daily reminder for `profile`, or `None` when disabled.
pub fn plan_daily_reminder<S: KeyValueStore + ?Sized>(
    store: &S,
    profile: &str,
    today: NaiveDate,
    config: &ReminderConfig,
) -> Option<DailyReminder> {
    if !config.enabled {
        return None;
    }

    let has_targets = match targets_for_day(store, profile, today) {
        Ok(targets) => !targets.is_empty(),
        Err(e) => {
            warn!(%profile, error = %e, "could not read targets for reminder");
            false
        }
    };
    let body = if has_targets {
        BODY_TARGETS_WAITING
    } else {
        BODY_NO_TARGETS
    };

    Some(DailyReminder {
        hour: config.hour,
        minute: config.minute,
        title: REMINDER_TITLE.to_string(),
        body: body.to_string(),
        repeats: true,
    })
}
