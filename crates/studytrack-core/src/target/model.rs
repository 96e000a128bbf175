use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Shortest duration a finished session can record, in minutes.
pub const MIN_DURATION_MIN: u32 = 1;

const MS_PER_MINUTE: i64 = 60_000;

/// Live timing session attached to a target.
///
/// Stored as `timerState` and only present while a session is running or
/// paused. `start_time` is shifted back by the elapsed time on resume, so
/// `now - start_time` is always the cumulative elapsed time while running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    pub is_running: bool,
    pub is_paused: bool,
    /// Epoch milliseconds.
    pub start_time: i64,
    /// Milliseconds. Frozen while paused, refreshed by ticks while running.
    pub elapsed_time: i64,
}

impl TimerSnapshot {
    /// A running session that carries over `previous_elapsed` ms.
    pub fn started(now_ms: i64, previous_elapsed: i64) -> Self {
        Self {
            is_running: true,
            is_paused: false,
            start_time: now_ms - previous_elapsed,
            elapsed_time: previous_elapsed,
        }
    }

    /// Running and not paused.
    pub fn is_ticking(&self) -> bool {
        self.is_running && !self.is_paused
    }

    pub fn elapsed_ms(&self, now_ms: i64) -> i64 {
        if self.is_paused {
            self.elapsed_time
        } else {
            now_ms.saturating_sub(self.start_time).max(0)
        }
    }
}

/// Where a target sits in its lifecycle, derived from its fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetPhase {
    Planned,
    Running,
    Paused,
    Stopped,
    Completed,
}

/// One planned unit of study work for a single day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    pub subject: String,
    pub topic: String,
    /// Planned question count.
    pub target_count: u32,
    pub date: NaiveDate,
    #[serde(default)]
    pub completed: bool,
    /// Minutes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timer_state: Option<TimerSnapshot>,
}

impl Target {
    pub fn new(
        subject: impl Into<String>,
        topic: impl Into<String>,
        target_count: u32,
        date: NaiveDate,
    ) -> Self {
        Self {
            subject: subject.into(),
            topic: topic.into(),
            target_count,
            date,
            completed: false,
            duration: None,
            timer_state: None,
        }
    }

    pub fn key(&self) -> TargetKey {
        TargetKey {
            date: self.date,
            subject: self.subject.clone(),
            topic: self.topic.clone(),
            target_count: self.target_count,
        }
    }

    pub fn matches(&self, key: &TargetKey) -> bool {
        self.date == key.date
            && self.subject == key.subject
            && self.topic == key.topic
            && self.target_count == key.target_count
    }

    pub fn phase(&self) -> TargetPhase {
        if self.completed {
            return TargetPhase::Completed;
        }
        match (&self.timer_state, self.duration) {
            (Some(t), _) if t.is_paused => TargetPhase::Paused,
            (Some(_), _) => TargetPhase::Running,
            (None, Some(_)) => TargetPhase::Stopped,
            (None, None) => TargetPhase::Planned,
        }
    }

    /// Display value: live `HH:MM:SS` while a session exists, else `"{n} dk"`.
    pub fn format_duration(&self, now_ms: i64) -> String {
        match (&self.timer_state, self.duration) {
            (Some(timer), _) => format_hms(timer.elapsed_ms(now_ms)),
            (None, Some(minutes)) => format_minutes(minutes),
            (None, None) => format_minutes(0),
        }
    }
}

/// Natural identity of a target. There is no surrogate id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetKey {
    pub date: NaiveDate,
    pub subject: String,
    pub topic: String,
    pub target_count: u32,
}

impl fmt::Display for TargetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} / {} ({} questions)",
            self.date, self.subject, self.topic, self.target_count
        )
    }
}

/// Whole minutes in `ms`, never below [`MIN_DURATION_MIN`].
pub fn minutes_from_ms(ms: i64) -> u32 {
    let minutes = (ms.max(0) / MS_PER_MINUTE).min(u32::MAX as i64) as u32;
    minutes.max(MIN_DURATION_MIN)
}

pub fn format_hms(ms: i64) -> String {
    let total_secs = ms.max(0) / 1000;
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

pub fn format_minutes(minutes: u32) -> String {
    format!("{minutes} dk")
}
