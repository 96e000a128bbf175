use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::progress::ProgressRecord;
use crate::target::TargetKey;

/// Every successful target transition produces an Event.
/// The presentation layer renders them; the CLI prints them as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TargetAdded {
        target: TargetKey,
        at: DateTime<Utc>,
    },
    TimerStarted {
        target: TargetKey,
        /// Elapsed time carried over from a previous pause.
        resumed_from_ms: i64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        target: TargetKey,
        elapsed_ms: i64,
        at: DateTime<Utc>,
    },
    TimerStopped {
        target: TargetKey,
        duration_min: u32,
        at: DateTime<Utc>,
    },
    /// Live refresh of the running timer. Never persisted.
    TimerTick {
        target: TargetKey,
        elapsed_ms: i64,
        display: String,
        at: DateTime<Utc>,
    },
    DurationEntered {
        target: TargetKey,
        duration_min: u32,
        at: DateTime<Utc>,
    },
    TargetCompleted {
        target: TargetKey,
        duration_min: u32,
        record: ProgressRecord,
        at: DateTime<Utc>,
    },
    TargetUncompleted {
        target: TargetKey,
        /// Progress records removed from the day's log.
        removed_records: usize,
        at: DateTime<Utc>,
    },
    TargetDeleted {
        target: TargetKey,
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn target(&self) -> &TargetKey {
        match self {
            Event::TargetAdded { target, .. }
            | Event::TimerStarted { target, .. }
            | Event::TimerPaused { target, .. }
            | Event::TimerStopped { target, .. }
            | Event::TimerTick { target, .. }
            | Event::DurationEntered { target, .. }
            | Event::TargetCompleted { target, .. }
            | Event::TargetUncompleted { target, .. }
            | Event::TargetDeleted { target, .. } => target,
        }
    }
}
