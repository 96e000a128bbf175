//! Completed-session log and daily aggregates.
//!
//! Each completed target appends one [`ProgressRecord`] to the day's list.
//! Daily totals are always recomputed from the records, never stored.

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::storage::{progress_key, read_json, write_json, KeyValueStore};
use crate::target::Target;

/// Days shown per study log page.
pub const DAYS_PER_PAGE: u32 = 7;

/// How far past a page to look when deciding whether older data exists.
const LOOKAHEAD_DAYS: u32 = 7;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    pub subject: String,
    pub topic: String,
    pub question_count: u32,
    /// Minutes.
    pub duration: u32,
    pub timestamp: DateTime<Utc>,
}

impl ProgressRecord {
    pub fn for_target(target: &Target, duration: u32, timestamp: DateTime<Utc>) -> Self {
        Self {
            subject: target.subject.clone(),
            topic: target.topic.clone(),
            question_count: target.target_count,
            duration,
            timestamp,
        }
    }

    /// Whether this record was produced by completing `target`.
    pub fn belongs_to(&self, target: &Target) -> bool {
        self.subject == target.subject
            && self.topic == target.topic
            && self.question_count == target.target_count
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub records: Vec<ProgressRecord>,
    pub total_questions: u64,
    /// Minutes.
    pub total_duration: u64,
}

impl DailySummary {
    pub fn from_records(date: NaiveDate, records: Vec<ProgressRecord>) -> Self {
        let total_questions = records.iter().map(|r| u64::from(r.question_count)).sum();
        let total_duration = records.iter().map(|r| u64::from(r.duration)).sum();
        Self {
            date,
            records,
            total_questions,
            total_duration,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyLogPage {
    pub page: u32,
    /// Newest day first.
    pub days: Vec<DailySummary>,
    pub has_more: bool,
}

pub fn load_day<S: KeyValueStore + ?Sized>(
    store: &S,
    profile: &str,
    date: NaiveDate,
) -> Result<Vec<ProgressRecord>, StorageError> {
    Ok(read_json(store, &progress_key(profile, date))?.unwrap_or_default())
}

pub fn save_day<S: KeyValueStore + ?Sized>(
    store: &S,
    profile: &str,
    date: NaiveDate,
    records: &[ProgressRecord],
) -> Result<(), StorageError> {
    write_json(store, &progress_key(profile, date), records)
}

pub fn summarize_day<S: KeyValueStore + ?Sized>(
    store: &S,
    profile: &str,
    date: NaiveDate,
) -> Result<DailySummary, StorageError> {
    Ok(DailySummary::from_records(date, load_day(store, profile, date)?))
}

/// One page of the study log, walking backwards from `today`.
///
/// Page 1 covers `today` and the six days before it. Days without records
/// are included with zero totals. `has_more` is set when any of the seven
/// days after the page holds records. A page reaching past the earliest
/// representable date is cut short there.
pub fn study_log_page<S: KeyValueStore + ?Sized>(
    store: &S,
    profile: &str,
    today: NaiveDate,
    page: u32,
) -> Result<StudyLogPage, StorageError> {
    let page = page.max(1);
    // u64 holds (u32::MAX - 1) * 7 + 14 without overflow.
    let start = u64::from(page - 1) * u64::from(DAYS_PER_PAGE);
    let end = start + u64::from(DAYS_PER_PAGE);

    let mut days = Vec::with_capacity(DAYS_PER_PAGE as usize);
    for offset in start..end {
        let Some(date) = today.checked_sub_days(Days::new(offset)) else {
            break;
        };
        days.push(summarize_day(store, profile, date)?);
    }

    let mut has_more = false;
    for offset in end..end + u64::from(LOOKAHEAD_DAYS) {
        let Some(date) = today.checked_sub_days(Days::new(offset)) else {
            break;
        };
        if store.get(&progress_key(profile, date))?.is_some() {
            has_more = true;
            break;
        }
    }

    Ok(StudyLogPage {
        page,
        days,
        has_more,
    })
}
