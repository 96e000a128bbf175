//! Planning flow: creating targets for today or a future day.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::model::Target;
use crate::clock::Clock;
use crate::error::{PlanningError, StorageError};
use crate::events::Event;
use crate::storage::{read_json, targets_key, write_json, KeyValueStore};

/// Form input for a new target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTarget {
    pub subject: String,
    pub topic: String,
    pub target_count: i64,
    pub date: NaiveDate,
}

/// Every stored target of `profile` dated `date`.
pub fn targets_for_day<S: KeyValueStore + ?Sized>(
    store: &S,
    profile: &str,
    date: NaiveDate,
) -> Result<Vec<Target>, StorageError> {
    let all: Vec<Target> = read_json(store, &targets_key(profile))?.unwrap_or_default();
    Ok(all.into_iter().filter(|t| t.date == date).collect())
}

/// Validate and append a new target.
///
/// Past dates are refused, and a day holds at most one target per
/// subject and topic.
pub fn add_target<S, C>(
    store: &S,
    clock: &C,
    profile: &str,
    new: NewTarget,
) -> Result<Event, PlanningError>
where
    S: KeyValueStore + ?Sized,
    C: Clock + ?Sized,
{
    if new.date < clock.today() {
        return Err(PlanningError::PastDate { date: new.date });
    }
    let subject = new.subject.trim();
    let topic = new.topic.trim();
    if subject.is_empty() {
        return Err(PlanningError::MissingField("subject"));
    }
    if topic.is_empty() {
        return Err(PlanningError::MissingField("topic"));
    }
    let target_count = u32::try_from(new.target_count)
        .ok()
        .filter(|count| *count > 0)
        .ok_or(PlanningError::InvalidTargetCount)?;

    let key = targets_key(profile);
    let mut all: Vec<Target> = read_json(store, &key)?.unwrap_or_default();
    if all
        .iter()
        .any(|t| t.date == new.date && t.subject == subject && t.topic == topic)
    {
        return Err(PlanningError::DuplicateTarget {
            subject: subject.to_string(),
            topic: topic.to_string(),
            date: new.date,
        });
    }

    let target = Target::new(subject, topic, target_count, new.date);
    let target_key = target.key();
    all.push(target);
    write_json(store, &key, &all)?;

    info!(key = %target_key, "target added");
    Ok(Event::TargetAdded {
        target: target_key,
        at: clock.now(),
    })
}
