//! Target lifecycle manager.
//!
//! Owns the targets of one day and applies the user's intents to them.
//!
//! ## State Transitions
//!
//! ```text
//! Planned -> Running <-> Paused -> Stopped -> Completed
//!            Running/Paused ------------------> Completed
//!            Completed -> Planned (uncomplete)
//! ```
//!
//! At most one target holds a timer at a time, and only targets dated
//! today accept timer or completion transitions.
//!
//! Every transition is write-then-reflect: the new state is persisted first
//! and only adopted in memory once the write succeeded. A failed write
//! leaves the in-memory list exactly as it was.
//!
//! ## Usage
//!
//! ```ignore
//! let mut manager = LifecycleManager::load(db, SystemClock, "ayse", today)?;
//! manager.play(&key)?;
//! // Once per second while a timer runs:
//! manager.tick();
//! manager.stop(&key)?;
//! ```

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use super::model::{minutes_from_ms, Target, TargetKey, TimerSnapshot, MIN_DURATION_MIN};
use crate::clock::Clock;
use crate::error::{LifecycleError, StorageError};
use crate::events::Event;
use crate::progress::{self, DailySummary, ProgressRecord};
use crate::storage::{read_json, targets_key, write_json, KeyValueStore};

pub struct LifecycleManager<S, C> {
    store: S,
    clock: C,
    profile: String,
    day: NaiveDate,
    targets: Vec<Target>,
}

impl<S: KeyValueStore, C: Clock> LifecycleManager<S, C> {
    /// Load the targets of `day` for `profile`.
    pub fn load(
        store: S,
        clock: C,
        profile: impl Into<String>,
        day: NaiveDate,
    ) -> Result<Self, StorageError> {
        let mut manager = Self {
            store,
            clock,
            profile: profile.into(),
            day,
            targets: Vec::new(),
        };
        manager.reload()?;
        Ok(manager)
    }

    /// Replace the in-memory list with what is persisted.
    pub fn reload(&mut self) -> Result<(), StorageError> {
        let day = self.day;
        self.targets = self
            .load_all()?
            .into_iter()
            .filter(|t| t.date == day)
            .collect();
        debug!(profile = %self.profile, %day, count = self.targets.len(), "loaded targets");
        Ok(())
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn day(&self) -> NaiveDate {
        self.day
    }

    pub fn profile(&self) -> &str {
        &self.profile
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn target(&self, key: &TargetKey) -> Option<&Target> {
        self.targets.iter().find(|t| t.matches(key))
    }

    /// The target holding a timer, running or paused.
    pub fn active_timer(&self) -> Option<&Target> {
        self.targets.iter().find(|t| t.timer_state.is_some())
    }

    /// Whether a timer is running and not paused, i.e. ticks are needed.
    pub fn has_running_timer(&self) -> bool {
        self.targets
            .iter()
            .any(|t| t.timer_state.is_some_and(|timer| timer.is_ticking()))
    }

    pub fn format_duration(&self, key: &TargetKey) -> Option<String> {
        let now = self.clock.now_ms();
        self.target(key).map(|t| t.format_duration(now))
    }

    /// Totals for the loaded day, summed from its progress records.
    pub fn summary(&self) -> Result<DailySummary, StorageError> {
        progress::summarize_day(&self.store, &self.profile, self.day)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start the timer, or resume it from a pause.
    pub fn play(&mut self, key: &TargetKey) -> Result<Event, LifecycleError> {
        let idx = self.find(key)?;
        self.ensure_today(idx)?;
        let target = &self.targets[idx];
        if target.completed {
            return Err(LifecycleError::AlreadyCompleted);
        }
        if let Some(other) = self
            .targets
            .iter()
            .enumerate()
            .find(|(i, t)| *i != idx && t.timer_state.is_some())
            .map(|(_, t)| t)
        {
            return Err(LifecycleError::ConcurrentTimerActive {
                active: other.key(),
            });
        }
        if target.timer_state.is_some_and(|t| t.is_ticking()) {
            return Err(LifecycleError::TimerAlreadyRunning);
        }

        let previous_elapsed = target.timer_state.map(|t| t.elapsed_time).unwrap_or(0);
        let mut updated = target.clone();
        updated.timer_state = Some(TimerSnapshot::started(self.clock.now_ms(), previous_elapsed));

        self.commit(idx, updated)?;
        debug!(key = %key, previous_elapsed, "timer started");
        Ok(Event::TimerStarted {
            target: key.clone(),
            resumed_from_ms: previous_elapsed,
            at: self.clock.now(),
        })
    }

    /// Freeze the elapsed time of a running timer.
    pub fn pause(&mut self, key: &TargetKey) -> Result<Event, LifecycleError> {
        let idx = self.find(key)?;
        self.ensure_today(idx)?;
        let target = &self.targets[idx];
        let timer = match target.timer_state {
            Some(timer) if timer.is_ticking() => timer,
            _ => return Err(LifecycleError::NoActiveTimer),
        };

        let elapsed = timer.elapsed_ms(self.clock.now_ms());
        let mut updated = target.clone();
        updated.timer_state = Some(TimerSnapshot {
            is_paused: true,
            elapsed_time: elapsed,
            ..timer
        });

        self.commit(idx, updated)?;
        debug!(key = %key, elapsed, "timer paused");
        Ok(Event::TimerPaused {
            target: key.clone(),
            elapsed_ms: elapsed,
            at: self.clock.now(),
        })
    }

    /// End the session and record its length as the target's duration.
    pub fn stop(&mut self, key: &TargetKey) -> Result<Event, LifecycleError> {
        let idx = self.find(key)?;
        self.ensure_today(idx)?;
        let target = &self.targets[idx];
        let timer = target.timer_state.ok_or(LifecycleError::NoActiveTimer)?;

        let minutes = minutes_from_ms(timer.elapsed_ms(self.clock.now_ms()));
        let mut updated = target.clone();
        updated.duration = Some(minutes);
        updated.timer_state = None;

        self.commit(idx, updated)?;
        info!(key = %key, minutes, "timer stopped");
        Ok(Event::TimerStopped {
            target: key.clone(),
            duration_min: minutes,
            at: self.clock.now(),
        })
    }

    /// Mark the target completed and append its progress record.
    ///
    /// The duration comes from the active timer if there is one, else from
    /// the recorded duration. With neither, nothing changes and
    /// [`LifecycleError::NotCompletable`] asks the caller for a manual entry.
    pub fn complete(&mut self, key: &TargetKey) -> Result<Event, LifecycleError> {
        let idx = self.find(key)?;
        self.ensure_today(idx)?;
        let target = &self.targets[idx];
        if target.completed {
            return Err(LifecycleError::AlreadyCompleted);
        }
        let duration = match (target.timer_state, target.duration) {
            (Some(timer), _) => minutes_from_ms(timer.elapsed_ms(self.clock.now_ms())),
            (None, Some(minutes)) => minutes.max(MIN_DURATION_MIN),
            (None, None) => return Err(LifecycleError::NotCompletable),
        };

        let mut updated = target.clone();
        updated.completed = true;
        updated.duration = Some(duration);
        updated.timer_state = None;

        let record = ProgressRecord::for_target(&updated, duration, self.clock.now());
        let previous = self.persist_target(&updated)?;
        let write_progress = progress::load_day(&self.store, &self.profile, updated.date)
            .and_then(|mut records| {
                records.push(record.clone());
                progress::save_day(&self.store, &self.profile, updated.date, &records)
            });
        if let Err(e) = write_progress {
            warn!(key = %key, error = %e, "progress write failed; reverting target");
            self.revert_targets(&previous);
            return Err(e.into());
        }

        self.targets[idx] = updated;
        info!(key = %key, duration, "target completed");
        Ok(Event::TargetCompleted {
            target: key.clone(),
            duration_min: duration,
            record,
            at: self.clock.now(),
        })
    }

    /// Undo a completion: clear the duration and drop the day's matching
    /// progress record. Confirming with the user is the caller's job.
    pub fn uncomplete(&mut self, key: &TargetKey) -> Result<Event, LifecycleError> {
        let idx = self.find(key)?;
        self.ensure_today(idx)?;
        let target = &self.targets[idx];
        if !target.completed {
            return Err(LifecycleError::NotCompleted);
        }

        let mut updated = target.clone();
        updated.completed = false;
        updated.duration = None;
        updated.timer_state = None;

        let previous = self.persist_target(&updated)?;
        let remove_progress = progress::load_day(&self.store, &self.profile, updated.date)
            .and_then(|records| {
                let before = records.len();
                let kept: Vec<ProgressRecord> =
                    records.into_iter().filter(|r| !r.belongs_to(&updated)).collect();
                let removed = before - kept.len();
                if removed > 0 {
                    progress::save_day(&self.store, &self.profile, updated.date, &kept)?;
                }
                Ok(removed)
            });
        let removed = match remove_progress {
            Ok(removed) => removed,
            Err(e) => {
                warn!(key = %key, error = %e, "progress removal failed; reverting target");
                self.revert_targets(&previous);
                return Err(e.into());
            }
        };

        self.targets[idx] = updated;
        info!(key = %key, removed, "target uncompleted");
        Ok(Event::TargetUncompleted {
            target: key.clone(),
            removed_records: removed,
            at: self.clock.now(),
        })
    }

    /// Remove an unfinished target. Confirming with the user is the caller's job.
    pub fn delete(&mut self, key: &TargetKey) -> Result<Event, LifecycleError> {
        let idx = self.find(key)?;
        if self.targets[idx].completed {
            return Err(LifecycleError::NotDeletable);
        }

        let remaining: Vec<Target> = self
            .load_all()?
            .into_iter()
            .filter(|t| !t.matches(key))
            .collect();
        self.save_all(&remaining)?;

        self.targets.remove(idx);
        info!(key = %key, "target deleted");
        Ok(Event::TargetDeleted {
            target: key.clone(),
            at: self.clock.now(),
        })
    }

    /// Record a duration typed in by the user, in whole minutes.
    ///
    /// Non-numeric and negative input is rejected; zero is raised to the
    /// one-minute minimum. Any timer on the target is discarded.
    pub fn set_manual_duration(
        &mut self,
        key: &TargetKey,
        input: &str,
    ) -> Result<Event, LifecycleError> {
        let idx = self.find(key)?;
        self.ensure_today(idx)?;
        let target = &self.targets[idx];
        if target.completed {
            return Err(LifecycleError::AlreadyCompleted);
        }
        let minutes = parse_manual_duration(input)?;

        let mut updated = target.clone();
        updated.duration = Some(minutes);
        updated.timer_state = None;

        self.commit(idx, updated)?;
        info!(key = %key, minutes, "duration entered");
        Ok(Event::DurationEntered {
            target: key.clone(),
            duration_min: minutes,
            at: self.clock.now(),
        })
    }

    /// Refresh the running timer's elapsed time. Memory only.
    ///
    /// Returns `None` when no timer is running, which tells the caller to
    /// stop ticking.
    pub fn tick(&mut self) -> Option<Event> {
        let now = self.clock.now_ms();
        let target = self
            .targets
            .iter_mut()
            .find(|t| t.timer_state.is_some_and(|timer| timer.is_ticking()))?;
        let timer = target.timer_state.as_mut()?;
        timer.elapsed_time = timer.elapsed_ms(now);
        let elapsed = timer.elapsed_time;
        Some(Event::TimerTick {
            target: target.key(),
            elapsed_ms: elapsed,
            display: target.format_duration(now),
            at: self.clock.now(),
        })
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn find(&self, key: &TargetKey) -> Result<usize, LifecycleError> {
        self.targets
            .iter()
            .position(|t| t.matches(key))
            .ok_or_else(|| LifecycleError::TargetNotFound(key.clone()))
    }

    fn ensure_today(&self, idx: usize) -> Result<(), LifecycleError> {
        let today = self.clock.today();
        let date = self.targets[idx].date;
        if date != today {
            debug!(%date, %today, "rejected transition on a locked day");
            return Err(LifecycleError::InvalidDate { date, today });
        }
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<Target>, StorageError> {
        Ok(read_json(&self.store, &targets_key(&self.profile))?.unwrap_or_default())
    }

    fn save_all(&self, targets: &[Target]) -> Result<(), StorageError> {
        write_json(&self.store, &targets_key(&self.profile), targets).inspect_err(|e| {
            warn!(profile = %self.profile, error = %e, "failed to write targets");
        })
    }

    /// Write `updated` over its stored record and return the collection as
    /// it was before the write.
    fn persist_target(&self, updated: &Target) -> Result<Vec<Target>, LifecycleError> {
        let key = updated.key();
        let previous = self.load_all()?;
        if !previous.iter().any(|t| t.matches(&key)) {
            return Err(LifecycleError::TargetNotFound(key));
        }
        let next: Vec<Target> = previous
            .iter()
            .map(|t| if t.matches(&key) { updated.clone() } else { t.clone() })
            .collect();
        self.save_all(&next)?;
        Ok(previous)
    }

    fn revert_targets(&self, previous: &[Target]) {
        if let Err(e) = self.save_all(previous) {
            warn!(profile = %self.profile, error = %e, "could not revert targets; reload to resync");
        }
    }

    fn commit(&mut self, idx: usize, updated: Target) -> Result<(), LifecycleError> {
        self.persist_target(&updated)?;
        self.targets[idx] = updated;
        Ok(())
    }
}

/// Parse a typed-in duration in minutes.
///
/// Non-numeric and negative input is rejected; zero becomes one minute.
pub fn parse_manual_duration(input: &str) -> Result<u32, LifecycleError> {
    let invalid = || LifecycleError::InvalidDuration {
        input: input.to_string(),
    };
    let minutes: i64 = input.trim().parse().map_err(|_| invalid())?;
    if minutes < 0 {
        return Err(invalid());
    }
    let minutes = u32::try_from(minutes).map_err(|_| invalid())?;
    Ok(minutes.max(MIN_DURATION_MIN))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::storage::MemoryStore;

    const PROFILE: &str = "ayse";
    const T0: i64 = 1_700_000_000_000;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 10).unwrap()
    }

    fn seed(store: &MemoryStore, targets: &[Target]) {
        write_json(store, &targets_key(PROFILE), targets).unwrap();
    }

    fn setup(targets: &[Target]) -> (LifecycleManager<MemoryStore, ManualClock>, MemoryStore, ManualClock) {
        let store = MemoryStore::new();
        seed(&store, targets);
        let clock = ManualClock::new(today(), T0);
        let manager = LifecycleManager::load(store.clone(), clock.clone(), PROFILE, today()).unwrap();
        (manager, store, clock)
    }

    fn stored(store: &MemoryStore) -> Vec<Target> {
        read_json(store, &targets_key(PROFILE)).unwrap().unwrap_or_default()
    }

    #[test]
    fn load_keeps_only_the_selected_day() {
        let yesterday = today().pred_opt().unwrap();
        let (manager, _, _) = setup(&[
            Target::new("Math", "Fractions", 20, today()),
            Target::new("Math", "Fractions", 20, yesterday),
        ]);
        assert_eq!(manager.targets().len(), 1);
        assert_eq!(manager.targets()[0].date, today());
    }

    #[test]
    fn play_then_stop_records_clamped_minutes() {
        let math = Target::new("Math", "Fractions", 20, today());
        let key = math.key();
        let (mut manager, store, clock) = setup(&[math]);

        manager.play(&key).unwrap();
        clock.advance(65_000);
        assert_eq!(manager.format_duration(&key).as_deref(), Some("00:01:05"));

        let event = manager.stop(&key).unwrap();
        assert!(matches!(event, Event::TimerStopped { duration_min: 1, .. }));
        let target = manager.target(&key).unwrap();
        assert_eq!(target.duration, Some(1));
        assert!(target.timer_state.is_none());
        assert!(!target.completed);
        assert_eq!(stored(&store)[0].duration, Some(1));
    }

    #[test]
    fn stop_under_a_minute_still_records_one() {
        let math = Target::new("Math", "Fractions", 20, today());
        let key = math.key();
        let (mut manager, _, clock) = setup(&[math]);
        manager.play(&key).unwrap();
        clock.advance(5_000);
        manager.stop(&key).unwrap();
        assert_eq!(manager.target(&key).unwrap().duration, Some(1));
    }

    #[test]
    fn pause_and_resume_preserve_elapsed_time() {
        let math = Target::new("Math", "Fractions", 20, today());
        let key = math.key();
        let (mut manager, _, clock) = setup(&[math]);

        manager.play(&key).unwrap();
        clock.advance(30_000);
        let paused = manager.pause(&key).unwrap();
        assert!(matches!(paused, Event::TimerPaused { elapsed_ms: 30_000, .. }));

        clock.advance(10_000);
        assert_eq!(manager.format_duration(&key).as_deref(), Some("00:00:30"));

        let resumed = manager.play(&key).unwrap();
        assert!(matches!(resumed, Event::TimerStarted { resumed_from_ms: 30_000, .. }));
        clock.advance(30_000);
        assert_eq!(manager.format_duration(&key).as_deref(), Some("00:01:00"));

        manager.stop(&key).unwrap();
        assert_eq!(manager.target(&key).unwrap().duration, Some(1));
    }

    #[test]
    fn second_timer_is_rejected_even_when_first_is_paused() {
        let math = Target::new("Math", "Fractions", 20, today());
        let physics = Target::new("Physics", "Optics", 10, today());
        let (a, b) = (math.key(), physics.key());
        let (mut manager, _, _) = setup(&[math, physics]);

        manager.play(&a).unwrap();
        let err = manager.play(&b).unwrap_err();
        assert!(matches!(err, LifecycleError::ConcurrentTimerActive { ref active } if *active == a));

        manager.pause(&a).unwrap();
        assert!(matches!(
            manager.play(&b),
            Err(LifecycleError::ConcurrentTimerActive { .. })
        ));
        assert!(manager.target(&b).unwrap().timer_state.is_none());

        manager.stop(&a).unwrap();
        manager.play(&b).unwrap();
    }

    #[test]
    fn playing_a_running_timer_is_rejected() {
        let math = Target::new("Math", "Fractions", 20, today());
        let key = math.key();
        let (mut manager, _, _) = setup(&[math]);
        manager.play(&key).unwrap();
        assert!(matches!(manager.play(&key), Err(LifecycleError::TimerAlreadyRunning)));
    }

    #[test]
    fn pause_and_stop_need_a_timer() {
        let math = Target::new("Math", "Fractions", 20, today());
        let key = math.key();
        let (mut manager, _, _) = setup(&[math]);
        assert!(matches!(manager.pause(&key), Err(LifecycleError::NoActiveTimer)));
        assert!(matches!(manager.stop(&key), Err(LifecycleError::NoActiveTimer)));

        manager.play(&key).unwrap();
        manager.pause(&key).unwrap();
        assert!(matches!(manager.pause(&key), Err(LifecycleError::NoActiveTimer)));
        manager.stop(&key).unwrap();
    }

    #[test]
    fn other_days_are_locked() {
        let yesterday = today().pred_opt().unwrap();
        let tomorrow = today().succ_opt().unwrap();
        for day in [yesterday, tomorrow] {
            let target = Target::new("Math", "Fractions", 20, day);
            let key = target.key();
            let store = MemoryStore::new();
            seed(&store, &[target.clone()]);
            let clock = ManualClock::new(today(), T0);
            let mut manager = LifecycleManager::load(store.clone(), clock, PROFILE, day).unwrap();

            assert!(matches!(manager.play(&key), Err(LifecycleError::InvalidDate { .. })));
            assert!(matches!(manager.pause(&key), Err(LifecycleError::InvalidDate { .. })));
            assert!(matches!(manager.stop(&key), Err(LifecycleError::InvalidDate { .. })));
            assert!(matches!(manager.complete(&key), Err(LifecycleError::InvalidDate { .. })));
            assert!(matches!(
                manager.set_manual_duration(&key, "10"),
                Err(LifecycleError::InvalidDate { .. })
            ));
            assert_eq!(manager.target(&key), Some(&target));
            assert_eq!(stored(&store), vec![target]);
        }
    }

    #[test]
    fn complete_without_any_duration_source_is_deferred() {
        let math = Target::new("Math", "Fractions", 20, today());
        let key = math.key();
        let (mut manager, store, _) = setup(&[math.clone()]);

        assert!(matches!(manager.complete(&key), Err(LifecycleError::NotCompletable)));
        assert_eq!(manager.target(&key), Some(&math));
        assert!(store.get(&crate::storage::progress_key(PROFILE, today())).unwrap().is_none());

        manager.set_manual_duration(&key, "25").unwrap();
        let event = manager.complete(&key).unwrap();
        assert!(matches!(event, Event::TargetCompleted { duration_min: 25, .. }));
        let target = manager.target(&key).unwrap();
        assert!(target.completed);
        assert_eq!(target.duration, Some(25));

        let summary = manager.summary().unwrap();
        assert_eq!(summary.total_questions, 20);
        assert_eq!(summary.total_duration, 25);
    }

    #[test]
    fn complete_from_a_running_timer_is_clamped() {
        let math = Target::new("Math", "Fractions", 20, today());
        let key = math.key();
        let (mut manager, store, clock) = setup(&[math]);
        manager.play(&key).unwrap();
        clock.advance(20_000);
        manager.complete(&key).unwrap();

        let target = manager.target(&key).unwrap();
        assert_eq!(target.duration, Some(1));
        assert!(target.timer_state.is_none());
        assert!(!manager.has_running_timer());
        let records = progress::load_day(&store, PROFILE, today()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].duration, 1);
        assert_eq!(records[0].question_count, 20);
    }

    #[test]
    fn complete_twice_is_rejected() {
        let mut math = Target::new("Math", "Fractions", 20, today());
        math.duration = Some(5);
        let key = math.key();
        let (mut manager, _, _) = setup(&[math]);
        manager.complete(&key).unwrap();
        assert!(matches!(manager.complete(&key), Err(LifecycleError::AlreadyCompleted)));
        assert!(matches!(manager.play(&key), Err(LifecycleError::AlreadyCompleted)));
    }

    #[test]
    fn uncomplete_removes_only_the_matching_record() {
        let mut math = Target::new("Math", "Fractions", 20, today());
        math.duration = Some(30);
        let mut physics = Target::new("Physics", "Optics", 10, today());
        physics.duration = Some(15);
        let (a, b) = (math.key(), physics.key());
        let (mut manager, store, _) = setup(&[math, physics]);

        let yesterday = today().pred_opt().unwrap();
        let old = ProgressRecord {
            subject: "Math".into(),
            topic: "Fractions".into(),
            question_count: 20,
            duration: 40,
            timestamp: chrono::Utc::now(),
        };
        progress::save_day(&store, PROFILE, yesterday, &[old]).unwrap();

        manager.complete(&a).unwrap();
        manager.complete(&b).unwrap();
        assert_eq!(progress::load_day(&store, PROFILE, today()).unwrap().len(), 2);

        assert!(matches!(manager.uncomplete(&b), Ok(Event::TargetUncompleted { removed_records: 1, .. })));
        let target = manager.target(&b).unwrap();
        assert!(!target.completed);
        assert_eq!(target.duration, None);

        let remaining = progress::load_day(&store, PROFILE, today()).unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].subject, "Math");
        assert_eq!(progress::load_day(&store, PROFILE, yesterday).unwrap().len(), 1);
        assert!(matches!(manager.uncomplete(&b), Err(LifecycleError::NotCompleted)));
    }

    #[test]
    fn delete_rejects_completed_and_removes_from_storage() {
        let mut math = Target::new("Math", "Fractions", 20, today());
        math.duration = Some(30);
        let physics = Target::new("Physics", "Optics", 10, today());
        let (a, b) = (math.key(), physics.key());
        let (mut manager, store, clock) = setup(&[math, physics]);

        manager.complete(&a).unwrap();
        assert!(matches!(manager.delete(&a), Err(LifecycleError::NotDeletable)));

        manager.delete(&b).unwrap();
        assert!(manager.target(&b).is_none());

        let reloaded = LifecycleManager::load(store.clone(), clock, PROFILE, today()).unwrap();
        assert_eq!(reloaded.targets().len(), 1);
        assert!(reloaded.target(&b).is_none());
    }

    #[test]
    fn past_targets_can_still_be_deleted() {
        let yesterday = today().pred_opt().unwrap();
        let old = Target::new("Math", "Fractions", 20, yesterday);
        let key = old.key();
        let store = MemoryStore::new();
        seed(&store, &[old]);
        let clock = ManualClock::new(today(), T0);
        let mut manager = LifecycleManager::load(store.clone(), clock, PROFILE, yesterday).unwrap();
        manager.delete(&key).unwrap();
        assert!(stored(&store).is_empty());
    }

    #[test]
    fn manual_duration_parsing() {
        assert_eq!(parse_manual_duration("45").unwrap(), 45);
        assert_eq!(parse_manual_duration(" 7 ").unwrap(), 7);
        assert_eq!(parse_manual_duration("0").unwrap(), 1);
        assert!(matches!(parse_manual_duration("abc"), Err(LifecycleError::InvalidDuration { .. })));
        assert!(matches!(parse_manual_duration("-3"), Err(LifecycleError::InvalidDuration { .. })));
        assert!(matches!(parse_manual_duration("2.5"), Err(LifecycleError::InvalidDuration { .. })));
        assert!(matches!(parse_manual_duration(""), Err(LifecycleError::InvalidDuration { .. })));
    }

    #[test]
    fn manual_duration_clears_timer_and_keeps_completion_flag() {
        let math = Target::new("Math", "Fractions", 20, today());
        let key = math.key();
        let (mut manager, store, _) = setup(&[math]);
        manager.play(&key).unwrap();
        manager.set_manual_duration(&key, "12").unwrap();
        let target = manager.target(&key).unwrap();
        assert_eq!(target.duration, Some(12));
        assert!(target.timer_state.is_none());
        assert!(!target.completed);
        assert_eq!(stored(&store)[0].duration, Some(12));
        assert!(matches!(
            manager.set_manual_duration(&key, "nope"),
            Err(LifecycleError::InvalidDuration { .. })
        ));
        assert_eq!(manager.target(&key).unwrap().duration, Some(12));
    }

    #[test]
    fn failed_write_leaves_memory_untouched() {
        let math = Target::new("Math", "Fractions", 20, today());
        let key = math.key();
        let (mut manager, store, clock) = setup(&[math.clone()]);
        manager.play(&key).unwrap();
        clock.advance(120_000);

        store.fail_writes(true);
        let before = manager.target(&key).cloned();
        assert!(matches!(manager.stop(&key), Err(LifecycleError::PersistenceFailure(_))));
        assert_eq!(manager.target(&key).cloned(), before);

        store.fail_writes(false);
        manager.stop(&key).unwrap();
        assert_eq!(manager.target(&key).unwrap().duration, Some(2));
    }

    #[test]
    fn failed_progress_write_reverts_completion() {
        let mut math = Target::new("Math", "Fractions", 20, today());
        math.duration = Some(10);
        let key = math.key();
        let (mut manager, store, _) = setup(&[math.clone()]);

        store.fail_writes_containing("_progress_");
        assert!(matches!(manager.complete(&key), Err(LifecycleError::PersistenceFailure(_))));
        assert_eq!(manager.target(&key), Some(&math));
        assert_eq!(stored(&store), vec![math]);
    }

    #[test]
    fn timer_survives_reload() {
        let math = Target::new("Math", "Fractions", 20, today());
        let key = math.key();
        let (mut manager, store, clock) = setup(&[math]);
        manager.play(&key).unwrap();
        clock.advance(90_000);

        let reloaded = LifecycleManager::load(store, clock, PROFILE, today()).unwrap();
        assert_eq!(reloaded.format_duration(&key).as_deref(), Some("00:01:30"));
        assert!(reloaded.has_running_timer());
    }

    #[test]
    fn tick_only_touches_memory() {
        let math = Target::new("Math", "Fractions", 20, today());
        let key = math.key();
        let (mut manager, store, clock) = setup(&[math]);
        assert!(manager.tick().is_none());

        manager.play(&key).unwrap();
        let persisted = store.get(&targets_key(PROFILE)).unwrap();
        clock.advance(3_000);
        match manager.tick() {
            Some(Event::TimerTick { elapsed_ms, display, .. }) => {
                assert_eq!(elapsed_ms, 3_000);
                assert_eq!(display, "00:00:03");
            }
            other => panic!("expected TimerTick, got {other:?}"),
        }
        assert_eq!(store.get(&targets_key(PROFILE)).unwrap(), persisted);

        manager.pause(&key).unwrap();
        assert!(manager.tick().is_none());
        assert!(!manager.has_running_timer());
        assert!(manager.active_timer().is_some());
    }

    #[test]
    fn unknown_target_is_reported() {
        let (mut manager, _, _) = setup(&[]);
        let key = Target::new("Math", "Fractions", 20, today()).key();
        assert!(matches!(manager.play(&key), Err(LifecycleError::TargetNotFound(_))));
    }
}
