//! # StudyTrack Core Library
//!
//! This library provides the core logic for StudyTrack, a daily study
//! planner: pick subject/topic/question-count targets for a day, time them
//! with a stopwatch, mark them complete and review the resulting log.
//! The CLI binary is a thin presentation layer over the same library.
//!
//! ## Architecture
//!
//! - **Lifecycle Manager**: state machine for one day's targets (play,
//!   pause, stop, complete, uncomplete, delete, manual duration)
//! - **Storage**: profile-scoped JSON documents in a key-value store
//!   (SQLite on disk, in-memory for tests) and TOML configuration
//! - **Progress**: append-only completion log and daily aggregates
//! - **Ticker**: one-second refresh of the running timer's display
//!
//! ## Key Components
//!
//! - [`LifecycleManager`]: target state machine
//! - [`KeyValueStore`]: persistence collaborator contract
//! - [`Database`]: SQLite-backed store
//! - [`Config`]: application configuration management

pub mod clock;
pub mod error;
pub mod events;
pub mod progress;
pub mod reminder;
pub mod storage;
pub mod target;
pub mod ticker;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{
    ConfigError, CoreError, LifecycleError, PlanningError, ProfileError, StorageError,
};
pub use events::Event;
pub use progress::{DailySummary, ProgressRecord, StudyLogPage};
pub use reminder::{plan_daily_reminder, DailyReminder};
pub use storage::{Config, Database, KeyValueStore, MemoryStore, ProfileStore, UserProfile};
pub use target::{LifecycleManager, NewTarget, Target, TargetKey, TargetPhase, TimerSnapshot};
pub use ticker::Ticker;
