//! Core error types for studytrack-core.
//!
//! This module defines the error hierarchy using thiserror. Every user
//! intent fails with a typed reason; none of them is fatal to the caller.

use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

use crate::target::TargetKey;

/// Core error type for studytrack-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Target lifecycle errors
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    /// Planning flow errors
    #[error(transparent)]
    Planning(#[from] PlanningError),

    /// Persistence errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Profile errors
    #[error("Profile error: {0}")]
    Profile(#[from] ProfileError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Reasons a target transition is refused.
#[derive(Error, Debug)]
pub enum LifecycleError {
    /// Timer and completion transitions are only allowed on today's targets.
    #[error("only today's targets can be changed (target is dated {date}, today is {today})")]
    InvalidDate { date: NaiveDate, today: NaiveDate },

    #[error("another target's timer is active ({active}); stop it first")]
    ConcurrentTimerActive { active: TargetKey },

    /// Neither a timer nor a duration exists; the caller must collect one.
    #[error("target has no recorded duration; enter a duration before completing it")]
    NotCompletable,

    #[error("invalid duration '{input}': enter a whole number of minutes")]
    InvalidDuration { input: String },

    #[error("completed targets cannot be deleted")]
    NotDeletable,

    #[error("target is already completed")]
    AlreadyCompleted,

    #[error("target is not completed")]
    NotCompleted,

    /// Pause needs a running timer; stop needs a running or paused one.
    #[error("target has no running timer")]
    NoActiveTimer,

    #[error("target's timer is already running")]
    TimerAlreadyRunning,

    #[error("target not found: {0}")]
    TargetNotFound(TargetKey),

    #[error("failed to persist change: {0}")]
    PersistenceFailure(#[from] StorageError),
}

/// Reasons the planning flow refuses a new target.
#[derive(Error, Debug)]
pub enum PlanningError {
    #[error("targets cannot be added to past dates ({date})")]
    PastDate { date: NaiveDate },

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("question count must be a positive number")]
    InvalidTargetCount,

    #[error("a target for {subject} / {topic} already exists on {date}")]
    DuplicateTarget {
        subject: String,
        topic: String,
        date: NaiveDate,
    },

    #[error("failed to persist target: {0}")]
    Persistence(#[from] StorageError),
}

/// Persistence collaborator errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open the database
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Storage backend failure: {0}")]
    Backend(String),

    /// Stored value exists but cannot be decoded.
    #[error("Stored value for '{key}' is corrupt: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode value: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Profile errors.
#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("profile name must not be empty")]
    EmptyName,

    #[error("grade must be between 5 and 12, got {0}")]
    InvalidGrade(u8),

    #[error("no active profile; create one first")]
    NoActiveProfile,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        StorageError::Backend(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
