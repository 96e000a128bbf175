//! Active profile persistence.
//!
//! A single document under [`ACTIVE_PROFILE_KEY`] holds the profile. Its
//! `name` scopes every other key, so it is fixed once the profile exists.

use std::ops::RangeInclusive;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{read_json, write_json, KeyValueStore, ACTIVE_PROFILE_KEY};
use crate::error::ProfileError;

/// Supported school grades.
pub const GRADE_RANGE: RangeInclusive<u8> = 5..=12;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub name: String,
    pub grade: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_uri: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    /// Build a validated profile. The name is trimmed.
    pub fn new(
        name: &str,
        grade: u8,
        created_at: DateTime<Utc>,
    ) -> Result<Self, ProfileError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ProfileError::EmptyName);
        }
        validate_grade(grade)?;
        Ok(Self {
            name: name.to_string(),
            grade,
            photo_uri: None,
            created_at,
        })
    }
}

fn validate_grade(grade: u8) -> Result<(), ProfileError> {
    if GRADE_RANGE.contains(&grade) {
        Ok(())
    } else {
        Err(ProfileError::InvalidGrade(grade))
    }
}

pub struct ProfileStore<S> {
    store: S,
}

impl<S: KeyValueStore> ProfileStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn load_active(&self) -> Result<Option<UserProfile>, ProfileError> {
        Ok(read_json(&self.store, ACTIVE_PROFILE_KEY)?)
    }

    /// Like [`load_active`](Self::load_active) but a missing profile is an error.
    pub fn require_active(&self) -> Result<UserProfile, ProfileError> {
        self.load_active()?.ok_or(ProfileError::NoActiveProfile)
    }

    pub fn save(&self, profile: &UserProfile) -> Result<(), ProfileError> {
        write_json(&self.store, ACTIVE_PROFILE_KEY, profile)?;
        info!(name = %profile.name, grade = profile.grade, "saved active profile");
        Ok(())
    }

    pub fn set_grade(&self, grade: u8) -> Result<UserProfile, ProfileError> {
        validate_grade(grade)?;
        let mut profile = self.require_active()?;
        profile.grade = grade;
        self.save(&profile)?;
        Ok(profile)
    }

    pub fn set_photo(&self, photo_uri: Option<String>) -> Result<UserProfile, ProfileError> {
        let mut profile = self.require_active()?;
        profile.photo_uri = photo_uri;
        self.save(&profile)?;
        Ok(profile)
    }
}
