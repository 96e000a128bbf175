//! In-memory key-value store.
//!
//! Clones share the same map, so a test can keep a handle while the
//! lifecycle manager owns another. Writes can be made to fail on demand,
//! either all of them or only those whose key contains a fragment.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::KeyValueStore;
use crate::error::StorageError;

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<String, String>,
    /// Writes to keys containing this fragment fail. Empty matches all.
    failing: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `set` fail (or succeed again).
    pub fn fail_writes(&self, fail: bool) {
        self.lock().failing = fail.then(String::new);
    }

    /// Make writes fail only for keys containing `fragment`.
    pub fn fail_writes_containing(&self, fragment: &str) {
        self.lock().failing = Some(fragment.to_string());
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.lock().entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut inner = self.lock();
        if inner
            .failing
            .as_deref()
            .is_some_and(|fragment| key.contains(fragment))
        {
            return Err(StorageError::Unavailable(format!("write to '{key}' rejected")));
        }
        inner.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
