//! Session persistence across scenario boundaries.
//!
//! Authenticated sessions live in origin-scoped key/value storage. Saving
//! captures every pair into a [`SessionSnapshot`]; restoring writes every
//! captured pair back, leaving keys absent from the snapshot untouched.
//! The snapshot is an explicit value carried in the scenario context, not a
//! process-wide map.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::driver::Driver;
use crate::result::EscenarioResult;

/// A captured copy of origin-scoped key/value storage at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    entries: BTreeMap<String, String>,
}

impl SessionSnapshot {
    /// Capture the current storage contents through a driver.
    ///
    /// # Errors
    ///
    /// Propagates `StorageUnavailable` from the storage boundary.
    pub fn capture(driver: &dyn Driver) -> EscenarioResult<Self> {
        let entries = driver.storage_snapshot()?;
        debug!(keys = entries.len(), "captured session snapshot");
        Ok(Self { entries })
    }

    /// Write every captured pair back through a driver.
    ///
    /// Keys absent from the snapshot are left as they are in live storage.
    ///
    /// # Errors
    ///
    /// Propagates `StorageUnavailable` from the storage boundary.
    pub fn apply(&self, driver: &mut dyn Driver) -> EscenarioResult<()> {
        for (key, value) in &self.entries {
            driver.storage_set(key, value)?;
        }
        debug!(keys = self.entries.len(), "restored session snapshot");
        Ok(())
    }

    /// Value captured under a key, if any
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Captured keys, sorted
    #[must_use]
    pub fn keys(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    /// Number of captured pairs
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the snapshot captured nothing
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, String)> for SessionSnapshot {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Holds at most one [`SessionSnapshot`] and moves it across the
/// save/restore boundary of each scenario.
#[derive(Debug, Default)]
pub struct SessionStore {
    snapshot: Option<SessionSnapshot>,
}

impl SessionStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture current storage, replacing any prior snapshot entirely.
    ///
    /// Saving with empty storage yields an empty snapshot, not `None`, so
    /// a later restore of that snapshot is still a deliberate (if empty)
    /// write-back.
    ///
    /// # Errors
    ///
    /// Propagates `StorageUnavailable`; the prior snapshot is kept on error.
    pub fn save(&mut self, driver: &dyn Driver) -> EscenarioResult<()> {
        let snapshot = SessionSnapshot::capture(driver)?;
        self.snapshot = Some(snapshot);
        Ok(())
    }

    /// Write the current snapshot back into storage.
    ///
    /// No snapshot is a no-op.
    ///
    /// # Errors
    ///
    /// Propagates `StorageUnavailable` from the storage boundary.
    pub fn restore(&self, driver: &mut dyn Driver) -> EscenarioResult<()> {
        match &self.snapshot {
            Some(snapshot) => snapshot.apply(driver),
            None => Ok(()),
        }
    }

    /// The held snapshot, if any
    #[must_use]
    pub fn snapshot(&self) -> Option<&SessionSnapshot> {
        self.snapshot.as_ref()
    }

    /// Drop the held snapshot
    pub fn clear(&mut self) {
        self.snapshot = None;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::driver::MockDriver;
    use proptest::prelude::*;

    #[test]
    fn test_save_captures_all_keys() {
        let driver = MockDriver::new()
            .with_storage_entry("token", "abc123")
            .with_storage_entry("userName", "tester");
        let mut store = SessionStore::new();
        store.save(&driver).unwrap();
        let snapshot = store.snapshot().unwrap();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.get("token"), Some("abc123"));
    }

    #[test]
    fn test_save_replaces_prior_snapshot_wholesale() {
        let driver_a = MockDriver::new().with_storage_entry("token", "old");
        let driver_b = MockDriver::new().with_storage_entry("expires", "tomorrow");
        let mut store = SessionStore::new();
        store.save(&driver_a).unwrap();
        store.save(&driver_b).unwrap();
        let snapshot = store.snapshot().unwrap();
        // No merge: the first save's key is gone.
        assert_eq!(snapshot.get("token"), None);
        assert_eq!(snapshot.get("expires"), Some("tomorrow"));
    }

    #[test]
    fn test_restore_roundtrip_reproduces_captured_keys() {
        let source = MockDriver::new()
            .with_storage_entry("token", "abc123")
            .with_storage_entry("userID", "42");
        let mut store = SessionStore::new();
        store.save(&source).unwrap();

        // Fresh browser state after a navigation/reload.
        let mut target = MockDriver::new();
        store.restore(&mut target).unwrap();
        let live = target.storage_snapshot().unwrap();
        assert_eq!(live.get("token").map(String::as_str), Some("abc123"));
        assert_eq!(live.get("userID").map(String::as_str), Some("42"));
    }

    #[test]
    fn test_restore_leaves_unrelated_keys_untouched() {
        let source = MockDriver::new().with_storage_entry("token", "abc123");
        let mut store = SessionStore::new();
        store.save(&source).unwrap();

        let mut target = MockDriver::new().with_storage_entry("theme", "dark");
        store.restore(&mut target).unwrap();
        let live = target.storage_snapshot().unwrap();
        assert_eq!(live.get("theme").map(String::as_str), Some("dark"));
        assert_eq!(live.get("token").map(String::as_str), Some("abc123"));
    }

    #[test]
    fn test_save_with_empty_storage_yields_empty_snapshot() {
        let driver = MockDriver::new();
        let mut store = SessionStore::new();
        store.save(&driver).unwrap();
        assert!(store.snapshot().unwrap().is_empty());
    }

    #[test]
    fn test_restore_without_snapshot_is_noop() {
        let store = SessionStore::new();
        let mut driver = MockDriver::new().with_storage_entry("theme", "dark");
        store.restore(&mut driver).unwrap();
        assert_eq!(driver.storage().unwrap().len(), 1);
    }

    #[test]
    fn test_storage_unavailable_surfaces_on_save() {
        let driver = MockDriver::new().without_storage();
        let mut store = SessionStore::new();
        let err = store.save(&driver).unwrap_err();
        assert_eq!(err.kind(), "StorageUnavailable");
        assert!(store.snapshot().is_none());
    }

    #[test]
    fn test_storage_unavailable_surfaces_on_restore() {
        let source = MockDriver::new().with_storage_entry("token", "abc");
        let mut store = SessionStore::new();
        store.save(&source).unwrap();

        let mut target = MockDriver::new().without_storage();
        let err = store.restore(&mut target).unwrap_err();
        assert_eq!(err.kind(), "StorageUnavailable");
    }

    proptest! {
        /// restore(save()) leaves storage containing every captured pair.
        #[test]
        fn prop_roundtrip_reproduces_snapshot(
            entries in proptest::collection::btree_map("[a-z]{1,8}", "[ -~]{0,16}", 0..8)
        ) {
            let mut source = MockDriver::new();
            for (key, value) in &entries {
                source.storage_set(key, value).unwrap();
            }
            let mut store = SessionStore::new();
            store.save(&source).unwrap();

            let mut target = MockDriver::new();
            store.restore(&mut target).unwrap();
            let live = target.storage_snapshot().unwrap();
            for (key, value) in &entries {
                prop_assert_eq!(live.get(key), Some(value));
            }
        }
    }
}
