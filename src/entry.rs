//! Stored record type

use crate::util::time::Timestamp;

/// One stored key/value record with its creation and last-update times.
///
/// Entries are owned by the [`Store`](crate::store::Store). Everything handed
/// out to callers is a clone, so a returned `Entry` is a detached view that
/// can not reach back into the map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    key: String,
    value: String,
    created: Timestamp,
    updated: Timestamp,
}

impl Entry {
    /// Create a new entry stamped with `now` for both timestamps
    pub(crate) fn new(key: impl Into<String>, value: impl Into<String>, now: Timestamp) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            created: now,
            updated: now,
        }
    }

    /// Replace the value and bump `updated`.
    ///
    /// `updated` never moves backwards, even if the wall clock does.
    pub(crate) fn set_value(&mut self, value: impl Into<String>, now: Timestamp) {
        self.value = value.into();
        self.updated = self.updated.max(now);
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn created(&self) -> Timestamp {
        self.created
    }

    pub fn updated(&self) -> Timestamp {
        self.updated
    }
}
