use std::collections::HashMap;
use std::collections::hash_map;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::entry::Entry;
use crate::util::time::{self, Timestamp};

type Entries = HashMap<String, Entry>;

/// In-memory key-value store
///
/// Every public method takes the lock exactly once and holds it across its
/// whole check-then-act sequence. The `*_locked` helpers take the already
/// locked map and never touch the lock themselves, so a public method may
/// compose them freely without re-acquiring.
///
/// Reads (`exists`, `get`, `snapshot`, `len`) share the lock; mutations
/// (`add`, `update`, `delete`) take it exclusively.
pub struct Store {
    entries: RwLock<Entries>,
}

impl Store {
    /// Create a new empty store
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Whether `key` is currently present
    pub fn exists(&self, key: &str) -> bool {
        self.read().contains_key(key)
    }

    /// Copy of the entry stored under `key`
    pub fn get(&self, key: &str) -> Option<Entry> {
        self.read().get(key).cloned()
    }

    /// Create `key` with `value` if it is absent.
    ///
    /// Returns `false` and leaves the store untouched when the key already exists.
    pub fn add(&self, key: String, value: String) -> bool {
        let now = time::now();
        let mut entries = self.write();
        Self::insert_locked(&mut entries, key, value, now)
    }

    /// Replace the value of `key`, or create it if absent.
    ///
    /// `created` is left alone on an existing entry. The fallback create runs
    /// under the same write guard as the lookup.
    pub fn update(&self, key: String, value: String) -> bool {
        let now = time::now();
        let mut entries = self.write();
        match entries.get_mut(&key) {
            Some(entry) => {
                entry.set_value(value, now);
                true
            }
            None => Self::insert_locked(&mut entries, key, value, now),
        }
    }

    /// Remove `key`, returning whether it was present
    pub fn delete(&self, key: &str) -> bool {
        self.write().remove(key).is_some()
    }

    /// Point-in-time copy of every entry, sorted by key
    pub fn snapshot(&self) -> Vec<Entry> {
        let mut entries: Vec<Entry> = self.read().values().cloned().collect();
        entries.sort_by(|a, b| a.key().cmp(b.key()));
        entries
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Insert into an already locked map. Caller holds the write guard.
    fn insert_locked(entries: &mut Entries, key: String, value: String, now: Timestamp) -> bool {
        match entries.entry(key) {
            hash_map::Entry::Occupied(_) => false,
            hash_map::Entry::Vacant(slot) => {
                let entry = Entry::new(slot.key().clone(), value, now);
                slot.insert(entry);
                true
            }
        }
    }

    // No helper can panic between a check and its mutation, so a poisoned
    // map is still consistent and the guard is taken as-is.
    fn read(&self) -> RwLockReadGuard<'_, Entries> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Entries> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}
