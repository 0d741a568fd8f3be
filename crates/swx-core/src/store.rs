//! Ordered in-memory sequence of activity changes.
//!
//! # Invariants
//!
//! After every committed mutation:
//! 1. Entries are ordered non-decreasing by time.
//! 2. No two adjacent entries reference the same activity (two adjacent
//!    inactive entries included).
//! 3. Each registry reference count equals the number of entries naming that
//!    activity, and unreferenced activities are absent from the registry.
//!
//! Invariant 2 is enforced here by [`EventStore::push`] and
//! [`EventStore::put_at`]. Ordering (1) is the caller's responsibility, since
//! amending and loading each have their own rules for out-of-order times.

use std::collections::HashMap;

use crate::registry::{ActivityId, ActivityRegistry};
use crate::time::TimePoint;

/// One recorded change of activity.
///
/// The activity is in progress from `time` until the next entry's time, or
/// until now if this is the last entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry {
    pub activity: ActivityId,
    pub time: TimePoint,
}

/// The entries of the log together with the registry interning their names.
#[derive(Debug, Default)]
pub struct EventStore {
    entries: Vec<Entry>,
    registry: ActivityRegistry,
}

impl EventStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&Entry> {
        self.entries.last()
    }

    pub const fn registry(&self) -> &ActivityRegistry {
        &self.registry
    }

    /// Returns the activity name of `entry`.
    pub fn activity_of(&self, entry: &Entry) -> &str {
        self.registry.name(entry.activity)
    }

    /// Iterates over `(activity name, time)` pairs in chronological order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&str, TimePoint)> + '_ {
        self.entries
            .iter()
            .map(|entry| (self.registry.name(entry.activity), entry.time))
    }

    /// Appends an entry, unless it would repeat the last entry's activity.
    ///
    /// Returns true if an entry was added.
    pub fn push(&mut self, activity: &str, time: TimePoint) -> bool {
        let id = self.registry.intern(activity);
        if self.entries.last().is_some_and(|last| last.activity == id) {
            self.registry.release(id);
            return false;
        }
        self.entries.push(Entry { activity: id, time });
        true
    }

    /// Removes the last entry, returning its activity name.
    pub fn pop(&mut self) -> Option<String> {
        let entry = self.entries.pop()?;
        let name = self.registry.name(entry.activity).to_string();
        self.registry.release(entry.activity);
        Some(name)
    }

    /// Overwrites the entry at `index`, unless the new activity would repeat
    /// the activity of the entry at `index - 1`.
    ///
    /// Returns true if the entry was placed. Used for in-place compaction:
    /// callers advance their write cursor only when this returns true.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn put_at(&mut self, activity: &str, time: TimePoint, index: usize) -> bool {
        let old = self.entries[index].activity;
        let id = self.registry.intern(activity);
        if index > 0 && self.entries[index - 1].activity == id {
            self.registry.release(id);
            return false;
        }
        self.registry.release(old);
        self.entries[index] = Entry { activity: id, time };
        true
    }

    /// Drops every entry from `len` onwards.
    pub fn truncate(&mut self, len: usize) {
        while self.entries.len() > len {
            self.pop();
        }
    }

    /// Removes every entry and activity.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.registry.clear();
    }

    /// Checks invariants 1 to 3, describing the first violation found.
    pub fn validate(&self) -> Result<(), String> {
        for (i, pair) in self.entries.windows(2).enumerate() {
            if pair[1].time < pair[0].time {
                return Err(format!("entries {i} and {} out of order", i + 1));
            }
            if pair[1].activity == pair[0].activity {
                return Err(format!(
                    "entries {i} and {} repeat activity {:?}",
                    i + 1,
                    self.registry.name(pair[0].activity)
                ));
            }
        }

        let mut counts: HashMap<&str, usize> = HashMap::new();
        for entry in &self.entries {
            *counts.entry(self.registry.name(entry.activity)).or_default() += 1;
        }
        for (name, references) in self.registry.iter() {
            let actual = counts.get(name).copied().unwrap_or(0);
            if references != actual {
                return Err(format!(
                    "activity {name:?} has {references} references but {actual} entries"
                ));
            }
        }
        if counts.len() != self.registry.len() {
            return Err("registry is missing activities named by entries".to_string());
        }
        Ok(())
    }

    /// Panics in debug builds if an invariant does not hold.
    pub fn debug_assert_valid(&self) {
        if cfg!(debug_assertions) {
            if let Err(violation) = self.validate() {
                panic!("event store invariant violated: {violation}");
            }
        }
    }
}
