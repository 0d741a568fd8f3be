//! Reference-counted interning table for activity names.
//!
//! Each entry in the event store holds an [`ActivityId`] rather than a copy of
//! the activity name. Ids are indices into a slot arena, so they stay valid
//! while other names are interned or released. A slot is freed (and may later
//! be reused) only once its reference count drops to zero, at which point no
//! entry can still be holding the id.

use std::collections::HashMap;

/// Handle to an interned activity name.
///
/// Two live ids are equal if and only if they denote the same activity name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActivityId(u32);

#[derive(Debug)]
struct Slot {
    name: String,
    references: usize,
}

/// Interning table mapping activity names to reference counts.
#[derive(Debug, Default)]
pub struct ActivityRegistry {
    slots: Vec<Option<Slot>>,
    free: Vec<u32>,
    index: HashMap<String, ActivityId>,
}

impl ActivityRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes a reference to `name`, interning it if not already present.
    pub fn intern(&mut self, name: &str) -> ActivityId {
        if let Some(&id) = self.index.get(name) {
            self.slot_mut(id).references += 1;
            return id;
        }

        let slot = Slot {
            name: name.to_string(),
            references: 1,
        };
        let id = if let Some(raw) = self.free.pop() {
            self.slots[raw as usize] = Some(slot);
            ActivityId(raw)
        } else {
            let raw = u32::try_from(self.slots.len()).expect("activity registry exhausted");
            self.slots.push(Some(slot));
            ActivityId(raw)
        };
        self.index.insert(name.to_string(), id);
        id
    }

    /// Drops a reference to the activity, removing it once unreferenced.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not live. Every live id has at least one reference, so
    /// this indicates a release without a matching [`intern`](Self::intern).
    pub fn release(&mut self, id: ActivityId) {
        let slot = self.slot_mut(id);
        slot.references -= 1;
        if slot.references > 0 {
            return;
        }
        if let Some(slot) = self.slots[id.0 as usize].take() {
            self.index.remove(&slot.name);
            self.free.push(id.0);
        }
    }

    /// Returns the name behind a live id.
    ///
    /// # Panics
    ///
    /// Panics if `id` has been released.
    pub fn name(&self, id: ActivityId) -> &str {
        match self.slots.get(id.0 as usize) {
            Some(Some(slot)) => &slot.name,
            _ => panic!("activity id {} is not live", id.0),
        }
    }

    /// Returns the number of entries currently referencing `name`, or zero.
    pub fn references(&self, name: &str) -> usize {
        self.index
            .get(name)
            .map_or(0, |&id| self.slot(id).references)
    }

    /// Returns true if `name` is referenced by at least one entry.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Number of distinct live activities (the inactive sentinel included).
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Iterates over live `(name, reference count)` pairs in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.slots
            .iter()
            .flatten()
            .map(|slot| (slot.name.as_str(), slot.references))
    }

    /// Forgets every activity. Previously issued ids become invalid.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.index.clear();
    }

    fn slot(&self, id: ActivityId) -> &Slot {
        match self.slots.get(id.0 as usize) {
            Some(Some(slot)) => slot,
            _ => panic!("activity id {} is not live", id.0),
        }
    }

    fn slot_mut(&mut self, id: ActivityId) -> &mut Slot {
        match self.slots.get_mut(id.0 as usize) {
            Some(Some(slot)) => slot,
            _ => panic!("activity id {} released with no references", id.0),
        }
    }
}
