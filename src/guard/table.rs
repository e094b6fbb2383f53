//! Guard table
//!
//! Mapping from route id to loaded guard. Built once by the loader and then
//! only read.

use crate::guard::types::{GuardEntry, RouteId};
use std::collections::BTreeMap;
use std::fmt;

/// Loaded guards keyed by route id
///
/// Iteration order is ascending lexicographic by route id, which is the
/// order guards are evaluated in.
pub struct GuardTable<R> {
    entries: BTreeMap<RouteId, GuardEntry<R>>,
}

impl<R> GuardTable<R> {
    /// Create an empty table
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Insert an entry; a later entry with the same route id replaces the
    /// earlier one
    pub(crate) fn insert(&mut self, entry: GuardEntry<R>) -> Option<GuardEntry<R>> {
        self.entries.insert(entry.route_id().clone(), entry)
    }

    /// Get the guard registered for a route id
    pub fn get(&self, route_id: &str) -> Option<&GuardEntry<R>> {
        self.entries.get(route_id)
    }

    /// Check if a guard is registered for a route id
    pub fn contains(&self, route_id: &str) -> bool {
        self.entries.contains_key(route_id)
    }

    /// Get all route ids, in evaluation order
    pub fn route_ids(&self) -> impl Iterator<Item = &RouteId> {
        self.entries.keys()
    }

    /// Get all entries, in evaluation order
    pub fn entries(&self) -> impl Iterator<Item = &GuardEntry<R>> {
        self.entries.values()
    }

    /// Get the number of guards
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the table is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<R> Default for GuardTable<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> FromIterator<GuardEntry<R>> for GuardTable<R> {
    fn from_iter<I: IntoIterator<Item = GuardEntry<R>>>(iter: I) -> Self {
        let mut table = Self::new();
        for entry in iter {
            table.insert(entry);
        }
        table
    }
}

impl<R> fmt::Debug for GuardTable<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.entries.values()).finish()
    }
}
