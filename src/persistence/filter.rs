use std::collections::HashSet;

use indexmap::IndexMap;

use super::key::Key;

/// Per-column allow-sets a backend should apply when it builds cursors.
///
/// A column without an entry is unfiltered. Entries are kept in the order they
/// were set.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Filter(IndexMap<usize, HashSet<Key>>);

impl Filter {
    pub fn new() -> Filter {
        Filter(IndexMap::new())
    }

    pub fn set(&mut self, column: usize, keys: HashSet<Key>) {
        //! Set the admissible values of `column`, replacing any earlier set.

        self.0.insert(column, keys);
    }

    pub fn clear(&mut self, column: usize) -> Option<HashSet<Key>> {
        self.0.shift_remove(&column)
    }

    pub fn contains(&self, column: usize) -> bool {
        self.0.contains_key(&column)
    }

    pub fn get(&self, column: usize) -> Option<&HashSet<Key>> {
        self.0.get(&column)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, usize, HashSet<Key>> {
        self.0.iter()
    }
}
