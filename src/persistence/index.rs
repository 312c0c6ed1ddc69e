use std::collections::HashMap;

use super::key::Key;

/// Finds the position of a keyed row in a [`super::MemoryTable`] quickly.
///
/// Unkeyed rows are never indexed.
#[derive(Clone, Debug, Default)]
pub(crate) struct Index {
    key_index_map: HashMap<Key, usize>,
}

impl Index {
    pub fn new() -> Index {
        Index {
            key_index_map: HashMap::new(),
        }
    }

    pub fn insert(&mut self, key: Key, index: usize) {
        self.key_index_map.insert(key, index);
    }

    pub fn get(&self, key: &Key) -> Option<usize> {
        self.key_index_map.get(key).copied()
    }

    pub fn contains(&self, key: &Key) -> bool {
        self.key_index_map.contains_key(key)
    }

    pub fn remove(&mut self, key: &Key) -> Option<usize> {
        self.key_index_map.remove(key)
    }

    pub fn clear(&mut self) {
        self.key_index_map.clear();
    }

    pub fn shift_index_back(&mut self, start_index: usize) {
        //! Re-shape the index so as to remove the empty space left in
        //! the rows vector by a row deleted at `start_index`.

        for row_index in self.key_index_map.values_mut() {
            if *row_index > start_index {
                *row_index -= 1;
            }
        }
    }
}
