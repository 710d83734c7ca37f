use std::collections::BTreeMap;
use std::collections::btree_map;
use std::path::PathBuf;

use crate::identity::IdentityKey;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub key: IdentityKey,
    pub location: PathBuf,
}

/// Mapping from identity key to exactly one file location.
///
/// Backed by an ordered map so iteration (and everything derived from it) is
/// stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeIndex {
    entries: BTreeMap<IdentityKey, IndexEntry>,
}

impl TreeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `location` under `key`, returning the location it replaced.
    pub fn insert(&mut self, key: IdentityKey, location: PathBuf) -> Option<PathBuf> {
        let entry = IndexEntry {
            key: key.clone(),
            location,
        };
        self.entries.insert(key, entry).map(|old| old.location)
    }

    #[cfg(test)]
    pub fn get(&self, key: &IdentityKey) -> Option<&std::path::Path> {
        self.entries.get(key).map(|e| e.location.as_path())
    }

    pub fn remove(&mut self, key: &IdentityKey) -> Option<IndexEntry> {
        self.entries.remove(key)
    }

    #[cfg(test)]
    pub fn contains_key(&self, key: &IdentityKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &IndexEntry> {
        self.entries.values()
    }

    #[cfg(test)]
    pub fn keys(&self) -> impl Iterator<Item = &IdentityKey> {
        self.entries.keys()
    }
}

impl IntoIterator for TreeIndex {
    type Item = IndexEntry;
    type IntoIter = btree_map::IntoValues<IdentityKey, IndexEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_values()
    }
}

impl FromIterator<(IdentityKey, PathBuf)> for TreeIndex {
    fn from_iter<I: IntoIterator<Item = (IdentityKey, PathBuf)>>(iter: I) -> Self {
        let mut index = TreeIndex::new();
        for (key, location) in iter {
            index.insert(key, location);
        }
        index
    }
}
