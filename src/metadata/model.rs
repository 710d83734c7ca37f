use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::field::SyncField;

/// Point-in-time view of a file's embedded tags.
///
/// Every field is optional; an absent field is not the same as an empty one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TrackMetadata {
    pub album: Option<String>,
    pub disc_number: Option<String>,
    pub disc_total: Option<String>,
    pub track_number: Option<String>,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album_artist: Option<String>,
    pub genre: Option<String>,
    pub composer: Option<String>,
    pub comment: Option<String>,
}

impl TrackMetadata {
    pub fn get(&self, field: SyncField) -> Option<&str> {
        field.get(self)
    }

    pub fn set(&mut self, field: SyncField, value: impl Into<String>) {
        field.set(self, value);
    }

    /// Genre as read, or the empty string when absent.
    pub fn genre_or_empty(&self) -> &str {
        self.genre.as_deref().unwrap_or("")
    }
}

/// Field writes needed to bring a destination file in line with its source.
///
/// Applied all-or-nothing by a `TagWriter`. Ordered by `SyncField`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldPatch {
    changes: BTreeMap<SyncField, String>,
}

impl FieldPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&mut self, field: SyncField, value: impl Into<String>) {
        self.changes.insert(field, value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    #[cfg(test)]
    pub fn get(&self, field: SyncField) -> Option<&str> {
        self.changes.get(&field).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (SyncField, &str)> {
        self.changes.iter().map(|(f, v)| (*f, v.as_str()))
    }

    /// Apply the staged values onto an in-memory metadata view.
    #[cfg(test)]
    pub fn apply_to(&self, meta: &mut TrackMetadata) {
        for (field, value) in self.iter() {
            meta.set(field, value);
        }
    }

    /// Field names, for log lines.
    pub fn field_names(&self) -> Vec<&'static str> {
        self.changes.keys().map(|f| f.name()).collect()
    }
}
