use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::LibraryError;
use crate::metadata::{SyncField, TrackMetadata};

use super::{LibrarySource, LibraryTrack};

/// One record of a library export: where the file lives plus the library's
/// own view of its tags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryRecord {
    #[serde(default)]
    pub location: Option<PathBuf>,
    #[serde(flatten)]
    pub metadata: TrackMetadata,
}

impl LibraryTrack for LibraryRecord {
    fn location(&self) -> Option<&Path> {
        self.location.as_deref()
    }

    fn get(&self, field: SyncField) -> Option<&str> {
        self.metadata.get(field)
    }

    fn set(&mut self, field: SyncField, value: &str) {
        self.metadata.set(field, value);
    }

    fn describe(&self) -> String {
        format!(
            "<{}, {}, {}>",
            self.metadata.album.as_deref().unwrap_or(""),
            self.metadata.title.as_deref().unwrap_or(""),
            self.location
                .as_deref()
                .map(|p| p.display().to_string())
                .unwrap_or_default()
        )
    }
}

/// A library exported as a JSON array of `LibraryRecord`s.
#[derive(Debug)]
pub struct JsonLibrary {
    path: PathBuf,
    records: Vec<LibraryRecord>,
}

impl JsonLibrary {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, LibraryError> {
        let path = path.into();
        let text = fs::read_to_string(&path)?;
        let records = serde_json::from_str(&text)?;
        Ok(Self { path, records })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn records(&self) -> &[LibraryRecord] {
        &self.records
    }
}

impl LibrarySource for JsonLibrary {
    type Track = LibraryRecord;

    fn tracks_mut(&mut self) -> &mut [LibraryRecord] {
        &mut self.records
    }

    /// Rewrite the export through a sibling temp file.
    fn commit(&mut self) -> Result<(), LibraryError> {
        let json = serde_json::to_string_pretty(&self.records)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
