use std::path::Path;

use lofty::config::WriteOptions;
use lofty::file::TaggedFileExt;
use lofty::tag::{Tag, TagExt};

use crate::error::SyncError;

use super::field::SyncField;
use super::model::{FieldPatch, TrackMetadata};

/// Reads a file's embedded tags.
pub trait TagReader {
    fn read(&self, path: &Path) -> Result<TrackMetadata, SyncError>;
}

/// Commits a `FieldPatch` into a file's embedded tags.
pub trait TagWriter {
    fn write(&self, path: &Path, patch: &FieldPatch) -> Result<(), SyncError>;
}

/// `TagReader` / `TagWriter` backed by lofty.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoftyTags;

fn unreadable(path: &Path, reason: impl ToString) -> SyncError {
    SyncError::UnreadableFile {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

fn unwritable(path: &Path, reason: impl ToString) -> SyncError {
    SyncError::UnwritableFile {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

fn metadata_from_tag(tag: &Tag) -> TrackMetadata {
    let mut meta = TrackMetadata::default();
    for field in SyncField::ALL {
        if let Some(v) = tag.get_string(&field.item_key()) {
            // Blank frames read as absent.
            if !v.trim().is_empty() {
                meta.set(field, v);
            }
        }
    }
    meta
}

impl TagReader for LoftyTags {
    fn read(&self, path: &Path) -> Result<TrackMetadata, SyncError> {
        let tagged = lofty::read_from_path(path).map_err(|e| unreadable(path, e))?;
        let tag = tagged
            .primary_tag()
            .or_else(|| tagged.first_tag())
            .ok_or_else(|| unreadable(path, "file carries no tag"))?;
        Ok(metadata_from_tag(tag))
    }
}

impl TagWriter for LoftyTags {
    fn write(&self, path: &Path, patch: &FieldPatch) -> Result<(), SyncError> {
        if patch.is_empty() {
            return Ok(());
        }

        let tagged = lofty::read_from_path(path).map_err(|e| unreadable(path, e))?;
        // Same tag `read` sees; fields outside the patch must survive.
        let primary_type = tagged.primary_tag_type();
        let mut tag = match tagged.primary_tag().or_else(|| tagged.first_tag()) {
            Some(t) => {
                let mut t = t.clone();
                if t.tag_type() != primary_type {
                    t.re_map(primary_type);
                }
                t
            }
            None => Tag::new(primary_type),
        };

        for (field, value) in patch.iter() {
            if !tag.insert_text(field.item_key(), value.to_string()) {
                return Err(unwritable(
                    path,
                    format!("{} is not representable in {:?}", field.name(), tag.tag_type()),
                ));
            }
        }

        tag.save_to_path(path, WriteOptions::default())
            .map_err(|e| unwritable(path, e))
    }
}
