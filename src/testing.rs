//! Test doubles for the tag and transcoder capabilities.
//!
//! Track files in tests are plain text, one `field-name=value` line per tag,
//! so fixtures stay readable and the indexer still walks a real tree.

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::SyncError;
use crate::metadata::{FieldPatch, SyncField, TagReader, TagWriter, TrackMetadata};
use crate::transcode::{TranscodeStatus, Transcoder};

/// Marker content for files the fake reader refuses.
pub(crate) const GARBAGE: &str = "garbage";

fn parse(text: &str) -> TrackMetadata {
    let mut meta = TrackMetadata::default();
    for line in text.lines() {
        if let Some((name, value)) = line.split_once('=') {
            if let Some(field) = SyncField::ALL.into_iter().find(|f| f.name() == name) {
                meta.set(field, value);
            }
        }
    }
    meta
}

fn render(meta: &TrackMetadata) -> String {
    SyncField::ALL
        .into_iter()
        .filter_map(|f| meta.get(f).map(|v| format!("{}={}\n", f.name(), v)))
        .collect()
}

pub(crate) fn meta(fields: &[(SyncField, &str)]) -> TrackMetadata {
    let mut m = TrackMetadata::default();
    for (f, v) in fields {
        m.set(*f, *v);
    }
    m
}

/// Write a fake track at `root/rel`, creating parent directories.
pub(crate) fn track(root: &Path, rel: &str, fields: &[(SyncField, &str)]) -> PathBuf {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, render(&meta(fields))).unwrap();
    path
}

pub(crate) fn read_track(path: &Path) -> TrackMetadata {
    parse(&fs::read_to_string(path).unwrap())
}

/// Reads and writes the text track format.
#[derive(Debug, Default)]
pub(crate) struct TextTags {
    pub writes: RefCell<Vec<(PathBuf, FieldPatch)>>,
}

impl TagReader for TextTags {
    fn read(&self, path: &Path) -> Result<TrackMetadata, SyncError> {
        let text = fs::read_to_string(path).map_err(|e| SyncError::UnreadableFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        if text.starts_with(GARBAGE) {
            return Err(SyncError::UnreadableFile {
                path: path.to_path_buf(),
                reason: "not an audio file".into(),
            });
        }
        Ok(parse(&text))
    }
}

impl TagWriter for TextTags {
    fn write(&self, path: &Path, patch: &FieldPatch) -> Result<(), SyncError> {
        let mut current = self.read(path)?;
        patch.apply_to(&mut current);
        fs::write(path, render(&current)).map_err(|e| SyncError::UnwritableFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        self.writes
            .borrow_mut()
            .push((path.to_path_buf(), patch.clone()));
        Ok(())
    }
}

/// Writer that fails every commit.
pub(crate) struct ReadOnlyTags;

impl TagWriter for ReadOnlyTags {
    fn write(&self, path: &Path, _patch: &FieldPatch) -> Result<(), SyncError> {
        Err(SyncError::UnwritableFile {
            path: path.to_path_buf(),
            reason: "read-only".into(),
        })
    }
}

/// "Transcodes" by copying, optionally failing for sources whose name contains `fail_on`.
#[derive(Debug, Default)]
pub(crate) struct CopyTranscoder {
    pub fail_on: Option<String>,
    pub calls: RefCell<Vec<(PathBuf, PathBuf)>>,
}

impl Transcoder for CopyTranscoder {
    fn transcode(&self, source: &Path, target: &Path) -> Result<TranscodeStatus, SyncError> {
        self.calls
            .borrow_mut()
            .push((source.to_path_buf(), target.to_path_buf()));
        let fails = self
            .fail_on
            .as_deref()
            .map(|needle| source.to_string_lossy().contains(needle))
            .unwrap_or(false);
        if fails {
            fs::write(target, b"partial").map_err(|e| SyncError::io(target, e))?;
            return Ok(TranscodeStatus::Exited(Some(1)));
        }
        fs::copy(source, target).map_err(|e| SyncError::io(target, e))?;
        Ok(TranscodeStatus::Exited(Some(0)))
    }
}
