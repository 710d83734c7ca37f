//! Reconcile a music library export against the tags of the files it points at.
//!
//! The library is authoritative for values the files lack; values both sides
//! carry are only compared and reported. A few genre rules keep artist and
//! composer credits out of the library where they don't belong.

mod export;
mod rules;

use std::fmt;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::config::LibrarySettings;
use crate::error::LibraryError;
use crate::metadata::{FieldPatch, SyncField, TagReader, TagWriter};

pub use export::JsonLibrary;
pub use rules::{MissingField, resolve_missing};

/// One track as the library sees it.
pub trait LibraryTrack {
    /// File the record points at; records without one are skipped.
    fn location(&self) -> Option<&Path>;
    fn get(&self, field: SyncField) -> Option<&str>;
    /// Set a field; the empty string clears it.
    fn set(&mut self, field: SyncField, value: &str);
    /// Short human-readable identification for log lines.
    fn describe(&self) -> String;
}

/// A library whose records can be edited in place and written back.
pub trait LibrarySource {
    type Track: LibraryTrack;

    fn tracks_mut(&mut self) -> &mut [Self::Track];
    fn commit(&mut self) -> Result<(), LibraryError>;
}

/// Which side(s) a run may modify.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncOptions {
    /// Fill fields missing from files with the library's values.
    pub update_files: bool,
    /// Clear misplaced artist/composer credits in the library.
    pub update_library: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LibrarySummary {
    /// Records with a location that were checked against their file.
    pub examined: usize,
    pub files_patched: usize,
    pub records_changed: usize,
    /// Fields present on both sides with different values.
    pub mismatches: usize,
    pub errors: usize,
}

impl fmt::Display for LibrarySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "examined {}, files patched {}, library records changed {}, mismatches {}, errors {}",
            self.examined, self.files_patched, self.records_changed, self.mismatches, self.errors
        )
    }
}

pub struct LibrarySync<R, W> {
    rules: LibrarySettings,
    fields: Vec<SyncField>,
    options: SyncOptions,
    reader: R,
    writer: W,
}

impl<R: TagReader, W: TagWriter> LibrarySync<R, W> {
    pub fn new(
        rules: LibrarySettings,
        fields: Vec<SyncField>,
        options: SyncOptions,
        reader: R,
        writer: W,
    ) -> Self {
        Self {
            rules,
            fields,
            options,
            reader,
            writer,
        }
    }

    /// Walk every record once. The library is committed at the end, and only
    /// when a record changed.
    pub fn run<S: LibrarySource>(&self, library: &mut S) -> Result<LibrarySummary, LibraryError> {
        let mut summary = LibrarySummary::default();

        for track in library.tracks_mut() {
            if self.sync_track(track, &mut summary) {
                summary.records_changed += 1;
            }
        }

        if summary.records_changed > 0 {
            info!("writing {} changed library records", summary.records_changed);
            library.commit()?;
        }
        Ok(summary)
    }

    /// Returns whether the library record was modified.
    fn sync_track<T: LibraryTrack>(&self, track: &mut T, summary: &mut LibrarySummary) -> bool {
        let Some(location) = track.location().map(Path::to_path_buf) else {
            return false;
        };
        summary.examined += 1;

        let file = match self.reader.read(&location) {
            Ok(meta) => meta,
            Err(e) => {
                warn!("{e}");
                summary.errors += 1;
                return false;
            }
        };
        let genre = file.genre_or_empty();

        let mut patch = FieldPatch::new();
        let mut changed = false;
        for &field in &self.fields {
            let library_value = non_empty(track.get(field)).map(str::to_string);

            if let Some(file_value) = non_empty(file.get(field)) {
                if library_value.as_deref() != Some(file_value) && field != SyncField::Comment {
                    warn!(
                        "no match for {} in {}; library=<{}>, file=<{}>",
                        field.name(),
                        track.describe(),
                        library_value.as_deref().unwrap_or(""),
                        file_value
                    );
                    summary.mismatches += 1;
                }
                continue;
            }

            let Some(library_value) = library_value else {
                continue;
            };
            match resolve_missing(&self.rules, genre, field, &library_value) {
                MissingField::MoveToComment { label } => {
                    if self.options.update_library {
                        info!("clearing library {} in {}", field.name(), track.describe());
                        track.set(field, "");
                        let comment = non_empty(track.get(SyncField::Comment));
                        if !comment.is_some_and(|c| c.contains('(')) {
                            let note = credit_note(comment, label, &library_value);
                            track.set(SyncField::Comment, &note);
                        }
                        changed = true;
                    }
                }
                MissingField::Clear => {
                    if self.options.update_library {
                        info!("clearing library {} in {}", field.name(), track.describe());
                        track.set(field, "");
                        changed = true;
                    }
                }
                MissingField::Ignore => {}
                MissingField::FillFile => {
                    if self.options.update_files {
                        warn!(
                            "missing {} in {}; library=<{}>",
                            field.name(),
                            track.describe(),
                            library_value
                        );
                        patch.stage(field, library_value);
                    } else {
                        debug!("{} missing from {}", field.name(), location.display());
                    }
                }
            }
        }

        if !patch.is_empty() {
            match self.writer.write(&location, &patch) {
                Ok(()) => summary.files_patched += 1,
                Err(e) => {
                    warn!("{e}");
                    summary.errors += 1;
                }
            }
        }
        changed
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// `"<comment> (<label>: <credit>)"`, or just the parenthesized part.
fn credit_note(comment: Option<&str>, label: &str, credit: &str) -> String {
    match comment {
        Some(c) => format!("{c} ({label}: {credit})"),
        None => format!("({label}: {credit})"),
    }
}
