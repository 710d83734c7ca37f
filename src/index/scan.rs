use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::ScanSettings;
use crate::identity::{IdentityKey, Role, build_key};
use crate::metadata::TagReader;

use super::model::TreeIndex;

/// Two files in one tree resolved to the same identity key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collision {
    pub key: IdentityKey,
    /// The entry that stays in the index.
    pub kept: PathBuf,
    /// The entry it replaced.
    pub superseded: PathBuf,
}

/// Result of indexing one side of the sync.
#[derive(Debug, Default)]
pub struct IndexOutcome {
    pub index: TreeIndex,
    pub collisions: Vec<Collision>,
    /// Candidate files whose tags could not be read.
    pub unreadable: usize,
    /// Source files dropped by the excluded-genre filter.
    pub excluded: usize,
}

/// Walks directory trees and builds a `TreeIndex` from the tags it reads.
pub struct TreeIndexer<'a, R> {
    settings: &'a ScanSettings,
    reader: &'a R,
    extensions: Vec<String>,
}

fn normalize_extensions(raw: &[String]) -> Vec<String> {
    raw.iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

fn genre_matches(genre: Option<&str>, excluded: &str) -> bool {
    genre
        .map(|g| g.to_lowercase() == excluded.to_lowercase())
        .unwrap_or(false)
}

impl<'a, R: TagReader> TreeIndexer<'a, R> {
    pub fn new(settings: &'a ScanSettings, reader: &'a R) -> Self {
        Self {
            settings,
            reader,
            extensions: normalize_extensions(&settings.extensions),
        }
    }

    pub(crate) fn is_audio_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|s| s.to_str())
            .map(|ext| {
                let ext = ext.to_ascii_lowercase();
                self.extensions.iter().any(|e| e == &ext)
            })
            .unwrap_or(false)
    }

    /// Index every root in order into a single index.
    ///
    /// Entries are visited in file-name order within each directory, so when two
    /// files share a key the survivor is the last one in that order.
    pub fn build(&self, roots: &[PathBuf], role: Role) -> IndexOutcome {
        let mut outcome = IndexOutcome::default();
        for root in roots {
            self.index_root(root, role, &mut outcome);
        }
        info!(
            "indexed {} {} tracks ({} unreadable, {} excluded, {} duplicates)",
            outcome.index.len(),
            role,
            outcome.unreadable,
            outcome.excluded,
            outcome.collisions.len()
        );
        outcome
    }

    fn index_root(&self, root: &Path, role: Role, outcome: &mut IndexOutcome) {
        info!("walking {} tree {}", role, root.display());

        let include_hidden = self.settings.include_hidden;
        let walker = WalkDir::new(root)
            .follow_links(self.settings.follow_links)
            .sort_by_file_name();

        for entry in walker
            .into_iter()
            .filter_entry(|e| include_hidden || e.depth() == 0 || !is_hidden(e.path()))
        {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    warn!("skipping unreadable directory entry: {e}");
                    continue;
                }
            };
            let path = entry.path();
            if !entry.file_type().is_file() || !self.is_audio_file(path) {
                continue;
            }
            self.index_file(path, role, outcome);
        }
    }

    fn index_file(&self, path: &Path, role: Role, outcome: &mut IndexOutcome) {
        let meta = match self.reader.read(path) {
            Ok(m) => m,
            Err(e) => {
                warn!("{e}");
                outcome.unreadable += 1;
                return;
            }
        };

        if role == Role::Source {
            if let Some(excluded) = self.settings.excluded_genre.as_deref() {
                if genre_matches(meta.genre.as_deref(), excluded) {
                    debug!("excluded by genre: {}", path.display());
                    outcome.excluded += 1;
                    return;
                }
            }
        }

        let key = build_key(&meta, role);
        if let Some(previous) = outcome.index.insert(key.clone(), path.to_path_buf()) {
            warn!(
                "duplicate {} key <{}>:\n  {}\n  {}",
                role,
                key,
                path.display(),
                previous.display()
            );
            outcome.collisions.push(Collision {
                key,
                kept: path.to_path_buf(),
                superseded: previous,
            });
        }
    }
}
