//! Line-oriented index cache.
//!
//! ```text
//! #tagmirror-index<>1
//! #roots<>/music/a<>/music/b
//! #entries<>2
//! Album|1|1|Title<>/music/a/Album/01 Title.m4a
//! ...
//! ```
//!
//! UTF-8, one entry per line. The header lets a later run refuse a cache
//! written for other roots, an older format, or a tree modified since.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::info;
use walkdir::WalkDir;

use crate::error::CacheError;
use crate::identity::IdentityKey;

use super::model::TreeIndex;

pub(crate) const SEPARATOR: &str = "<>";
pub(crate) const FORMAT_VERSION: u32 = 1;
const MAGIC: &str = "#tagmirror-index";
const ROOTS: &str = "#roots";
const ENTRIES: &str = "#entries";

/// Outcome of trying to restore an index from disk.
#[derive(Debug)]
pub enum CacheLoad {
    /// No cache file exists yet.
    Missing,
    /// A cache exists but must not be trusted; the reason is for logging.
    Stale(String),
    Loaded(TreeIndex),
}

/// A persisted `TreeIndex` at a fixed path.
#[derive(Debug, Clone)]
pub struct IndexCache {
    path: PathBuf,
}

fn root_strings(roots: &[PathBuf]) -> Result<Vec<String>, CacheError> {
    roots
        .iter()
        .map(|r| match r.to_str() {
            Some(s) if !s.contains(SEPARATOR) => Ok(s.to_string()),
            _ => Err(CacheError::Unencodable { line: 2 }),
        })
        .collect()
}

fn modified(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}

/// Newest modification time of `root` and everything below it.
///
/// A directory's mtime only moves when its direct children change, so a new
/// album two levels down is only visible by looking at every level.
fn newest_modified(root: &Path) -> Option<SystemTime> {
    WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_map(Result::ok)
        .filter_map(|e| e.metadata().ok().and_then(|m| m.modified().ok()))
        .max()
}

fn header_value<'l>(
    line: Option<&'l str>,
    tag: &str,
    line_no: usize,
) -> Result<&'l str, CacheError> {
    line.and_then(|l| l.strip_prefix(tag))
        .and_then(|rest| rest.strip_prefix(SEPARATOR))
        .ok_or(CacheError::Malformed { line: line_no })
}

impl IndexCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Restore the index if a trustworthy cache exists for exactly `roots`.
    pub fn load(&self, roots: &[PathBuf]) -> Result<CacheLoad, CacheError> {
        if !self.path.exists() {
            return Ok(CacheLoad::Missing);
        }
        info!("reading index cache {}", self.path.display());

        let reader = BufReader::new(File::open(&self.path)?);
        let mut lines = Vec::new();
        for line in reader.lines() {
            lines.push(line?);
        }
        let mut it = lines.iter().map(String::as_str);

        let version = header_value(it.next(), MAGIC, 1)
            .map_err(|_| CacheError::UnsupportedVersion {
                expected: FORMAT_VERSION,
            })?;
        if version.parse::<u32>().ok() != Some(FORMAT_VERSION) {
            return Err(CacheError::UnsupportedVersion {
                expected: FORMAT_VERSION,
            });
        }

        let recorded_roots: Vec<&str> = match header_value(it.next(), ROOTS, 2)? {
            "" => Vec::new(),
            list => list.split(SEPARATOR).collect(),
        };
        let wanted = root_strings(roots)?;
        if recorded_roots != wanted {
            return Ok(CacheLoad::Stale(format!(
                "cache was written for roots {recorded_roots:?}"
            )));
        }

        let expected: usize = header_value(it.next(), ENTRIES, 3)?
            .parse()
            .map_err(|_| CacheError::Malformed { line: 3 })?;

        let mut index = TreeIndex::new();
        let mut count = 0usize;
        for (offset, line) in it.enumerate() {
            if line.is_empty() {
                continue;
            }
            let (key, path) = line
                .split_once(SEPARATOR)
                .ok_or(CacheError::Malformed { line: offset + 4 })?;
            index.insert(IdentityKey::from_cached(key), PathBuf::from(path));
            count += 1;
        }
        if count != expected || index.len() != expected {
            return Ok(CacheLoad::Stale(format!(
                "header announces {expected} entries, found {count}"
            )));
        }

        let written = modified(&self.path);
        for root in roots {
            match (newest_modified(root), written) {
                (Some(root_time), Some(cache_time)) if root_time <= cache_time => {}
                (None, _) => {
                    return Ok(CacheLoad::Stale(format!("{} is missing", root.display())));
                }
                _ => {
                    return Ok(CacheLoad::Stale(format!(
                        "{} changed after the cache was written",
                        root.display()
                    )));
                }
            }
        }

        Ok(CacheLoad::Loaded(index))
    }

    /// Drop the cache file, e.g. after the tree it describes was modified.
    pub fn invalidate(&self) -> Result<(), CacheError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Persist `index` for `roots`, replacing any previous cache atomically.
    pub fn store(&self, index: &TreeIndex, roots: &[PathBuf]) -> Result<(), CacheError> {
        let roots = root_strings(roots)?;

        let mut body = String::new();
        body.push_str(&format!("{MAGIC}{SEPARATOR}{FORMAT_VERSION}\n"));
        body.push_str(&format!("{ROOTS}{SEPARATOR}{}\n", roots.join(SEPARATOR)));
        body.push_str(&format!("{ENTRIES}{SEPARATOR}{}\n", index.len()));

        for (i, entry) in index.iter().enumerate() {
            let line_no = i + 4;
            let key = entry.key.as_str();
            let path = entry
                .location
                .to_str()
                .ok_or(CacheError::Unencodable { line: line_no })?;
            let unencodable = |s: &str| s.contains(SEPARATOR) || s.contains('\n');
            if unencodable(key) || unencodable(path) {
                return Err(CacheError::Unencodable { line: line_no });
            }
            body.push_str(key);
            body.push_str(SEPARATOR);
            body.push_str(path);
            body.push('\n');
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("tmp");
        {
            let mut w = BufWriter::new(File::create(&tmp)?);
            w.write_all(body.as_bytes())?;
            w.flush()?;
        }
        fs::rename(&tmp, &self.path)?;
        info!(
            "wrote {} entries to index cache {}",
            index.len(),
            self.path.display()
        );
        Ok(())
    }
}
