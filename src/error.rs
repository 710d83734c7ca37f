//! Error types shared by the indexer, executors and library sync.
//!
//! Per-file errors are reported and tallied; only `Relativization` points at a
//! broken invariant of the tree walk itself.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    /// Tag extraction failed; the file is skipped.
    #[error("cannot read tags from {}: {reason}", .path.display())]
    UnreadableFile { path: PathBuf, reason: String },

    /// Tag commit failed; the update for this file is skipped.
    #[error("cannot write tags to {}: {reason}", .path.display())]
    UnwritableFile { path: PathBuf, reason: String },

    /// The transcoder exited with a non-zero status (or was killed by a signal).
    #[error("transcoding {} failed with status {}", .source_path.display(), exit_code(.status))]
    TranscodeFailure {
        source_path: PathBuf,
        status: Option<i32>,
    },

    /// The transcoder did not finish within the configured bound.
    #[error("transcoding {} timed out after {after:?}", .source_path.display())]
    TranscodeTimeout {
        source_path: PathBuf,
        after: Duration,
    },

    /// A source path lies under none of the configured source roots.
    #[error("{} is not under any configured source root", .path.display())]
    Relativization { path: PathBuf },

    #[error("io error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Library(#[from] LibraryError),
}

impl SyncError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

fn exit_code(status: &Option<i32>) -> String {
    match status {
        Some(code) => code.to_string(),
        None => "signal".to_string(),
    }
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unsupported cache format (expected version {expected})")]
    UnsupportedVersion { expected: u32 },

    #[error("malformed cache line {line}")]
    Malformed { line: usize },

    #[error("entry {line} contains the field separator or is not valid UTF-8")]
    Unencodable { line: usize },
}

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("library export io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("library export is not valid json: {0}")]
    Json(#[from] serde_json::Error),
}
