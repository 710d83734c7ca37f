use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::metadata::SyncField;

/// Top-level settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/tagmirror/config.toml` or `~/.config/tagmirror/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `TAGMIRROR__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub scan: ScanSettings,
    pub sync: SyncSettings,
    pub transcode: TranscodeSettings,
    pub cache: CacheSettings,
    pub library: LibrarySettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScanSettings {
    /// File extensions to treat as audio (case-insensitive, without dot).
    pub extensions: Vec<String>,
    /// Whether to follow symlinks during scanning.
    pub follow_links: bool,
    /// Whether to include hidden files/directories (dotfiles).
    pub include_hidden: bool,
    /// Source tracks whose genre matches this (case-insensitively) are never synced.
    pub excluded_genre: Option<String>,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            extensions: vec!["mp3".into(), "m4a".into()],
            follow_links: true,
            include_hidden: true,
            excluded_genre: Some("Podcast".into()),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SyncSettings {
    /// Fields compared and patched on matched pairs, in order.
    pub fields: Vec<SyncField>,
    /// What to do with orphaned and duplicate destination files.
    pub delete_mode: DeleteMode,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            fields: SyncField::ALL.to_vec(),
            delete_mode: DeleteMode::Remove,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeleteMode {
    /// Remove the file from disk.
    #[serde(alias = "delete", alias = "hard")]
    Remove,
    /// Only report what would be removed.
    #[serde(alias = "soft", alias = "report-only")]
    Report,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TranscodeSettings {
    /// Transcoder executable (looked up on `PATH` when not absolute).
    pub program: String,
    /// Argument template; `{input}` and `{output}` are substituted per file.
    pub args: Vec<String>,
    /// Extension of files produced at the destination.
    pub target_extension: String,
    /// Upper bound for a single transcode, in seconds.
    pub timeout_secs: u64,
}

impl Default for TranscodeSettings {
    fn default() -> Self {
        Self {
            program: "ffmpeg".to_string(),
            args: [
                "-y",
                "-loglevel",
                "quiet",
                "-i",
                "{input}",
                "-id3v2_version",
                "3",
                "{output}",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            target_extension: "mp3".to_string(),
            timeout_secs: 600,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Whether index caches are read and written at all.
    pub enabled: bool,
    /// Directory holding the cache files; defaults to the XDG cache dir.
    pub dir: Option<PathBuf>,
    /// File name of the source index cache.
    pub source_file: String,
    /// File name of the destination index cache.
    pub destination_file: String,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: None,
            source_file: "src.dat".to_string(),
            destination_file: "dst.dat".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// Genres whose tracks keep artist credits out of the artist fields.
    pub artistless_genres: Vec<String>,
    /// Genres whose tracks carry a composer credit.
    pub composer_genres: Vec<String>,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            artistless_genres: vec!["Classical".into(), "Podcast".into()],
            composer_genres: vec!["Classical".into()],
        }
    }
}
