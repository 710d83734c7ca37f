use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};

use crate::config::DeleteMode;
use crate::error::SyncError;
use crate::metadata::{TagReader, TagWriter};
use crate::patch::compute_patch;
use crate::reconcile::Action;
use crate::transcode::{TranscodeStatus, Transcoder};

use super::{Engine, RunSummary};

/// What an executor did for one action.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Applied {
    Created(PathBuf),
    /// Tags rewritten; carries the number of patched fields.
    Updated(usize),
    Unchanged,
    Deleted,
    /// Delete mode is `report`: nothing removed.
    Reported,
}

impl<R: TagReader, W: TagWriter, T: Transcoder> Engine<R, W, T> {
    /// Perform one action and fold its outcome into `summary`.
    pub(crate) fn execute(&self, action: &Action, summary: &mut RunSummary) {
        let result = match action {
            Action::Create { source } => self.create(source),
            Action::Update {
                source,
                destination,
            } => self.update(source, destination),
            Action::Delete { destination } => self.delete(destination),
        };

        match result {
            Ok(Applied::Created(target)) => {
                debug!("created {}", target.display());
                summary.created += 1;
            }
            Ok(Applied::Updated(fields)) => {
                debug!("patched {fields} field(s)");
                summary.updated += 1;
            }
            Ok(Applied::Unchanged) => summary.unchanged += 1,
            Ok(Applied::Deleted) => summary.deleted += 1,
            Ok(Applied::Reported) => summary.reported += 1,
            Err(e @ SyncError::Relativization { .. }) => {
                error!("internal consistency violation: {e}");
                summary.errored += 1;
            }
            Err(e) => {
                warn!("{e}");
                summary.errored += 1;
            }
        }
    }

    /// Where a source file lands in the destination tree.
    ///
    /// The path is re-rooted under the first configured source root it can be
    /// expressed relative to, and given the target extension.
    pub fn destination_path_for(&self, source: &Path) -> Result<PathBuf, SyncError> {
        for root in &self.config.source_roots {
            if let Ok(rel) = source.strip_prefix(root) {
                if rel.components().next().is_some() {
                    return Ok(self
                        .config
                        .destination_root
                        .join(rel)
                        .with_extension(&self.config.target_extension));
                }
            }
        }
        Err(SyncError::Relativization {
            path: source.to_path_buf(),
        })
    }

    fn create(&self, source: &Path) -> Result<Applied, SyncError> {
        let target = self.destination_path_for(source)?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| SyncError::io(parent, e))?;
        }

        info!("transcode: {} -> {}", source.display(), target.display());
        let status = self.transcoder.transcode(source, &target)?;
        if status.is_success() {
            return Ok(Applied::Created(target));
        }

        // Leave no half-written file for the next run to index.
        if let Err(e) = fs::remove_file(&target) {
            if e.kind() != ErrorKind::NotFound {
                warn!("could not remove partial output {}: {e}", target.display());
            }
        }
        Err(match status {
            TranscodeStatus::TimedOut(after) => SyncError::TranscodeTimeout {
                source_path: source.to_path_buf(),
                after,
            },
            TranscodeStatus::Exited(code) => SyncError::TranscodeFailure {
                source_path: source.to_path_buf(),
                status: code,
            },
        })
    }

    fn update(&self, source: &Path, destination: &Path) -> Result<Applied, SyncError> {
        let src = self.reader.read(source)?;
        let dst = self.reader.read(destination)?;

        let patch = compute_patch(&src, &dst, &self.config.fields);
        if patch.is_empty() {
            return Ok(Applied::Unchanged);
        }

        info!(
            "committing update to {} ({})",
            destination.display(),
            patch.field_names().join(", ")
        );
        self.writer.write(destination, &patch)?;
        Ok(Applied::Updated(patch.len()))
    }

    fn delete(&self, destination: &Path) -> Result<Applied, SyncError> {
        match self.config.delete_mode {
            DeleteMode::Report => {
                info!("would delete {}", destination.display());
                Ok(Applied::Reported)
            }
            DeleteMode::Remove => {
                info!("deleting {}", destination.display());
                match fs::remove_file(destination) {
                    Ok(()) => Ok(Applied::Deleted),
                    // Already gone (e.g. index restored from an older cache).
                    Err(e) if e.kind() == ErrorKind::NotFound => Ok(Applied::Deleted),
                    Err(e) => Err(SyncError::io(destination, e)),
                }
            }
        }
    }
}
