//! Sync engine: index both sides, reconcile, and drive the executors.
//!
//! Everything the engine needs comes in through `EngineConfig` and the three
//! capabilities; there is no global state.

mod executor;
mod summary;

use std::path::PathBuf;

use tracing::{info, warn};

use crate::config::{DeleteMode, ScanSettings, Settings};
use crate::identity::Role;
use crate::index::{CacheLoad, IndexCache, TreeIndex, TreeIndexer};
use crate::metadata::{SyncField, TagReader, TagWriter};
use crate::reconcile::{Action, reconcile};
use crate::transcode::Transcoder;

pub use summary::RunSummary;

const PROGRESS_EVERY: usize = 100;

/// Explicit configuration for one sync run.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub destination_root: PathBuf,
    /// Source roots, in priority order for relativization and duplicate resolution.
    pub source_roots: Vec<PathBuf>,
    pub scan: ScanSettings,
    pub fields: Vec<SyncField>,
    pub delete_mode: DeleteMode,
    /// Extension given to transcoded files, without the dot.
    pub target_extension: String,
    /// Where to persist indexes; `None` disables caching.
    pub caches: Option<CachePaths>,
    /// Ignore existing caches (they are still rewritten).
    pub rescan: bool,
}

#[derive(Debug, Clone)]
pub struct CachePaths {
    pub source: PathBuf,
    pub destination: PathBuf,
}

impl EngineConfig {
    pub fn from_settings(
        settings: &Settings,
        destination_root: PathBuf,
        source_roots: Vec<PathBuf>,
    ) -> Self {
        let caches = settings.cache.enabled.then(|| {
            let dir = settings.cache_dir();
            CachePaths {
                source: dir.join(&settings.cache.source_file),
                destination: dir.join(&settings.cache.destination_file),
            }
        });
        Self {
            destination_root,
            source_roots,
            scan: settings.scan.clone(),
            fields: settings.sync.fields.clone(),
            delete_mode: settings.sync.delete_mode,
            target_extension: settings
                .transcode
                .target_extension
                .trim()
                .trim_start_matches('.')
                .to_string(),
            caches,
            rescan: false,
        }
    }
}

pub struct Engine<R, W, T> {
    config: EngineConfig,
    reader: R,
    writer: W,
    transcoder: T,
}

impl<R: TagReader, W: TagWriter, T: Transcoder> Engine<R, W, T> {
    pub fn new(config: EngineConfig, reader: R, writer: W, transcoder: T) -> Self {
        Self {
            config,
            reader,
            writer,
            transcoder,
        }
    }

    /// Run a full sync and return its tallies. Per-file failures are counted,
    /// never propagated.
    pub fn run(&self) -> RunSummary {
        let mut summary = RunSummary::default();

        let destination_roots = vec![self.config.destination_root.clone()];
        let destination_cache = self.cache(|c| &c.destination);
        let destination = self.acquire_index(
            &destination_roots,
            Role::Destination,
            destination_cache.as_ref(),
            &mut summary,
        );

        let source_cache = self.cache(|c| &c.source);
        let source = self.acquire_index(
            &self.config.source_roots,
            Role::Source,
            source_cache.as_ref(),
            &mut summary,
        );

        let plan = reconcile(&source, destination);
        summary.unmatched = plan.orphaned.len();
        info!(
            "plan: {} to create, {} to check, {} unaccounted for in destination",
            plan.creates(),
            plan.updates(),
            plan.deletes()
        );

        // Deletes go first so a create that lands on an orphan's path is not undone.
        let (deletes, rest): (Vec<&Action>, Vec<&Action>) = plan
            .actions
            .iter()
            .partition(|a| matches!(a, Action::Delete { .. }));

        for action in deletes {
            self.execute(action, &mut summary);
        }

        let total = rest.len();
        for (i, action) in rest.into_iter().enumerate() {
            if (i + 1) % PROGRESS_EVERY == 0 {
                info!("processed {} of {}", i + 1, total);
            }
            self.execute(action, &mut summary);
        }

        if summary.touched_destination() {
            if let Some(cache) = &destination_cache {
                if let Err(e) = cache.invalidate() {
                    warn!("could not drop {}: {e}", cache.path().display());
                }
            }
        }

        summary
    }

    fn cache(&self, pick: impl Fn(&CachePaths) -> &PathBuf) -> Option<IndexCache> {
        self.config
            .caches
            .as_ref()
            .map(|c| IndexCache::new(pick(c).clone()))
    }

    /// Restore an index from its cache when trustworthy, otherwise walk the
    /// tree and refresh the cache.
    fn acquire_index(
        &self,
        roots: &[PathBuf],
        role: Role,
        cache: Option<&IndexCache>,
        summary: &mut RunSummary,
    ) -> TreeIndex {
        if let Some(cache) = cache.filter(|_| !self.config.rescan) {
            match cache.load(roots) {
                Ok(CacheLoad::Loaded(index)) => {
                    info!("loaded {} {} entries from cache", index.len(), role);
                    return index;
                }
                Ok(CacheLoad::Missing) => {}
                Ok(CacheLoad::Stale(reason)) => {
                    info!("ignoring stale cache {}: {reason}", cache.path().display());
                }
                Err(e) => warn!("ignoring unusable cache {}: {e}", cache.path().display()),
            }
        }

        let outcome = TreeIndexer::new(&self.config.scan, &self.reader).build(roots, role);
        summary.skipped += outcome.unreadable;
        summary.excluded += outcome.excluded;
        summary.collisions += outcome.collisions.len();

        if role == Role::Destination {
            // Destination duplicates are leftovers of an earlier partial run.
            for collision in &outcome.collisions {
                self.execute(
                    &Action::Delete {
                        destination: collision.superseded.clone(),
                    },
                    summary,
                );
            }
        }

        if let Some(cache) = cache {
            if let Err(e) = cache.store(&outcome.index, roots) {
                warn!("not caching {} index: {e}", role);
            }
        }
        outcome.index
    }
}
