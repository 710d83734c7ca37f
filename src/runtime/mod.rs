use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, ensure};
use tracing::info;

use crate::cli::{Cli, Commands};
use crate::config::{DeleteMode, Settings};
use crate::engine::{Engine, EngineConfig};
use crate::library_sync::{JsonLibrary, LibrarySync, SyncOptions};
use crate::metadata::LoftyTags;
use crate::transcode::CommandTranscoder;

mod logging;
mod settings;

pub fn run(cli: Cli) -> anyhow::Result<()> {
    logging::init(cli.verbose);
    let settings = settings::load_settings();

    match cli.command {
        Commands::Sync {
            destination,
            sources,
            soft_delete,
            rescan,
            no_cache,
        } => {
            let mut config = EngineConfig::from_settings(&settings, destination, sources);
            if soft_delete {
                config.delete_mode = DeleteMode::Report;
            }
            if no_cache {
                config.caches = None;
            }
            config.rescan = rescan;
            sync(config, &settings)
        }
        Commands::Library {
            export,
            update_files,
            update_library,
        } => library(
            &export,
            &settings,
            SyncOptions {
                update_files,
                update_library,
            },
        ),
        Commands::Config => {
            print!("{}", toml::to_string(&settings)?);
            Ok(())
        }
    }
}

fn sync(config: EngineConfig, settings: &Settings) -> anyhow::Result<()> {
    let config = resolve_roots(config)?;
    info!(
        "syncing {} source root(s) into {}",
        config.source_roots.len(),
        config.destination_root.display()
    );
    let transcoder = CommandTranscoder::new(&settings.transcode);
    let engine = Engine::new(config, LoftyTags, LoftyTags, transcoder);
    let summary = engine.run();
    info!("sync finished: {summary}");
    Ok(())
}

/// Check that every root is an existing directory and make it absolute, so
/// cached paths and root prefixes do not depend on the working directory.
fn resolve_roots(mut config: EngineConfig) -> anyhow::Result<EngineConfig> {
    ensure!(
        config.destination_root.is_dir(),
        "destination {} is not a directory",
        config.destination_root.display()
    );
    ensure!(!config.source_roots.is_empty(), "no source roots given");
    let missing: Vec<&PathBuf> = config
        .source_roots
        .iter()
        .filter(|root| !root.is_dir())
        .collect();
    ensure!(
        missing.is_empty(),
        "source root(s) not found: {}",
        missing
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ")
    );

    config.destination_root = canonical(&config.destination_root)?;
    config.source_roots = config
        .source_roots
        .iter()
        .map(|root| canonical(root))
        .collect::<anyhow::Result<_>>()?;
    Ok(config)
}

fn canonical(root: &Path) -> anyhow::Result<PathBuf> {
    fs::canonicalize(root).with_context(|| format!("resolving {}", root.display()))
}

fn library(export: &Path, settings: &Settings, options: SyncOptions) -> anyhow::Result<()> {
    let mut source = JsonLibrary::open(export)
        .with_context(|| format!("reading library export {}", export.display()))?;
    info!("{} records in {}", source.records().len(), source.path().display());

    let sync = LibrarySync::new(
        settings.library.clone(),
        settings.sync.fields.clone(),
        options,
        LoftyTags,
        LoftyTags,
    );
    let summary = sync
        .run(&mut source)
        .with_context(|| format!("writing library export {}", export.display()))?;
    info!("library sync finished: {summary}");
    Ok(())
}
