use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "tagmirror")]
#[command(about = "Mirror tagged audio trees into a transcoded destination", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Log per-file decisions
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Bring DEST in line with one or more source trees
    Sync {
        /// Destination tree (must exist)
        destination: PathBuf,
        /// Source trees, in priority order
        #[arg(required = true)]
        sources: Vec<PathBuf>,
        /// Report orphaned destination files instead of deleting them
        #[arg(long)]
        soft_delete: bool,
        /// Ignore cached indexes and walk both trees
        #[arg(long)]
        rescan: bool,
        /// Neither read nor write index caches
        #[arg(long)]
        no_cache: bool,
    },
    /// Compare a library export with the tags of the files it lists
    Library {
        /// JSON export: an array of records with a `location` and tag fields
        export: PathBuf,
        /// Fill tags missing from files with library values
        #[arg(long)]
        update_files: bool,
        /// Clear misplaced artist/composer credits in the export
        #[arg(long)]
        update_library: bool,
    },
    /// Print the effective configuration as TOML
    Config,
}
