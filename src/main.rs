use clap::Parser;

mod cli;
mod config;
mod engine;
mod error;
mod identity;
mod index;
mod library_sync;
mod metadata;
mod patch;
mod reconcile;
mod runtime;
mod transcode;

#[cfg(test)]
mod testing;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    runtime::run(cli)
}
