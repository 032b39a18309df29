//! `alexdb sources` — load venue shards and rebuild the ISSN lookup

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use alexdb_core::SharedProgress;
use alexdb_store::{stage, Store};

use crate::config::Config;

#[derive(Args)]
pub struct SourcesArgs {
    /// Snapshot sources directory (default: from config)
    #[arg(long)]
    snapshot_dir: Option<PathBuf>,

    /// Forget checkpoints and reload every shard
    #[arg(long)]
    rebuild: bool,
}

pub fn run(args: SourcesArgs, config: &Config, progress: &SharedProgress) -> Result<()> {
    let snapshot_dir = args.snapshot_dir.unwrap_or_else(|| config.sources_dir());

    let mut store = Store::open(&config.database.path)?;
    if args.rebuild {
        let cleared = store.clear_checkpoints(stage::SOURCES)?;
        log::info!("cleared {cleared} source checkpoints");
    }

    alexdb_snapshot::load_sources(&mut store, &snapshot_dir, progress)?;
    store.meta_set("last_sources", &chrono::Utc::now().to_rfc3339())?;
    Ok(())
}
