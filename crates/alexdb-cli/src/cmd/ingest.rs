//! `alexdb ingest` — load work shards into the store

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;

use alexdb_core::SharedProgress;
use alexdb_snapshot::{list_shards, LoadOptions, Manifest};
use alexdb_store::{stage, Store};

use crate::config::Config;

#[derive(Args)]
pub struct IngestArgs {
    /// Snapshot works directory (default: from config)
    #[arg(long)]
    snapshot_dir: Option<PathBuf>,

    /// Decode workers
    #[arg(short, long)]
    workers: Option<usize>,

    /// Rows per write transaction
    #[arg(long)]
    batch_size: Option<usize>,

    /// Stop after this many shards
    #[arg(long)]
    max_shards: Option<usize>,

    /// Keep the raw JSON line for each work
    #[arg(long)]
    store_raw: bool,

    /// Forget checkpoints and reload every shard
    #[arg(long)]
    rebuild: bool,

    /// Skip the manifest completeness check
    #[arg(long)]
    no_verify: bool,
}

pub fn run(args: IngestArgs, config: &Config, progress: &SharedProgress) -> Result<()> {
    let snapshot_dir = args.snapshot_dir.unwrap_or_else(|| config.works_dir());

    if !args.no_verify {
        verify_manifest(&snapshot_dir)?;
    }

    let mut store = Store::open(&config.database.path)?;
    if args.rebuild {
        let cleared = store.clear_checkpoints(stage::WORKS)?;
        log::info!("cleared {cleared} work checkpoints");
    }

    let opts = LoadOptions {
        workers: args.workers.unwrap_or(config.load.workers),
        batch_size: args.batch_size.unwrap_or(config.load.batch_size),
        queue_depth: config.load.queue_depth,
        store_raw: args.store_raw || config.load.store_raw,
        max_shards: args.max_shards,
    };

    let summary = alexdb_snapshot::load_works(&mut store, &snapshot_dir, &opts, progress)?;
    store.meta_set("last_ingest", &chrono::Utc::now().to_rfc3339())?;

    if summary.shards_failed > 0 {
        bail!(
            "{} of {} shards failed; re-run to retry them",
            summary.shards_failed,
            summary.shards_total
        );
    }
    Ok(())
}

/// Refuse to load from a snapshot the manifest says is incomplete.
fn verify_manifest(snapshot_dir: &std::path::Path) -> Result<()> {
    let manifest_path = snapshot_dir.join("manifest");
    if !manifest_path.exists() {
        log::debug!("no manifest at {}", manifest_path.display());
        return Ok(());
    }
    let manifest = Manifest::load(&manifest_path)?;
    let local = list_shards(snapshot_dir)?;
    let missing = manifest.missing_shards(&local);
    if !missing.is_empty() {
        bail!(
            "snapshot incomplete: {} of {} shards missing (first: {})",
            missing.len(),
            manifest.len(),
            missing[0]
        );
    }
    log::info!("manifest verified: all {} shards present", manifest.len());
    Ok(())
}
