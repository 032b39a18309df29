//! `alexdb index` — full-text index catch-up

use anyhow::Result;
use clap::Args;

use alexdb_core::{fmt_num, SharedProgress};
use alexdb_store::{fts, Store};

use crate::config::Config;

#[derive(Args)]
pub struct IndexArgs {
    /// Rows per indexing transaction
    #[arg(long)]
    batch_size: Option<usize>,

    /// Rebuild the whole index instead of catching up
    #[arg(long)]
    rebuild: bool,
}

pub fn run(args: IndexArgs, config: &Config, progress: &SharedProgress) -> Result<()> {
    let mut store = Store::open(&config.database.path)?;

    if args.rebuild {
        log::info!("rebuilding full-text index from scratch");
        fts::rebuild(&mut store)?;
        let stats = store.stats()?;
        progress.println(format!(
            "Rebuilt full-text index: {} rows",
            fmt_num(stats.fts_indexed as usize)
        ));
        return Ok(());
    }

    let batch = args.batch_size.unwrap_or(config.index.batch_size);
    let total = store.work_count()? as u64;
    let bar = progress.stage_bar("index", total);
    let summary = fts::catch_up(&mut store, batch, |indexed, _cursor| {
        bar.set_position(indexed);
    })?;
    bar.finish_and_clear();

    if summary.interrupted {
        progress.println(format!(
            "Interrupted at {}/{} rows; re-run to resume",
            fmt_num(summary.index_rows as usize),
            fmt_num(summary.works_rows as usize)
        ));
    } else {
        progress.println(format!(
            "Full-text index: {} rows ({} written this run)",
            fmt_num(summary.index_rows as usize),
            fmt_num(summary.indexed as usize)
        ));
    }
    Ok(())
}
