//! `alexdb graph` — citation graph build / resume

use anyhow::Result;
use clap::Args;

use alexdb_core::{fmt_num, SharedProgress};
use alexdb_graph::GraphOptions;
use alexdb_store::Store;

use crate::config::Config;

#[derive(Args)]
pub struct GraphArgs {
    /// Works scanned per transaction
    #[arg(long)]
    scan_batch: Option<usize>,

    /// Wipe existing edges and rebuild from the first work
    #[arg(long)]
    rebuild: bool,
}

pub fn run(args: GraphArgs, config: &Config, progress: &SharedProgress) -> Result<()> {
    let mut store = Store::open(&config.database.path)?;

    if args.rebuild {
        log::info!("wiping citation graph for rebuild");
        store.reset_graph()?;
    }

    let opts = GraphOptions {
        scan_batch: args.scan_batch.unwrap_or(config.graph.scan_batch),
    };
    let summary = alexdb_graph::build_graph(&mut store, &opts, progress)?;

    if summary.interrupted {
        progress.println(format!(
            "Interrupted at cursor {}; re-run to resume",
            summary.cursor
        ));
    } else {
        store.meta_set("last_graph", &chrono::Utc::now().to_rfc3339())?;
        progress.println(format!(
            "Citation graph: {} edges added, {} unresolved references",
            fmt_num(summary.edges_inserted as usize),
            fmt_num(summary.unresolved as usize)
        ));
    }
    Ok(())
}
