//! `alexdb search` — full-text query

use anyhow::Result;
use clap::Args;

use alexdb_core::fmt_num;
use alexdb_store::{fts, Store};

use crate::config::Config;

#[derive(Args)]
pub struct SearchArgs {
    /// FTS5 query (AND, OR, NOT, "phrases" supported)
    query: String,

    /// Maximum hits to print
    #[arg(short, long, default_value_t = 20)]
    limit: usize,

    /// Skip the first N hits (pagination)
    #[arg(long, default_value_t = 0)]
    offset: usize,

    /// Print only the match count
    #[arg(long)]
    count: bool,

    /// Emit hits as JSON lines
    #[arg(long)]
    json: bool,
}

pub fn run(args: SearchArgs, config: &Config) -> Result<()> {
    let store = Store::open(&config.database.path)?;

    if args.count {
        let total = fts::count(&store, &args.query)?;
        println!("{total}");
        return Ok(());
    }

    let page = fts::search(&store, &args.query, args.limit, args.offset)?;
    if args.json {
        for hit in &page.hits {
            println!("{}", serde_json::to_string(hit)?);
        }
        return Ok(());
    }

    for hit in &page.hits {
        let year = hit.year.map_or_else(|| "----".to_string(), |y| y.to_string());
        println!(
            "[{year}] {}  {}",
            hit.openalex_id,
            hit.title.as_deref().unwrap_or("(untitled)")
        );
    }
    eprintln!(
        "\n{} matches ({:.1} ms)",
        fmt_num(page.total),
        page.elapsed_ms
    );
    Ok(())
}
