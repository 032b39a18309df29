//! `alexdb status` — database counts and build progress

use anyhow::Result;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Cell, Color, Table};

use alexdb_core::fmt_num;
use alexdb_store::{stage, Store};

use crate::config::Config;

pub fn run(config: &Config) -> Result<()> {
    let store = Store::open(&config.database.path)?;
    let stats = store.stats()?;

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new("Table").fg(Color::Cyan),
            Cell::new("Rows").fg(Color::Cyan),
            Cell::new("State").fg(Color::Cyan),
        ]);

    let work_shards = store.completed_shards(stage::WORKS)?.len();
    let source_shards = store.completed_shards(stage::SOURCES)?.len();

    table.add_row(vec![
        "works".to_string(),
        fmt_num(stats.works as usize),
        format!("{work_shards} shards loaded"),
    ]);
    table.add_row(vec![
        "sources".to_string(),
        fmt_num(stats.sources as usize),
        format!("{source_shards} shards loaded"),
    ]);
    table.add_row(vec![
        "issn_lookup".to_string(),
        fmt_num(stats.issn_mappings as usize),
        String::new(),
    ]);
    table.add_row(vec![
        "works_fts".to_string(),
        fmt_num(stats.fts_indexed as usize),
        if stats.fts_complete() {
            "complete".to_string()
        } else {
            format!("behind by {}", fmt_num((stats.works - stats.fts_indexed) as usize))
        },
    ]);
    table.add_row(vec![
        "citations".to_string(),
        fmt_num(stats.citations as usize),
        format!("cursor {}", stats.graph_cursor),
    ]);

    eprintln!("\n{table}");

    for key in ["last_ingest", "last_sources", "last_graph"] {
        if let Some(value) = store.meta_get(key)? {
            eprintln!("{key}: {value}");
        }
    }
    if let Ok(meta) = std::fs::metadata(&config.database.path) {
        eprintln!(
            "database: {} ({:.2} GB)",
            config.database.path.display(),
            meta.len() as f64 / (1024.0 * 1024.0 * 1024.0)
        );
    }
    Ok(())
}
