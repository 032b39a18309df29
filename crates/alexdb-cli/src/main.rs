//! alexdb - Local scholarly works database built from snapshot dumps
//!
//! Ingests gz JSONL snapshot shards into SQLite, maintains a full-text
//! index and a citation graph, and serves lookups, search, and
//! impact-factor queries from the result.

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod cmd;
mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "alexdb")]
#[command(about = "Local scholarly works database built from snapshot dumps")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Config file path (default: ./alexdb.toml or ~/.config/alexdb/config.toml)
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Database path (overrides config)
    #[arg(long, global = true)]
    db: Option<std::path::PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Load work shards from a snapshot directory
    Ingest(cmd::ingest::IngestArgs),
    /// Load source (venue) shards and rebuild the ISSN lookup
    Sources(cmd::sources::SourcesArgs),
    /// Bring the full-text index up to date
    Index(cmd::index::IndexArgs),
    /// Build or resume the citation graph
    Graph(cmd::graph::GraphArgs),
    /// Compute a venue impact factor
    Impact(cmd::impact::ImpactArgs),
    /// Full-text search over titles and abstracts
    Search(cmd::search::SearchArgs),
    /// Look up works by OpenAlex id or DOI
    Get(cmd::get::GetArgs),
    /// Show database counts and build progress
    Status,
    /// Show current configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Progress context (TTY auto-detect)
    let progress = Arc::new(alexdb_core::ProgressContext::new());

    // Logging:
    //   TTY:     quiet (warn) unless --debug  — progress bars show activity
    //   non-TTY: info unless --debug          — logs are the only progress indicator
    let is_tty = progress.is_tty();
    let multi = if is_tty { Some(progress.multi()) } else { None };
    let quiet = if is_tty { !cli.debug } else { false };
    alexdb_core::init_logging(quiet, cli.debug, multi);

    alexdb_core::install_signal_handlers()?;

    let mut config = if let Some(path) = cli.config {
        Config::from_file(&path)?
    } else {
        Config::load()?
    };
    if let Some(db) = cli.db {
        config.database.path = db;
    }

    match cli.command {
        Command::Ingest(args) => cmd::ingest::run(args, &config, &progress),
        Command::Sources(args) => cmd::sources::run(args, &config, &progress),
        Command::Index(args) => cmd::index::run(args, &config, &progress),
        Command::Graph(args) => cmd::graph::run(args, &config, &progress),
        Command::Impact(args) => cmd::impact::run(args, &config, &progress),
        Command::Search(args) => cmd::search::run(args, &config),
        Command::Get(args) => cmd::get::run(args, &config),
        Command::Status => cmd::status::run(&config),
        Command::Config => {
            use comfy_table::{
                Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL,
            };

            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .apply_modifier(UTF8_ROUND_CORNERS)
                .set_header(vec![
                    Cell::new("Setting").fg(Color::Cyan),
                    Cell::new("Value").fg(Color::Cyan),
                ]);

            table.add_row(vec![
                "Database",
                &config.database.path.display().to_string(),
            ]);
            table.add_row(vec![
                "Snapshot dir",
                &config.snapshot.dir.display().to_string(),
            ]);
            table.add_row(vec!["Load workers", &config.load.workers.to_string()]);
            table.add_row(vec!["Load batch", &config.load.batch_size.to_string()]);
            table.add_row(vec!["Queue depth", &config.load.queue_depth.to_string()]);
            table.add_row(vec![
                "Store raw JSON",
                if config.load.store_raw { "yes" } else { "no" },
            ]);
            table.add_row(vec!["Index batch", &config.index.batch_size.to_string()]);
            table.add_row(vec!["Graph scan batch", &config.graph.scan_batch.to_string()]);

            eprintln!("\n{table}");
            Ok(())
        }
    }
}
