//! `alexdb get` — point and batch lookup

use anyhow::Result;
use clap::Args;

use alexdb_store::{Store, Work};

use crate::config::Config;

#[derive(Args)]
pub struct GetArgs {
    /// OpenAlex ids (W...) or DOIs
    #[arg(required = true)]
    ids: Vec<String>,

    /// Emit works as JSON lines
    #[arg(long)]
    json: bool,
}

pub fn run(args: GetArgs, config: &Config) -> Result<()> {
    let store = Store::open(&config.database.path)?;
    let (found, missing) = store.get_many(&args.ids)?;

    for work in &found {
        if args.json {
            println!("{}", serde_json::to_string(work)?);
        } else {
            print_work(work);
        }
    }
    for id in &missing {
        eprintln!("not found: {id}");
    }
    if !missing.is_empty() {
        anyhow::bail!("{} of {} ids not found", missing.len(), args.ids.len());
    }
    Ok(())
}

fn print_work(work: &Work) {
    println!(
        "{}  [{}]  {}",
        work.openalex_id,
        work.year.map_or_else(|| "----".to_string(), |y| y.to_string()),
        work.title.as_deref().unwrap_or("(untitled)")
    );
    if let Some(doi) = &work.doi {
        println!("  doi: {doi}");
    }
    if let Some(source) = &work.source {
        println!("  venue: {source}");
    }
    if !work.authors.is_empty() {
        println!("  authors: {}", work.authors.join(", "));
    }
    println!("  cited by: {}", work.cited_by_count);
    if let Some(text) = &work.abstract_text {
        let preview: String = text.chars().take(200).collect();
        let ellipsis = if text.chars().count() > 200 { "…" } else { "" };
        println!("  abstract: {preview}{ellipsis}");
    }
}
