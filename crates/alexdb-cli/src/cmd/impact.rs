//! `alexdb impact` — venue impact factor

use anyhow::Result;
use chrono::Datelike;
use clap::Args;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Cell, Color, Table};

use alexdb_core::{fmt_num, SharedProgress};
use alexdb_store::{impact, Store};

use crate::config::Config;

#[derive(Args)]
pub struct ImpactArgs {
    /// Venue ISSN (e.g. 0028-0836)
    #[arg(required_unless_present = "all", conflicts_with = "all")]
    issn: Option<String>,

    /// Target year (citations FROM this year; default: last year)
    #[arg(short, long)]
    year: Option<i32>,

    /// Citation window in years
    #[arg(short, long, default_value_t = impact::DEFAULT_WINDOW)]
    window: u32,

    /// Precompute and store the factor for every venue with works
    #[arg(long)]
    all: bool,
}

pub fn run(args: ImpactArgs, config: &Config, progress: &SharedProgress) -> Result<()> {
    let year = args
        .year
        .unwrap_or_else(|| chrono::Utc::now().year() - 1);

    if args.all {
        let mut store = Store::open(&config.database.path)?;
        let bar = progress.stage_bar("impact", 0);
        let summary = impact::build_table(&mut store, year, args.window, |done, total| {
            bar.set_length(total as u64);
            bar.set_position(done as u64);
        })?;
        bar.finish_and_clear();
        if summary.interrupted {
            progress.println("Interrupted; re-run to cover the remaining venues");
        } else {
            progress.println(format!(
                "Impact factors for {year}: {} venues stored, {} without articles in window",
                fmt_num(summary.computed),
                fmt_num(summary.undefined)
            ));
        }
        return Ok(());
    }

    let Some(issn) = args.issn else {
        anyhow::bail!("an ISSN is required without --all");
    };
    let store = Store::open(&config.database.path)?;

    let name = impact::venue_name(&store, &issn)?;
    let upstream = impact::upstream_citedness(&store, &issn)?;
    let factor = impact::impact_factor(&store, &issn, year, args.window)?;

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new("Metric").fg(Color::Cyan),
            Cell::new("Value").fg(Color::Cyan),
        ]);
    table.add_row(vec!["ISSN", &issn]);
    table.add_row(vec!["Venue", name.as_deref().unwrap_or("unknown")]);
    table.add_row(vec!["Year", &year.to_string()]);
    table.add_row(vec![
        "Window",
        &format!("{}-{}", year - args.window as i32, year - 1),
    ]);

    match factor {
        Some(f) => {
            table.add_row(vec!["Articles in window", &f.articles.to_string()]);
            table.add_row(vec!["Citations in year", &f.citations.to_string()]);
            table.add_row(vec!["Impact factor", &format!("{:.1}", f.value)]);
        }
        None => {
            table.add_row(vec!["Impact factor", "N/A (no articles in window)"]);
        }
    }
    if let Some(citedness) = upstream {
        table.add_row(vec!["Upstream 2yr citedness", &format!("{citedness:.1}")]);
    }

    eprintln!("\n{table}");
    Ok(())
}
