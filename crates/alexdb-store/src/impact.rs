//! Per-venue impact factor over the citation graph
//!
//! IF(issn, Y) = citations made in year Y to the venue's works published
//! in the window [Y-w, Y-1] (w = 2 by default), divided by the number of
//! those works. An empty citable set yields no ratio at all, never 0.0.

use std::time::{Duration, Instant};

use rusqlite::params;

use alexdb_core::{
    fmt_num, is_shutdown_requested, retry_with_backoff, StageError, DEFAULT_MAX_RETRIES,
};

use crate::store::Store;

pub const DEFAULT_WINDOW: u32 = 2;

/// Venues written per transaction when precomputing the table.
const TABLE_BATCH: usize = 500;

/// One computed impact factor with its numerator and denominator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImpactFactor {
    pub year: i32,
    pub window: u32,
    pub citations: i64,
    pub articles: i64,
    pub value: f64,
}

/// Compute the impact factor of a venue for one year.
///
/// Returns `Ok(None)` when the venue published nothing in the window —
/// the ratio is undefined, and this is distinct from a real 0.0 (works
/// exist but nothing cited them).
pub fn impact_factor(
    store: &Store,
    issn: &str,
    year: i32,
    window: u32,
) -> Result<Option<ImpactFactor>, StageError> {
    let conn = store.conn();
    let from_year = year - window as i32;

    let articles: i64 = conn
        .prepare_cached(
            "SELECT COUNT(*) FROM works
             WHERE issn = ?1 AND year >= ?2 AND year < ?3",
        )?
        .query_row(params![issn, from_year, year], |r| r.get(0))?;

    if articles == 0 {
        return Ok(None);
    }

    let citations: i64 = conn
        .prepare_cached(
            "SELECT COUNT(*) FROM citations c
             JOIN works w ON w.id = c.cited_id
             WHERE w.issn = ?1 AND w.year >= ?2 AND w.year < ?3
               AND c.citing_year = ?4",
        )?
        .query_row(params![issn, from_year, year, year], |r| r.get(0))?;

    Ok(Some(ImpactFactor {
        year,
        window,
        citations,
        articles,
        value: citations as f64 / articles as f64,
    }))
}

/// Summary of one table precompute run.
#[derive(Debug, Default)]
pub struct ImpactTableSummary {
    pub venues: usize,
    pub computed: usize,
    /// Venues whose window holds no citable articles get no row
    pub undefined: usize,
    pub interrupted: bool,
    pub elapsed: Duration,
}

impl ImpactTableSummary {
    pub fn log(&self) {
        log::info!("=== Impact Table Summary ===");
        log::info!(
            "Venues: {} computed, {} without articles in window, of {}",
            fmt_num(self.computed),
            fmt_num(self.undefined),
            fmt_num(self.venues)
        );
        if self.interrupted {
            log::info!("Interrupted; re-run to cover the remaining venues");
        }
        log::info!("Time: {:.1}s", self.elapsed.as_secs_f64());
    }
}

/// Precompute the impact factor of every venue with works on record
/// and persist the results, one row per (issn, year, window).
///
/// Upserts refresh existing rows in place, so a re-run after more
/// works or citations arrive updates the table rather than growing
/// it. Interruptable between batches; committed rows survive.
/// `on_progress` receives (venues handled, venue total) per batch.
pub fn build_table(
    store: &mut Store,
    year: i32,
    window: u32,
    mut on_progress: impl FnMut(usize, usize),
) -> Result<ImpactTableSummary, StageError> {
    let start = Instant::now();
    let issns = store.work_issns()?;
    let mut summary = ImpactTableSummary {
        venues: issns.len(),
        ..Default::default()
    };
    log::info!(
        "computing impact factors for {} venues (year {year}, window {window})",
        summary.venues
    );

    for chunk in issns.chunks(TABLE_BATCH) {
        if is_shutdown_requested() {
            summary.interrupted = true;
            break;
        }
        let mut rows: Vec<(String, ImpactFactor)> = Vec::with_capacity(chunk.len());
        for issn in chunk {
            match impact_factor(store, issn, year, window)? {
                Some(factor) => rows.push((issn.clone(), factor)),
                None => summary.undefined += 1,
            }
        }
        retry_with_backoff("impact batch", DEFAULT_MAX_RETRIES, || {
            store.upsert_impact_factors_batch(&rows)
        })?;
        summary.computed += rows.len();
        on_progress(summary.computed + summary.undefined, summary.venues);
    }

    summary.elapsed = start.elapsed();
    summary.log();
    Ok(summary)
}

/// Read a precomputed impact factor back from the table.
pub fn stored_impact_factor(
    store: &Store,
    issn: &str,
    year: i32,
    window: u32,
) -> Result<Option<ImpactFactor>, StageError> {
    use rusqlite::OptionalExtension;
    Ok(store
        .conn()
        .prepare_cached(
            "SELECT citations_count, articles_count, impact_factor
             FROM journal_impact_factors
             WHERE issn = ?1 AND year = ?2 AND window = ?3",
        )?
        .query_row(params![issn, year, window], |r| {
            Ok(ImpactFactor {
                year,
                window,
                citations: r.get(0)?,
                articles: r.get(1)?,
                value: r.get(2)?,
            })
        })
        .optional()?)
}

/// Venue display name for an ISSN, via the lookup table with a fallback
/// on the linking ISSN column.
pub fn venue_name(store: &Store, issn: &str) -> Result<Option<String>, StageError> {
    use rusqlite::OptionalExtension;
    let conn = store.conn();
    let via_lookup: Option<String> = conn
        .prepare_cached(
            "SELECT s.display_name FROM issn_lookup l
             JOIN sources s ON s.id = l.source_id
             WHERE l.issn = ?1",
        )?
        .query_row([issn], |r| r.get(0))
        .optional()?
        .flatten();
    if via_lookup.is_some() {
        return Ok(via_lookup);
    }
    Ok(conn
        .prepare_cached("SELECT display_name FROM sources WHERE issn_l = ?1 LIMIT 1")?
        .query_row([issn], |r| r.get(0))
        .optional()?
        .flatten())
}

/// Upstream two-year mean citedness carried on the source record, for
/// comparison against the locally computed ratio.
pub fn upstream_citedness(store: &Store, issn: &str) -> Result<Option<f64>, StageError> {
    use rusqlite::OptionalExtension;
    Ok(store
        .conn()
        .prepare_cached(
            "SELECT s.two_year_mean_citedness FROM issn_lookup l
             JOIN sources s ON s.id = l.source_id
             WHERE l.issn = ?1",
        )?
        .query_row([issn], |r| r.get(0))
        .optional()?
        .flatten())
}
