//! Cursor-driven edge materialization

use std::time::{Duration, Instant};

use alexdb_core::{
    fmt_num, is_shutdown_requested, retry_with_backoff, ProgressContext, StageError,
    DEFAULT_MAX_RETRIES,
};
use alexdb_store::{CitationEdge, Store};

/// Tuning knobs for a graph build
#[derive(Debug, Clone)]
pub struct GraphOptions {
    /// Works scanned (and committed) per transaction
    pub scan_batch: usize,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self { scan_batch: 10_000 }
    }
}

/// Summary of one graph build run
#[derive(Debug, Default)]
pub struct GraphSummary {
    pub works_scanned: u64,
    pub edges_inserted: u64,
    /// References pointing outside the loaded corpus
    pub unresolved: u64,
    /// Works without a year contribute no edges
    pub skipped_no_year: u64,
    pub cursor: i64,
    pub interrupted: bool,
    pub elapsed: Duration,
}

impl GraphSummary {
    pub fn log(&self) {
        log::info!("=== Graph Summary ===");
        log::info!(
            "Scanned {} works, inserted {} edges ({} unresolved refs)",
            fmt_num(self.works_scanned as usize),
            fmt_num(self.edges_inserted as usize),
            fmt_num(self.unresolved as usize)
        );
        if self.interrupted {
            log::info!("Interrupted at cursor {}; re-run to resume", self.cursor);
        }
        log::info!("Time: {:.1}s", self.elapsed.as_secs_f64());
    }
}

/// Build (or resume building) the citation graph.
///
/// Each batch scans works above the cursor, resolves their reference
/// lists to internal keys, and commits the edges together with the
/// advanced cursor. Interruptable between batches; a completed build
/// creates the citation indexes and refreshes planner statistics.
pub fn build_graph(
    store: &mut Store,
    opts: &GraphOptions,
    progress: &ProgressContext,
) -> Result<GraphSummary, StageError> {
    let start = Instant::now();
    let mut summary = GraphSummary {
        cursor: store.graph_cursor()?,
        ..Default::default()
    };

    let max_key = store.max_work_key()?;
    if summary.cursor >= max_key {
        log::info!("citation graph already current (cursor {})", summary.cursor);
        summary.elapsed = start.elapsed();
        return Ok(summary);
    }
    log::info!(
        "building citation graph from cursor {} to {}",
        summary.cursor,
        max_key
    );

    let bar = progress.stage_bar("graph", max_key as u64);
    bar.set_position(summary.cursor.max(0) as u64);

    loop {
        if is_shutdown_requested() {
            summary.interrupted = true;
            break;
        }

        let rows = store.scan_reference_lists(summary.cursor, opts.scan_batch)?;
        let Some(&(last_id, _, _)) = rows.last() else {
            break;
        };

        let mut edges: Vec<CitationEdge> = Vec::new();
        for (citing_id, year, refs_json) in &rows {
            summary.works_scanned += 1;
            let Some(citing_year) = *year else {
                summary.skipped_no_year += 1;
                continue;
            };
            let Some(json) = refs_json else { continue };
            let refs: Vec<String> = match serde_json::from_str(json) {
                Ok(refs) => refs,
                Err(e) => {
                    log::warn!("work {citing_id}: bad reference list: {e}");
                    continue;
                }
            };
            for reference in &refs {
                match store.resolve_work_key(reference)? {
                    Some(cited_id) => edges.push(CitationEdge {
                        citing_id: *citing_id,
                        cited_id,
                        citing_year,
                    }),
                    None => summary.unresolved += 1,
                }
            }
        }

        retry_with_backoff("citation batch", DEFAULT_MAX_RETRIES, || {
            store.insert_citations_batch(&edges, last_id)
        })?;
        summary.edges_inserted += edges.len() as u64;
        summary.cursor = last_id;
        bar.set_position(last_id as u64);
    }
    bar.finish_and_clear();

    if !summary.interrupted {
        store.ensure_citation_indexes()?;
        store.analyze()?;
    }
    summary.elapsed = start.elapsed();
    summary.log();
    Ok(summary)
}
