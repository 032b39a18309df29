//! Sources (venue) loader and ISSN lookup rebuild
//!
//! The sources entity is small next to works, so this stage runs
//! sequentially: decode each shard, upsert in batches, checkpoint the
//! shard, and rebuild the ISSN lookup once at the end.

use std::path::Path;
use std::time::{Duration, Instant};

use rustc_hash::FxHashSet;

use alexdb_core::{
    fmt_num, is_shutdown_requested, retry_with_backoff, ProgressContext, StageError,
    DEFAULT_MAX_RETRIES,
};
use alexdb_store::{stage, SourceRow, Store};

use crate::decode::ShardReader;
use crate::flatten::flatten_source;
use crate::manifest::list_shards;
use crate::record::SourceRecord;

const SOURCE_BATCH: usize = 2_000;

#[derive(Debug, Default)]
pub struct SourcesSummary {
    pub shards_total: usize,
    pub shards_skipped: usize,
    pub shards_loaded: usize,
    pub sources_upserted: u64,
    pub issn_mappings: usize,
    pub parse_errors: u64,
    pub interrupted: bool,
    pub elapsed: Duration,
}

impl SourcesSummary {
    pub fn log(&self) {
        log::info!("=== Sources Summary ===");
        log::info!(
            "Shards: {} loaded, {} skipped of {}",
            self.shards_loaded,
            self.shards_skipped,
            self.shards_total
        );
        log::info!(
            "Sources: {} upserted, {} ISSN mappings, {} parse errors",
            fmt_num(self.sources_upserted as usize),
            fmt_num(self.issn_mappings),
            fmt_num(self.parse_errors as usize)
        );
        log::info!("Time: {:.1}s", self.elapsed.as_secs_f64());
    }
}

/// Load all source shards and rebuild the ISSN lookup.
pub fn load_sources(
    store: &mut Store,
    snapshot_dir: &Path,
    progress: &ProgressContext,
) -> Result<SourcesSummary, StageError> {
    let start = Instant::now();

    let shards = list_shards(snapshot_dir)?;
    let done: FxHashSet<String> = store
        .completed_shards(stage::SOURCES)?
        .into_iter()
        .collect();

    let mut summary = SourcesSummary {
        shards_total: shards.len(),
        ..Default::default()
    };
    let bar = progress.stage_bar("sources", shards.len() as u64);

    for shard in &shards {
        if done.contains(&shard.key) {
            summary.shards_skipped += 1;
            bar.inc(1);
            continue;
        }
        if is_shutdown_requested() {
            summary.interrupted = true;
            break;
        }

        let mut reader = ShardReader::open(&shard.path)?;
        let mut batch: Vec<SourceRow> = Vec::with_capacity(SOURCE_BATCH);
        let mut records = 0usize;

        while let Some(result) = reader.next_record::<SourceRecord>()? {
            match result {
                Ok((record, _raw)) => {
                    if let Some(row) = flatten_source(record) {
                        batch.push(row);
                        records += 1;
                    }
                }
                Err(e) => {
                    log::warn!("{e}");
                    summary.parse_errors += 1;
                }
            }
            if batch.len() >= SOURCE_BATCH {
                summary.sources_upserted += flush_sources(store, &batch)? as u64;
                batch.clear();
                // Stop only between commits; the shard stays
                // uncheckpointed and replays cleanly (upserts).
                if is_shutdown_requested() {
                    summary.interrupted = true;
                    break;
                }
            }
        }
        if summary.interrupted {
            break;
        }
        if !batch.is_empty() {
            summary.sources_upserted += flush_sources(store, &batch)? as u64;
        }
        store.mark_shard_done(stage::SOURCES, &shard.key, records)?;
        summary.shards_loaded += 1;
        bar.inc(1);
    }
    bar.finish_and_clear();

    if !summary.interrupted {
        summary.issn_mappings = store.rebuild_issn_lookup()?;
    }
    summary.elapsed = start.elapsed();
    summary.log();
    Ok(summary)
}

fn flush_sources(store: &mut Store, batch: &[SourceRow]) -> Result<usize, StageError> {
    retry_with_backoff("sources batch", DEFAULT_MAX_RETRIES, || {
        store.upsert_sources_batch(batch)
    })
}
