//! Checkpointed works loader
//!
//! Decode workers claim shards from a lock-free queue, parse and
//! flatten records, and hand row batches to the single writer over a
//! bounded channel. The writer commits each batch as one transaction
//! and records a shard checkpoint only after that shard's final batch
//! has committed, so a checkpoint never exists for partially written
//! data. Replaying a half-loaded shard is safe: the unique external id
//! turns duplicate rows into no-ops.

use std::path::Path;
use std::sync::mpsc::{sync_channel, Receiver, SyncSender};
use std::time::{Duration, Instant};

use rustc_hash::FxHashSet;

use alexdb_core::{
    fmt_num, is_shutdown_requested, retry_with_backoff, ProgressContext, StageError, WorkQueue,
    DEFAULT_MAX_RETRIES,
};
use alexdb_store::{stage, Store, WorkRow};

use crate::decode::ShardReader;
use crate::flatten::flatten_work;
use crate::manifest::{list_shards, Shard};
use crate::record::WorkRecord;

/// Tuning knobs for a load run
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Decode workers running in parallel
    pub workers: usize,
    /// Rows per write transaction
    pub batch_size: usize,
    /// Batches buffered between decoders and the writer
    pub queue_depth: usize,
    /// Keep the raw JSON line alongside the flattened row
    pub store_raw: bool,
    /// Stop after this many shards (testing / partial loads)
    pub max_shards: Option<usize>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            workers: rayon::current_num_threads(),
            batch_size: 5_000,
            queue_depth: 8,
            store_raw: false,
            max_shards: None,
        }
    }
}

/// Summary of one load run
#[derive(Debug, Default)]
pub struct LoadSummary {
    pub shards_total: usize,
    pub shards_skipped: usize,
    pub shards_loaded: usize,
    pub shards_failed: usize,
    pub records_inserted: u64,
    pub records_dropped: u64,
    pub parse_errors: u64,
    pub interrupted: bool,
    pub elapsed: Duration,
}

impl LoadSummary {
    pub fn log(&self) {
        log::info!("=== Load Summary ===");
        log::info!(
            "Shards: {} loaded, {} skipped (done), {} failed of {}",
            self.shards_loaded,
            self.shards_skipped,
            self.shards_failed,
            self.shards_total
        );
        log::info!(
            "Rows: {} inserted, {} dropped, {} parse errors",
            fmt_num(self.records_inserted as usize),
            fmt_num(self.records_dropped as usize),
            fmt_num(self.parse_errors as usize)
        );
        if self.interrupted {
            log::info!("Interrupted; re-run to resume from checkpoints");
        }
        log::info!("Time: {:.1}s", self.elapsed.as_secs_f64());
    }
}

enum WriterMsg {
    Batch {
        shard_idx: usize,
        rows: Vec<WorkRow>,
    },
    /// Sent after the shard's last batch; the per-worker channel order
    /// guarantees every batch of the shard precedes it.
    ShardDone {
        shard_idx: usize,
        records: usize,
        dropped: u64,
        parse_errors: u64,
    },
    ShardFailed {
        shard_idx: usize,
        error: String,
    },
}

/// Load all work shards under `snapshot_dir` into the store.
///
/// Already-checkpointed shards are skipped; interrupting between
/// batches leaves the store consistent and resumable.
pub fn load_works(
    store: &mut Store,
    snapshot_dir: &Path,
    opts: &LoadOptions,
    progress: &ProgressContext,
) -> Result<LoadSummary, StageError> {
    let start = Instant::now();

    let all_shards = list_shards(snapshot_dir)?;
    if all_shards.is_empty() {
        log::warn!("no shards found under {}", snapshot_dir.display());
        return Ok(LoadSummary {
            elapsed: start.elapsed(),
            ..Default::default()
        });
    }

    let done: FxHashSet<String> = store
        .completed_shards(stage::WORKS)?
        .into_iter()
        .collect();
    let mut pending: Vec<Shard> = all_shards
        .iter()
        .filter(|s| !done.contains(&s.key))
        .cloned()
        .collect();
    if let Some(max) = opts.max_shards {
        pending.truncate(max);
    }

    let mut summary = LoadSummary {
        shards_total: all_shards.len(),
        shards_skipped: all_shards.len() - pending.len(),
        ..Default::default()
    };
    if pending.is_empty() {
        log::info!("all {} shards already loaded", all_shards.len());
        summary.elapsed = start.elapsed();
        return Ok(summary);
    }

    log::info!(
        "loading {} shards ({} already done) with {} workers",
        pending.len(),
        summary.shards_skipped,
        opts.workers
    );

    let queue: WorkQueue<(usize, Shard)> =
        WorkQueue::new(pending.iter().cloned().enumerate().collect());
    let (tx, rx) = sync_channel::<WriterMsg>(opts.queue_depth);
    let overall = progress.stage_bar("load", pending.len() as u64);

    let mut writer_result: Result<(), StageError> = Ok(());
    rayon::scope(|s| {
        for _ in 0..opts.workers {
            let tx = tx.clone();
            let queue = &queue;
            let overall = &overall;
            s.spawn(move |_| {
                while let Some((idx, shard)) = queue.next() {
                    if is_shutdown_requested() {
                        break;
                    }
                    let bar = progress.shard_bar(&shard.key);
                    decode_shard(*idx, shard, opts, &tx, &bar);
                    bar.finish_and_clear();
                    overall.inc(1);
                }
            });
        }
        drop(tx);

        writer_result = run_writer(store, &pending, rx, &mut summary);
    });
    overall.finish_and_clear();
    writer_result?;

    summary.interrupted = is_shutdown_requested();
    summary.elapsed = start.elapsed();
    summary.log();
    Ok(summary)
}

/// Decode one shard, sending row batches to the writer.
///
/// A mid-shard stop (shutdown or read error) sends no `ShardDone`, so
/// the shard stays uncheckpointed and the next run replays it.
fn decode_shard(
    shard_idx: usize,
    shard: &Shard,
    opts: &LoadOptions,
    tx: &SyncSender<WriterMsg>,
    bar: &indicatif::ProgressBar,
) {
    let mut reader = match ShardReader::open(&shard.path) {
        Ok(r) => r,
        Err(e) => {
            let _ = tx.send(WriterMsg::ShardFailed {
                shard_idx,
                error: e.to_string(),
            });
            return;
        }
    };

    let mut rows: Vec<WorkRow> = Vec::with_capacity(opts.batch_size);
    let mut records = 0usize;
    let mut dropped = 0u64;
    let mut parse_errors = 0u64;

    loop {
        match reader.next_record::<WorkRecord>() {
            Ok(Some(Ok((record, raw)))) => {
                let raw = opts.store_raw.then_some(raw.as_str());
                match flatten_work(record, raw) {
                    Some(row) => {
                        rows.push(row);
                        records += 1;
                        bar.inc(1);
                    }
                    None => dropped += 1,
                }
            }
            Ok(Some(Err(decode_err))) => {
                log::warn!("{decode_err}");
                parse_errors += 1;
            }
            Ok(None) => break,
            Err(e) => {
                // Unreadable stream: the whole shard fails, including
                // rows already queued (they will replay harmlessly)
                let _ = tx.send(WriterMsg::ShardFailed {
                    shard_idx,
                    error: format!("{}: {e}", shard.key),
                });
                return;
            }
        }

        if rows.len() >= opts.batch_size {
            if is_shutdown_requested() {
                return;
            }
            let batch = std::mem::replace(&mut rows, Vec::with_capacity(opts.batch_size));
            if tx
                .send(WriterMsg::Batch {
                    shard_idx,
                    rows: batch,
                })
                .is_err()
            {
                return;
            }
        }
    }

    if !rows.is_empty()
        && tx
            .send(WriterMsg::Batch {
                shard_idx,
                rows,
            })
            .is_err()
    {
        return;
    }
    let _ = tx.send(WriterMsg::ShardDone {
        shard_idx,
        records,
        dropped,
        parse_errors,
    });
}

/// Single writer: commits batches, withholds checkpoints from failed
/// shards, and surfaces only fatal (corruption) errors as hard stops.
fn run_writer(
    store: &mut Store,
    shards: &[Shard],
    rx: Receiver<WriterMsg>,
    summary: &mut LoadSummary,
) -> Result<(), StageError> {
    let mut failed: FxHashSet<usize> = FxHashSet::default();

    for msg in rx {
        match msg {
            WriterMsg::Batch { shard_idx, rows } => {
                if failed.contains(&shard_idx) {
                    continue;
                }
                let result = retry_with_backoff("works batch", DEFAULT_MAX_RETRIES, || {
                    store.insert_works_batch(&rows)
                });
                match result {
                    Ok(n) => summary.records_inserted += n as u64,
                    Err(e) if e.is_fatal() => return Err(e),
                    Err(e) if e.is_constraint() => {
                        // Replay-safe inserts swallow conflicts, so a
                        // surfaced constraint means the rows are already
                        // represented. Skip the batch, keep the shard.
                        log::warn!("shard {}: batch skipped: {e}", shards[shard_idx].key);
                    }
                    Err(e) => {
                        log::error!("shard {}: write failed: {e}", shards[shard_idx].key);
                        if failed.insert(shard_idx) {
                            summary.shards_failed += 1;
                        }
                    }
                }
            }
            WriterMsg::ShardDone {
                shard_idx,
                records,
                dropped,
                parse_errors,
            } => {
                summary.records_dropped += dropped;
                summary.parse_errors += parse_errors;
                if failed.contains(&shard_idx) {
                    continue;
                }
                store.mark_shard_done(stage::WORKS, &shards[shard_idx].key, records)?;
                summary.shards_loaded += 1;
            }
            WriterMsg::ShardFailed { shard_idx, error } => {
                log::error!("shard failed: {error}");
                if failed.insert(shard_idx) {
                    summary.shards_failed += 1;
                }
            }
        }
    }
    Ok(())
}
