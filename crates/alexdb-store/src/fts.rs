//! Full-text index maintenance and search (FTS5, porter stemming)
//!
//! The index is external-content over `works`, so catching up is an
//! `INSERT .. SELECT` from the works table. Completeness is judged by
//! exact row-count equality with `works`, which makes a re-run against
//! a complete index perform zero writes.

use std::time::Instant;

use rusqlite::params;

use alexdb_core::{is_shutdown_requested, StageError};

use crate::model::{SearchHit, SearchPage};
use crate::store::Store;

pub const DEFAULT_INDEX_BATCH: usize = 50_000;

/// Outcome of an index catch-up run.
#[derive(Debug, Clone, Default)]
pub struct IndexSummary {
    /// Rows written by this run (0 when the index was already complete).
    pub indexed: u64,
    /// Rows in the index after the run.
    pub index_rows: i64,
    /// Rows in the works table.
    pub works_rows: i64,
    /// True when interrupted between batches; a re-run resumes.
    pub interrupted: bool,
}

impl IndexSummary {
    pub fn complete(&self) -> bool {
        self.index_rows == self.works_rows
    }
}

/// Bring the full-text index up to date with the works table.
///
/// Idempotent: if the counts already match, nothing is written. An
/// incomplete index resumes from its highest indexed rowid, each batch
/// committed as one transaction. Safe to interrupt between batches.
pub fn catch_up(
    store: &mut Store,
    batch_size: usize,
    mut on_batch: impl FnMut(u64, i64),
) -> Result<IndexSummary, StageError> {
    let conn = store.conn();
    let works_rows: i64 = conn.query_row("SELECT COUNT(*) FROM works", [], |r| r.get(0))?;
    let index_rows: i64 = conn.query_row("SELECT COUNT(*) FROM works_fts", [], |r| r.get(0))?;

    if index_rows == works_rows {
        log::info!("full-text index already complete ({index_rows} rows)");
        return Ok(IndexSummary {
            indexed: 0,
            index_rows,
            works_rows,
            interrupted: false,
        });
    }

    // Resume from the highest rowid already indexed. Loading inserts
    // works in increasing rowid order, so everything at or below the
    // max is already present.
    let mut cursor: i64 =
        conn.query_row("SELECT COALESCE(MAX(rowid), 0) FROM works_fts", [], |r| {
            r.get(0)
        })?;
    log::info!(
        "full-text index at {}/{} rows, resuming above rowid {cursor}",
        index_rows,
        works_rows
    );

    let mut indexed = 0u64;
    let mut interrupted = false;
    loop {
        if is_shutdown_requested() {
            interrupted = true;
            break;
        }
        let written = conn.execute(
            "INSERT INTO works_fts (rowid, openalex_id, title, abstract)
             SELECT id, openalex_id, title, abstract
             FROM works WHERE id > ?1 ORDER BY id LIMIT ?2",
            params![cursor, batch_size as i64],
        )?;
        if written == 0 {
            break;
        }
        cursor = conn.query_row("SELECT MAX(rowid) FROM works_fts", [], |r| r.get(0))?;
        indexed += written as u64;
        on_batch(indexed, cursor);
    }

    if !interrupted {
        conn.execute("INSERT INTO works_fts (works_fts) VALUES ('optimize')", [])?;
    }

    let index_rows: i64 = conn.query_row("SELECT COUNT(*) FROM works_fts", [], |r| r.get(0))?;
    Ok(IndexSummary {
        indexed,
        index_rows,
        works_rows,
        interrupted,
    })
}

/// Rebuild the index from scratch using the FTS5 'rebuild' command
/// (external content makes this a pure re-read of the works table).
pub fn rebuild(store: &mut Store) -> Result<(), StageError> {
    let conn = store.conn();
    conn.execute("INSERT INTO works_fts (works_fts) VALUES ('rebuild')", [])?;
    conn.execute("INSERT INTO works_fts (works_fts) VALUES ('optimize')", [])?;
    Ok(())
}

/// Quote query terms when they contain characters FTS5 would read as
/// operators (hyphenated words, paths, handles). An already-quoted
/// phrase query passes through untouched.
pub fn sanitize_query(query: &str) -> String {
    if query.starts_with('"') && query.ends_with('"') && query.len() >= 2 {
        return query.to_string();
    }

    let hyphenated = query.as_bytes().windows(3).any(|w| {
        w[1] == b'-' && (w[0] as char).is_alphanumeric() && (w[2] as char).is_alphanumeric()
    });
    let special = query.contains(['/', '\\', '@', '#', '$', '%', '^', '&']);

    if hyphenated || special {
        query
            .split_whitespace()
            .map(|w| format!("\"{w}\""))
            .collect::<Vec<_>>()
            .join(" ")
    } else {
        query.to_string()
    }
}

/// Full-text search over titles and abstracts, best match first.
pub fn search(
    store: &Store,
    query: &str,
    limit: usize,
    offset: usize,
) -> Result<SearchPage, StageError> {
    let start = Instant::now();
    let safe = sanitize_query(query);
    let conn = store.conn();

    let total: i64 = conn
        .prepare_cached("SELECT COUNT(*) FROM works_fts WHERE works_fts MATCH ?1")?
        .query_row([&safe], |r| r.get(0))?;

    let mut stmt = conn.prepare_cached(
        "SELECT w.openalex_id, w.title, w.year, w.doi, f.rank
         FROM works_fts f
         JOIN works w ON w.id = f.rowid
         WHERE works_fts MATCH ?1
         ORDER BY f.rank
         LIMIT ?2 OFFSET ?3",
    )?;
    let hits = stmt
        .query_map(params![safe, limit as i64, offset as i64], |r| {
            Ok(SearchHit {
                openalex_id: r.get(0)?,
                title: r.get(1)?,
                year: r.get(2)?,
                doi: r.get(3)?,
                rank: r.get(4)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(SearchPage {
        hits,
        total: total as usize,
        query: query.to_string(),
        elapsed_ms: start.elapsed().as_secs_f64() * 1000.0,
    })
}

/// Count matches without fetching rows.
pub fn count(store: &Store, query: &str) -> Result<usize, StageError> {
    let safe = sanitize_query(query);
    let total: i64 = store
        .conn()
        .prepare_cached("SELECT COUNT(*) FROM works_fts WHERE works_fts MATCH ?1")?
        .query_row([&safe], |r| r.get(0))?;
    Ok(total as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::WorkRow;
    use tempfile::TempDir;

    fn seed(store: &mut Store, rows: &[(&str, &str, &str)]) {
        let batch: Vec<WorkRow> = rows
            .iter()
            .map(|(id, title, abs)| WorkRow {
                openalex_id: id.to_string(),
                title: Some(title.to_string()),
                abstract_text: Some(abs.to_string()),
                year: 2020,
                ..Default::default()
            })
            .collect();
        store.insert_works_batch(&batch).unwrap();
    }

    #[test]
    fn catch_up_then_search() {
        let dir = TempDir::new().unwrap();
        let mut store = Store::open(&dir.path().join("t.db")).unwrap();
        seed(
            &mut store,
            &[
                ("W1", "Deep learning for protein folding", "Neural networks predict structure"),
                ("W2", "Sorting algorithms revisited", "Classical comparison sorts"),
            ],
        );

        let summary = catch_up(&mut store, 10, |_, _| {}).unwrap();
        assert_eq!(summary.indexed, 2);
        assert!(summary.complete());

        let page = search(&store, "protein folding", 10, 0).unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.hits[0].openalex_id, "W1");
    }

    #[test]
    fn catch_up_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let mut store = Store::open(&dir.path().join("t.db")).unwrap();
        seed(&mut store, &[("W1", "Alpha", "beta gamma")]);

        assert_eq!(catch_up(&mut store, 10, |_, _| {}).unwrap().indexed, 1);
        // Second run converges with zero writes
        assert_eq!(catch_up(&mut store, 10, |_, _| {}).unwrap().indexed, 0);
    }

    #[test]
    fn catch_up_indexes_only_new_rows() {
        let dir = TempDir::new().unwrap();
        let mut store = Store::open(&dir.path().join("t.db")).unwrap();
        seed(&mut store, &[("W1", "First paper", "one")]);
        catch_up(&mut store, 10, |_, _| {}).unwrap();

        seed(&mut store, &[("W2", "Second paper", "two")]);
        let summary = catch_up(&mut store, 10, |_, _| {}).unwrap();
        assert_eq!(summary.indexed, 1);
        assert_eq!(summary.index_rows, 2);

        assert_eq!(count(&store, "second").unwrap(), 1);
    }

    #[test]
    fn porter_stemming_matches_inflections() {
        let dir = TempDir::new().unwrap();
        let mut store = Store::open(&dir.path().join("t.db")).unwrap();
        seed(&mut store, &[("W1", "Connected networks", "connecting nodes")]);
        catch_up(&mut store, 10, |_, _| {}).unwrap();

        assert_eq!(count(&store, "connect").unwrap(), 1);
        assert_eq!(count(&store, "connections").unwrap(), 1);
    }

    #[test]
    fn sanitize_quotes_hyphenated_terms() {
        assert_eq!(sanitize_query("machine learning"), "machine learning");
        assert_eq!(
            sanitize_query("single-cell sequencing"),
            "\"single-cell\" \"sequencing\""
        );
        assert_eq!(sanitize_query("c/n ratio"), "\"c/n\" \"ratio\"");
        // Explicit phrase queries pass through
        assert_eq!(sanitize_query("\"exact phrase\""), "\"exact phrase\"");
    }

    #[test]
    fn hyphenated_query_does_not_error() {
        let dir = TempDir::new().unwrap();
        let mut store = Store::open(&dir.path().join("t.db")).unwrap();
        seed(&mut store, &[("W1", "Single-cell RNA sequencing", "cells")]);
        catch_up(&mut store, 10, |_, _| {}).unwrap();

        // Unsanitized, FTS5 would parse `-cell` as an exclusion
        let page = search(&store, "single-cell sequencing", 10, 0).unwrap();
        assert_eq!(page.total, 1);
    }
}
