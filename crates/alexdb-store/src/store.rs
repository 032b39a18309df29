//! Store — single-writer SQLite database owning all pipeline state

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OptionalExtension};

use alexdb_core::StageError;

use crate::model::{CitationEdge, SourceRow, StoreStats, Tag, Work, WorkRow};
use crate::schema;

/// Checkpoint stage names. One writer stage per name; the loader and
/// the graph builder are sequenced, never concurrent writers.
pub mod stage {
    pub const WORKS: &str = "works";
    pub const SOURCES: &str = "sources";
    pub const GRAPH: &str = "graph";
}

/// Key under which the graph builder stores its work-id cursor.
const GRAPH_CURSOR_KEY: &str = "cursor";

/// Handle to the persisted store.
///
/// Opens in WAL mode so the status observer and the query surface can
/// read concurrently with the single writer.
pub struct Store {
    conn: Connection,
    path: PathBuf,
}

impl Store {
    /// Open (creating if absent) and apply schema + pragmas.
    pub fn open(path: &Path) -> Result<Self, StageError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.pragma_update(None, "cache_size", -2_000_000)?;
        conn.pragma_update(None, "temp_store", "MEMORY")?;
        conn.execute_batch(schema::SCHEMA_SQL)?;
        conn.execute_batch(schema::FTS_SCHEMA_SQL)?;
        Ok(Self {
            conn,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }

    // === Works ===

    /// Insert a batch of flattened works as one transaction.
    ///
    /// `INSERT OR IGNORE` on the unique external id makes replayed
    /// batches (after a mid-shard crash) no-ops instead of errors.
    /// Returns rows actually inserted.
    pub fn insert_works_batch(&mut self, rows: &[WorkRow]) -> Result<usize, StageError> {
        let tx = self.conn.transaction()?;
        let mut inserted = 0usize;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT OR IGNORE INTO works (
                    openalex_id, doi, title, abstract, year, publication_date,
                    type, language, source, source_id, issn, volume, issue,
                    first_page, last_page, publisher, cited_by_count, is_oa,
                    oa_status, oa_url, authors_json, concepts_json, topics_json,
                    referenced_works_json, raw_json
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12,
                          ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22,
                          ?23, ?24, ?25)",
            )?;
            for row in rows {
                inserted += stmt.execute(params![
                    row.openalex_id,
                    row.doi,
                    row.title,
                    row.abstract_text,
                    row.year,
                    row.publication_date,
                    row.work_type,
                    row.language,
                    row.source,
                    row.source_id,
                    row.issn,
                    row.volume,
                    row.issue,
                    row.first_page,
                    row.last_page,
                    row.publisher,
                    row.cited_by_count,
                    row.is_oa as i64,
                    row.oa_status,
                    row.oa_url,
                    json_column(&row.authors),
                    json_column(&row.concepts),
                    json_column(&row.topics),
                    json_column(&row.referenced_works),
                    row.raw_json,
                ])?;
            }
        }
        tx.commit()?;
        Ok(inserted)
    }

    pub fn work_count(&self) -> Result<i64, StageError> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM works", [], |r| r.get(0))?)
    }

    pub fn max_work_key(&self) -> Result<i64, StageError> {
        Ok(self
            .conn
            .query_row("SELECT COALESCE(MAX(id), 0) FROM works", [], |r| r.get(0))?)
    }

    /// Resolve an external work identifier to its internal key.
    pub fn resolve_work_key(&self, openalex_id: &str) -> Result<Option<i64>, StageError> {
        Ok(self
            .conn
            .prepare_cached("SELECT id FROM works WHERE openalex_id = ?1")?
            .query_row([openalex_id], |r| r.get(0))
            .optional()?)
    }

    /// Point lookup by external identifier or DOI.
    pub fn get_work(&self, id_or_doi: &str) -> Result<Option<Work>, StageError> {
        if id_or_doi.starts_with('W') || id_or_doi.starts_with('w') {
            if let Some(work) = self.work_by_column("openalex_id", &id_or_doi.to_uppercase())? {
                return Ok(Some(work));
            }
        }
        let doi = id_or_doi
            .strip_prefix("https://doi.org/")
            .unwrap_or(id_or_doi);
        self.work_by_column("doi", doi)
    }

    /// Batch lookup: partition identifiers into found works and misses.
    pub fn get_many(&self, ids: &[String]) -> Result<(Vec<Work>, Vec<String>), StageError> {
        let mut found = Vec::new();
        let mut missing = Vec::new();
        for id in ids {
            match self.get_work(id)? {
                Some(work) => found.push(work),
                None => missing.push(id.clone()),
            }
        }
        Ok((found, missing))
    }

    fn work_by_column(&self, column: &str, value: &str) -> Result<Option<Work>, StageError> {
        // column is a compile-time constant from this module, not user input
        let sql = format!(
            "SELECT id, openalex_id, doi, title, abstract, year, publication_date,
                    type, language, source, issn, publisher, cited_by_count, is_oa,
                    oa_status, oa_url, authors_json, concepts_json, topics_json,
                    referenced_works_json
             FROM works WHERE {column} = ?1"
        );
        Ok(self
            .conn
            .prepare_cached(&sql)?
            .query_row([value], work_from_row)
            .optional()?)
    }

    // === Sources ===

    /// Upsert a batch of source rows as one transaction.
    ///
    /// Upsert (not REPLACE) so an existing source keeps its internal
    /// key across snapshot re-loads.
    pub fn upsert_sources_batch(&mut self, rows: &[SourceRow]) -> Result<usize, StageError> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO sources (
                    openalex_id, issn_l, issns_json, display_name, type,
                    host_organization, works_count, cited_by_count,
                    two_year_mean_citedness, h_index, i10_index, is_oa, is_in_doaj
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
                ON CONFLICT(openalex_id) DO UPDATE SET
                    issn_l = excluded.issn_l,
                    issns_json = excluded.issns_json,
                    display_name = excluded.display_name,
                    type = excluded.type,
                    host_organization = excluded.host_organization,
                    works_count = excluded.works_count,
                    cited_by_count = excluded.cited_by_count,
                    two_year_mean_citedness = excluded.two_year_mean_citedness,
                    h_index = excluded.h_index,
                    i10_index = excluded.i10_index,
                    is_oa = excluded.is_oa,
                    is_in_doaj = excluded.is_in_doaj",
            )?;
            for row in rows {
                stmt.execute(params![
                    row.openalex_id,
                    row.issn_l,
                    json_column(&row.issns),
                    row.display_name,
                    row.source_type,
                    row.host_organization,
                    row.works_count,
                    row.cited_by_count,
                    row.two_year_mean_citedness,
                    row.h_index,
                    row.i10_index,
                    row.is_oa as i64,
                    row.is_in_doaj as i64,
                ])?;
            }
        }
        tx.commit()?;
        Ok(rows.len())
    }

    /// Rebuild the ISSN → source mapping from scratch.
    ///
    /// Walks sources in internal-key order and uses `INSERT OR IGNORE`,
    /// so when two sources claim the same ISSN the one loaded first
    /// (lowest internal key) wins. Deterministic given a fixed shard
    /// order.
    pub fn rebuild_issn_lookup(&mut self) -> Result<usize, StageError> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM issn_lookup", [])?;
        let mut mapped = 0usize;
        {
            let mut read = tx.prepare(
                "SELECT id, issn_l, issns_json FROM sources
                 WHERE issn_l IS NOT NULL OR issns_json IS NOT NULL
                 ORDER BY id",
            )?;
            let mut write = tx
                .prepare_cached("INSERT OR IGNORE INTO issn_lookup (issn, source_id) VALUES (?1, ?2)")?;
            let mut rows = read.query([])?;
            while let Some(row) = rows.next()? {
                let source_id: i64 = row.get(0)?;
                let issn_l: Option<String> = row.get(1)?;
                let issns_json: Option<String> = row.get(2)?;

                let mut issns: Vec<String> = Vec::new();
                if let Some(issn) = issn_l {
                    issns.push(issn);
                }
                if let Some(json) = issns_json {
                    if let Ok(list) = serde_json::from_str::<Vec<String>>(&json) {
                        issns.extend(list);
                    }
                }
                issns.sort();
                issns.dedup();
                for issn in issns {
                    mapped += write.execute(params![issn, source_id])?;
                }
            }
        }
        tx.commit()?;
        Ok(mapped)
    }

    /// Map an ISSN to its source's internal key, if known.
    pub fn source_for_issn(&self, issn: &str) -> Result<Option<i64>, StageError> {
        Ok(self
            .conn
            .prepare_cached("SELECT source_id FROM issn_lookup WHERE issn = ?1")?
            .query_row([issn], |r| r.get(0))
            .optional()?)
    }

    // === Citations ===

    /// Commit a batch of citation edges and advance the graph cursor in
    /// the same transaction. The cursor can therefore never run ahead
    /// of committed edges, and the guard keeps it monotonic.
    pub fn insert_citations_batch(
        &mut self,
        edges: &[CitationEdge],
        cursor: i64,
    ) -> Result<(), StageError> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO citations (citing_id, cited_id, citing_year) VALUES (?1, ?2, ?3)",
            )?;
            for edge in edges {
                stmt.execute(params![edge.citing_id, edge.cited_id, edge.citing_year])?;
            }
            tx.prepare_cached(
                "INSERT INTO checkpoints (stage, key, cursor) VALUES (?1, ?2, ?3)
                 ON CONFLICT(stage, key) DO UPDATE SET
                    cursor = excluded.cursor,
                    completed_at = CURRENT_TIMESTAMP
                 WHERE excluded.cursor > checkpoints.cursor",
            )?
            .execute(params![stage::GRAPH, GRAPH_CURSOR_KEY, cursor])?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Create the citation composite indexes (post-load).
    pub fn ensure_citation_indexes(&self) -> Result<(), StageError> {
        self.conn.execute_batch(schema::CITATION_INDEX_SQL)?;
        Ok(())
    }

    /// Last committed graph cursor (0 if the build never ran).
    pub fn graph_cursor(&self) -> Result<i64, StageError> {
        Ok(self
            .conn
            .prepare_cached("SELECT cursor FROM checkpoints WHERE stage = ?1 AND key = ?2")?
            .query_row(params![stage::GRAPH, GRAPH_CURSOR_KEY], |r| r.get(0))
            .optional()?
            .unwrap_or(0))
    }

    /// Scan (id, year, referenced_works_json) for works after `after`,
    /// in increasing internal-key order.
    pub fn scan_reference_lists(
        &self,
        after: i64,
        limit: usize,
    ) -> Result<Vec<(i64, Option<i32>, Option<String>)>, StageError> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT id, year, referenced_works_json FROM works
             WHERE id > ?1 ORDER BY id LIMIT ?2",
        )?;
        let rows = stmt
            .query_map(params![after, limit as i64], |r| {
                Ok((r.get(0)?, r.get(1)?, r.get(2)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    // === Impact factors ===

    /// Distinct ISSNs present on works rows — the venue universe of the
    /// impact-factor table.
    pub fn work_issns(&self) -> Result<Vec<String>, StageError> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT DISTINCT issn FROM works WHERE issn IS NOT NULL ORDER BY issn",
        )?;
        let rows = stmt
            .query_map([], |r| r.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(rows)
    }

    /// Persist a batch of computed impact factors as one transaction,
    /// refreshing existing (issn, year, window) rows in place.
    pub fn upsert_impact_factors_batch(
        &mut self,
        rows: &[(String, crate::impact::ImpactFactor)],
    ) -> Result<(), StageError> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO journal_impact_factors
                    (issn, year, window, impact_factor, citations_count, articles_count)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(issn, year, window) DO UPDATE SET
                    impact_factor = excluded.impact_factor,
                    citations_count = excluded.citations_count,
                    articles_count = excluded.articles_count,
                    computed_at = CURRENT_TIMESTAMP",
            )?;
            for (issn, factor) in rows {
                stmt.execute(params![
                    issn,
                    factor.year,
                    factor.window,
                    factor.value,
                    factor.citations,
                    factor.articles,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    // === Checkpoints ===

    /// Shards already completed for a stage.
    pub fn completed_shards(&self, stage: &str) -> Result<Vec<String>, StageError> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT key FROM checkpoints WHERE stage = ?1")?;
        let rows = stmt
            .query_map([stage], |r| r.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(rows)
    }

    /// Record a shard as fully loaded. Called only after every batch of
    /// the shard has committed.
    pub fn mark_shard_done(
        &mut self,
        stage: &str,
        shard: &str,
        records: usize,
    ) -> Result<(), StageError> {
        self.conn
            .prepare_cached(
                "INSERT OR REPLACE INTO checkpoints (stage, key, records) VALUES (?1, ?2, ?3)",
            )?
            .execute(params![stage, shard, records as i64])?;
        Ok(())
    }

    /// Wipe the citation graph and its cursor so the next build starts
    /// from zero. One transaction, so an interrupted reset never leaves
    /// a cursor pointing at deleted edges.
    pub fn reset_graph(&mut self) -> Result<(), StageError> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM citations", [])?;
        tx.execute("DELETE FROM checkpoints WHERE stage = ?1", [stage::GRAPH])?;
        tx.commit()?;
        Ok(())
    }

    /// Forget a stage's checkpoints (forced re-run).
    pub fn clear_checkpoints(&mut self, stage: &str) -> Result<usize, StageError> {
        Ok(self
            .conn
            .execute("DELETE FROM checkpoints WHERE stage = ?1", [stage])?)
    }

    // === Metadata ===

    pub fn meta_set(&mut self, key: &str, value: &str) -> Result<(), StageError> {
        self.conn
            .prepare_cached("INSERT OR REPLACE INTO meta (key, value) VALUES (?1, ?2)")?
            .execute(params![key, value])?;
        Ok(())
    }

    pub fn meta_get(&self, key: &str) -> Result<Option<String>, StageError> {
        Ok(self
            .conn
            .prepare_cached("SELECT value FROM meta WHERE key = ?1")?
            .query_row([key], |r| r.get(0))
            .optional()?)
    }

    // === Status ===

    pub fn stats(&self) -> Result<StoreStats, StageError> {
        let count = |sql: &str| -> Result<i64, rusqlite::Error> {
            self.conn.query_row(sql, [], |r| r.get(0))
        };
        Ok(StoreStats {
            works: count("SELECT COUNT(*) FROM works")?,
            sources: count("SELECT COUNT(*) FROM sources")?,
            citations: count("SELECT COUNT(*) FROM citations")?,
            fts_indexed: count("SELECT COUNT(*) FROM works_fts")?,
            issn_mappings: count("SELECT COUNT(*) FROM issn_lookup")?,
            graph_cursor: self.graph_cursor()?,
        })
    }

    /// Refresh planner statistics after a bulk load.
    pub fn analyze(&self) -> Result<(), StageError> {
        self.conn.execute_batch("ANALYZE")?;
        Ok(())
    }
}

/// Serialize an array column; empty arrays map to NULL.
fn json_column<T: serde::Serialize>(items: &[T]) -> Option<String> {
    if items.is_empty() {
        None
    } else {
        serde_json::to_string(items).ok()
    }
}

fn work_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Work> {
    let authors_json: Option<String> = row.get(16)?;
    let concepts_json: Option<String> = row.get(17)?;
    let topics_json: Option<String> = row.get(18)?;
    let refs_json: Option<String> = row.get(19)?;
    Ok(Work {
        id: row.get(0)?,
        openalex_id: row.get(1)?,
        doi: row.get(2)?,
        title: row.get(3)?,
        abstract_text: row.get(4)?,
        year: row.get(5)?,
        publication_date: row.get(6)?,
        work_type: row.get(7)?,
        language: row.get(8)?,
        source: row.get(9)?,
        issn: row.get(10)?,
        publisher: row.get(11)?,
        cited_by_count: row.get(12)?,
        is_oa: row.get::<_, i64>(13)? != 0,
        oa_status: row.get(14)?,
        oa_url: row.get(15)?,
        authors: parse_json_list(authors_json),
        concepts: parse_json_list::<Tag>(concepts_json),
        topics: parse_json_list::<Tag>(topics_json),
        referenced_works: parse_json_list(refs_json),
    })
}

fn parse_json_list<T: serde::de::DeserializeOwned>(json: Option<String>) -> Vec<T> {
    json.and_then(|s| serde_json::from_str(&s).ok())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn work(id: &str, year: i32) -> WorkRow {
        WorkRow {
            openalex_id: id.to_string(),
            year,
            title: Some(format!("Title of {id}")),
            ..Default::default()
        }
    }

    fn open_store(dir: &TempDir) -> Store {
        Store::open(&dir.path().join("test.db")).unwrap()
    }

    #[test]
    fn insert_and_lookup() {
        let dir = TempDir::new().unwrap();
        let mut store = open_store(&dir);

        let inserted = store
            .insert_works_batch(&[work("W1", 2020), work("W2", 2021)])
            .unwrap();
        assert_eq!(inserted, 2);

        let w = store.get_work("W1").unwrap().unwrap();
        assert_eq!(w.openalex_id, "W1");
        assert_eq!(w.year, Some(2020));
        assert!(store.get_work("W999").unwrap().is_none());
    }

    #[test]
    fn insert_is_replay_safe() {
        let dir = TempDir::new().unwrap();
        let mut store = open_store(&dir);

        let batch = vec![work("W1", 2020)];
        assert_eq!(store.insert_works_batch(&batch).unwrap(), 1);
        // Replaying the same batch inserts nothing and does not error
        assert_eq!(store.insert_works_batch(&batch).unwrap(), 0);
        assert_eq!(store.work_count().unwrap(), 1);
    }

    #[test]
    fn lookup_by_doi_strips_url_prefix() {
        let dir = TempDir::new().unwrap();
        let mut store = open_store(&dir);

        let mut row = work("W1", 2020);
        row.doi = Some("10.1038/nature12373".to_string());
        store.insert_works_batch(&[row]).unwrap();

        assert!(store.get_work("10.1038/nature12373").unwrap().is_some());
        assert!(store
            .get_work("https://doi.org/10.1038/nature12373")
            .unwrap()
            .is_some());
    }

    #[test]
    fn get_many_partitions() {
        let dir = TempDir::new().unwrap();
        let mut store = open_store(&dir);
        store.insert_works_batch(&[work("W1", 2020)]).unwrap();

        let (found, missing) = store
            .get_many(&["W1".to_string(), "W2".to_string()])
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(missing, vec!["W2".to_string()]);
    }

    #[test]
    fn arrays_round_trip_and_empty_is_null() {
        let dir = TempDir::new().unwrap();
        let mut store = open_store(&dir);

        let mut row = work("W1", 2020);
        row.authors = vec!["Ada Lovelace".to_string(), "Charles Babbage".to_string()];
        row.concepts = vec![Tag {
            name: "Computation".to_string(),
            score: Some(0.9),
        }];
        store.insert_works_batch(&[row, work("W2", 2021)]).unwrap();

        let w1 = store.get_work("W1").unwrap().unwrap();
        assert_eq!(w1.authors.len(), 2);
        assert_eq!(w1.concepts[0].name, "Computation");

        let w2 = store.get_work("W2").unwrap().unwrap();
        assert!(w2.authors.is_empty());
        let raw: Option<String> = store
            .conn
            .query_row(
                "SELECT authors_json FROM works WHERE openalex_id = 'W2'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert!(raw.is_none());
    }

    #[test]
    fn issn_lookup_first_seen_wins() {
        let dir = TempDir::new().unwrap();
        let mut store = open_store(&dir);

        let first = SourceRow {
            openalex_id: "S1".to_string(),
            issn_l: Some("1234-5678".to_string()),
            display_name: Some("Journal A".to_string()),
            ..Default::default()
        };
        let second = SourceRow {
            openalex_id: "S2".to_string(),
            issn_l: Some("1234-5678".to_string()),
            display_name: Some("Journal B".to_string()),
            ..Default::default()
        };
        store.upsert_sources_batch(&[first, second]).unwrap();
        store.rebuild_issn_lookup().unwrap();

        let s1_key: i64 = store
            .conn
            .query_row("SELECT id FROM sources WHERE openalex_id = 'S1'", [], |r| {
                r.get(0)
            })
            .unwrap();
        assert_eq!(store.source_for_issn("1234-5678").unwrap(), Some(s1_key));
    }

    #[test]
    fn source_upsert_keeps_internal_key() {
        let dir = TempDir::new().unwrap();
        let mut store = open_store(&dir);

        let mut row = SourceRow {
            openalex_id: "S1".to_string(),
            works_count: 10,
            ..Default::default()
        };
        store.upsert_sources_batch(std::slice::from_ref(&row)).unwrap();
        let key_before: i64 = store
            .conn
            .query_row("SELECT id FROM sources WHERE openalex_id = 'S1'", [], |r| {
                r.get(0)
            })
            .unwrap();

        row.works_count = 20;
        store.upsert_sources_batch(&[row]).unwrap();
        let (key_after, works_count): (i64, i64) = store
            .conn
            .query_row(
                "SELECT id, works_count FROM sources WHERE openalex_id = 'S1'",
                [],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .unwrap();
        assert_eq!(key_before, key_after);
        assert_eq!(works_count, 20);
    }

    #[test]
    fn shard_checkpoints() {
        let dir = TempDir::new().unwrap();
        let mut store = open_store(&dir);

        assert!(store.completed_shards(stage::WORKS).unwrap().is_empty());
        store
            .mark_shard_done(stage::WORKS, "part_0000.gz", 100)
            .unwrap();
        store
            .mark_shard_done(stage::WORKS, "part_0001.gz", 50)
            .unwrap();
        let mut done = store.completed_shards(stage::WORKS).unwrap();
        done.sort();
        assert_eq!(done, vec!["part_0000.gz", "part_0001.gz"]);
        // Stages are independent
        assert!(store.completed_shards(stage::SOURCES).unwrap().is_empty());
    }

    #[test]
    fn graph_cursor_monotonic() {
        let dir = TempDir::new().unwrap();
        let mut store = open_store(&dir);

        assert_eq!(store.graph_cursor().unwrap(), 0);
        store.insert_citations_batch(&[], 10).unwrap();
        assert_eq!(store.graph_cursor().unwrap(), 10);
        // A lower cursor never regresses the checkpoint
        store.insert_citations_batch(&[], 5).unwrap();
        assert_eq!(store.graph_cursor().unwrap(), 10);
        store.insert_citations_batch(&[], 25).unwrap();
        assert_eq!(store.graph_cursor().unwrap(), 25);
    }

    #[test]
    fn meta_round_trip() {
        let dir = TempDir::new().unwrap();
        let mut store = open_store(&dir);

        assert!(store.meta_get("snapshot_date").unwrap().is_none());
        store.meta_set("snapshot_date", "2025-06-30").unwrap();
        assert_eq!(
            store.meta_get("snapshot_date").unwrap().as_deref(),
            Some("2025-06-30")
        );
    }

    #[test]
    fn stats_counts() {
        let dir = TempDir::new().unwrap();
        let mut store = open_store(&dir);
        store
            .insert_works_batch(&[work("W1", 2020), work("W2", 2021)])
            .unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.works, 2);
        assert_eq!(stats.citations, 0);
        assert!(!stats.fts_complete());
    }
}
