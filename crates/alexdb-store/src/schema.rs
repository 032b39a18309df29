//! SQLite schema for the works store
//!
//! The store is the single shared state of the pipeline: data tables,
//! checkpoint table, and metadata. All resumability derives from rows
//! here, never from process memory.

/// Core tables + indexes, created once at open (idempotent).
pub const SCHEMA_SQL: &str = "
-- Works table: core metadata for each scholarly work
CREATE TABLE IF NOT EXISTS works (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    openalex_id TEXT UNIQUE NOT NULL,
    doi TEXT,
    title TEXT,
    abstract TEXT,
    year INTEGER,
    publication_date TEXT,
    type TEXT,
    language TEXT,
    source TEXT,
    source_id TEXT,
    issn TEXT,
    volume TEXT,
    issue TEXT,
    first_page TEXT,
    last_page TEXT,
    publisher TEXT,
    cited_by_count INTEGER DEFAULT 0,
    is_oa INTEGER DEFAULT 0,
    oa_status TEXT,
    oa_url TEXT,
    authors_json TEXT,
    concepts_json TEXT,
    topics_json TEXT,
    referenced_works_json TEXT,
    raw_json TEXT,
    created_at TEXT DEFAULT CURRENT_TIMESTAMP
);

CREATE INDEX IF NOT EXISTS idx_works_doi ON works(doi);
CREATE INDEX IF NOT EXISTS idx_works_year ON works(year);
CREATE INDEX IF NOT EXISTS idx_works_type ON works(type);
CREATE INDEX IF NOT EXISTS idx_works_language ON works(language);
CREATE INDEX IF NOT EXISTS idx_works_cited_by_count ON works(cited_by_count);
-- Composite index backing the citable-set lookup of the aggregator
CREATE INDEX IF NOT EXISTS idx_works_issn_year ON works(issn, year);

-- Sources table: journal/venue metadata with upstream impact metrics
CREATE TABLE IF NOT EXISTS sources (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    openalex_id TEXT UNIQUE NOT NULL,
    issn_l TEXT,
    issns_json TEXT,
    display_name TEXT,
    type TEXT,
    host_organization TEXT,
    works_count INTEGER DEFAULT 0,
    cited_by_count INTEGER DEFAULT 0,
    two_year_mean_citedness REAL,
    h_index INTEGER,
    i10_index INTEGER,
    is_oa INTEGER DEFAULT 0,
    is_in_doaj INTEGER DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_sources_issn_l ON sources(issn_l);

-- ISSN lookup: every ISSN maps to at most one source (first-seen wins)
CREATE TABLE IF NOT EXISTS issn_lookup (
    issn TEXT PRIMARY KEY,
    source_id INTEGER NOT NULL REFERENCES sources(id)
);

-- Citations: (citing, cited, citing_year) over internal work keys.
-- Append-only; rebuilt via wipe or resumed scan, never updated in place.
CREATE TABLE IF NOT EXISTS citations (
    citing_id INTEGER NOT NULL,
    cited_id INTEGER NOT NULL,
    citing_year INTEGER NOT NULL
);

-- Precomputed per-venue impact factors, one row per (issn, year,
-- window). Refreshed in place by the batch aggregator.
CREATE TABLE IF NOT EXISTS journal_impact_factors (
    issn TEXT NOT NULL,
    year INTEGER NOT NULL,
    window INTEGER NOT NULL,
    impact_factor REAL NOT NULL,
    citations_count INTEGER NOT NULL,
    articles_count INTEGER NOT NULL,
    computed_at TEXT DEFAULT CURRENT_TIMESTAMP,
    PRIMARY KEY (issn, year, window)
);

CREATE INDEX IF NOT EXISTS idx_jif_year_value
    ON journal_impact_factors(year, impact_factor);

-- Checkpoints: one row per (stage, resumption key). A row exists only
-- after its batch is durably committed.
CREATE TABLE IF NOT EXISTS checkpoints (
    stage TEXT NOT NULL,
    key TEXT NOT NULL,
    cursor INTEGER,
    records INTEGER,
    completed_at TEXT DEFAULT CURRENT_TIMESTAMP,
    PRIMARY KEY (stage, key)
);

-- Build provenance
CREATE TABLE IF NOT EXISTS meta (
    key TEXT PRIMARY KEY,
    value TEXT
);
";

/// Citation indexes are created after graph build completes; creating
/// them up front would slow the multi-billion-row insert phase.
pub const CITATION_INDEX_SQL: &str = "
-- Composite index backing the citation-count lookup of the aggregator
CREATE INDEX IF NOT EXISTS idx_citations_cited_year ON citations(cited_id, citing_year);
CREATE INDEX IF NOT EXISTS idx_citations_citing ON citations(citing_id);
";

/// FTS5 virtual table over title + abstract, external content on works
/// (rowid = works.id). Porter stemming over unicode word boundaries.
pub const FTS_SCHEMA_SQL: &str = "
CREATE VIRTUAL TABLE IF NOT EXISTS works_fts USING fts5(
    openalex_id,
    title,
    abstract,
    content='works',
    content_rowid='id',
    tokenize='porter unicode61'
);
";
