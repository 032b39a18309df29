//! SQLite-backed store for the works pipeline
//!
//! Owns the schema, the single-writer transactional write paths, the
//! checkpoint table every stage resumes from, the FTS5 index, and the
//! impact-factor query.

pub mod fts;
pub mod impact;
pub mod model;
pub mod schema;
pub mod store;

pub use fts::{IndexSummary, DEFAULT_INDEX_BATCH};
pub use impact::{ImpactFactor, ImpactTableSummary, DEFAULT_WINDOW};
pub use model::{
    CitationEdge, SearchHit, SearchPage, SourceRow, StoreStats, Tag, Work, WorkRow,
};
pub use store::{stage, Store};
