//! Snapshot ingestion: gz JSONL shards → SQLite rows
//!
//! Stages: shard discovery and manifest verification, streaming decode,
//! record flattening (including the inverted-index abstract), the
//! checkpointed parallel works loader, and the sequential sources
//! loader.

pub mod abstract_decode;
pub mod decode;
pub mod flatten;
pub mod loader;
pub mod manifest;
pub mod record;
pub mod sources;

pub use decode::ShardReader;
pub use flatten::{flatten_source, flatten_work};
pub use loader::{load_works, LoadOptions, LoadSummary};
pub use manifest::{list_shards, Manifest, Shard};
pub use record::{SourceRecord, WorkRecord};
pub use sources::{load_sources, SourcesSummary};
