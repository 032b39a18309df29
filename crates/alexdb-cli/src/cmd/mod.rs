//! Subcommand implementations

pub mod get;
pub mod graph;
pub mod impact;
pub mod index;
pub mod ingest;
pub mod search;
pub mod sources;
pub mod status;
