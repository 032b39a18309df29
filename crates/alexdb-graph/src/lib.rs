//! Citation graph builder
//!
//! Walks the works table in internal-key order, resolves each
//! reference list against the loaded corpus, and materializes
//! `(citing, cited, citing_year)` edges. The scan cursor is committed
//! in the same transaction as the edges it covers, so the checkpoint
//! can never run ahead of the data and a resumed build emits no
//! duplicate edges.

pub mod builder;

pub use builder::{build_graph, GraphOptions, GraphSummary};
