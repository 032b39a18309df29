//! alexdb Core - Common infrastructure for the snapshot build pipeline
//!
//! This crate provides reusable components shared by the ingestion,
//! indexing, and graph-build stages: error classification, retry with
//! backoff, cooperative shutdown, logging, and progress reporting.

pub mod error;
pub mod logging;
pub mod progress;
pub mod retry;
pub mod shutdown;
pub mod work_queue;

// Re-exports for convenience
pub use error::{DecodeError, StageError};
pub use logging::{init_logging, IndicatifLogger};
pub use progress::{fmt_num, ProgressContext, SharedProgress};
pub use retry::{backoff_duration, retry_with_backoff, DEFAULT_MAX_RETRIES};
pub use shutdown::{install_signal_handlers, is_shutdown_requested, request_shutdown};
pub use work_queue::WorkQueue;
