//! Retry with exponential backoff for batch commits

use std::time::Duration;

use crate::error::StageError;

/// Default attempt ceiling before a batch failure is escalated.
pub const DEFAULT_MAX_RETRIES: u32 = 5;

/// Exponential backoff: 2^attempt seconds (2s, 4s, 8s, ...)
pub const fn backoff_duration(attempt: u32) -> Duration {
    Duration::from_secs(2u64.pow(attempt))
}

/// Retry a fallible store operation with exponential backoff.
///
/// On retryable errors (lock contention, transient I/O), logs the
/// failure, sleeps, and retries up to `max_retries`. Data errors and
/// fatal errors are returned immediately.
///
/// Returns `Ok(T)` on first success, or the final `Err` on exhaustion /
/// non-retryable error.
pub fn retry_with_backoff<T>(
    label: &str,
    max_retries: u32,
    mut attempt_fn: impl FnMut() -> Result<T, StageError>,
) -> Result<T, StageError> {
    let mut attempt = 0u32;
    loop {
        match attempt_fn() {
            Ok(v) => return Ok(v),
            Err(e) if attempt < max_retries && e.is_retryable() => {
                attempt += 1;
                log::debug!("{label}: attempt {attempt}/{max_retries} failed: {e}, retrying...");
                std::thread::sleep(backoff_duration(attempt));
            }
            Err(e) => {
                log::error!("{label}: failed permanently: {e}");
                return Err(e);
            }
        }
    }
}
