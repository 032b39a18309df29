//! Common error types for pipeline stages

use std::path::PathBuf;

/// Error from decoding a single line of a JSON-Lines shard.
///
/// Always recoverable: the pipeline counts these and moves on to the
/// next line. Carries enough context (shard path + line number) to
/// audit data-quality regressions after a run.
#[derive(Debug)]
pub struct DecodeError {
    pub shard: PathBuf,
    pub line: usize,
    pub message: String,
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}: {}",
            self.shard.display(),
            self.line,
            self.message
        )
    }
}

impl std::error::Error for DecodeError {}

/// Error from a pipeline stage writing to the store.
///
/// Wraps either a store/SQL error or a local I/O error. Classified into
/// retryable (lock contention, transient I/O), skippable (constraint
/// violations from replayed batches), and fatal (corruption).
#[derive(Debug)]
pub enum StageError {
    Sql(rusqlite::Error),
    Io(std::io::Error),
    /// Shard discovery failed before any work started (bad glob pattern,
    /// e.g. a snapshot path containing glob metacharacters).
    Listing(glob::PatternError),
}

impl std::fmt::Display for StageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sql(e) => write!(f, "store: {e}"),
            Self::Io(e) => write!(f, "IO: {e}"),
            Self::Listing(e) => write!(f, "shard listing: {e}"),
        }
    }
}

impl std::error::Error for StageError {}

impl From<rusqlite::Error> for StageError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Sql(e)
    }
}

impl From<std::io::Error> for StageError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<glob::PatternError> for StageError {
    fn from(e: glob::PatternError) -> Self {
        Self::Listing(e)
    }
}

impl StageError {
    /// Lock contention and transient I/O are retried with backoff.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Sql(rusqlite::Error::SqliteFailure(err, _)) => matches!(
                err.code,
                rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
            ),
            Self::Sql(_) => false,
            Self::Io(e) => e.kind() != std::io::ErrorKind::StorageFull,
            Self::Listing(_) => false,
        }
    }

    /// Constraint violations from a replayed batch are treated as
    /// already-done and skipped, never escalated.
    pub fn is_constraint(&self) -> bool {
        matches!(
            self,
            Self::Sql(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation
        )
    }

    /// Store corruption requires manual intervention; the stage halts.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Sql(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::DatabaseCorrupt
                    || err.code == rusqlite::ErrorCode::NotADatabase
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::ErrorKind;

    fn sqlite_err(code: rusqlite::ErrorCode) -> StageError {
        StageError::Sql(rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error {
                code,
                extended_code: 0,
            },
            None,
        ))
    }

    #[test]
    fn busy_is_retryable() {
        assert!(sqlite_err(rusqlite::ErrorCode::DatabaseBusy).is_retryable());
        assert!(sqlite_err(rusqlite::ErrorCode::DatabaseLocked).is_retryable());
    }

    #[test]
    fn constraint_not_retryable_but_skippable() {
        let err = sqlite_err(rusqlite::ErrorCode::ConstraintViolation);
        assert!(!err.is_retryable());
        assert!(err.is_constraint());
        assert!(!err.is_fatal());
    }

    #[test]
    fn corruption_is_fatal() {
        let err = sqlite_err(rusqlite::ErrorCode::DatabaseCorrupt);
        assert!(err.is_fatal());
        assert!(!err.is_retryable());
    }

    #[test]
    fn io_storage_full_not_retryable() {
        let err = StageError::Io(std::io::Error::new(ErrorKind::StorageFull, "disk full"));
        assert!(!err.is_retryable());
    }

    #[test]
    fn io_other_retryable() {
        let err = StageError::Io(std::io::Error::new(ErrorKind::Interrupted, "interrupted"));
        assert!(err.is_retryable());
    }

    #[test]
    fn listing_error_not_retryable() {
        let err = StageError::from(glob::Pattern::new("works[").unwrap_err());
        assert!(!err.is_retryable());
        assert!(!err.is_fatal());
        assert!(format!("{err}").starts_with("shard listing:"));
    }

    #[test]
    fn decode_error_display() {
        let err = DecodeError {
            shard: PathBuf::from("part_0001.gz"),
            line: 42,
            message: "bad json".to_string(),
        };
        assert_eq!(format!("{err}"), "part_0001.gz:42: bad json");
    }
}
