//! Unified error types for nimbus.
//!
//! A cache miss is not represented here: store lookups return `Ok(None)`
//! and the strategy executors treat that as normal control flow.

use tokio_rusqlite::rusqlite;

/// Unified error types for the nimbus worker.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., empty URL).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// The network fetch could not complete (connection refused, DNS,
    /// timeout). Executors treat every variant of this uniformly as
    /// "network unavailable".
    #[error("NETWORK_FAILURE: {0}")]
    NetworkFailure(String),

    /// Response body exceeded the configured size limit.
    #[error("FETCH_TOO_LARGE: {0}")]
    FetchTooLarge(String),

    /// One or more precache manifest entries failed during install.
    ///
    /// Fatal to that install attempt: the in-progress store is discarded
    /// and the host is expected to retry installation from scratch.
    #[error("INSTALL_INCOMPLETE: {} manifest entries failed: [{}]", failed.len(), failed.join(", "))]
    InstallIncomplete { failed: Vec<String> },

    /// Store database operation failed.
    #[error("STORE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("STORE_ERROR: migration failed: {0}")]
    MigrationFailed(String),

    /// Invalid URL.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),

    /// Request cannot be answered from the cache (non-GET method or
    /// non-http scheme). Such requests are routed to bypass; this variant
    /// only surfaces when a caller asks the store to persist one anyway.
    #[error("UNSUPPORTED_REQUEST: {0}")]
    UnsupportedRequest(String),

    /// Lifecycle triggers arrived out of order (activate before a
    /// successful install).
    #[error("LIFECYCLE_ERROR: {0}")]
    Lifecycle(String),
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}
