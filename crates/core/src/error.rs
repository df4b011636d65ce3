//! Unified error types for waycache.

use tokio_rusqlite::rusqlite;

/// Unified error type shared by the cache store, the request handler, and
/// the lifecycle controller.
///
/// Non-2xx HTTP statuses are deliberately absent: a response that reached us
/// over the network is a value, never an error. Only transport-level failure
/// (the request produced no response at all) appears here.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Network transport failure: DNS, connect, TLS, timeout, body read.
    #[error("transport failure: {0}")]
    Transport(String),

    /// Database operation failed.
    #[error("cache store error: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("cache store error: migration failed: {0}")]
    MigrationFailed(String),

    /// URL could not be parsed or resolved.
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    /// A listed pre-cache resource could not be fetched and stored.
    ///
    /// Raised during install; the generation being populated is discarded.
    #[error("pre-cache of {url} failed: {reason}")]
    Precache { url: String, reason: String },
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
