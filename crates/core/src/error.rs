//! Unified error types for hotpack.

use tokio_rusqlite::rusqlite;

/// Unified error types shared by the codec, the store, and the controller.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed or truncated binary bundle, or a length mismatch.
    #[error("invalid bundle format: {0}")]
    Format(String),

    /// A bundle entry exceeds the wire format's size limits.
    #[error("bundle encode failed: {0}")]
    Encode(String),

    /// Ingestion payload is not valid JSON or not a flat string mapping.
    #[error("invalid ingest payload: {0}")]
    IngestParse(String),

    /// Persistent store open/read/write failure.
    #[error("store error: {0}")]
    Store(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("store error: migration failed: {0}")]
    MigrationFailed(String),

    /// A store key could not be normalized to an absolute URL.
    #[error("invalid url: {0}")]
    InvalidUrl(String),
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Store(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Store(tokio_rusqlite::Error::Close(c)),
            _ => Error::Store(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Store(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Store(tokio_rusqlite::Error::Error(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Format("declared length mismatch".to_string());
        assert!(err.to_string().contains("invalid bundle format"));
        assert!(err.to_string().contains("declared length mismatch"));
    }

    #[test]
    fn test_encode_error_display() {
        let err = Error::Encode("entry name too long".to_string());
        assert!(err.to_string().contains("encode failed"));
    }
}
