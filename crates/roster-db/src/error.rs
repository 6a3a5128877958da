//! Error types for the data layer.
//!
//! [`DbError`] is a small closed taxonomy. Every [`sqlx::Error`] is
//! classified into one of its variants so callers can tell a missing row
//! from a violated constraint from an unreachable database.

use sqlx::error::ErrorKind;

/// Errors that can occur in the data layer.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// The requested row does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A unique, foreign-key, not-null or check constraint rejected a write.
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    /// The database could not be reached (I/O, TLS, pool exhausted or closed).
    #[error("connectivity failure: {0}")]
    Connectivity(String),

    /// A stored value could not be turned into a domain value.
    #[error("decode error: {0}")]
    Decode(String),

    /// Any other query failure.
    #[error("query failed: {0}")]
    Query(#[source] sqlx::Error),

    /// A configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Self::NotFound(String::from("row not found")),
            sqlx::Error::Database(ref db) if !matches!(db.kind(), ErrorKind::Other) => {
                Self::ConstraintViolation(db.message().to_owned())
            }
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => Self::Connectivity(err.to_string()),
            sqlx::Error::Configuration(_) => Self::Config(err.to_string()),
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
                Self::Decode(err.to_string())
            }
            other => Self::Query(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_not_found_is_not_found() {
        assert!(matches!(
            DbError::from(sqlx::Error::RowNotFound),
            DbError::NotFound(_)
        ));
    }

    #[test]
    fn pool_and_io_failures_are_connectivity() {
        assert!(matches!(
            DbError::from(sqlx::Error::PoolTimedOut),
            DbError::Connectivity(_)
        ));
        assert!(matches!(
            DbError::from(sqlx::Error::PoolClosed),
            DbError::Connectivity(_)
        ));
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        assert!(matches!(
            DbError::from(sqlx::Error::Io(io)),
            DbError::Connectivity(_)
        ));
    }

    #[test]
    fn protocol_errors_fall_through_to_query() {
        let err = DbError::from(sqlx::Error::Protocol(String::from("bad frame")));
        assert!(matches!(err, DbError::Query(_)));
        assert!(err.to_string().contains("bad frame"));
    }
}
