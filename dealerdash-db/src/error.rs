//! Database error type

use dealerdash_core::DashError;

/// Failures while talking to the sales store.
///
/// `Connect` is the connection failure; `Query` and `Decode` are query
/// failures. `NotConnected` means no connection handle is held.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("not connected to the database")]
    NotConnected,

    #[error("failed to connect to the database: {0}")]
    Connect(#[source] sqlx::Error),

    #[error("query failed: {0}")]
    Query(#[from] sqlx::Error),

    #[error("cannot decode column '{column}' of type {type_name}")]
    Decode { column: String, type_name: String },

    #[error("malformed result: {0}")]
    Malformed(#[from] DashError),
}

impl DbError {
    /// True for failures to establish a connection (including never having one).
    pub fn is_connection_failure(&self) -> bool {
        matches!(self, DbError::NotConnected | DbError::Connect(_))
    }
}
