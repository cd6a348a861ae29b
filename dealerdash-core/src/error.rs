/// Structured error types for dealerdash-core.
///
/// Binary crates (dealerdash-cli) wrap these in `anyhow`; library consumers
/// get structured, composable errors.
use thiserror::Error;

/// Main error type for dealerdash-core operations
#[derive(Error, Debug)]
pub enum DashError {
    /// Configuration could not be resolved
    #[error("Configuration error: {reason}")]
    Config { reason: String },

    /// A reporting period that cannot be queried
    #[error("Invalid period: {reason}")]
    InvalidPeriod { reason: String },

    /// A row did not match the table's column count
    #[error("Row has {found} values but the table has {expected} columns")]
    RowWidth { expected: usize, found: usize },

    /// JSON serialization failed
    #[error("JSON error at {context}: {source}")]
    Json {
        context: String,
        source: serde_json::Error,
    },
}

/// Result type alias for dealerdash-core operations
pub type Result<T> = std::result::Result<T, DashError>;

impl DashError {
    /// Create a config error
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }

    /// Create an invalid period error
    pub fn invalid_period(reason: impl Into<String>) -> Self {
        Self::InvalidPeriod {
            reason: reason.into(),
        }
    }

    /// Create a JSON error with context
    pub fn json(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Json {
            context: context.into(),
            source,
        }
    }
}
