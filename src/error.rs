//! Error types for the noughts crate

use thiserror::Error;

/// Main error type for the noughts crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("board must have exactly {expected} cells, got {got}")]
    InvalidBoardLength { expected: usize, got: usize },

    #[error("invalid symbol '{symbol}' at position {position} (expected '-', 'X' or 'O')")]
    InvalidSymbol { symbol: String, position: usize },

    #[error("invalid board code {code}: {reason}")]
    InvalidCode { code: u32, reason: String },

    #[error("invalid action {action} for state {state}: {reason}")]
    InvalidAction {
        state: String,
        action: String,
        reason: String,
    },

    #[error("no legal actions available: the board is full")]
    NoLegalActions,

    #[error("validation failed: {message}")]
    Validation { message: String },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("playdata queue unavailable: {message}")]
    QueueUnavailable { message: String },

    #[error("unsupported snapshot version {found} (expected {expected})")]
    UnsupportedSnapshotVersion { found: u32, expected: u32 },

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("failed to {operation}: {message}")]
    SerializationContext { operation: String, message: String },
}

impl Error {
    /// Whether the error belongs to the validation family, i.e. the input
    /// was rejected before reaching the core.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::InvalidBoardLength { .. }
                | Error::InvalidSymbol { .. }
                | Error::InvalidAction { .. }
                | Error::Validation { .. }
        )
    }
}

/// Convenience type alias for Results using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io {
            operation: "IO operation".to_string(),
            source,
        }
    }
}
