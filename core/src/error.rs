//! Error types for walkgraph-core.

use std::fmt;
use thiserror::Error;

/// Coarse classification of a [`GraphError`], stable for matching and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Vertex (or edge endpoint) is not a member of the graph
    NotFound,
    /// Key already present where uniqueness is required
    DuplicateKey,
    /// Construction or call argument outside its valid range
    InvalidArgument,
    /// Operation not offered by this container or graph state
    Unsupported,
    /// Positional access past the end of a sequence or heap
    IndexOutOfRange,
    /// Underlying stream failure during import/export
    Io,
    /// Configuration document could not be parsed
    Config,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::DuplicateKey => "duplicate_key",
            ErrorKind::InvalidArgument => "invalid_argument",
            ErrorKind::Unsupported => "unsupported",
            ErrorKind::IndexOutOfRange => "index_out_of_range",
            ErrorKind::Io => "io",
            ErrorKind::Config => "config",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Engine error type.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("duplicate key: {0}")]
    DuplicateKey(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("unsupported operation: {0}")]
    Unsupported(String),

    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

impl GraphError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GraphError::NotFound(_) => ErrorKind::NotFound,
            GraphError::DuplicateKey(_) => ErrorKind::DuplicateKey,
            GraphError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            GraphError::Unsupported(_) => ErrorKind::Unsupported,
            GraphError::IndexOutOfRange { .. } => ErrorKind::IndexOutOfRange,
            GraphError::Io(_) => ErrorKind::Io,
            GraphError::Config(_) => ErrorKind::Config,
        }
    }

    // Convenience constructors

    pub fn vertex_not_found(vertex: &impl fmt::Debug) -> Self {
        GraphError::NotFound(format!("vertex {vertex:?}"))
    }

    pub fn duplicate_key(key: &impl fmt::Debug) -> Self {
        GraphError::DuplicateKey(format!("{key:?}"))
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        GraphError::InvalidArgument(message.into())
    }

    pub fn unsupported(message: impl Into<String>) -> Self {
        GraphError::Unsupported(message.into())
    }

    pub fn read_only() -> Self {
        GraphError::Unsupported("graph is read-only".to_string())
    }

    pub fn out_of_range(index: usize, len: usize) -> Self {
        GraphError::IndexOutOfRange { index, len }
    }
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, GraphError>;
