//! Error types for mfs_core.

use std::fmt;
use thiserror::Error;

/// Result type alias using mfs_core's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse error category, stable across operation wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    AlreadyExists,
    InvalidParams,
    NotADirectory,
    CorruptNode,
    StoreUnavailable,
    UnsupportedAlgorithm,
    Timeout,
    Conflict,
    Io,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::NotFound => "ERR_NOT_FOUND",
            ErrorKind::AlreadyExists => "ERR_ALREADY_EXISTS",
            ErrorKind::InvalidParams => "ERR_INVALID_PARAMS",
            ErrorKind::NotADirectory => "ERR_NOT_A_DIRECTORY",
            ErrorKind::CorruptNode => "ERR_CORRUPT_NODE",
            ErrorKind::StoreUnavailable => "ERR_STORE_UNAVAILABLE",
            ErrorKind::UnsupportedAlgorithm => "ERR_UNSUPPORTED_ALGORITHM",
            ErrorKind::Timeout => "ERR_TIMEOUT",
            ErrorKind::Conflict => "ERR_CONFLICT",
            ErrorKind::Io => "ERR_IO",
        };
        f.write_str(s)
    }
}

/// Errors that can occur while resolving or mutating the file tree.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error occurred during file operations.
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// A path, link or block does not exist.
    #[error("{what} does not exist")]
    NotFound { what: String },

    /// A directory already has an entry by that name.
    #[error("{what} already exists")]
    AlreadyExists { what: String },

    /// The request is ambiguous or malformed.
    #[error("Invalid parameters: {reason}")]
    InvalidParams { reason: String },

    /// Traversal hit a non-directory with path segments remaining.
    #[error("{path} is not a directory")]
    NotADirectory { path: String },

    /// A block could not be decoded into a node.
    #[error("Corrupt node {id}: {reason}")]
    CorruptNode { id: String, reason: String },

    /// The block or root store failed.
    #[error("Store unavailable: {reason}")]
    StoreUnavailable { reason: String },

    /// Unsupported hash algorithm or id version.
    #[error("Unsupported algorithm: {algorithm}")]
    UnsupportedAlgorithm { algorithm: String },

    /// The operation's deadline expired before it could commit.
    #[error("Operation timed out after {millis}ms")]
    Timeout { millis: u128 },

    /// The root pointer moved between reading and publishing.
    #[error("Root changed concurrently: expected {expected}, found {actual}")]
    Conflict { expected: String, actual: String },

    /// A failure inside a named high-level operation.
    #[error("{op} {path}: {source}")]
    Operation {
        op: &'static str,
        path: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Create a NotFound error.
    pub fn not_found(what: impl Into<String>) -> Self {
        Error::NotFound { what: what.into() }
    }

    /// Create an AlreadyExists error.
    pub fn already_exists(what: impl Into<String>) -> Self {
        Error::AlreadyExists { what: what.into() }
    }

    /// Create an InvalidParams error.
    pub fn invalid_params(reason: impl Into<String>) -> Self {
        Error::InvalidParams {
            reason: reason.into(),
        }
    }

    /// Create a NotADirectory error.
    pub fn not_a_directory(path: impl Into<String>) -> Self {
        Error::NotADirectory { path: path.into() }
    }

    /// Create a CorruptNode error.
    pub fn corrupt_node(id: impl fmt::Display, reason: impl Into<String>) -> Self {
        Error::CorruptNode {
            id: id.to_string(),
            reason: reason.into(),
        }
    }

    /// Create a StoreUnavailable error.
    pub fn store_unavailable(reason: impl Into<String>) -> Self {
        Error::StoreUnavailable {
            reason: reason.into(),
        }
    }

    /// Create an UnsupportedAlgorithm error.
    pub fn unsupported_algorithm(algorithm: impl Into<String>) -> Self {
        Error::UnsupportedAlgorithm {
            algorithm: algorithm.into(),
        }
    }

    /// Create a Conflict error for a root pointer that no longer holds `expected`.
    pub fn conflict(expected: Option<&impl fmt::Display>, actual: Option<&impl fmt::Display>) -> Self {
        let show = |id: Option<String>| id.unwrap_or_else(|| "unset".to_string());
        Error::Conflict {
            expected: show(expected.map(|id| id.to_string())),
            actual: show(actual.map(|id| id.to_string())),
        }
    }

    /// Wrap this error with the failing operation name and path.
    pub fn within(self, op: &'static str, path: impl Into<String>) -> Self {
        Error::Operation {
            op,
            path: path.into(),
            source: Box::new(self),
        }
    }

    /// The category of this error, looking through operation wrappers.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Io { .. } => ErrorKind::Io,
            Error::NotFound { .. } => ErrorKind::NotFound,
            Error::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            Error::InvalidParams { .. } => ErrorKind::InvalidParams,
            Error::NotADirectory { .. } => ErrorKind::NotADirectory,
            Error::CorruptNode { .. } => ErrorKind::CorruptNode,
            Error::StoreUnavailable { .. } => ErrorKind::StoreUnavailable,
            Error::UnsupportedAlgorithm { .. } => ErrorKind::UnsupportedAlgorithm,
            Error::Timeout { .. } => ErrorKind::Timeout,
            Error::Conflict { .. } => ErrorKind::Conflict,
            Error::Operation { source, .. } => source.kind(),
        }
    }
}

// Additional From implementations for external error types

impl From<tempfile::PersistError> for Error {
    fn from(err: tempfile::PersistError) -> Self {
        Error::Io { source: err.error }
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(err: tokio::task::JoinError) -> Self {
        Error::store_unavailable(format!("blocking store task failed: {}", err))
    }
}
