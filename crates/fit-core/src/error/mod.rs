//! Error types and result aliases for fit operations.
//!
//! Provides a unified error type that covers every failure a store command can
//! hit, grouped into kinds that map onto process exit codes.

use thiserror::Error;

/// Unified error type for all fit operations
#[derive(Error, Debug)]
pub enum FitError {
    // Validation errors
    #[error("Invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("File '{path}' is already being tracked")]
    AlreadyTracked { path: String },

    #[error("File '{path}' is not being tracked")]
    NotTracked { path: String },

    #[error("Store '{path}' already exists")]
    StoreExists { path: String },

    #[error("Snapshot index {index} is out of range: the store holds {count} snapshot(s)")]
    SnapshotOutOfRange { index: usize, count: usize },

    #[error("The store has no saved snapshots")]
    NoSnapshots,

    #[error("Saving would grow the blob to {size} bytes, above the limit of {limit} bytes")]
    BlobLimitExceeded { size: u64, limit: u64 },

    // Format errors
    #[error("Malformed store file: {message}")]
    Format { message: String },

    #[error("Blob range {offset}+{length} exceeds blob size {size}")]
    BlobOutOfBounds { offset: u64, length: u64, size: u64 },

    // Config errors
    #[error("Failed to parse fit.toml: {message} at line {line}, column {column}")]
    TomlParse {
        message: String,
        line: usize,
        column: usize,
    },

    #[error("Configuration field '{field}' is invalid: {reason}")]
    ConfigValidation { field: String, reason: String },

    // IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for fit operations
pub type FitResult<T> = Result<T, FitError>;

/// Coarse classification of a [`FitError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad argument or a request the current store state refuses
    Validation,
    /// Filesystem failure
    Io,
    /// Store file could not be decoded
    Format,
    /// Configuration could not be loaded
    Config,
}

impl FitError {
    /// Create an IO error from std::io::Error
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a format error
    pub fn format(message: impl Into<String>) -> Self {
        Self::Format {
            message: message.into(),
        }
    }

    /// Create an invalid path error
    pub fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            FitError::InvalidPath { .. }
            | FitError::AlreadyTracked { .. }
            | FitError::NotTracked { .. }
            | FitError::StoreExists { .. }
            | FitError::SnapshotOutOfRange { .. }
            | FitError::NoSnapshots
            | FitError::BlobLimitExceeded { .. } => ErrorKind::Validation,
            FitError::Format { .. } | FitError::BlobOutOfBounds { .. } => ErrorKind::Format,
            FitError::TomlParse { .. } | FitError::ConfigValidation { .. } => ErrorKind::Config,
            FitError::Io { .. } => ErrorKind::Io,
        }
    }

    /// Process exit code for this error
    pub fn exit_code(&self) -> u8 {
        match self.kind() {
            ErrorKind::Io => 1,
            ErrorKind::Validation => 2,
            ErrorKind::Format => 3,
            ErrorKind::Config => 4,
        }
    }

    /// Check if the failed operation may be retried after the user fixes something
    pub fn is_recoverable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Validation | ErrorKind::Io)
    }

    /// Get a user-friendly suggestion for fixing this error
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            FitError::AlreadyTracked { .. } => {
                Some("Only one instance of a file can be tracked at a time")
            },
            FitError::NotTracked { .. } => Some("Run 'fit tracklist <store>' to see tracked files"),
            FitError::StoreExists { .. } => Some("Pick another store name or remove the old file"),
            FitError::SnapshotOutOfRange { .. } => {
                Some("Run 'fit snaps <store>' to list snapshots, or omit the index to load the latest")
            },
            FitError::NoSnapshots => Some("Run 'fit save <store>' to record a snapshot first"),
            FitError::BlobLimitExceeded { .. } => {
                Some("Raise store.max_blob_bytes in fit.toml or set FIT_MAX_BLOB_BYTES")
            },
            FitError::InvalidPath { .. } => {
                Some("Tracked paths must be relative to the directory holding the store")
            },
            FitError::Format { .. } | FitError::BlobOutOfBounds { .. } => {
                Some("The store file is corrupt or was written by an incompatible version")
            },
            _ => None,
        }
    }
}
