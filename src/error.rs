//! Error types for the loading pipeline.
//!
//! `LoadError` is `Clone` because a single in-flight fetch resolves every
//! waiter with the same result, failures included.

use std::fmt;
use thiserror::Error;

/// Errors surfaced by the index, category and orchestration layers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("Index unavailable: {0}")]
    IndexUnavailable(String),

    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("Failed to fetch category {id}: {reason}")]
    CategoryFetchFailed { id: String, reason: String },

    #[error("All data sources exhausted (index: {index}; fallback: {fallback})")]
    AllSourcesExhausted { index: String, fallback: String },
}

impl LoadError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LoadError::IndexUnavailable(_) => ErrorKind::IndexUnavailable,
            LoadError::UnknownCategory(_) => ErrorKind::UnknownCategory,
            LoadError::CategoryFetchFailed { .. } => ErrorKind::CategoryFetchFailed,
            LoadError::AllSourcesExhausted { .. } => ErrorKind::AllSourcesExhausted,
        }
    }
}

/// Transport-level failures for a single resource fetch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Request for {path} returned status {status}")]
    Status { path: String, status: u16 },

    #[error("Request for {path} failed: {reason}")]
    Request { path: String, reason: String },

    #[error("I/O error reading {path}: {reason}")]
    Io { path: String, reason: String },
}

/// Failure fetching or decoding a whole-document resource (index, legacy dataset).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Malformed {path}: {reason}")]
    Decode { path: String, reason: String },

    #[error("Invalid {path}: {reason}")]
    Invalid { path: String, reason: String },
}

/// Failures of the durable key-value area behind the cache.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage backend error: {0}")]
    Backend(String),

    #[error("Storage quota exceeded writing {key}")]
    QuotaExceeded { key: String },

    #[error("Storage is disabled")]
    Disabled,
}

impl From<sled::Error> for StorageError {
    fn from(err: sled::Error) -> Self {
        StorageError::Backend(err.to_string())
    }
}

/// Top-level error for configuration, logging and tooling.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Output error: {0}")]
    Output(String),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}

/// Error kinds reported to the rendering layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    IndexUnavailable,
    UnknownCategory,
    CategoryFetchFailed,
    /// Tags unreadable cache entries in logs; they are read as misses.
    CacheDecodeError,
    AllSourcesExhausted,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::IndexUnavailable => "IndexUnavailable",
            ErrorKind::UnknownCategory => "UnknownCategory",
            ErrorKind::CategoryFetchFailed => "CategoryFetchFailed",
            ErrorKind::CacheDecodeError => "CacheDecodeError",
            ErrorKind::AllSourcesExhausted => "AllSourcesExhausted",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
