//! Error types for tag-extractor-core.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that can occur when working with configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to deserialize configuration.
    #[error("invalid configuration: {0}")]
    Deserialize(#[from] Box<figment::Error>),

    /// Configuration file not found after searching all locations.
    #[error("no configuration file found")]
    NotFound,
}

/// Result type alias using [`ConfigError`].
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors that can occur while loading, counting, or saving tags.
#[derive(Error, Debug)]
pub enum TagError {
    /// A source could not be read or a destination could not be written.
    #[error("I/O failure on {path}: {source}")]
    Io {
        /// The file being read or written.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A stream with no associated path failed to read.
    #[error("read failed: {0}")]
    Read(#[from] std::io::Error),

    /// A source exceeds the configured input limit.
    #[error("input too large: {path} is {size} bytes (limit: {limit} bytes)")]
    InputTooLarge {
        /// The oversized file.
        path: Utf8PathBuf,
        /// Size of the file in bytes.
        size: u64,
        /// Configured limit in bytes.
        limit: u64,
    },

    /// Save was requested before any frequency map was built.
    #[error("nothing to save: no document has been processed")]
    NothingToSave,

    /// A persisted tags line is not of the form `word: count`.
    #[error("malformed tag entry on line {line}: {content:?}")]
    MalformedEntry {
        /// One-based line number.
        line: usize,
        /// The offending line.
        content: String,
    },
}

impl TagError {
    /// Wrap an I/O error with the path it occurred on.
    pub fn io(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias using [`TagError`].
pub type TagResult<T> = Result<T, TagError>;
