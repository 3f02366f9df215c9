//! Error types for preference parsing, rendering and deployment
//!
//! This module defines the error types used throughout the ffskel library.
//! All public functions return [`Result<T, Error>`] for consistent error handling.

use std::path::PathBuf;

/// Errors that can occur while loading, rendering or deploying preferences
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Lexer error during tokenization
    #[error("Lexer error at line {line}, column {column}: {message}")]
    Lexer {
        line: usize,
        column: usize,
        message: String,
    },

    /// Parser error during parsing
    #[error("Parser error at line {line}, column {column}: {message}")]
    Parser {
        line: usize,
        column: usize,
        message: String,
    },

    /// Value cannot be written as a boolean, integer or string literal
    #[error("Invalid value type for '{key}': {found} values cannot be rendered")]
    InvalidValueType { key: String, found: &'static str },

    /// Destination directory is missing or not writable
    #[error("Destination {} is not writable: {reason}", path.display())]
    DestinationUnwritable { path: PathBuf, reason: String },

    /// Write was interrupted; the previous destination content is intact
    #[error("Partial write to {}: {source}", path.display())]
    PartialWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// I/O error during file operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid glob pattern in query
    #[error("Invalid glob pattern: {0}")]
    InvalidGlobPattern(String),

    /// Unknown deploy policy name
    #[error("Invalid policy '{0}'. Expected 'overwrite' or 'merge'")]
    InvalidPolicy(String),

    /// Deploy plan could not be read or is incomplete
    #[error("Invalid deploy plan {}: {message}", path.display())]
    Plan { path: PathBuf, message: String },

    /// profiles.ini parsing error
    #[error("Failed to parse profiles.ini: {0}")]
    ProfilesIniParse(String),

    /// Skeleton root does not exist or is not a directory
    #[error("Skeleton directory not found: {}", .0.display())]
    SkeletonNotFound(PathBuf),
}

impl Error {
    /// Map an I/O failure on the destination directory to the closest deploy error
    pub(crate) fn unwritable(path: impl Into<PathBuf>, err: &std::io::Error) -> Self {
        Error::DestinationUnwritable {
            path: path.into(),
            reason: err.to_string(),
        }
    }
}

/// Result type alias for convenience
///
/// # Example
///
/// ```rust
/// use ffskel::{Result, PreferenceSet};
///
/// fn count(content: &str) -> Result<usize> {
///     let set = PreferenceSet::parse(content)?;
///     Ok(set.len())
/// }
/// # assert_eq!(count(r#"user_pref("a.b", 1);"#).unwrap(), 1);
/// ```
pub type Result<T> = std::result::Result<T, Error>;
