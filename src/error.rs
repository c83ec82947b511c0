//! Error types for CMod model conversion.

use thiserror::Error;

/// Result type alias using CmodError.
pub type Result<T> = std::result::Result<T, CmodError>;

/// Main error type for reading and writing CMod files.
#[derive(Error, Debug)]
pub enum CmodError {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Bad magic tag, unsupported version or a malformed section.
    #[error("Format error: {0}")]
    Format(String),

    /// The stream ended in the middle of a record.
    #[error("Truncated data while reading {0}")]
    Truncated(String),

    /// The export/import request cannot be satisfied by the given input.
    #[error("{0}")]
    Precondition(String),

    /// A bone or vertex-group name that is not part of the fixed skeleton.
    #[error("Unknown bone name: {0}")]
    UnknownBone(String),

    /// Failed to parse or produce JSON data.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CmodError {
    /// Whether the error aborts the whole call.
    ///
    /// Precondition failures are reported back to the caller, and unknown
    /// bone names only cause the offending influence to be skipped.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, CmodError::Precondition(_) | CmodError::UnknownBone(_))
    }

    /// Map an I/O error raised while reading `what`, turning an early end of
    /// stream into [`CmodError::Truncated`].
    pub(crate) fn from_read(err: std::io::Error, what: &str) -> Self {
        if err.kind() == std::io::ErrorKind::UnexpectedEof {
            CmodError::Truncated(what.to_string())
        } else {
            CmodError::Io(err)
        }
    }
}
