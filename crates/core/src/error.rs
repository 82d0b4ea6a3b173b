//! Error types for the savepoint persistence engine
//!
//! This module defines the error type shared by the container and codec
//! layers. We use `thiserror` for automatic `Display` and `Error` trait
//! implementations.
//!
//! One outcome is deliberately *not* an error: a medium whose leading magic
//! bytes are not recognized at all. That case is reported as `Ok(None)` by
//! the container open path so callers can fall back to other
//! interpretations of the file.

use std::io;
use thiserror::Error;

/// Result type alias for savepoint operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the savepoint persistence engine
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error from the underlying medium
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Wrong-mode stream usage (programmer error)
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Data corruption detected; the message names the broken invariant
    #[error("Data corruption: {0}")]
    Corruption(String),

    /// Compression library reported a failure
    #[error("Compression error: {0}")]
    Compress(String),

    /// Decompression library reported a failure
    #[error("Decompression error: {0}")]
    Decompress(String),

    /// Recognized a save written by the retired container scheme
    #[error("this save was written by an older version and can no longer be loaded")]
    LegacyFormat,

    /// Type tag with no registered constructor
    #[error("Unknown object type: {0}")]
    UnknownType(String),
}

impl Error {
    /// Create an invalid-operation error
    pub fn invalid_operation(msg: impl Into<String>) -> Self {
        Self::InvalidOperation(msg.into())
    }

    /// Create a corruption error
    pub fn corruption(msg: impl Into<String>) -> Self {
        Self::Corruption(msg.into())
    }

    /// Create a compression error
    pub fn compress(msg: impl Into<String>) -> Self {
        Self::Compress(msg.into())
    }

    /// Create a decompression error
    pub fn decompress(msg: impl Into<String>) -> Self {
        Self::Decompress(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_io() {
        let err = Error::Io(io::Error::new(io::ErrorKind::NotFound, "file not found"));
        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn test_error_display_corruption() {
        let err = Error::corruption("back-reference 9 exceeds object table size 3");
        let msg = err.to_string();
        assert!(msg.contains("Data corruption"));
        assert!(msg.contains("back-reference 9"));
    }

    #[test]
    fn test_error_display_legacy() {
        let err = Error::LegacyFormat;
        let msg = err.to_string();
        assert!(msg.contains("older version"));
        assert!(msg.contains("no longer"));
    }

    #[test]
    fn test_error_display_unknown_type() {
        let err = Error::UnknownType("zorcher".to_string());
        assert!(err.to_string().contains("zorcher"));
    }

    #[test]
    fn test_error_constructors() {
        assert!(matches!(
            Error::invalid_operation("write on a reader"),
            Error::InvalidOperation(_)
        ));
        assert!(matches!(Error::compress("zstd failed"), Error::Compress(_)));
        assert!(matches!(
            Error::decompress("zstd failed"),
            Error::Decompress(_)
        ));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
