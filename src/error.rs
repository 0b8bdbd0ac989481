//! Error types for trueno-live operations.

use std::io;
use thiserror::Error;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in trueno-live operations.
///
/// Only construction-time precondition violations and I/O surface here.
/// Per-frame rendering and streaming paths clamp or skip instead of failing.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error (file operations, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// PNG encoding error.
    #[error("PNG encoding error: {0}")]
    PngEncoding(#[from] png::EncodingError),

    /// CSV reader error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Invalid dimensions for a surface or chart.
    #[error("Invalid dimensions: {width}x{height}")]
    InvalidDimensions {
        /// Width value.
        width: f64,
        /// Height value.
        height: f64,
    },

    /// Scale domain error (degenerate or non-finite domain).
    #[error("Scale domain error: {0}")]
    ScaleDomain(String),

    /// Viewport bounds violate `min < max` or the padding range.
    #[error("Invalid viewport: {0}")]
    InvalidViewport(String),

    /// A bounded buffer was configured with zero capacity.
    #[error("Invalid buffer capacity: {0}")]
    InvalidCapacity(usize),

    /// Empty data provided where non-empty is required.
    #[error("Empty data provided")]
    EmptyData,

    /// Configuration parsing error with line number.
    #[error("configuration error at line {line}: {message}")]
    ConfigParse {
        /// Line number where the error occurred (1-indexed).
        line: usize,
        /// Error message describing the issue.
        message: String,
    },

    /// Configuration file not found.
    #[error("configuration file not found: {0}")]
    ConfigNotFound(String),

    /// Invalid configuration value.
    #[error("invalid configuration value for '{key}': {message}")]
    ConfigInvalid {
        /// The configuration key with invalid value.
        key: String,
        /// Error message describing why the value is invalid.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidDimensions {
            width: 0.0,
            height: 100.0,
        };
        assert!(err.to_string().contains("Invalid dimensions"));
    }

    #[test]
    fn test_config_parse_includes_line() {
        let err = Error::ConfigParse {
            line: 42,
            message: "invalid value".to_string(),
        };
        let display = err.to_string();
        assert!(display.contains("42"));
        assert!(display.contains("invalid value"));
    }

    #[test]
    fn test_capacity_error_includes_value() {
        let err = Error::InvalidCapacity(0);
        assert!(err.to_string().contains('0'));
    }

    #[test]
    fn test_io_error_converts() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "missing.csv");
        let err: Error = io_err.into();
        assert!(err.to_string().contains("missing.csv"));
    }
}
