//! Error types for mjmldocs.
//!
//! Library crates use [`DocsError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all mjmldocs operations.
#[derive(Debug, thiserror::Error)]
pub enum DocsError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error while fetching a source, stylesheet, image or example.
    #[error("network error: {0}")]
    Network(String),

    /// A remote response did not carry the expected payload shape.
    #[error("payload error: {message}")]
    Payload { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (bad locator, empty file name, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, DocsError>;

impl DocsError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a payload error from any displayable message.
    pub fn payload(msg: impl Into<String>) -> Self {
        Self::Payload {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = DocsError::config("missing output dir");
        assert_eq!(err.to_string(), "config error: missing output dir");

        let err = DocsError::payload("no \"value\" field");
        assert!(err.to_string().contains("no \"value\" field"));
    }

    #[test]
    fn io_error_carries_path() {
        let err = DocsError::io(
            "/tmp/documentation/images",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        let msg = err.to_string();
        assert!(msg.contains("documentation/images"));
        assert!(msg.contains("denied"));
    }
}
