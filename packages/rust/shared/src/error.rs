//! Error types for bookdesk.
//!
//! Library crates use [`BookdeskError`] via `thiserror`.
//! The server binary wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all bookdesk operations.
#[derive(Debug, thiserror::Error)]
pub enum BookdeskError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network, timeout, or HTTP status failure while fetching a fragment.
    #[error("fetch error for {url}: {message}")]
    Fetch { url: String, message: String },

    /// Fewer fragments than configured sources reached the persister.
    /// An artifact is never written from an incomplete fetch pass.
    #[error("incomplete assembly: expected {expected} fragments, got {got}")]
    Incomplete { expected: usize, got: usize },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Completion-model API error (request, transport, or response shape).
    #[error("completion error: {0}")]
    Completion(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, BookdeskError>;

impl BookdeskError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a fetch error for a specific source URL.
    pub fn fetch(url: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Fetch {
            url: url.into(),
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
        let err = BookdeskError::config("missing sources");
        assert_eq!(err.to_string(), "config error: missing sources");

        let err = BookdeskError::fetch("https://example.com/1", "HTTP 503");
        assert!(err.to_string().contains("https://example.com/1"));
        assert!(err.to_string().contains("HTTP 503"));
    }

    #[test]
    fn incomplete_reports_counts() {
        let err = BookdeskError::Incomplete {
            expected: 8,
            got: 3,
        };
        assert!(err.to_string().contains("expected 8"));
        assert!(err.to_string().contains("got 3"));
    }
}
