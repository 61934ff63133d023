//! Error types for foldertoc.
//!
//! Library crates use [`FolderTocError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all foldertoc operations.
#[derive(Debug, thiserror::Error)]
pub enum FolderTocError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// The README does not contain the marker that opens the managed region.
    #[error("config error: marker {marker:?} not found in {path:?}")]
    MissingMarker { path: PathBuf, marker: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Config file or document parsing error.
    #[error("parse error: {message}")]
    Parse { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, FolderTocError>;

impl FolderTocError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
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

    /// Report a README that lacks the marker.
    pub fn missing_marker(path: impl Into<PathBuf>, marker: impl Into<String>) -> Self {
        Self::MissingMarker {
            path: path.into(),
            marker: marker.into(),
        }
    }
}
