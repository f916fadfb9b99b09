//! Error taxonomy for mirroring passes.

use std::io;
use std::path::{Path, PathBuf};

/// Result alias for the sync core.
pub type Result<T> = std::result::Result<T, SyncError>;

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Setup was handed arguments it cannot work with.
    #[error("Invalid configuration: {message}")]
    Configuration { message: String },

    /// A required root path is missing.
    #[error("Path '{}' provided to the program does not exist.", .path.display())]
    NotFound { path: PathBuf },

    #[error("Permission denied: cannot {operation} '{}'", .path.display())]
    PermissionDenied {
        path: PathBuf,
        operation: &'static str,
    },

    /// Copy or delete of one entry failed; siblings are unaffected.
    #[error("Failed to {operation} '{}': {source}", .path.display())]
    MutationFailed {
        path: PathBuf,
        operation: &'static str,
        #[source]
        source: io::Error,
    },

    /// A directory below the roots could not be enumerated.
    #[error("Failed to list directory '{}': {source}", .path.display())]
    ListFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl SyncError {
    pub fn configuration(message: impl Into<String>) -> Self {
        SyncError::Configuration {
            message: message.into(),
        }
    }

    /// Classify a failed mutation by its I/O error kind.
    pub fn from_io(err: io::Error, operation: &'static str, path: &Path) -> Self {
        match err.kind() {
            io::ErrorKind::PermissionDenied => SyncError::PermissionDenied {
                path: path.to_path_buf(),
                operation,
            },
            _ => SyncError::MutationFailed {
                path: path.to_path_buf(),
                operation,
                source: err,
            },
        }
    }

    /// Classify a failed directory listing by its I/O error kind.
    pub fn from_listing(err: io::Error, path: &Path) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => SyncError::NotFound {
                path: path.to_path_buf(),
            },
            io::ErrorKind::PermissionDenied => SyncError::PermissionDenied {
                path: path.to_path_buf(),
                operation: "list",
            },
            _ => SyncError::ListFailed {
                path: path.to_path_buf(),
                source: err,
            },
        }
    }

    /// The path this error is about, when it names one.
    pub fn path(&self) -> Option<&Path> {
        match self {
            SyncError::Configuration { .. } => None,
            SyncError::NotFound { path }
            | SyncError::PermissionDenied { path, .. }
            | SyncError::MutationFailed { path, .. }
            | SyncError::ListFailed { path, .. } => Some(path),
        }
    }

    /// Whether the error stops the process instead of being logged per entry.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SyncError::Configuration { .. } | SyncError::NotFound { .. }
        )
    }
}
