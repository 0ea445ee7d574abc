// isosplice/src/error.rs
//! Error taxonomy for image patching.
//!
//! Every variant is terminal for the run. The binary maps each kind to a
//! distinct exit code through [`Error::exit_code`].

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result type for patch operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(windows)]
const NAME_TOO_LONG_OS_CODES: &[i32] = &[206];
#[cfg(target_os = "linux")]
const NAME_TOO_LONG_OS_CODES: &[i32] = &[36];
#[cfg(all(unix, not(target_os = "linux")))]
const NAME_TOO_LONG_OS_CODES: &[i32] = &[63];
#[cfg(not(any(unix, windows)))]
const NAME_TOO_LONG_OS_CODES: &[i32] = &[];

#[derive(Debug, Error)]
pub enum Error {
    #[error("bad arguments: {0}")]
    BadArguments(String),

    #[error("no such input file '{}'", path.display())]
    InputNotFound { path: PathBuf },

    #[error("file path '{}' exceeds system-defined length", path.display())]
    PathTooLong { path: PathBuf },

    #[error("current user lacks sufficient permissions for '{}'", path.display())]
    PermissionDenied { path: PathBuf },

    #[error("unsupported image format: {reason}")]
    UnsupportedFormat { reason: String },

    #[error("an error occurred while accessing '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("file '{path}' not found in image")]
    TargetNotFound { path: String },
}

impl Error {
    /// Classifies an I/O failure on `path` into the taxonomy.
    pub fn from_io(path: &Path, source: io::Error) -> Self {
        let path = path.to_path_buf();
        if let Some(code) = source.raw_os_error() {
            if NAME_TOO_LONG_OS_CODES.contains(&code) {
                return Error::PathTooLong { path };
            }
        }
        match source.kind() {
            io::ErrorKind::NotFound => Error::InputNotFound { path },
            io::ErrorKind::PermissionDenied => Error::PermissionDenied { path },
            io::ErrorKind::Unsupported | io::ErrorKind::InvalidInput => Error::UnsupportedFormat {
                reason: format!("'{}' is not in a recognizable format: {}", path.display(), source),
            },
            _ => Error::Io { path, source },
        }
    }

    pub(crate) fn unsupported(reason: impl Into<String>) -> Self {
        Error::UnsupportedFormat {
            reason: reason.into(),
        }
    }

    /// Process exit code reported for this error kind.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::BadArguments(_) => 160,
            Error::InputNotFound { .. } => 2,
            Error::TargetNotFound { .. } => 3,
            Error::PermissionDenied { .. } => 5,
            Error::UnsupportedFormat { .. } => 50,
            Error::PathTooLong { .. } => 111,
            Error::Io { .. } => 110,
        }
    }
}
