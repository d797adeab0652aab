//! Error taxonomy for the bundling pipeline.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Fatal errors surfaced while preparing a site for the downstream compiler.
///
/// Every variant carries the offending path. No retries are performed
/// anywhere in the pipeline; the first error aborts the run. References with
/// empty or external-looking source attributes are not errors at all — they
/// are silently excluded from bundling by policy.
#[derive(Debug, Error)]
pub enum BundleError {
    /// The configured source root is missing, so there is nothing to build.
    #[error("source directory {} does not exist", path.display())]
    MissingSourceRoot {
        /// The configured source root.
        path: PathBuf,
    },

    /// A source file or directory could not be read.
    #[error("failed to read {}", path.display())]
    Read {
        /// The unreadable path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A destination or staging path could not be created or written.
    #[error("failed to write {}", path.display())]
    Write {
        /// The unwritable path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

impl BundleError {
    /// Wrap an I/O error as a read failure for `path`.
    pub fn read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    /// Wrap an I/O error as a write failure for `path`.
    pub fn write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }
}
