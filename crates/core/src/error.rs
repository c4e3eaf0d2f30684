use std::{io, path::PathBuf, sync::Arc};
use thiserror::Error;

/// Errors generated by the atomic writer.
///
/// The outcome of a single write may be delivered to many
/// callers so the error is cheap to clone and shares the
/// underlying storage error.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// Error generated when the target path does not
    /// have a file name component.
    #[error("path '{}' does not have a file name", .0.display())]
    InvalidPath(PathBuf),

    /// Error generated writing the temporary file.
    #[error("failed to write temporary file '{}': {source}", path.display())]
    WriteTemp {
        /// Temporary file path.
        path: PathBuf,
        /// Storage error.
        #[source]
        source: Arc<io::Error>,
    },

    /// Error generated flushing a file or directory to disc.
    #[error("failed to sync '{}': {source}", path.display())]
    Sync {
        /// File or directory path.
        path: PathBuf,
        /// Storage error.
        #[source]
        source: Arc<io::Error>,
    },

    /// Error generated renaming the temporary file over the target.
    #[error(
        "failed to rename '{}' to '{}': {source}",
        from.display(),
        to.display()
    )]
    Rename {
        /// Temporary file path.
        from: PathBuf,
        /// Target file path.
        to: PathBuf,
        /// Storage error.
        #[source]
        source: Arc<io::Error>,
    },

    /// Error generated when the task running a write ended
    /// without reporting an outcome.
    #[error("write task terminated before reporting an outcome")]
    Terminated,
}

impl Error {
    /// Kind of the underlying storage error, if any.
    pub fn io_kind(&self) -> Option<io::ErrorKind> {
        match self {
            Self::WriteTemp { source, .. }
            | Self::Sync { source, .. }
            | Self::Rename { source, .. } => Some(source.kind()),
            Self::InvalidPath(_) | Self::Terminated => None,
        }
    }
}
