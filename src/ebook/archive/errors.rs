use std::io;
use std::path::PathBuf;

/// Alias for `Result<T, ArchiveError>`.
pub type ArchiveResult<T> = Result<T, ArchiveError>;

/// Possible errors from an [`Archive`](super::Archive) backing a package.
#[non_exhaustive]
#[derive(thiserror::Error, Debug)]
pub enum ArchiveError {
    /// The requested entry does not exist within the archive.
    #[error("[NotFound - `{path}`]: Entry does not exist within the archive")]
    NotFound {
        /// The archive path responsible for triggering the error.
        path: String,
    },

    /// The entry exists, although is unable to be read, typically I/O.
    #[error("[CannotRead - `{path}`]: {source}")]
    CannotRead {
        /// The root cause of the error.
        source: io::Error,
        /// The archive path responsible for triggering the error.
        path: String,
    },

    /// The archive itself is unreadable due to not existing,
    /// unsupported format, or malformed state.
    ///
    /// This error is *generally* returned **before** an archive is instantiated.
    #[error("[UnreadableArchive - `{path:?}`]: {source}")]
    UnreadableArchive {
        /// The root cause of this error.
        source: io::Error,
        /// The path responsible for triggering the error, if applicable.
        path: Option<PathBuf>,
    },
}

impl ArchiveError {
    pub(crate) fn cannot_read(path: &str, source: io::Error) -> Self {
        Self::CannotRead {
            source,
            path: path.to_owned(),
        }
    }

    /// Returns `true` if the error indicates a missing entry.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
