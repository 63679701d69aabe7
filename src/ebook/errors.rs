//! Error-related types for opening an [`Epub`](crate::Epub).
//!
//! Errors fall into two families:
//! - **Structural** errors ([`EbookError`], [`EpubError`]) abort opening a package.
//! - **Access** errors ([`ResourceError`]) are scoped to a single resource call.

pub use crate::ebook::archive::errors::{ArchiveError, ArchiveResult};
pub use crate::ebook::epub::errors::{EpubError, EpubResult};
pub use crate::ebook::resource::errors::{DecodingStage, ResourceError, ResourceResult};
use std::error::Error;

/// Alias for `Result<T, EbookError>`.
pub type EbookResult<T> = Result<T, EbookError>;

/// Unified error type returned when opening an [`Epub`](crate::Epub).
#[non_exhaustive]
#[derive(thiserror::Error, Debug)]
pub enum EbookError {
    /// File access within the package archive has failed.
    #[error(transparent)]
    Archive(#[from] ArchiveError),

    /// Essential files are malformed or reference each other inconsistently.
    #[error(transparent)]
    Format(#[from] FormatError),
}

impl From<EpubError> for EbookError {
    fn from(error: EpubError) -> Self {
        Self::Format(FormatError::Epub(error))
    }
}

/// Possible format errors for an [`Epub`](crate::Epub).
#[non_exhaustive]
#[derive(thiserror::Error, Debug)]
pub enum FormatError {
    /// File content unexpectedly causes an internal parser error.
    ///
    /// This may originate from malformed content within a file, such as improper XML.
    #[error(transparent)]
    Unparsable(#[from] Box<dyn Error + Send + Sync + 'static>),

    /// Structural errors specific to an [`Epub`](crate::Epub).
    #[error(transparent)]
    Epub(#[from] EpubError),
}
