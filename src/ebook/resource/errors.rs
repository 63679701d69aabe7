use std::error::Error;
use std::fmt::Display;
use std::ops::Range;

/// Alias for `Result<T, ResourceError>`.
pub type ResourceResult<T> = Result<T, ResourceError>;

/// The decoding transform that failed, see [`ResourceError::DecodingFailed`].
#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq)]
pub enum DecodingStage {
    /// Decryption (or deobfuscation) of raw entry bytes.
    Decryption,
    /// Decompression of decrypted bytes.
    Decompression,
}

impl Display for DecodingStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Decryption => "decryption",
            Self::Decompression => "decompression",
        })
    }
}

/// Possible errors when accessing a single [`Resource`](super::Resource).
///
/// Errors are scoped to the call that produced them;
/// the publication and other in-flight reads are unaffected.
#[non_exhaustive]
#[derive(thiserror::Error, Debug)]
pub enum ResourceError {
    /// The href does not resolve to any entry of the archive.
    #[error("[ResourceNotFound - `{0}`]: No entry exists for the resource")]
    ResourceNotFound(String),

    /// The requested range starts after its end or beyond the resource length.
    #[error("[RangeNotSatisfiable - `{href}`]: Range `{range:?}` is not satisfiable (length: {length:?})")]
    RangeNotSatisfiable {
        href: String,
        range: Range<u64>,
        /// The resource length, when known.
        length: Option<u64>,
    },

    /// The archive cannot tell the length without consuming the entire entry,
    /// such as a live stream.
    #[error("[LengthUnavailable - `{0}`]: Length is unknowable without consuming the entry")]
    LengthUnavailable(String),

    /// A decoding transform rejected the content; partial output is discarded.
    #[error("[DecodingFailed - `{href}`]: {stage} failed: {source}")]
    DecodingFailed {
        href: String,
        stage: DecodingStage,
        source: Box<dyn Error + Send + Sync + 'static>,
    },

    /// Any other archive failure, typically I/O.
    #[error("[Unavailable - `{href}`]: {source}")]
    Unavailable {
        href: String,
        source: Box<dyn Error + Send + Sync + 'static>,
    },
}

impl ResourceError {
    pub(crate) fn decoding(
        href: &str,
        stage: DecodingStage,
        source: impl Into<Box<dyn Error + Send + Sync + 'static>>,
    ) -> Self {
        Self::DecodingFailed {
            href: href.to_owned(),
            stage,
            source: source.into(),
        }
    }

    /// Returns `true` if the resource does not exist within the archive.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ResourceNotFound(_))
    }
}
