//! Byte sources backing a package.
//!
//! An [`Archive`] supplies the raw bytes of named entries, such as
//! `OEBPS/ch1.xhtml`, along with their length. It knows nothing about
//! manifests, encryption or compression declared by the package; those are
//! applied above it by the [`Fetcher`](crate::ebook::resource::Fetcher).
//!
//! # Provided archives
//! - [`ZipArchive`]: A zipped `.epub` file ([`ArchiveAccess::Serial`]).
//! - [`DirectoryArchive`]: An unzipped package directory ([`ArchiveAccess::Concurrent`]).
//! - [`MemoryArchive`]: Entries held in memory ([`ArchiveAccess::Concurrent`]).

mod directory;
pub mod errors;
mod memory;
mod zip;

use crate::ebook::archive::errors::ArchiveResult;
use async_trait::async_trait;
use std::ops::Range;

pub use self::directory::DirectoryArchive;
pub use self::errors::ArchiveError;
pub use self::memory::MemoryArchive;
pub use self::zip::ZipArchive;

/// The concurrency discipline of an [`Archive`].
///
/// The [`Fetcher`](crate::ebook::resource::Fetcher) respects this value:
/// calls into a [`Serial`](ArchiveAccess::Serial) archive are issued one at a time,
/// whereas calls into a [`Concurrent`](ArchiveAccess::Concurrent) archive are not gated.
#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq)]
pub enum ArchiveAccess {
    /// Only one read may be in flight at any moment,
    /// such as a single-stream archive reader.
    Serial,
    /// Independent reads may run concurrently, such as random file access.
    Concurrent,
}

/// A source of raw entry bytes, such as a zip file or a directory.
///
/// Entry paths are container-relative (e.g., `OEBPS/ch1.xhtml`) and percent-decoded.
/// A leading `/`, denoting the container root, is tolerated and ignored.
///
/// Implementations must document their [`ArchiveAccess`] through [`Archive::access`].
/// Retry policy for transient I/O, if any, belongs to implementations.
///
/// # Examples
/// - Reading entries from memory:
/// ```
/// # use bindery::ebook::archive::{Archive, MemoryArchive};
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let archive = MemoryArchive::from_iter([("mimetype", "application/epub+zip")]);
///
/// assert_eq!(Some(20), archive.length("mimetype").await.unwrap());
/// assert_eq!(b"epub".to_vec(), archive.read_range("/mimetype", 12..16).await.unwrap());
/// assert!(archive.read("missing.xhtml").await.unwrap_err().is_not_found());
/// # }
/// ```
#[async_trait]
pub trait Archive: Send + Sync {
    /// The concurrency discipline callers must respect.
    fn access(&self) -> ArchiveAccess;

    /// Returns the byte length of the entry at `path`.
    ///
    /// [`None`] is returned when the entry exists, although its total size is not knowable
    /// without fully consuming it, such as a live stream.
    ///
    /// # Errors
    /// [`ArchiveError::NotFound`] when no entry exists at `path`.
    async fn length(&self, path: &str) -> ArchiveResult<Option<u64>>;

    /// Returns the entire content of the entry at `path`.
    ///
    /// # Errors
    /// [`ArchiveError::NotFound`] when no entry exists at `path`.
    async fn read(&self, path: &str) -> ArchiveResult<Vec<u8>>;

    /// Returns the bytes of the entry at `path` within `range`.
    ///
    /// The range is clamped to the entry length;
    /// a range starting past the end yields no bytes.
    ///
    /// The default implementation reads the entire entry and slices it.
    ///
    /// # Errors
    /// [`ArchiveError::NotFound`] when no entry exists at `path`.
    async fn read_range(&self, path: &str, range: Range<u64>) -> ArchiveResult<Vec<u8>> {
        let bytes = self.read(path).await?;
        Ok(slice_range(bytes, range))
    }
}

/// Archives resolve paths relative to the container root.
///
/// `/EPUB/OEBPS/toc.xhtml` -> `EPUB/OEBPS/toc.xhtml`
fn entry_key(path: &str) -> &str {
    path.strip_prefix('/').unwrap_or(path)
}

/// Keeps only the bytes within `range`, clamped to the length of `bytes`.
pub(crate) fn slice_range(mut bytes: Vec<u8>, range: Range<u64>) -> Vec<u8> {
    let len = bytes.len() as u64;
    let end = range.end.min(len) as usize;
    let start = range.start.min(end as u64) as usize;

    bytes.truncate(end);
    bytes.drain(..start);
    bytes
}
