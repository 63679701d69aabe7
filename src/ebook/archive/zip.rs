use crate::ebook::archive::errors::{ArchiveError, ArchiveResult};
use crate::ebook::archive::{self, Archive, ArchiveAccess};
use async_trait::async_trait;
use std::fmt::{Debug, Formatter};
use std::fs::File;
use std::io::{self, BufReader, Read, Seek};
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use zip::ZipArchive as Zip;
use zip::result::ZipError;

/// An [`Archive`] over a zipped `.epub` file.
///
/// Entries are decompressed from a single shared reader,
/// so only one read may be in flight at a time ([`ArchiveAccess::Serial`]).
/// Reads run on tokio's blocking thread pool.
pub struct ZipArchive<R> {
    zip: Arc<Mutex<Zip<R>>>,
    path: Option<PathBuf>,
}

impl ZipArchive<BufReader<File>> {
    /// Opens the zip file at the given [`Path`].
    ///
    /// # Errors
    /// [`ArchiveError::UnreadableArchive`] when the file is missing or not a zip file.
    pub fn open(path: impl AsRef<Path>) -> ArchiveResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|error| ArchiveError::UnreadableArchive {
            source: error,
            path: Some(path.to_path_buf()),
        })?;

        Self::with_path(BufReader::new(file), Some(path))
    }
}

impl<R: Read + Seek + Send + 'static> ZipArchive<R> {
    /// Creates a zip archive from any implementation of [`Read`] + [`Seek`],
    /// such as a [`Cursor`](std::io::Cursor) over bytes.
    ///
    /// # Errors
    /// [`ArchiveError::UnreadableArchive`] when the content is not a zip file.
    pub fn new(reader: R) -> ArchiveResult<Self> {
        Self::with_path(reader, None)
    }

    /// `reader` (and optional `path` for a more descriptive error message).
    fn with_path(reader: R, path: Option<&Path>) -> ArchiveResult<Self> {
        Zip::new(reader)
            .map(|zip| Self {
                zip: Arc::new(Mutex::new(zip)),
                path: path.map(Path::to_path_buf),
            })
            .map_err(|error| ArchiveError::UnreadableArchive {
                source: io::Error::from(error),
                path: path.map(Path::to_path_buf),
            })
    }

    /// Runs `handle` against the entry at `path` on the blocking thread pool.
    ///
    /// `handle` receives the decompressing entry reader and the uncompressed entry size.
    async fn with_entry<T: Send + 'static>(
        &self,
        path: &str,
        handle: impl FnOnce(&mut dyn Read, u64) -> io::Result<T> + Send + 'static,
    ) -> ArchiveResult<T> {
        let zip = Arc::clone(&self.zip);
        let archive_path = self.path.clone();
        let key = archive::entry_key(path).to_owned();

        tokio::task::spawn_blocking(move || {
            let mut zip = acquire_archive_lock(&zip, archive_path)?;
            let mut entry = zip.by_name(&key).map_err(|error| match error {
                ZipError::FileNotFound => ArchiveError::NotFound { path: key.clone() },
                error => ArchiveError::cannot_read(&key, io::Error::from(error)),
            })?;
            let size = entry.size();

            handle(&mut entry, size).map_err(|error| ArchiveError::cannot_read(&key, error))
        })
        .await
        .map_err(|error| ArchiveError::cannot_read(path, io::Error::other(error)))?
    }
}

#[async_trait]
impl<R: Read + Seek + Send + 'static> Archive for ZipArchive<R> {
    fn access(&self) -> ArchiveAccess {
        ArchiveAccess::Serial
    }

    async fn length(&self, path: &str) -> ArchiveResult<Option<u64>> {
        self.with_entry(path, |_, size| Ok(Some(size))).await
    }

    async fn read(&self, path: &str) -> ArchiveResult<Vec<u8>> {
        self.with_entry(path, |entry, size| {
            let mut buf = Vec::with_capacity(size as usize);
            entry.read_to_end(&mut buf).map(|_| buf)
        })
        .await
    }

    async fn read_range(&self, path: &str, range: Range<u64>) -> ArchiveResult<Vec<u8>> {
        self.with_entry(path, move |entry, size| {
            let end = range.end.min(size);
            let start = range.start.min(end);

            // Deflated entries are not seekable; skip ahead by decompressing.
            io::copy(&mut (&mut *entry).take(start), &mut io::sink())?;

            let mut buf = Vec::with_capacity((end - start) as usize);
            entry.take(end - start).read_to_end(&mut buf).map(|_| buf)
        })
        .await
    }
}

impl<R> Debug for ZipArchive<R> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZipArchive")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

fn acquire_archive_lock<T>(
    lock: &Mutex<T>,
    path: Option<PathBuf>,
) -> ArchiveResult<MutexGuard<'_, T>> {
    lock.lock().map_err(|_| ArchiveError::UnreadableArchive {
        source: io::Error::other("Poisoned ZipArchive"),
        path,
    })
}
