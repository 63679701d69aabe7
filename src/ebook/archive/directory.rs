use crate::ebook::archive::errors::{ArchiveError, ArchiveResult};
use crate::ebook::archive::{self, Archive, ArchiveAccess};
use async_trait::async_trait;
use std::io::{self, SeekFrom};
use std::ops::Range;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::{AsyncReadExt, AsyncSeekExt};

/// An [`Archive`] over a directory containing the contents of an unzipped package.
///
/// Every read opens its own file handle, so reads may run concurrently
/// ([`ArchiveAccess::Concurrent`]).
#[derive(Debug)]
pub struct DirectoryArchive(PathBuf);

impl DirectoryArchive {
    /// Creates an archive rooted at the given directory.
    ///
    /// # Errors
    /// [`ArchiveError::UnreadableArchive`] when `dir` does not exist or is not a directory.
    pub fn new(dir: impl AsRef<Path>) -> ArchiveResult<Self> {
        let dir = dir.as_ref();

        match dir.canonicalize() {
            Ok(root) if root.is_dir() => Ok(Self(root)),
            Ok(_) => Err(ArchiveError::UnreadableArchive {
                path: Some(dir.to_path_buf()),
                source: io::Error::from(io::ErrorKind::NotADirectory),
            }),
            Err(source) => Err(ArchiveError::UnreadableArchive {
                path: Some(dir.to_path_buf()),
                source,
            }),
        }
    }

    /// The canonical root directory.
    pub fn root(&self) -> &Path {
        &self.0
    }

    async fn get_path(&self, path: &str) -> ArchiveResult<PathBuf> {
        let not_found = || ArchiveError::NotFound {
            path: path.to_owned(),
        };
        let resolved = match fs::canonicalize(self.0.join(archive::entry_key(path))).await {
            Ok(resolved) => resolved,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Err(not_found()),
            Err(error) => return Err(ArchiveError::cannot_read(path, error)),
        };

        // Path traversal mitigation
        if !resolved.starts_with(&self.0) {
            return Err(not_found());
        }
        match fs::metadata(&resolved).await {
            Ok(metadata) if metadata.is_file() => Ok(resolved),
            Ok(_) => Err(not_found()),
            Err(error) => Err(ArchiveError::cannot_read(path, error)),
        }
    }
}

#[async_trait]
impl Archive for DirectoryArchive {
    fn access(&self) -> ArchiveAccess {
        ArchiveAccess::Concurrent
    }

    async fn length(&self, path: &str) -> ArchiveResult<Option<u64>> {
        let file = self.get_path(path).await?;

        fs::metadata(file)
            .await
            .map(|metadata| Some(metadata.len()))
            .map_err(|error| ArchiveError::cannot_read(path, error))
    }

    async fn read(&self, path: &str) -> ArchiveResult<Vec<u8>> {
        let file = self.get_path(path).await?;

        fs::read(file)
            .await
            .map_err(|error| ArchiveError::cannot_read(path, error))
    }

    async fn read_range(&self, path: &str, range: Range<u64>) -> ArchiveResult<Vec<u8>> {
        let file = self.get_path(path).await?;
        let read = async {
            let mut file = File::open(file).await?;
            let mut buf = Vec::new();

            file.seek(SeekFrom::Start(range.start)).await?;
            file.take(range.end.saturating_sub(range.start))
                .read_to_end(&mut buf)
                .await?;
            Ok::<_, io::Error>(buf)
        };

        read.await
            .map_err(|error| ArchiveError::cannot_read(path, error))
    }
}
