use crate::ebook::archive::errors::{ArchiveError, ArchiveResult};
use crate::ebook::archive::{self, Archive, ArchiveAccess};
use async_trait::async_trait;
use std::collections::HashMap;
use std::ops::Range;

/// An [`Archive`] holding every entry in memory.
///
/// Entries are immutable once the archive is shared, so reads may run
/// concurrently ([`ArchiveAccess::Concurrent`]).
#[derive(Clone, Debug, Default)]
pub struct MemoryArchive {
    entries: HashMap<String, Vec<u8>>,
}

impl MemoryArchive {
    /// Creates an empty archive.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an entry, returning the previous content stored at `path`, if any.
    pub fn insert(&mut self, path: impl Into<String>, content: impl Into<Vec<u8>>) -> Option<Vec<u8>> {
        let path = path.into();
        let key = archive::entry_key(&path).to_owned();

        self.entries.insert(key, content.into())
    }

    /// Returns `true` if an entry exists at `path`.
    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(archive::entry_key(path))
    }

    /// The number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn get(&self, path: &str) -> ArchiveResult<&[u8]> {
        self.entries
            .get(archive::entry_key(path))
            .map(Vec::as_slice)
            .ok_or_else(|| ArchiveError::NotFound {
                path: path.to_owned(),
            })
    }
}

impl<P: Into<String>, C: AsRef<[u8]>> FromIterator<(P, C)> for MemoryArchive {
    fn from_iter<T: IntoIterator<Item = (P, C)>>(iter: T) -> Self {
        let mut archive = Self::new();

        for (path, content) in iter {
            archive.insert(path, content.as_ref());
        }
        archive
    }
}

#[async_trait]
impl Archive for MemoryArchive {
    fn access(&self) -> ArchiveAccess {
        ArchiveAccess::Concurrent
    }

    async fn length(&self, path: &str) -> ArchiveResult<Option<u64>> {
        self.get(path).map(|content| Some(content.len() as u64))
    }

    async fn read(&self, path: &str) -> ArchiveResult<Vec<u8>> {
        self.get(path).map(<[u8]>::to_vec)
    }

    async fn read_range(&self, path: &str, range: Range<u64>) -> ArchiveResult<Vec<u8>> {
        let content = self.get(path)?;
        let end = range.end.min(content.len() as u64) as usize;
        let start = range.start.min(end as u64) as usize;

        Ok(content[start..end].to_vec())
    }
}
