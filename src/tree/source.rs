//! Filesystem handles the tree builder reads from.
//!
//! Paths handed to a [`SourceFs`] are always relative to its root and use `/`
//! as the separator.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

/// Result of a `stat` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceMetadata {
    pub is_dir: bool,
    pub modified: DateTime<Utc>,
}

/// Read-only view of a project's files
pub trait SourceFs: Send + Sync {
    fn stat(&self, path: &str) -> io::Result<SourceMetadata>;
    fn read(&self, path: &str) -> io::Result<Vec<u8>>;
}

/// Filesystem rooted at a directory on disk
#[derive(Debug, Clone)]
pub struct DiskFs {
    root: PathBuf,
}

impl DiskFs {
    pub fn new(root: impl AsRef<Path>) -> io::Result<Self> {
        let root = dunce::canonicalize(root.as_ref())?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let mut full = self.root.clone();
        for segment in path.split('/').filter(|s| !s.is_empty() && *s != ".") {
            full.push(segment);
        }
        full
    }
}

impl SourceFs for DiskFs {
    fn stat(&self, path: &str) -> io::Result<SourceMetadata> {
        let metadata = std::fs::metadata(self.resolve(path))?;
        let modified = metadata
            .modified()
            .map(DateTime::<Utc>::from)
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
        Ok(SourceMetadata {
            is_dir: metadata.is_dir(),
            modified,
        })
    }

    fn read(&self, path: &str) -> io::Result<Vec<u8>> {
        std::fs::read(self.resolve(path))
    }
}

#[derive(Debug, Clone)]
struct MemoryFile {
    data: Option<Vec<u8>>,
    modified: DateTime<Utc>,
}

/// In-memory filesystem. Directories are implied by file path prefixes.
///
/// Files registered with [`MemoryFs::insert_unreadable`] stat successfully but
/// fail on read.
#[derive(Debug, Default)]
pub struct MemoryFs {
    files: RwLock<BTreeMap<String, MemoryFile>>,
}

impl MemoryFs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_files<I, P, C>(files: I) -> Self
    where
        I: IntoIterator<Item = (P, C)>,
        P: Into<String>,
        C: AsRef<[u8]>,
    {
        let fs = Self::new();
        for (path, content) in files {
            fs.insert(path, content);
        }
        fs
    }

    /// Insert or replace a file
    pub fn insert(&self, path: impl Into<String>, content: impl AsRef<[u8]>) {
        self.files.write().insert(
            normalize(&path.into()),
            MemoryFile {
                data: Some(content.as_ref().to_vec()),
                modified: Utc::now(),
            },
        );
    }

    pub fn insert_unreadable(&self, path: impl Into<String>) {
        self.files.write().insert(
            normalize(&path.into()),
            MemoryFile {
                data: None,
                modified: Utc::now(),
            },
        );
    }

    pub fn remove(&self, path: &str) -> bool {
        self.files.write().remove(&normalize(path)).is_some()
    }

    fn is_dir(&self, path: &str) -> bool {
        if path.is_empty() {
            return true;
        }
        let prefix = format!("{}/", path);
        self.files
            .read()
            .range(prefix.clone()..)
            .next()
            .map(|(k, _)| k.starts_with(&prefix))
            .unwrap_or(false)
    }
}

fn normalize(path: &str) -> String {
    path.split('/')
        .filter(|s| !s.is_empty() && *s != ".")
        .collect::<Vec<_>>()
        .join("/")
}

impl SourceFs for MemoryFs {
    fn stat(&self, path: &str) -> io::Result<SourceMetadata> {
        let path = normalize(path);
        if let Some(file) = self.files.read().get(&path) {
            return Ok(SourceMetadata {
                is_dir: false,
                modified: file.modified,
            });
        }
        if self.is_dir(&path) {
            return Ok(SourceMetadata {
                is_dir: true,
                modified: DateTime::<Utc>::UNIX_EPOCH,
            });
        }
        Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("{} does not exist", path),
        ))
    }

    fn read(&self, path: &str) -> io::Result<Vec<u8>> {
        let path = normalize(path);
        match self.files.read().get(&path) {
            Some(MemoryFile { data: Some(data), .. }) => Ok(data.clone()),
            Some(MemoryFile { data: None, .. }) => Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("{} is not readable", path),
            )),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} does not exist", path),
            )),
        }
    }
}
