//! File system abstraction consumed by the walker and the engine
//!
//! The engine never touches `std::fs` directly. Everything goes through a
//! [`FileSystem`] so tests can run against [`MemoryFileSystem`].

mod memory;

pub use memory::MemoryFileSystem;

use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Size and modification time of a path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
    pub size: u64,
    pub modified: SystemTime,
    pub is_dir: bool,
}

/// One entry of a directory listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub path: PathBuf,
    /// Whether the entry resolves to a directory, following symlinks
    pub is_dir: bool,
    /// Whether the entry itself is a symbolic link
    pub is_symlink: bool,
}

impl DirEntry {
    /// Final path component as a string
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}

/// Minimal file system contract the engine depends on.
///
/// Implementations must be usable from several worker threads at once.
pub trait FileSystem: Send + Sync {
    /// Read the whole file
    fn read_file(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Size, mtime and kind of a path
    fn stat(&self, path: &Path) -> io::Result<FileStat>;

    /// Immediate children of a directory
    fn list_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>>;

    /// Whether the path exists at all
    fn exists(&self, path: &Path) -> bool {
        self.stat(path).is_ok()
    }

    /// Whether the path exists and is a regular file
    fn is_file(&self, path: &Path) -> bool {
        self.stat(path).is_ok_and(|s| !s.is_dir)
    }
}

/// [`FileSystem`] backed by `std::fs`
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileSystem;

impl FileSystem for LocalFileSystem {
    fn read_file(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    fn stat(&self, path: &Path) -> io::Result<FileStat> {
        let metadata = std::fs::metadata(path)?;
        Ok(FileStat {
            size: metadata.len(),
            modified: metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH),
            is_dir: metadata.is_dir(),
        })
    }

    fn list_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(path)? {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    tracing::debug!("Skipping unreadable entry in {:?}: {}", path, e);
                    continue;
                }
            };
            // file_type() does not follow symlinks; fall back to metadata for those
            let (is_dir, is_symlink) = match entry.file_type() {
                Ok(t) if t.is_symlink() => (entry.path().is_dir(), true),
                Ok(t) => (t.is_dir(), false),
                Err(_) => continue,
            };
            entries.push(DirEntry {
                path: entry.path(),
                is_dir,
                is_symlink,
            });
        }
        Ok(entries)
    }
}
