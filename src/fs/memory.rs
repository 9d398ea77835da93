//! In-memory [`FileSystem`] used by tests and embedders without a disk workspace

use super::{DirEntry, FileStat, FileSystem};
use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};
use std::time::{Duration, SystemTime};

#[derive(Debug, Clone)]
struct MemoryFile {
    content: Vec<u8>,
    modified: SystemTime,
}

/// Files keyed by absolute path. Directories exist implicitly as ancestors of files.
#[derive(Debug, Default)]
pub struct MemoryFileSystem {
    files: RwLock<BTreeMap<PathBuf, MemoryFile>>,
    denied: RwLock<BTreeSet<PathBuf>>,
    clock: AtomicU64,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next logical mtime; every write moves the clock forward by one second
    fn tick(&self) -> SystemTime {
        let secs = self.clock.fetch_add(1, Ordering::Relaxed) + 1;
        SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000 + secs)
    }

    /// Create or overwrite a file
    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        let modified = self.tick();
        self.files
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                path.as_ref().to_path_buf(),
                MemoryFile {
                    content: content.into(),
                    modified,
                },
            );
    }

    /// Bump the modification time of an existing file
    pub fn touch(&self, path: impl AsRef<Path>) -> bool {
        let modified = self.tick();
        let mut files = self.files.write().unwrap_or_else(PoisonError::into_inner);
        match files.get_mut(path.as_ref()) {
            Some(file) => {
                file.modified = modified;
                true
            }
            None => false,
        }
    }

    pub fn remove(&self, path: impl AsRef<Path>) -> bool {
        self.files
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(path.as_ref())
            .is_some()
    }

    /// Make every operation on `path` (and anything below it) fail with `PermissionDenied`
    pub fn deny(&self, path: impl AsRef<Path>) {
        self.denied
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.as_ref().to_path_buf());
    }

    pub fn len(&self) -> usize {
        self.files
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_access(&self, path: &Path) -> io::Result<()> {
        let denied = self.denied.read().unwrap_or_else(PoisonError::into_inner);
        if denied.iter().any(|d| path.starts_with(d)) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("permission denied: {}", path.display()),
            ));
        }
        Ok(())
    }

    fn not_found(path: &Path) -> io::Error {
        io::Error::new(
            io::ErrorKind::NotFound,
            format!("no such file or directory: {}", path.display()),
        )
    }
}

impl FileSystem for MemoryFileSystem {
    fn read_file(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.check_access(path)?;
        let files = self.files.read().unwrap_or_else(PoisonError::into_inner);
        files
            .get(path)
            .map(|f| f.content.clone())
            .ok_or_else(|| Self::not_found(path))
    }

    fn stat(&self, path: &Path) -> io::Result<FileStat> {
        self.check_access(path)?;
        let files = self.files.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(file) = files.get(path) {
            return Ok(FileStat {
                size: file.content.len() as u64,
                modified: file.modified,
                is_dir: false,
            });
        }

        // A directory exists if some file lives below it; its mtime is the newest child
        let newest = files
            .iter()
            .filter(|(p, _)| p.starts_with(path) && p.as_path() != path)
            .map(|(_, f)| f.modified)
            .max();
        match newest {
            Some(modified) => Ok(FileStat {
                size: 0,
                modified,
                is_dir: true,
            }),
            None => Err(Self::not_found(path)),
        }
    }

    fn list_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        self.check_access(path)?;
        let files = self.files.read().unwrap_or_else(PoisonError::into_inner);

        let mut children: BTreeMap<PathBuf, bool> = BTreeMap::new();
        for file_path in files.keys() {
            let Ok(rest) = file_path.strip_prefix(path) else {
                continue;
            };
            let mut components = rest.components();
            let Some(first) = components.next() else {
                continue;
            };
            let is_dir = components.next().is_some();
            let child = path.join(first.as_os_str());
            let entry = children.entry(child).or_insert(is_dir);
            *entry |= is_dir;
        }

        if children.is_empty() {
            if files.contains_key(path) {
                return Err(io::Error::new(
                    io::ErrorKind::Other,
                    format!("not a directory: {}", path.display()),
                ));
            }
            return Err(Self::not_found(path));
        }

        Ok(children
            .into_iter()
            .map(|(path, is_dir)| DirEntry {
                path,
                is_dir,
                is_symlink: false,
            })
            .collect())
    }
}
