use crate::types::FileAnalysis;
use lru::LruCache;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::SystemTime;

#[derive(Debug, Clone)]
struct Entry {
    modified: SystemTime,
    size: u64,
    analysis: Arc<FileAnalysis>,
}

/// Bounded in-memory cache of unscored file analyses.
///
/// Entries are keyed by path and only served while the file's mtime and size
/// still match what was recorded. Sub-second edits that keep both unchanged
/// are not detected.
#[derive(Debug)]
pub struct AnalysisCache {
    entries: Option<Mutex<LruCache<PathBuf, Entry>>>,
    capacity: usize,
    hits: AtomicU64,
    misses: AtomicU64,
}

/// Statistics for the analysis cache
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Current number of entries
    pub entries: usize,
    pub capacity: usize,
}

impl CacheStats {
    /// Calculate hit rate
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

impl AnalysisCache {
    /// Cache holding at most `capacity` analyses; 0 disables caching
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: NonZeroUsize::new(capacity).map(|cap| Mutex::new(LruCache::new(cap))),
            capacity,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn disabled() -> Self {
        Self::new(0)
    }

    pub fn is_enabled(&self) -> bool {
        self.entries.is_some()
    }

    /// Cached analysis of `path` if it was recorded for this mtime and size.
    /// A stale entry is dropped.
    pub fn get(&self, path: &Path, modified: SystemTime, size: u64) -> Option<Arc<FileAnalysis>> {
        let entries = self.entries.as_ref()?;
        let mut entries = entries.lock().unwrap_or_else(PoisonError::into_inner);

        let lookup = entries
            .get(path)
            .map(|e| (e.modified == modified && e.size == size, e.analysis.clone()));
        let fresh = match lookup {
            Some((true, analysis)) => Some(analysis),
            Some((false, _)) => {
                tracing::debug!("Cache entry for {:?} is stale", path);
                entries.pop(path);
                None
            }
            None => None,
        };

        match fresh {
            Some(analysis) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(analysis)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Record an analysis. Last writer wins; content for one mtime does not change.
    pub fn insert(
        &self,
        path: PathBuf,
        modified: SystemTime,
        size: u64,
        analysis: Arc<FileAnalysis>,
    ) {
        if let Some(entries) = &self.entries {
            entries
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .put(
                    path,
                    Entry {
                        modified,
                        size,
                        analysis,
                    },
                );
        }
    }

    /// Drop one path. Returns whether it was cached.
    pub fn invalidate(&self, path: &Path) -> bool {
        self.entries.as_ref().is_some_and(|entries| {
            entries
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .pop(path)
                .is_some()
        })
    }

    /// Drop every entry and reset the counters
    pub fn invalidate_all(&self) {
        if let Some(entries) = &self.entries {
            entries.lock().unwrap_or_else(PoisonError::into_inner).clear();
        }
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }

    pub fn len(&self) -> usize {
        self.entries.as_ref().map_or(0, |entries| {
            entries.lock().unwrap_or_else(PoisonError::into_inner).len()
        })
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len(),
            capacity: self.capacity,
        }
    }
}
