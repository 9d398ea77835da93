//! Related-file discovery over import edges.
//!
//! The [`DependencyResolver`] walks outward from a start file, following each
//! file's `imports` through an [`ImportResolver`], breadth first and up to a
//! hop limit. Files that import the start file can be found with
//! [`DependencyResolver::import_of`].
//!
//! ## Usage
//!
//! ```ignore
//! let resolver = DependencyResolver::new(Arc::new(WorkspaceResolver::new(fs, root)));
//! let related = resolver.traverse(&start, 2, 10, |path| engine.load(path));
//! ```

mod resolve;

pub use resolve::{ImportResolver, WorkspaceResolver};

use crate::types::FileAnalysis;
use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// How a related file is connected to the start file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeDirection {
    /// Reached by following imports outward
    Imports,
    /// Imports the start file directly
    ImportedBy,
}

/// A file reachable from the start file
#[derive(Debug, Clone)]
pub struct RelatedFile {
    pub analysis: Arc<FileAnalysis>,
    /// Edges between the start file and this one
    pub hops: usize,
    /// Specifier of the edge that reached this file
    pub via: String,
    pub direction: EdgeDirection,
}

impl RelatedFile {
    /// Relevance of a related file: closer files score higher
    pub fn score(&self) -> f64 {
        match (self.direction, self.hops) {
            (EdgeDirection::Imports, 0 | 1) => 100.0,
            (EdgeDirection::ImportedBy, _) => 80.0,
            (EdgeDirection::Imports, 2) => 60.0,
            (EdgeDirection::Imports, _) => 20.0,
        }
    }
}

/// Follows import edges between workspace files
#[derive(Clone)]
pub struct DependencyResolver {
    resolver: Arc<dyn ImportResolver>,
}

impl DependencyResolver {
    pub fn new(resolver: Arc<dyn ImportResolver>) -> Self {
        Self { resolver }
    }

    /// Workspace files one import of `file` resolves to, in import order
    pub fn dependencies(&self, file: &FileAnalysis) -> Vec<(String, PathBuf)> {
        let from = Path::new(&file.path);
        file.imports
            .iter()
            .flat_map(|spec| {
                self.resolver
                    .resolve(from, spec, file.language)
                    .into_iter()
                    .map(move |target| (spec.clone(), target))
            })
            .collect()
    }

    /// Specifier in `file` that resolves to `target`, if any
    pub fn import_of(&self, file: &FileAnalysis, target: &Path) -> Option<String> {
        let from = Path::new(&file.path);
        if from == target {
            return None;
        }
        file.imports
            .iter()
            .find(|spec| {
                self.resolver
                    .resolve(from, spec, file.language)
                    .iter()
                    .any(|p| p == target)
            })
            .cloned()
    }

    /// Breadth-first traversal from `start`.
    ///
    /// `load` provides the analysis of a path and returns `None` for files
    /// that cannot be read; those are skipped. Each path is visited once, the
    /// start file is never part of the result and at most `max_files` files
    /// are returned, closest first.
    pub fn traverse<F>(
        &self,
        start: &FileAnalysis,
        max_hops: usize,
        max_files: usize,
        mut load: F,
    ) -> Vec<RelatedFile>
    where
        F: FnMut(&Path) -> Option<Arc<FileAnalysis>>,
    {
        let mut related = Vec::new();
        let mut visited: HashSet<PathBuf> = HashSet::new();
        visited.insert(PathBuf::from(&start.path));

        let mut queue: VecDeque<(Arc<FileAnalysis>, usize)> = VecDeque::new();
        queue.push_back((Arc::new(start.clone()), 0));

        while let Some((file, depth)) = queue.pop_front() {
            if depth >= max_hops {
                continue;
            }
            for (spec, target) in self.dependencies(&file) {
                if related.len() >= max_files {
                    return related;
                }
                if !visited.insert(target.clone()) {
                    continue;
                }
                let Some(analysis) = load(&target) else {
                    tracing::debug!("Skipping unreadable related file {:?}", target);
                    continue;
                };
                related.push(RelatedFile {
                    analysis: analysis.clone(),
                    hops: depth + 1,
                    via: spec,
                    direction: EdgeDirection::Imports,
                });
                queue.push_back((analysis, depth + 1));
            }
        }

        related
    }
}
