//! File walking functionality for directory traversal

use super::file_info::FileCandidate;
use super::language::Language;
use crate::fs::{DirEntry, FileSystem};
use crate::glob_utils::{PatternSet, is_test_path};
use crate::paths::relative_path;
use ignore::Match;
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Per-directory ignore files, in increasing precedence
const IGNORE_FILES: &[&str] = &[".gitignore", ".ignore"];

pub struct FileWalker {
    pub(crate) fs: Arc<dyn FileSystem>,
    pub(crate) root: PathBuf,
    pub(crate) max_file_size: u64,
    pub(crate) include_patterns: PatternSet,
    pub(crate) exclude_patterns: PatternSet,
    pub(crate) languages: Vec<String>,
    pub(crate) include_tests: bool,
    pub(crate) include_docs: bool,
    pub(crate) respect_ignore_files: bool,
}

impl FileWalker {
    pub fn new(fs: Arc<dyn FileSystem>, root: impl AsRef<Path>, max_file_size: u64) -> Self {
        Self {
            fs,
            root: root.as_ref().to_path_buf(),
            max_file_size,
            include_patterns: PatternSet::new::<&str>(&[]),
            exclude_patterns: PatternSet::new::<&str>(&[]),
            languages: vec![],
            include_tests: false,
            include_docs: false,
            respect_ignore_files: true,
        }
    }

    pub fn with_patterns(
        mut self,
        include_patterns: &[String],
        exclude_patterns: &[String],
    ) -> Self {
        self.include_patterns = PatternSet::new(include_patterns);
        self.exclude_patterns = PatternSet::new(exclude_patterns);
        self
    }

    /// Restrict candidates to these languages (names or extensions). Empty means all.
    pub fn with_languages(mut self, languages: Vec<String>) -> Self {
        self.languages = languages;
        self
    }

    pub fn with_tests(mut self, include_tests: bool) -> Self {
        self.include_tests = include_tests;
        self
    }

    pub fn with_docs(mut self, include_docs: bool) -> Self {
        self.include_docs = include_docs;
        self
    }

    /// Honour `.gitignore`, `.ignore` and `.git/info/exclude` (on by default)
    pub fn with_ignore_files(mut self, respect: bool) -> Self {
        self.respect_ignore_files = respect;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Start a fresh lazy walk from the root. Calling again restarts the enumeration.
    pub fn walk(&self) -> Walk<'_> {
        Walk {
            walker: self,
            dirs: vec![(self.root.clone(), IgnoreChain::default())],
            files: VecDeque::new(),
        }
    }

    /// Apply every filter to one file path, returning a candidate if it survives.
    ///
    /// Filters run in order: ignore files along the path, exclusion patterns,
    /// include patterns, language, tests/docs, then the size cutoff (the only
    /// one that needs a `stat`).
    pub fn admit(&self, path: &Path) -> Option<FileCandidate> {
        if self.is_ignored(path) {
            tracing::trace!("Ignored by ignore file: {:?}", path);
            return None;
        }
        self.filter(path)
    }

    /// Every filter except ignore files, which the walk applies per directory
    fn filter(&self, path: &Path) -> Option<FileCandidate> {
        let relative = relative_path(&self.root, path);

        if self.exclude_patterns.matches(&relative) {
            tracing::trace!("Excluded by pattern: {}", relative);
            return None;
        }
        if !self.include_patterns.is_empty() && !self.include_patterns.matches(&relative) {
            return None;
        }

        let language = Language::from_path(path);
        if !self.languages.is_empty() {
            let wanted = language
                .is_some_and(|lang| self.languages.iter().any(|f| lang.matches_filter(f)));
            if !wanted {
                return None;
            }
        }

        if !self.include_tests && is_test_path(&relative) {
            tracing::trace!("Skipping test file: {}", relative);
            return None;
        }
        if !self.include_docs && language.is_some_and(|l| l.is_documentation()) {
            return None;
        }

        let stat = match self.fs.stat(path) {
            Ok(stat) if !stat.is_dir => stat,
            Ok(_) => return None,
            Err(e) => {
                tracing::debug!("Skipping unreadable file {:?}: {}", path, e);
                return None;
            }
        };
        if stat.size > self.max_file_size {
            tracing::debug!("Skipping large file: {:?} ({} bytes)", path, stat.size);
            return None;
        }

        Some(FileCandidate {
            path: path.to_path_buf(),
            relative_path: relative,
            language,
            size: stat.size,
            modified: stat.modified,
        })
    }

    fn is_excluded_dir(&self, path: &Path) -> bool {
        let relative = relative_path(&self.root, path);
        self.exclude_patterns.matches(&relative)
    }

    /// Check `path` and each of its ancestor directories below the root
    /// against the ignore files found on the way down.
    fn is_ignored(&self, path: &Path) -> bool {
        if !self.respect_ignore_files {
            return false;
        }
        let Ok(relative) = path.strip_prefix(&self.root) else {
            return false;
        };
        let components: Vec<_> = relative.components().collect();
        let mut dir = self.root.clone();
        let mut chain = IgnoreChain::default().child(self.ignore_matcher(&dir));
        for (i, component) in components.iter().enumerate() {
            let next = dir.join(component);
            let is_dir = i + 1 < components.len();
            if chain.is_ignored(&next, is_dir) {
                return true;
            }
            if is_dir {
                chain = chain.child(self.ignore_matcher(&next));
                dir = next;
            }
        }
        false
    }

    /// Build the matcher for the ignore files of one directory, if it has any
    fn ignore_matcher(&self, dir: &Path) -> Option<Arc<Gitignore>> {
        let mut sources: Vec<PathBuf> = Vec::new();
        if dir == self.root {
            sources.push(dir.join(".git").join("info").join("exclude"));
        }
        sources.extend(IGNORE_FILES.iter().map(|name| dir.join(name)));

        let mut builder = GitignoreBuilder::new(dir);
        let mut found = false;
        for source in sources {
            let Ok(bytes) = self.fs.read_file(&source) else {
                continue;
            };
            found = true;
            for line in String::from_utf8_lossy(&bytes).lines() {
                if let Err(e) = builder.add_line(Some(source.clone()), line) {
                    tracing::debug!("Skipping ignore pattern in {:?}: {}", source, e);
                }
            }
        }
        if !found {
            return None;
        }
        match builder.build() {
            Ok(matcher) if !matcher.is_empty() => Some(Arc::new(matcher)),
            Ok(_) => None,
            Err(e) => {
                tracing::debug!("Invalid ignore rules in {:?}: {}", dir, e);
                None
            }
        }
    }
}

/// Ignore matchers of a directory and its ancestors, innermost last
#[derive(Clone, Default)]
struct IgnoreChain(Vec<Arc<Gitignore>>);

impl IgnoreChain {
    fn child(&self, matcher: Option<Arc<Gitignore>>) -> Self {
        let mut chain = self.clone();
        chain.0.extend(matcher);
        chain
    }

    /// The innermost matcher with an opinion decides
    fn is_ignored(&self, path: &Path, is_dir: bool) -> bool {
        for matcher in self.0.iter().rev() {
            match matcher.matched(path, is_dir) {
                Match::Ignore(_) => return true,
                Match::Whitelist(_) => return false,
                Match::None => {}
            }
        }
        false
    }
}

/// Lazy, finite enumeration of candidate files.
///
/// Directories are expanded one at a time from an explicit stack; entries are
/// visited in sorted order so two walks over the same tree agree. Symlinked
/// directories are not followed.
pub struct Walk<'a> {
    walker: &'a FileWalker,
    dirs: Vec<(PathBuf, IgnoreChain)>,
    files: VecDeque<DirEntry>,
}

impl Walk<'_> {
    fn expand(&mut self, dir: &Path, parent: &IgnoreChain) {
        let mut entries = match self.walker.fs.list_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::debug!("Skipping unreadable directory {:?}: {}", dir, e);
                return;
            }
        };
        entries.sort_by(|a, b| a.path.cmp(&b.path));

        let chain = if self.walker.respect_ignore_files {
            parent.child(self.walker.ignore_matcher(dir))
        } else {
            parent.clone()
        };

        let mut subdirs = Vec::new();
        for entry in entries {
            if chain.is_ignored(&entry.path, entry.is_dir) {
                tracing::trace!("Ignored by ignore file: {:?}", entry.path);
            } else if entry.is_dir && entry.is_symlink {
                tracing::trace!("Not following symlinked directory {:?}", entry.path);
            } else if entry.is_dir {
                if self.walker.is_excluded_dir(&entry.path) {
                    tracing::trace!("Pruning excluded directory {:?}", entry.path);
                } else {
                    subdirs.push((entry.path, chain.clone()));
                }
            } else {
                self.files.push_back(entry);
            }
        }
        // Reverse so the stack pops subdirectories in sorted order
        self.dirs.extend(subdirs.into_iter().rev());
    }
}

impl Iterator for Walk<'_> {
    type Item = FileCandidate;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(entry) = self.files.pop_front() {
                if let Some(candidate) = self.walker.filter(&entry.path) {
                    return Some(candidate);
                }
                continue;
            }
            let (dir, chain) = self.dirs.pop()?;
            self.expand(&dir, &chain);
        }
    }
}

#[cfg(test)]
mod tests;
