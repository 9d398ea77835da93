//! Glob pattern matching utilities for path filtering

use globset::{Glob, GlobSet, GlobSetBuilder};
use std::sync::LazyLock;

/// Patterns that mark a file as a test file
const TEST_PATTERNS: &[&str] = &[
    "*.test.*",
    "*.spec.*",
    "*_test.*",
    "test_*.py",
    "*Test.java",
    "*Tests.java",
    "*Test.cs",
    "*Tests.cs",
    "test",
    "tests",
    "__tests__",
    "spec",
];

static TEST_FILES: LazyLock<PatternSet> = LazyLock::new(|| PatternSet::new(TEST_PATTERNS));

/// A compiled set of exclusion or inclusion patterns.
///
/// Three pattern shapes are understood:
/// - plain names (`node_modules`) match any path component exactly
/// - globs without a slash (`*.min.js`) match any single component
/// - globs with a slash (`src/**/generated/*.ts`) match the relative path or one of its suffixes
#[derive(Debug, Clone)]
pub struct PatternSet {
    names: Vec<String>,
    component_globs: GlobSet,
    path_globs: GlobSet,
    substrings: Vec<String>,
    len: usize,
}

impl PatternSet {
    /// Compile patterns. A pattern that fails to compile falls back to substring matching.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Self {
        let mut names = Vec::new();
        let mut substrings = Vec::new();
        let mut component_builder = GlobSetBuilder::new();
        let mut path_builder = GlobSetBuilder::new();

        for pattern in patterns {
            let pattern = pattern.as_ref().trim();
            if pattern.is_empty() {
                continue;
            }
            if !has_glob_meta(pattern) && !pattern.contains('/') {
                names.push(pattern.to_string());
                continue;
            }
            match Glob::new(pattern) {
                Ok(glob) if pattern.contains('/') => {
                    path_builder.add(glob);
                }
                Ok(glob) => {
                    component_builder.add(glob);
                }
                Err(e) => {
                    tracing::warn!(
                        "Invalid glob pattern '{}', falling back to substring match: {}",
                        pattern,
                        e
                    );
                    substrings.push(pattern.to_string());
                }
            }
        }

        let len = patterns.len();
        Self {
            names,
            component_globs: build_or_empty(component_builder),
            path_globs: build_or_empty(path_builder),
            substrings,
            len,
        }
    }

    /// True when no patterns were supplied
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Check a workspace-relative path (forward slashes) against the set
    pub fn matches(&self, relative_path: &str) -> bool {
        let path = relative_path.trim_start_matches('/');

        if self.substrings.iter().any(|s| path.contains(s.as_str())) {
            return true;
        }

        let components: Vec<&str> = path.split('/').filter(|c| !c.is_empty()).collect();
        if components
            .iter()
            .any(|c| self.names.iter().any(|n| n == c) || self.component_globs.is_match(c))
        {
            return true;
        }

        if self.path_globs.is_empty() {
            return false;
        }
        // For patterns like "lib/**", also try matching against path suffixes
        (0..components.len()).any(|i| self.path_globs.is_match(components[i..].join("/")))
    }
}

fn has_glob_meta(pattern: &str) -> bool {
    pattern.contains(['*', '?', '[', '{'])
}

fn build_or_empty(builder: GlobSetBuilder) -> GlobSet {
    builder.build().unwrap_or_else(|e| {
        tracing::warn!("Failed to build glob set: {}", e);
        GlobSet::empty()
    })
}

/// Check whether a workspace-relative path looks like a test file
pub fn is_test_path(relative_path: &str) -> bool {
    TEST_FILES.matches(relative_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_names_match_components() {
        let set = PatternSet::new(&["node_modules", "target"]);

        assert!(set.matches("node_modules/react/index.js"));
        assert!(set.matches("crates/core/target/debug/build.rs"));
        assert!(!set.matches("src/targeting.rs"));
    }

    #[test]
    fn test_component_glob() {
        let set = PatternSet::new(&["*.min.js"]);

        assert!(set.matches("public/vendor/jquery.min.js"));
        assert!(!set.matches("public/app.js"));
    }

    #[test]
    fn test_matches_directory_glob() {
        let set = PatternSet::new(&["lib/**"]);

        assert!(set.matches("/project/lib/utils.ts"));
        assert!(set.matches("lib/nested/file.rs"));
        assert!(!set.matches("/project/src/main.rs"));
    }

    #[test]
    fn test_matches_complex_glob() {
        let set = PatternSet::new(&["src/components/**/*.ts"]);

        assert!(set.matches("src/components/Button.ts"));
        assert!(set.matches("app/src/components/forms/Input.ts"));
        assert!(!set.matches("lib/utils.ts"));
    }

    #[test]
    fn test_empty_patterns() {
        let set = PatternSet::new::<&str>(&[]);
        assert!(set.is_empty());
        assert!(!set.matches("any/path.rs"));
    }

    #[test]
    fn test_invalid_pattern_fallback() {
        let set = PatternSet::new(&["[invalid"]);

        // Should fall back to substring matching
        assert!(set.matches("path/[invalid/file.rs"));
        assert!(!set.matches("path/valid/file.rs"));
    }

    #[test]
    fn test_is_test_path() {
        assert!(is_test_path("src/auth/login.test.ts"));
        assert!(is_test_path("src/auth/login.spec.js"));
        assert!(is_test_path("pkg/server_test.go"));
        assert!(is_test_path("app/test_models.py"));
        assert!(is_test_path("src/test/java/UserServiceTest.java"));
        assert!(is_test_path("tests/integration.rs"));
        assert!(is_test_path("web/__tests__/App.tsx"));

        assert!(!is_test_path("src/auth/login.ts"));
        assert!(!is_test_path("src/contest.rs"));
        assert!(!is_test_path("src/testing_utils.py"));
    }
}
