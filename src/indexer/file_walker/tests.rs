//! Tests for FileWalker

use super::*;
use crate::fs::{LocalFileSystem, MemoryFileSystem};
use std::fs;
use tempfile::TempDir;

fn memory_workspace() -> Arc<MemoryFileSystem> {
    let fs = Arc::new(MemoryFileSystem::new());
    fs.add_file("/ws/src/UserService.ts", "export class UserService {}");
    fs.add_file("/ws/src/UserService.test.ts", "describe('UserService')");
    fs.add_file("/ws/src/util.py", "def helper(): pass");
    fs.add_file("/ws/node_modules/react/index.js", "module.exports = {}");
    fs.add_file("/ws/docs/guide.md", "# Guide");
    fs.add_file("/ws/Makefile", "all:\n\tcargo build");
    fs
}

fn paths(walker: &FileWalker) -> Vec<String> {
    walker.walk().map(|c| c.relative_path).collect()
}

#[test]
fn test_new() {
    let walker = FileWalker::new(Arc::new(MemoryFileSystem::new()), "/tmp", 1024);
    assert_eq!(walker.root, PathBuf::from("/tmp"));
    assert_eq!(walker.max_file_size, 1024);
    assert!(walker.include_patterns.is_empty());
    assert!(walker.exclude_patterns.is_empty());
    assert!(!walker.include_tests);
    assert!(!walker.include_docs);
}

#[test]
fn test_builder_pattern_chaining() {
    let walker = FileWalker::new(Arc::new(MemoryFileSystem::new()), "/tmp", 1024)
        .with_patterns(&["**/*.rs".to_string()], &["target".to_string()])
        .with_languages(vec!["rust".to_string()])
        .with_tests(true)
        .with_docs(true);
    assert!(!walker.include_patterns.is_empty());
    assert!(!walker.exclude_patterns.is_empty());
    assert_eq!(walker.languages, vec!["rust"]);
    assert!(walker.include_tests);
    assert!(walker.include_docs);
}

#[test]
fn test_walk_nonexistent_directory_yields_nothing() {
    let walker = FileWalker::new(Arc::new(LocalFileSystem), "/nonexistent/path/12345", 1024);
    assert_eq!(walker.walk().count(), 0);
}

#[test]
fn test_walk_default_filters() {
    let fs = memory_workspace();
    let walker =
        FileWalker::new(fs, "/ws", 1024).with_patterns(&[], &["node_modules".to_string()]);

    // Sorted order, tests and docs dropped, unknown extensions kept
    assert_eq!(paths(&walker), vec!["Makefile", "src/UserService.ts", "src/util.py"]);
}

#[test]
fn test_walk_include_tests_and_docs() {
    let fs = memory_workspace();
    let walker = FileWalker::new(fs, "/ws", 1024)
        .with_patterns(&[], &["node_modules".to_string()])
        .with_tests(true)
        .with_docs(true);

    let found = paths(&walker);
    assert!(found.contains(&"src/UserService.test.ts".to_string()));
    assert!(found.contains(&"docs/guide.md".to_string()));
    assert!(!found.iter().any(|p| p.starts_with("node_modules")));
}

#[test]
fn test_walk_language_filter() {
    let fs = memory_workspace();
    let walker = FileWalker::new(fs, "/ws", 1024).with_languages(vec!["python".to_string()]);
    assert_eq!(paths(&walker), vec!["src/util.py"]);
}

#[test]
fn test_walk_include_patterns() {
    let fs = memory_workspace();
    let walker = FileWalker::new(fs, "/ws", 1024).with_patterns(&["src/**".to_string()], &[]);
    assert_eq!(paths(&walker), vec!["src/UserService.ts", "src/util.py"]);
}

#[test]
fn test_walk_max_file_size() {
    let fs = Arc::new(MemoryFileSystem::new());
    fs.add_file("/ws/small.ts", "small");
    fs.add_file("/ws/large.ts", "a".repeat(2000));

    let walker = FileWalker::new(fs, "/ws", 1024);
    assert_eq!(paths(&walker), vec!["small.ts"]);
}

#[test]
fn test_walk_skips_unreadable_directory() {
    let fs = memory_workspace();
    fs.add_file("/ws/private/secret.ts", "export const key = 1;");
    fs.deny("/ws/private");

    let walker = FileWalker::new(fs, "/ws", 1024);
    let found = paths(&walker);
    assert!(!found.iter().any(|p| p.starts_with("private")));
    assert!(found.contains(&"src/UserService.ts".to_string()));
}

#[test]
fn test_walk_is_restartable() {
    let fs = memory_workspace();
    let walker = FileWalker::new(fs, "/ws", 1024);
    let first = paths(&walker);
    let second = paths(&walker);
    assert_eq!(first, second);

    // Partially consumed walks do not affect a fresh one
    let mut walk = walker.walk();
    walk.next();
    assert_eq!(walker.walk().count(), first.len());
}

#[test]
fn test_admit_candidate_fields() {
    let fs = memory_workspace();
    let walker = FileWalker::new(fs, "/ws", 1024);
    let candidate = walker.admit(Path::new("/ws/src/UserService.ts")).unwrap();
    assert_eq!(candidate.relative_path, "src/UserService.ts");
    assert_eq!(candidate.language, Some(Language::TypeScript));
    assert_eq!(candidate.size, 27);

    assert!(walker.admit(Path::new("/ws/src/missing.ts")).is_none());
}

#[test]
fn test_walk_nested_directories_local_fs() {
    let temp_dir = TempDir::new().unwrap();
    let subdir = temp_dir.path().join("subdir");
    fs::create_dir(&subdir).unwrap();
    fs::create_dir(temp_dir.path().join("target")).unwrap();
    fs::write(temp_dir.path().join("root.rs"), "fn root() {}").unwrap();
    fs::write(subdir.join("nested.rs"), "fn nested() {}").unwrap();
    fs::write(temp_dir.path().join("target").join("gen.rs"), "fn gen() {}").unwrap();

    let walker = FileWalker::new(Arc::new(LocalFileSystem), temp_dir.path(), 1024)
        .with_patterns(&[], &["target".to_string()]);
    assert_eq!(paths(&walker), vec!["root.rs", "subdir/nested.rs"]);
}

#[test]
fn test_walk_respects_gitignore() {
    let fs = Arc::new(MemoryFileSystem::new());
    fs.add_file("/ws/.gitignore", "ignored.ts\ngenerated/\n");
    fs.add_file("/ws/included.ts", "export const a = 1;");
    fs.add_file("/ws/ignored.ts", "export const b = 2;");
    fs.add_file("/ws/generated/api.ts", "export function authenticate() {}");
    fs.add_file("/ws/src/generated.ts", "export const c = 3;");

    let walker = FileWalker::new(fs, "/ws", 1024);
    // The ignore file itself is an ordinary candidate
    assert_eq!(paths(&walker), vec![".gitignore", "included.ts", "src/generated.ts"]);
}

#[test]
fn test_walk_nested_ignore_files() {
    let fs = Arc::new(MemoryFileSystem::new());
    fs.add_file("/ws/.gitignore", "*.gen.ts\n");
    fs.add_file("/ws/src/.ignore", "!keep.gen.ts\nscratch.ts\n");
    fs.add_file("/ws/a.gen.ts", "a");
    fs.add_file("/ws/src/b.gen.ts", "b");
    fs.add_file("/ws/src/keep.gen.ts", "keep");
    fs.add_file("/ws/src/scratch.ts", "scratch");
    fs.add_file("/ws/scratch.ts", "root scratch");

    let walker = FileWalker::new(fs, "/ws", 1024);
    assert_eq!(
        paths(&walker),
        vec![".gitignore", "scratch.ts", "src/.ignore", "src/keep.gen.ts"]
    );
}

#[test]
fn test_walk_git_info_exclude() {
    let fs = Arc::new(MemoryFileSystem::new());
    fs.add_file("/ws/.git/info/exclude", "local.ts\n");
    fs.add_file("/ws/local.ts", "local");
    fs.add_file("/ws/shared.ts", "shared");

    let walker = FileWalker::new(fs, "/ws", 1024).with_patterns(&[], &[".git".to_string()]);
    assert_eq!(paths(&walker), vec!["shared.ts"]);
}

#[test]
fn test_ignore_files_can_be_disabled() {
    let fs = Arc::new(MemoryFileSystem::new());
    fs.add_file("/ws/.gitignore", "generated/\n");
    fs.add_file("/ws/generated/api.ts", "api");

    let walker = FileWalker::new(fs, "/ws", 1024).with_ignore_files(false);
    assert_eq!(paths(&walker), vec![".gitignore", "generated/api.ts"]);
    assert!(walker.admit(Path::new("/ws/generated/api.ts")).is_some());
}

#[test]
fn test_admit_checks_ancestor_ignore_files() {
    let fs = Arc::new(MemoryFileSystem::new());
    fs.add_file("/ws/.gitignore", "generated/\n");
    fs.add_file("/ws/lib/.gitignore", "*.tmp.ts\n");
    fs.add_file("/ws/generated/api.ts", "api");
    fs.add_file("/ws/lib/cache.tmp.ts", "tmp");
    fs.add_file("/ws/lib/cache.ts", "cache");

    let walker = FileWalker::new(fs, "/ws", 1024);
    assert!(walker.admit(Path::new("/ws/generated/api.ts")).is_none());
    assert!(walker.admit(Path::new("/ws/lib/cache.tmp.ts")).is_none());
    assert!(walker.admit(Path::new("/ws/lib/cache.ts")).is_some());
}

#[cfg(unix)]
#[test]
fn test_walk_does_not_follow_symlinked_directories() {
    let temp_dir = TempDir::new().unwrap();
    let src = temp_dir.path().join("src");
    fs::create_dir(&src).unwrap();
    fs::write(src.join("auth.ts"), "export function authenticate() {}").unwrap();
    // A cycle back to the parent directory
    std::os::unix::fs::symlink(&src, src.join("loop")).unwrap();

    let walker = FileWalker::new(Arc::new(LocalFileSystem), temp_dir.path(), 1024);
    assert_eq!(paths(&walker), vec!["src/auth.ts"]);
}
