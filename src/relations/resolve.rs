//! Import specifier resolution against the workspace

use crate::fs::FileSystem;
use crate::indexer::Language;
use crate::paths::normalize_lexically;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Extensions probed for JavaScript-family specifiers, in priority order
const SCRIPT_EXTENSIONS: &[&str] = &["ts", "tsx", "d.ts", "js", "jsx", "mjs", "cjs", "mts", "cts"];

/// Source roots probed for dotted JVM/.NET names
const DOTTED_SOURCE_ROOTS: &[&str] = &[
    "",
    "src",
    "src/main/java",
    "src/main/kotlin",
    "src/main/scala",
];

/// Most files returned for a package or namespace directory
const MAX_PACKAGE_FILES: usize = 20;

/// Maps an import specifier to the workspace files it names.
pub trait ImportResolver: Send + Sync {
    /// Files `specifier` (as written in `from`) refers to. Empty when it
    /// points outside the workspace or to nothing that exists.
    fn resolve(&self, from: &Path, specifier: &str, language: Option<Language>) -> Vec<PathBuf>;
}

/// Resolver probing a [`FileSystem`] under one workspace root
pub struct WorkspaceResolver {
    fs: Arc<dyn FileSystem>,
    root: PathBuf,
}

impl WorkspaceResolver {
    pub fn new(fs: Arc<dyn FileSystem>, root: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            root: root.into(),
        }
    }

    fn file(&self, path: PathBuf) -> Option<PathBuf> {
        let path = normalize_lexically(&path);
        (path.starts_with(&self.root) && self.fs.is_file(&path)).then_some(path)
    }

    /// `base`, `base.<ext>` or `base/index.<ext>`
    fn probe(&self, base: &Path, extensions: &[&str], index: &str) -> Option<PathBuf> {
        if let Some(found) = self.file(base.to_path_buf()) {
            return Some(found);
        }
        for ext in extensions {
            if let Some(found) = self.file(with_suffix(base, ext)) {
                return Some(found);
            }
        }
        for ext in extensions {
            if let Some(found) = self.file(base.join(format!("{}.{}", index, ext))) {
                return Some(found);
            }
        }
        None
    }

    /// Sorted files directly inside `dir` with one of `extensions`
    fn package_files(&self, dir: &Path, extensions: &[&str], skip_suffix: &str) -> Vec<PathBuf> {
        let dir = normalize_lexically(dir);
        if !dir.starts_with(&self.root) {
            return Vec::new();
        }
        let Ok(entries) = self.fs.list_dir(&dir) else {
            return Vec::new();
        };
        let mut files: Vec<PathBuf> = entries
            .into_iter()
            .filter(|e| !e.is_dir)
            .filter(|e| {
                let name = e.file_name();
                extensions.iter().any(|ext| name.ends_with(&format!(".{}", ext)))
                    && (skip_suffix.is_empty() || !name.ends_with(skip_suffix))
            })
            .map(|e| e.path)
            .collect();
        files.sort();
        files.truncate(MAX_PACKAGE_FILES);
        files
    }

    fn script(&self, dir: &Path, spec: &str) -> Vec<PathBuf> {
        let bases: Vec<PathBuf> = if spec.starts_with("./")
            || spec.starts_with("../")
            || spec == "."
            || spec == ".."
        {
            vec![dir.join(spec)]
        } else if let Some(rest) = spec.strip_prefix("@/").or_else(|| spec.strip_prefix("~/")) {
            vec![self.root.join("src").join(rest), self.root.join(rest)]
        } else if let Some(rest) = spec.strip_prefix('/') {
            vec![self.root.join(rest)]
        } else {
            // Bare specifiers are packages unless the workspace has a matching path
            vec![self.root.join(spec), self.root.join("src").join(spec)]
        };

        bases
            .iter()
            .find_map(|base| self.probe(base, SCRIPT_EXTENSIONS, "index"))
            .into_iter()
            .collect()
    }

    fn python(&self, dir: &Path, spec: &str) -> Vec<PathBuf> {
        let dots = spec.len() - spec.trim_start_matches('.').len();
        let parts: Vec<&str> = spec[dots..].split('.').filter(|p| !p.is_empty()).collect();

        let bases: Vec<PathBuf> = if dots > 0 {
            let mut base = dir.to_path_buf();
            for _ in 1..dots {
                base.pop();
            }
            vec![base]
        } else {
            vec![dir.to_path_buf(), self.root.clone(), self.root.join("src")]
        };

        for base in bases {
            let target = parts.iter().fold(base, |acc, part| acc.join(part));
            if parts.is_empty() {
                if let Some(found) = self.file(target.join("__init__.py")) {
                    return vec![found];
                }
                continue;
            }
            if let Some(found) = self.probe(&target, &["py", "pyi"], "__init__") {
                return vec![found];
            }
        }
        Vec::new()
    }

    /// Directory holding the child modules of `from`
    fn rust_module_dir(from: &Path) -> PathBuf {
        let dir = from.parent().map(Path::to_path_buf).unwrap_or_default();
        let name = from.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        match name {
            "mod.rs" | "lib.rs" | "main.rs" => dir,
            _ => match from.file_stem() {
                Some(stem) => dir.join(stem),
                None => dir,
            },
        }
    }

    /// Nearest ancestor of `from` holding a crate root file
    fn rust_crate_dir(&self, from: &Path) -> PathBuf {
        from.ancestors()
            .skip(1)
            .take_while(|dir| dir.starts_with(&self.root))
            .find(|dir| {
                self.fs.is_file(&dir.join("lib.rs")) || self.fs.is_file(&dir.join("main.rs"))
            })
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.root.join("src"))
    }

    fn rust(&self, from: &Path, spec: &str) -> Vec<PathBuf> {
        let module_dir = Self::rust_module_dir(from);

        if let Some(name) = spec.strip_prefix("mod ") {
            let name = name.trim();
            return [module_dir.join(format!("{}.rs", name)), module_dir.join(name).join("mod.rs")]
                .into_iter()
                .find_map(|p| self.file(p))
                .into_iter()
                .collect();
        }

        let path = spec.split_whitespace().next().unwrap_or_default();
        let path = path.split('{').next().unwrap_or_default().trim_start_matches("::");
        let mut segments: Vec<&str> = path.split("::").filter(|s| !s.is_empty()).collect();

        let mut base = match segments.first().copied() {
            Some("crate") => self.rust_crate_dir(from),
            Some("self") => module_dir,
            Some("super") => module_dir.parent().map(Path::to_path_buf).unwrap_or_default(),
            _ => return Vec::new(),
        };
        segments.remove(0);
        while segments.first() == Some(&"super") {
            base.pop();
            segments.remove(0);
        }

        for len in (1..=segments.len()).rev() {
            let target = segments[..len].iter().fold(base.clone(), |acc, s| acc.join(s));
            let found = [with_suffix(&target, "rs"), target.join("mod.rs")]
                .into_iter()
                .find_map(|p| self.file(p));
            if let Some(found) = found {
                return vec![found];
            }
        }
        Vec::new()
    }

    fn go(&self, spec: &str) -> Vec<PathBuf> {
        let segments: Vec<&str> = spec.split('/').filter(|s| !s.is_empty()).collect();
        for start in 0..segments.len() {
            let dir = segments[start..].iter().fold(self.root.clone(), |acc, s| acc.join(s));
            let files = self.package_files(&dir, &["go"], "_test.go");
            if !files.is_empty() {
                return files;
            }
        }
        Vec::new()
    }

    fn dotted(&self, spec: &str, extension: &str) -> Vec<PathBuf> {
        let spec = spec.trim_end_matches(';');
        let wildcard = spec.ends_with(".*");
        let segments: Vec<&str> = spec
            .trim_end_matches(".*")
            .split('.')
            .filter(|s| !s.is_empty())
            .collect();

        for source_root in DOTTED_SOURCE_ROOTS {
            let root = self.root.join(source_root);
            // Namespaces often omit their leading segments on disk
            for start in 0..segments.len() {
                let tail = &segments[start..];
                for len in (1..=tail.len()).rev() {
                    let target = tail[..len].iter().fold(root.clone(), |acc, s| acc.join(s));
                    if !wildcard && let Some(found) = self.file(with_suffix(&target, extension)) {
                        return vec![found];
                    }
                    if wildcard || len == tail.len() {
                        let files = self.package_files(&target, &[extension], "");
                        if !files.is_empty() {
                            return files;
                        }
                    }
                }
            }
        }
        Vec::new()
    }
}

impl ImportResolver for WorkspaceResolver {
    fn resolve(&self, from: &Path, specifier: &str, language: Option<Language>) -> Vec<PathBuf> {
        let spec = specifier.trim();
        if spec.is_empty() {
            return Vec::new();
        }
        let dir = from.parent().unwrap_or(&self.root);

        let mut found = match language {
            Some(Language::Python) => self.python(dir, spec),
            Some(Language::Rust) => self.rust(from, spec),
            Some(Language::Go) => self.go(spec),
            Some(Language::Java) => self.dotted(spec, "java"),
            Some(Language::Kotlin) => self.dotted(spec, "kt"),
            Some(Language::Scala) => self.dotted(spec, "scala"),
            Some(Language::CSharp) => self.dotted(spec, "cs"),
            _ => self.script(dir, spec),
        };
        found.retain(|p| p != from);
        found.dedup();

        if found.is_empty() {
            tracing::trace!("Unresolved import '{}' in {:?}", spec, from);
        }
        found
    }
}

/// `base` with `.ext` appended to its final component
fn with_suffix(base: &Path, ext: &str) -> PathBuf {
    let mut name = OsString::from(base.as_os_str());
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}
