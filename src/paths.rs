/// Platform config locations and path normalization helpers
///
/// Workspace paths are normalized lexically (no symlink resolution) so the same
/// logic works against the real file system and the in-memory one.
use std::path::{Component, Path, PathBuf};

/// Platform-agnostic path utilities
pub struct PlatformPaths;

impl PlatformPaths {
    /// Get the appropriate config directory for the current platform
    ///
    /// Falls back to the current directory when the platform has none.
    pub fn config_dir() -> PathBuf {
        dirs::config_dir().unwrap_or_else(|| PathBuf::from("."))
    }

    /// Get default project-specific config directory
    ///
    /// Returns: {config_dir}/code-context
    pub fn project_config_dir() -> PathBuf {
        Self::config_dir().join("code-context")
    }

    /// Get default config file path
    ///
    /// Returns: {config_dir}/code-context/config.toml
    pub fn default_config_path() -> PathBuf {
        Self::project_config_dir().join("config.toml")
    }
}

/// Collapse `.` and `..` components without touching the file system
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // Never pop past the root or a prefix
                let popped = matches!(
                    out.components().next_back(),
                    Some(Component::Normal(_))
                ) && out.pop();
                if !popped && !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Resolve a caller-supplied path against the workspace root
///
/// Absolute paths are kept, relative ones are joined onto `root`.
pub fn resolve_in_workspace(root: &Path, path: &str) -> PathBuf {
    let candidate = Path::new(path);
    if candidate.is_absolute() {
        normalize_lexically(candidate)
    } else {
        normalize_lexically(&root.join(candidate))
    }
}

/// Workspace-relative display path using forward slashes
pub fn relative_path(root: &Path, path: &Path) -> String {
    match path.strip_prefix(root) {
        Ok(relative) => relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/"),
        Err(_) => path.to_string_lossy().replace('\\', "/"),
    }
}
