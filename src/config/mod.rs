/// Configuration system for code-context
///
/// Supports loading from multiple sources with priority:
/// CLI args > Environment variables > Config file > Defaults
use crate::error::{ConfigError, ContextError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Workspace binding
    #[serde(default)]
    pub workspace: WorkspaceConfig,

    /// File enumeration rules
    #[serde(default)]
    pub walker: WalkerConfig,

    /// Search and scoring defaults
    #[serde(default)]
    pub search: SearchConfig,

    /// Dependency graph traversal
    #[serde(default)]
    pub relations: RelationsConfig,

    /// In-memory analysis cache
    #[serde(default)]
    pub cache: CacheConfig,

    /// Worker pool
    #[serde(default)]
    pub engine: EngineConfig,
}

/// Workspace configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WorkspaceConfig {
    /// Root directory searched by the engine
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,
}

/// File walker configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalkerConfig {
    /// Maximum file size to scan (in bytes)
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,

    /// Default include patterns (empty = everything)
    #[serde(default)]
    pub include_patterns: Vec<String>,

    /// Default exclude patterns
    #[serde(default = "default_exclude_patterns")]
    pub exclude_patterns: Vec<String>,

    /// Skip paths matched by `.gitignore`, `.ignore` and `.git/info/exclude`
    #[serde(default = "default_respect_ignore_files")]
    pub respect_ignore_files: bool,
}

/// Search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Upper bound for any requested `max_files`
    #[serde(default = "default_max_files_limit")]
    pub max_files_limit: usize,

    /// Minimum similarity for fuzzy symbol matches (0.0 to 1.0)
    #[serde(default = "default_fuzzy_threshold")]
    pub fuzzy_threshold: f32,

    /// Lines of context kept around each match in excerpts
    #[serde(default = "default_context_window")]
    pub context_window: usize,

    /// Files scoring below this (0-100) are dropped
    #[serde(default = "default_min_score")]
    pub min_score: f64,

    /// Default deadline per call in milliseconds, 0 disables it
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

/// Related-file discovery configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationsConfig {
    /// Import hops followed from the start file
    #[serde(default = "default_max_hops")]
    pub max_hops: usize,

    /// Default number of related files returned
    #[serde(default = "default_related_max_files")]
    pub max_files: usize,
}

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_enabled")]
    pub enabled: bool,

    /// Maximum cached file analyses
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EngineConfig {
    /// Analysis worker threads, 0 = available parallelism
    #[serde(default)]
    pub worker_threads: usize,
}

// Default value functions
fn default_max_file_size() -> u64 {
    1_048_576 // 1 MB
}

fn default_exclude_patterns() -> Vec<String> {
    [
        "node_modules",
        "target",
        ".git",
        "dist",
        "build",
        "out",
        "coverage",
        "__pycache__",
        ".venv",
        "venv",
        "vendor",
        ".next",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_respect_ignore_files() -> bool {
    true
}

fn default_max_files_limit() -> usize {
    50
}

fn default_fuzzy_threshold() -> f32 {
    0.6
}

fn default_context_window() -> usize {
    3
}

fn default_min_score() -> f64 {
    1.0
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_max_hops() -> usize {
    2
}

fn default_related_max_files() -> usize {
    10
}

fn default_cache_enabled() -> bool {
    true
}

fn default_cache_capacity() -> usize {
    2048
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            max_file_size: default_max_file_size(),
            include_patterns: Vec::new(),
            exclude_patterns: default_exclude_patterns(),
            respect_ignore_files: default_respect_ignore_files(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_files_limit: default_max_files_limit(),
            fuzzy_threshold: default_fuzzy_threshold(),
            context_window: default_context_window(),
            min_score: default_min_score(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl Default for RelationsConfig {
    fn default() -> Self {
        Self {
            max_hops: default_max_hops(),
            max_files: default_related_max_files(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_cache_enabled(),
            capacity: default_cache_capacity(),
        }
    }
}

impl Config {
    /// Default configuration bound to a workspace root
    pub fn for_workspace(root: impl Into<PathBuf>) -> Self {
        Self {
            workspace: WorkspaceConfig {
                root: Some(root.into()),
            },
            ..Self::default()
        }
    }

    /// Load configuration from file
    pub fn from_file(path: &Path) -> Result<Self, ContextError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()).into());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::LoadFailed(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| ConfigError::ParseFailed(format!("Invalid TOML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from default location or create default
    pub fn load_or_default() -> Result<Self, ContextError> {
        let config_path = crate::paths::PlatformPaths::default_config_path();

        if config_path.exists() {
            tracing::info!("Loading config from: {}", config_path.display());
            Self::from_file(&config_path)
        } else {
            tracing::debug!("No config file found, using defaults");
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<(), ContextError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ConfigError::SaveFailed(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SaveFailed(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| ConfigError::SaveFailed(format!("Failed to write config file: {}", e)))?;

        tracing::info!("Saved config to: {}", path.display());
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ContextError> {
        if self.walker.max_file_size == 0 {
            return Err(invalid("walker.max_file_size", "must be greater than 0"));
        }

        if self.search.max_files_limit == 0 {
            return Err(invalid("search.max_files_limit", "must be greater than 0"));
        }

        if !(0.0..=1.0).contains(&self.search.fuzzy_threshold) {
            return Err(invalid(
                "search.fuzzy_threshold",
                format!(
                    "must be between 0.0 and 1.0, got {}",
                    self.search.fuzzy_threshold
                ),
            ));
        }

        if !(0.0..=100.0).contains(&self.search.min_score) {
            return Err(invalid(
                "search.min_score",
                format!("must be between 0 and 100, got {}", self.search.min_score),
            ));
        }

        if !(1..=3).contains(&self.relations.max_hops) {
            return Err(invalid(
                "relations.max_hops",
                format!("must be between 1 and 3, got {}", self.relations.max_hops),
            ));
        }

        if self.relations.max_files == 0 {
            return Err(invalid("relations.max_files", "must be greater than 0"));
        }

        Ok(())
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) {
        if let Ok(root) = std::env::var("CODE_CONTEXT_WORKSPACE")
            && !root.trim().is_empty()
        {
            self.workspace.root = Some(PathBuf::from(root));
        }

        if let Ok(size) = std::env::var("CODE_CONTEXT_MAX_FILE_SIZE")
            && let Ok(size) = size.parse()
        {
            self.walker.max_file_size = size;
        }

        if let Ok(threshold) = std::env::var("CODE_CONTEXT_FUZZY_THRESHOLD")
            && let Ok(threshold) = threshold.parse()
        {
            self.search.fuzzy_threshold = threshold;
        }

        if let Ok(capacity) = std::env::var("CODE_CONTEXT_CACHE_CAPACITY")
            && let Ok(capacity) = capacity.parse()
        {
            self.cache.capacity = capacity;
        }

        if let Ok(threads) = std::env::var("CODE_CONTEXT_WORKER_THREADS")
            && let Ok(threads) = threads.parse()
        {
            self.engine.worker_threads = threads;
        }

        if let Ok(timeout) = std::env::var("CODE_CONTEXT_TIMEOUT_MS")
            && let Ok(timeout) = timeout.parse()
        {
            self.search.timeout_ms = timeout;
        }
    }

    /// Create a new Config with defaults and environment overrides
    pub fn new() -> Result<Self, ContextError> {
        let mut config = Self::load_or_default()?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }
}

fn invalid(key: &str, reason: impl Into<String>) -> ContextError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        reason: reason.into(),
    }
    .into()
}
