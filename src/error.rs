/// Centralized error types for code-context using thiserror
///
/// Only engine construction and task failures reach callers as errors. Per-file
/// problems are modelled as [`FileError`] values that the pipeline logs and absorbs.
use thiserror::Error;

/// Main error type for the retrieval engine
#[derive(Error, Debug)]
pub enum ContextError {
    #[error("Workspace error: {0}")]
    Workspace(#[from] WorkspaceError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("File error: {0}")]
    File(#[from] FileError),

    #[error("Invalid extraction pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Worker task failed: {0}")]
    TaskFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

/// Errors raised while binding the engine to a workspace
#[derive(Error, Debug)]
pub enum WorkspaceError {
    #[error("No workspace root configured")]
    NotConfigured,

    #[error("Workspace root does not exist: {0}")]
    RootNotFound(String),

    #[error("Workspace root is not a directory: {0}")]
    NotADirectory(String),
}

/// Errors related to configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration file: {0}")]
    LoadFailed(String),

    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    #[error("Invalid configuration value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Failed to save configuration: {0}")]
    SaveFailed(String),

    #[error("Configuration file not found: {0}")]
    FileNotFound(String),
}

/// Errors for a single candidate file. Never fatal to a retrieval call.
#[derive(Error, Debug)]
pub enum FileError {
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Failed to read file '{file}': {reason}")]
    Unreadable { file: String, reason: String },

    #[error("File size exceeds maximum: {size} > {max}")]
    TooLarge { size: u64, max: u64 },

    #[error("File is binary: {0}")]
    Binary(String),

    #[error("File is not valid UTF-8: {0}")]
    InvalidUtf8(String),
}

impl FileError {
    /// Build a `FileError` from an IO failure on `path`
    pub fn from_io(path: &str, err: &std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => FileError::NotFound(path.to_string()),
            _ => FileError::Unreadable {
                file: path.to_string(),
                reason: err.to_string(),
            },
        }
    }
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, ContextError>;

// Conversion from anyhow::Error to ContextError
impl From<anyhow::Error> for ContextError {
    fn from(err: anyhow::Error) -> Self {
        ContextError::Other(format!("{:#}", err))
    }
}

impl ContextError {
    /// Create a new error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        ContextError::Other(msg.into())
    }

    /// Check if this is a caller configuration error rather than a system failure
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            ContextError::Workspace(_) | ContextError::Config(ConfigError::InvalidValue { .. })
        )
    }
}
