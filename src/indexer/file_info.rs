//! Candidate file surfaced by the walker

use super::language::Language;
use std::path::PathBuf;
use std::time::SystemTime;

/// Information about a discovered file, before it is read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCandidate {
    pub path: PathBuf,
    pub relative_path: String,
    pub language: Option<Language>,
    pub size: u64,
    pub modified: SystemTime,
}
