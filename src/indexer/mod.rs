//! Workspace enumeration and language detection
//!
//! Provides the lazily-produced candidate stream that feeds the analysis
//! pipeline, plus extension-based language detection.

mod file_info;
mod file_walker;
mod language;

pub use file_info::FileCandidate;
pub use file_walker::{FileWalker, Walk};
pub use language::Language;
