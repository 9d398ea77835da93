use crate::analyzer::FileStructure;
use crate::config::Config;
use crate::indexer::Language;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Hard ceiling on `max_files`, whatever the caller or config asks for
pub const MAX_FILES_CEILING: usize = 100;

/// Largest excerpt radius accepted from callers
pub const MAX_CONTEXT_WINDOW: usize = 50;

/// Strategy used to score candidates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    Keyword,
    Function,
    Class,
    Usage,
    Semantic,
}

impl SearchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchType::Keyword => "keyword",
            SearchType::Function => "function",
            SearchType::Class => "class",
            SearchType::Usage => "usage",
            SearchType::Semantic => "semantic",
        }
    }

    /// Result count used when the caller does not ask for one
    pub fn default_max_files(&self) -> usize {
        match self {
            SearchType::Keyword => 10,
            SearchType::Function | SearchType::Class => 8,
            SearchType::Usage => 15,
            SearchType::Semantic => 12,
        }
    }
}

impl fmt::Display for SearchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "keyword" => Ok(SearchType::Keyword),
            "function" => Ok(SearchType::Function),
            "class" => Ok(SearchType::Class),
            "usage" => Ok(SearchType::Usage),
            "semantic" => Ok(SearchType::Semantic),
            other => Err(format!(
                "unknown search type '{}', expected keyword, function, class, usage or semantic",
                other
            )),
        }
    }
}

/// A function or method declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FunctionInfo {
    pub name: String,
    /// 1-based line of the declaration
    pub line: usize,
    pub parameters: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<String>,
    pub is_exported: bool,
    /// Enclosing class/struct for methods
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
}

/// A class-like declaration (class, struct, record, enum)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClassInfo {
    pub name: String,
    pub line: usize,
    /// Distinct method names; each overload is its own entry in `functions`
    pub methods: Vec<String>,
    pub properties: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,
    pub implements: Vec<String>,
    pub is_exported: bool,
}

/// A named interface or type declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Declaration {
    pub name: String,
    pub line: usize,
    pub is_exported: bool,
}

/// Byte range inside `FileAnalysis::content` that satisfied the query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MatchRange {
    pub start: usize,
    pub end: usize,
    /// 1-based line of `start`
    pub line: usize,
}

/// Line window of content around matches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Excerpt {
    pub start_line: usize,
    pub end_line: usize,
    pub text: String,
}

/// Everything the engine knows about one scanned file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileAnalysis {
    /// Absolute path, unique within one retrieval call
    pub path: String,
    /// Path relative to the workspace root, forward slashes
    pub relative_path: String,
    pub content: String,
    pub size_bytes: u64,
    pub language: Option<Language>,
    /// 0-100, only meaningful for the query that produced it
    pub relevance_score: f64,
    pub functions: Vec<FunctionInfo>,
    pub classes: Vec<ClassInfo>,
    pub interfaces: Vec<Declaration>,
    pub types: Vec<Declaration>,
    pub imports: Vec<String>,
    pub exports: Vec<String>,
    pub match_ranges: Vec<MatchRange>,
    #[serde(default)]
    pub excerpts: Vec<Excerpt>,
}

impl FileAnalysis {
    /// Unscored analysis of `content` with its extracted structure
    pub fn new(
        path: String,
        relative_path: String,
        content: String,
        language: Option<Language>,
        structure: FileStructure,
    ) -> Self {
        Self {
            path,
            relative_path,
            size_bytes: content.len() as u64,
            content,
            language,
            relevance_score: 0.0,
            functions: structure.functions,
            classes: structure.classes,
            interfaces: structure.interfaces,
            types: structure.types,
            imports: structure.imports,
            exports: structure.exports,
            match_ranges: Vec::new(),
            excerpts: Vec::new(),
        }
    }

    /// Every extracted symbol name: functions, classes, interfaces and types
    pub fn symbol_names(&self) -> impl Iterator<Item = &str> {
        self.functions
            .iter()
            .map(|f| f.name.as_str())
            .chain(self.classes.iter().map(|c| c.name.as_str()))
            .chain(self.interfaces.iter().map(|i| i.name.as_str()))
            .chain(self.types.iter().map(|t| t.name.as_str()))
    }

    /// Line of the earliest match, `usize::MAX` when nothing matched
    pub fn first_match_line(&self) -> usize {
        self.match_ranges
            .iter()
            .map(|m| m.line)
            .min()
            .unwrap_or(usize::MAX)
    }

    /// File name component of the path
    pub fn file_name(&self) -> &str {
        self.relative_path
            .rsplit('/')
            .next()
            .unwrap_or(&self.relative_path)
    }

    /// Copy with query-dependent fields cleared
    pub fn without_score(&self) -> Self {
        Self {
            relevance_score: 0.0,
            match_ranges: Vec::new(),
            excerpts: Vec::new(),
            ..self.clone()
        }
    }
}

/// Aggregate information about one retrieval call. Always populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchMetadata {
    pub query: String,
    pub search_type: SearchType,
    pub time_ms: u64,
    pub total_files_scanned: usize,
    pub included_languages: Vec<String>,
    pub excluded_patterns: Vec<String>,
    /// Deadline or cancellation hit before every candidate was scored
    #[serde(default)]
    pub timed_out: bool,
    /// Options that were out of range and replaced
    #[serde(default)]
    pub adjustments: Vec<String>,
    #[serde(default)]
    pub cache_hits: usize,
}

/// The context bundle returned to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RetrievalContext {
    /// Descending by relevance, at most `max_files` entries
    pub files: Vec<FileAnalysis>,
    /// Mean relevance of the included files, 0.0-1.0
    pub relevance_score: f64,
    /// Raw matches found before truncation
    pub total_matches: usize,
    pub search_metadata: SearchMetadata,
}

impl RetrievalContext {
    /// A well-formed bundle with no files
    pub fn empty(metadata: SearchMetadata) -> Self {
        Self {
            files: Vec::new(),
            relevance_score: 0.0,
            total_matches: 0,
            search_metadata: metadata,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Whether a file with this relative path is in the bundle
    pub fn contains(&self, relative_path: &str) -> bool {
        self.files.iter().any(|f| f.relative_path == relative_path)
    }
}

/// Caller-facing search options.
///
/// Numeric fields are deliberately loose so hosts can pass anything; they are
/// clamped by [`SearchOptions::resolve`] instead of being rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchOptions {
    pub max_files: Option<i64>,
    pub include_tests: bool,
    pub include_docs: bool,
    pub include_languages: Option<Vec<String>>,
    pub max_file_size: Option<i64>,
    pub context_window: Option<i64>,
    pub search_type: Option<SearchType>,
    pub fuzzy_threshold: Option<f64>,
    /// Extra exclusion patterns on top of the configured ones
    pub exclude_patterns: Vec<String>,
    /// Deadline for the whole call; 0 disables it
    pub timeout_ms: Option<u64>,
    /// Import hops followed by related-file discovery
    pub max_hops: Option<i64>,
}

/// Validated options used by the pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedOptions {
    pub max_files: usize,
    pub include_tests: bool,
    pub include_docs: bool,
    pub include_languages: Vec<String>,
    pub max_file_size: u64,
    pub context_window: usize,
    pub fuzzy_threshold: f32,
    pub exclude_patterns: Vec<String>,
    pub timeout_ms: Option<u64>,
    pub max_hops: usize,
    /// Human-readable notes about replaced values
    pub adjustments: Vec<String>,
}

impl SearchOptions {
    pub fn with_search_type(mut self, search_type: SearchType) -> Self {
        self.search_type = Some(search_type);
        self
    }

    pub fn with_max_files(mut self, max_files: i64) -> Self {
        self.max_files = Some(max_files);
        self
    }

    /// Clamp every option into range, falling back to config defaults
    pub fn resolve(&self, config: &Config, search_type: SearchType) -> ResolvedOptions {
        let mut adjustments = Vec::new();
        let limit = config.search.max_files_limit.clamp(1, MAX_FILES_CEILING);

        let max_files = match self.max_files {
            None => search_type.default_max_files().min(limit),
            Some(n) if n <= 0 => {
                let fallback = search_type.default_max_files().min(limit);
                adjustments.push(format!("maxFiles {} replaced with {}", n, fallback));
                fallback
            }
            Some(n) if n as u64 > limit as u64 => {
                adjustments.push(format!("maxFiles {} capped at {}", n, limit));
                limit
            }
            Some(n) => n as usize,
        };

        let fuzzy_threshold = match self.fuzzy_threshold {
            None => config.search.fuzzy_threshold,
            Some(t) if t.is_finite() && (0.0..=1.0).contains(&t) => t as f32,
            Some(t) => {
                adjustments.push(format!(
                    "fuzzyThreshold {} replaced with {}",
                    t, config.search.fuzzy_threshold
                ));
                config.search.fuzzy_threshold
            }
        };

        let max_file_size = match self.max_file_size {
            None => config.walker.max_file_size,
            Some(n) if n <= 0 => {
                adjustments.push(format!(
                    "maxFileSize {} replaced with {}",
                    n, config.walker.max_file_size
                ));
                config.walker.max_file_size
            }
            Some(n) => n as u64,
        };

        let context_window = match self.context_window {
            None => config.search.context_window,
            Some(n) if n < 0 => {
                adjustments.push(format!(
                    "contextWindow {} replaced with {}",
                    n, config.search.context_window
                ));
                config.search.context_window
            }
            Some(n) if n as u64 > MAX_CONTEXT_WINDOW as u64 => {
                adjustments.push(format!(
                    "contextWindow {} capped at {}",
                    n, MAX_CONTEXT_WINDOW
                ));
                MAX_CONTEXT_WINDOW
            }
            Some(n) => n as usize,
        };

        let max_hops = match self.max_hops {
            None => config.relations.max_hops.clamp(1, 3),
            Some(n) if (1..=3).contains(&n) => n as usize,
            Some(n) => {
                let clamped = n.clamp(1, 3) as usize;
                adjustments.push(format!("maxHops {} clamped to {}", n, clamped));
                clamped
            }
        };

        let timeout_ms = match self.timeout_ms.unwrap_or(config.search.timeout_ms) {
            0 => None,
            ms => Some(ms),
        };

        let include_languages = self
            .include_languages
            .clone()
            .unwrap_or_default()
            .into_iter()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect();

        let mut exclude_patterns = config.walker.exclude_patterns.clone();
        for pattern in &self.exclude_patterns {
            if !exclude_patterns.contains(pattern) {
                exclude_patterns.push(pattern.clone());
            }
        }

        for note in &adjustments {
            tracing::warn!("Clamped out-of-range search option: {}", note);
        }

        ResolvedOptions {
            max_files,
            include_tests: self.include_tests,
            include_docs: self.include_docs,
            include_languages,
            max_file_size,
            context_window,
            fuzzy_threshold,
            exclude_patterns,
            timeout_ms,
            max_hops,
            adjustments,
        }
    }
}

#[cfg(test)]
mod tests;
