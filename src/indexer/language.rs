//! Programming language detection from file extensions

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Languages the engine can recognise from a file extension.
///
/// Only some of them have structural extraction rules; the rest are still
/// keyword-searchable as plain text.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
pub enum Language {
    TypeScript,
    JavaScript,
    Python,
    Rust,
    Go,
    Java,
    CSharp,
    Kotlin,
    Swift,
    C,
    Cpp,
    Ruby,
    Php,
    Scala,
    Shell,
    Sql,
    Html,
    Css,
    Json,
    Yaml,
    Toml,
    Xml,
    Markdown,
    ReStructuredText,
    AsciiDoc,
    Text,
}

impl Language {
    /// Detect programming language from file extension
    pub fn from_extension(extension: &str) -> Option<Self> {
        let lang = match extension.to_lowercase().as_str() {
            "ts" | "tsx" | "mts" | "cts" => Self::TypeScript,
            "js" | "jsx" | "mjs" | "cjs" => Self::JavaScript,
            "py" | "pyi" => Self::Python,
            "rs" => Self::Rust,
            "go" => Self::Go,
            "java" => Self::Java,
            "cs" => Self::CSharp,
            "kt" | "kts" => Self::Kotlin,
            "swift" => Self::Swift,
            "c" | "h" => Self::C,
            "cpp" | "cc" | "cxx" | "hpp" | "hh" | "hxx" => Self::Cpp,
            "rb" => Self::Ruby,
            "php" => Self::Php,
            "scala" => Self::Scala,
            "sh" | "bash" | "zsh" => Self::Shell,
            "sql" => Self::Sql,
            "html" | "htm" => Self::Html,
            "css" | "scss" | "sass" | "less" => Self::Css,
            "json" => Self::Json,
            "yaml" | "yml" => Self::Yaml,
            "toml" => Self::Toml,
            "xml" => Self::Xml,
            "md" | "markdown" => Self::Markdown,
            "rst" => Self::ReStructuredText,
            "adoc" | "asciidoc" => Self::AsciiDoc,
            "txt" => Self::Text,
            _ => return None,
        };
        Some(lang)
    }

    /// Detect the language of a path from its extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// Display name, e.g. "TypeScript"
    pub fn name(&self) -> &'static str {
        match self {
            Self::TypeScript => "TypeScript",
            Self::JavaScript => "JavaScript",
            Self::Python => "Python",
            Self::Rust => "Rust",
            Self::Go => "Go",
            Self::Java => "Java",
            Self::CSharp => "C#",
            Self::Kotlin => "Kotlin",
            Self::Swift => "Swift",
            Self::C => "C",
            Self::Cpp => "C++",
            Self::Ruby => "Ruby",
            Self::Php => "PHP",
            Self::Scala => "Scala",
            Self::Shell => "Shell",
            Self::Sql => "SQL",
            Self::Html => "HTML",
            Self::Css => "CSS",
            Self::Json => "JSON",
            Self::Yaml => "YAML",
            Self::Toml => "TOML",
            Self::Xml => "XML",
            Self::Markdown => "Markdown",
            Self::ReStructuredText => "reStructuredText",
            Self::AsciiDoc => "AsciiDoc",
            Self::Text => "Text",
        }
    }

    /// Documentation formats, excluded unless docs are requested
    pub fn is_documentation(&self) -> bool {
        matches!(
            self,
            Self::Markdown | Self::ReStructuredText | Self::AsciiDoc | Self::Text
        )
    }

    /// Check a user-supplied language filter ("ts", "typescript", "TypeScript", "c#")
    pub fn matches_filter(&self, filter: &str) -> bool {
        let filter = filter.trim().trim_start_matches('.');
        if filter.eq_ignore_ascii_case(self.name()) {
            return true;
        }
        if format!("{:?}", self).eq_ignore_ascii_case(filter) {
            return true;
        }
        Self::from_extension(filter) == Some(*self)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
