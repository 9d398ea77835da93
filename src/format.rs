//! Rendering a [`RetrievalContext`] as markdown prompt text

use crate::indexer::Language;
use crate::types::{FileAnalysis, RetrievalContext};
use std::fmt::Write;

/// Options for [`format_context`]
#[derive(Debug, Clone)]
pub struct FormatOptions {
    /// Upper bound on the output length in bytes
    pub max_chars: usize,
    /// Lines of raw content shown for files without excerpts, 0 hides them
    pub content_lines: usize,
    /// List extracted symbol names under each file
    pub include_symbols: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            max_chars: 24_000,
            content_lines: 40,
            include_symbols: true,
        }
    }
}

const TRUNCATED: &str = "\n[output truncated]\n";

/// Render `context` as markdown.
///
/// Files are emitted in ranking order. Once the next section would not fit
/// into `max_chars` the remaining files are only counted.
pub fn format_context(context: &RetrievalContext, options: &FormatOptions) -> String {
    let meta = &context.search_metadata;
    let mut out = String::new();
    let _ = writeln!(out, "# Code context for `{}`", meta.query);
    let _ = writeln!(
        out,
        "\nSearch type: {} | files: {} | matches: {} | relevance: {:.2} | {} ms",
        meta.search_type,
        context.files.len(),
        context.total_matches,
        context.relevance_score,
        meta.time_ms
    );
    if meta.timed_out {
        out.push_str("\n_Search stopped early; results may be incomplete._\n");
    }
    if context.files.is_empty() {
        out.push_str("\nNo matching files.\n");
        return clamp(out, options.max_chars);
    }

    for (i, file) in context.files.iter().enumerate() {
        let section = file_section(file, options);
        if out.len() + section.len() > options.max_chars {
            let rest = context.files.len() - i;
            if i == 0 {
                out.push_str(&section);
                return clamp(out, options.max_chars);
            }
            let note = format!("\n_{} more file(s) omitted._\n", rest);
            if out.len() + note.len() <= options.max_chars {
                out.push_str(&note);
            }
            return out;
        }
        out.push_str(&section);
    }
    out
}

fn file_section(file: &FileAnalysis, options: &FormatOptions) -> String {
    let mut section = String::new();
    let language = file.language.map_or("unknown", |l| l.name());
    let _ = writeln!(
        section,
        "\n## {} ({}, score {:.1})",
        file.relative_path, language, file.relevance_score
    );

    if options.include_symbols {
        let symbols: Vec<&str> = file.symbol_names().collect();
        if !symbols.is_empty() {
            let _ = writeln!(section, "\nSymbols: {}", symbols.join(", "));
        }
    }

    let tag = fence_tag(file.language);
    if !file.excerpts.is_empty() {
        for excerpt in &file.excerpts {
            let _ = writeln!(
                section,
                "\nLines {}-{}:\n```{}\n{}\n```",
                excerpt.start_line, excerpt.end_line, tag, excerpt.text
            );
        }
    } else if options.content_lines > 0 && !file.content.is_empty() {
        let shown: Vec<&str> = file.content.lines().take(options.content_lines).collect();
        let total = file.content.lines().count();
        let _ = writeln!(section, "\n```{}\n{}\n```", tag, shown.join("\n"));
        if total > shown.len() {
            let _ = writeln!(section, "_{} more line(s)_", total - shown.len());
        }
    }
    section
}

/// Code fence info string for a language
fn fence_tag(language: Option<Language>) -> String {
    match language {
        None => String::new(),
        Some(Language::CSharp) => "csharp".to_string(),
        Some(Language::Cpp) => "cpp".to_string(),
        Some(Language::ReStructuredText) => "rst".to_string(),
        Some(lang) => lang.name().to_lowercase(),
    }
}

/// Cut `text` to at most `max` bytes on a char boundary, marking the cut
fn clamp(mut text: String, max: usize) -> String {
    if text.len() <= max {
        return text;
    }
    let mut cut = max.saturating_sub(TRUNCATED.len());
    while cut > 0 && !text.is_char_boundary(cut) {
        cut -= 1;
    }
    text.truncate(cut);
    if text.len() + TRUNCATED.len() <= max {
        text.push_str(TRUNCATED);
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::FileStructure;
    use crate::types::{Excerpt, SearchMetadata, SearchType};

    fn metadata() -> SearchMetadata {
        SearchMetadata {
            query: "authenticate".to_string(),
            search_type: SearchType::Keyword,
            time_ms: 3,
            total_files_scanned: 2,
            included_languages: vec![],
            excluded_patterns: vec![],
            timed_out: false,
            adjustments: vec![],
            cache_hits: 0,
        }
    }

    fn file(relative: &str, content: &str, excerpt: Option<Excerpt>) -> FileAnalysis {
        let mut file = FileAnalysis::new(
            format!("/ws/{}", relative),
            relative.to_string(),
            content.to_string(),
            Some(Language::TypeScript),
            FileStructure::default(),
        );
        file.relevance_score = 72.5;
        file.excerpts = excerpt.into_iter().collect();
        file
    }

    fn context(files: Vec<FileAnalysis>) -> RetrievalContext {
        RetrievalContext {
            total_matches: files.len(),
            relevance_score: 0.725,
            files,
            search_metadata: metadata(),
        }
    }

    #[test]
    fn test_format_header_and_excerpts() {
        let excerpt = Excerpt {
            start_line: 1,
            end_line: 1,
            text: "export function authenticate() {}".to_string(),
        };
        let out = format_context(
            &context(vec![file("src/auth.ts", "export function authenticate() {}", Some(excerpt))]),
            &FormatOptions::default(),
        );

        assert!(out.starts_with("# Code context for `authenticate`"));
        assert!(out.contains("Search type: keyword"));
        assert!(out.contains("## src/auth.ts (TypeScript, score 72.5)"));
        assert!(out.contains("Lines 1-1:\n```typescript\nexport function authenticate() {}\n```"));
    }

    #[test]
    fn test_format_falls_back_to_content() {
        let content = "a\nb\nc\nd";
        let options = FormatOptions {
            content_lines: 2,
            ..Default::default()
        };
        let out = format_context(&context(vec![file("src/a.ts", content, None)]), &options);
        assert!(out.contains("```typescript\na\nb\n```"));
        assert!(out.contains("_2 more line(s)_"));
    }

    #[test]
    fn test_format_empty_context() {
        let out = format_context(&RetrievalContext::empty(metadata()), &FormatOptions::default());
        assert!(out.contains("No matching files."));
    }

    #[test]
    fn test_format_respects_budget() {
        let files: Vec<FileAnalysis> = (0..20)
            .map(|i| file(&format!("src/file_{}.ts", i), &"let x = 1;\n".repeat(30), None))
            .collect();
        let options = FormatOptions {
            max_chars: 1_000,
            ..Default::default()
        };
        let out = format_context(&context(files), &options);
        assert!(out.len() <= 1_000);
        assert!(out.contains("more file(s) omitted"));
        assert!(out.contains("## src/file_0.ts"));
    }

    #[test]
    fn test_format_truncates_oversized_first_file() {
        let big = "x".repeat(5_000);
        let options = FormatOptions {
            max_chars: 500,
            content_lines: 1,
            ..Default::default()
        };
        let out = format_context(&context(vec![file("src/big.ts", &big, None)]), &options);
        assert!(out.len() <= 500);
        assert!(out.ends_with("[output truncated]\n"));
    }
}
