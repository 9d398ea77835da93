//! Reference detection via identifier matching.
//!
//! Finds whole-word occurrences of an identifier and classifies each one by
//! the text around it on the same line.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Kind of reference to a symbol
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    /// Import or re-export statement
    Import,
    /// Function or method call
    Call,
    /// Member access (`obj.name` or `name.field`)
    PropertyAccess,
    /// Instantiation (new Foo())
    Instantiation,
    /// Class inheritance (extends/implements)
    Inheritance,
    /// Type annotation or type reference
    TypeReference,
    /// Variable write/assignment
    Write,
    /// Variable read access
    Read,
}

/// One occurrence of the identifier outside its definition lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reference {
    /// 1-based line
    pub line: usize,
    /// Byte offsets into the whole content
    pub start: usize,
    pub end: usize,
    pub kind: ReferenceKind,
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

/// Byte offsets of whole-word occurrences of `needle` in `haystack`
pub fn word_occurrences<'a>(
    haystack: &'a str,
    needle: &'a str,
) -> impl Iterator<Item = usize> + 'a {
    let bytes = haystack.as_bytes();
    haystack
        .match_indices(needle)
        .map(|(pos, _)| pos)
        .filter(move |&pos| {
            let before_ok = pos == 0 || !is_ident_byte(bytes[pos - 1]);
            let end = pos + needle.len();
            let after_ok = end >= bytes.len() || !is_ident_byte(bytes[end]);
            !needle.is_empty() && before_ok && after_ok
        })
}

/// Find every reference to `identifier`, skipping the lines listed in
/// `definition_lines` (declarations of the identifier in this same file).
pub fn find_references(
    content: &str,
    identifier: &str,
    definition_lines: &[usize],
) -> Vec<Reference> {
    let mut references = Vec::new();
    if identifier.is_empty() {
        return references;
    }

    let mut line_start = 0;
    for (line_num, line) in content.split_inclusive('\n').enumerate() {
        let line_number = line_num + 1;
        if !definition_lines.contains(&line_number) {
            for position in word_occurrences(line, identifier) {
                references.push(Reference {
                    line: line_number,
                    start: line_start + position,
                    end: line_start + position + identifier.len(),
                    kind: determine_reference_kind(line, position, identifier),
                });
            }
        }
        line_start += line.len();
    }

    references
}

fn is_import_line(line: &str) -> bool {
    let trimmed = line.trim_start();
    ["import ", "from ", "use ", "using ", "pub use ", "export * from", "#include"]
        .iter()
        .any(|prefix| trimmed.starts_with(prefix))
        || trimmed.contains("require(")
        || trimmed.contains("import(")
        || (trimmed.starts_with("export ") && trimmed.contains(" from "))
}

/// Determine the kind of reference based on context
fn determine_reference_kind(line: &str, position: usize, name: &str) -> ReferenceKind {
    let before = &line[..position];
    let after_name = line[position + name.len()..].trim_start();

    if is_import_line(line) {
        return ReferenceKind::Import;
    }

    // Checked before calls, since `new Foo()` looks like a call
    if before.trim_end().ends_with("new") {
        return ReferenceKind::Instantiation;
    }

    if before.contains("extends") || before.contains("implements") {
        return ReferenceKind::Inheritance;
    }

    let member_of = before.ends_with('.') || before.ends_with("?.");
    if after_name.starts_with('(') {
        return ReferenceKind::Call;
    }
    if member_of || (after_name.starts_with('.') && !after_name.starts_with("..")) {
        return ReferenceKind::PropertyAccess;
    }

    if after_name.starts_with('=')
        && !after_name.starts_with("==")
        && !after_name.starts_with("=>")
    {
        return ReferenceKind::Write;
    }

    if before.contains(':') || before.contains("->") || before.contains('<') {
        return ReferenceKind::TypeReference;
    }

    ReferenceKind::Read
}
