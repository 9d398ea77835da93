//! Text helpers shared by extraction and scoring: line lookup, brace and
//! indentation bodies, parameter splitting.

/// Byte offset to 1-based line lookup
#[derive(Debug, Clone, Default)]
pub struct LineIndex {
    newlines: Vec<usize>,
    len: usize,
}

impl LineIndex {
    pub fn new(content: &str) -> Self {
        Self {
            newlines: content
                .bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(i, _)| i)
                .collect(),
            len: content.len(),
        }
    }

    /// 1-based line containing `offset`
    pub fn line_of(&self, offset: usize) -> usize {
        self.newlines.partition_point(|&n| n < offset) + 1
    }

    /// Byte offset where a 1-based line starts
    pub fn line_start(&self, line: usize) -> usize {
        match line {
            0 | 1 => 0,
            n => self
                .newlines
                .get(n - 2)
                .map_or(self.len, |&newline| newline + 1),
        }
    }

    /// Byte offset just past the last character of a 1-based line
    pub fn line_end(&self, line: usize) -> usize {
        self.newlines
            .get(line.saturating_sub(1))
            .copied()
            .unwrap_or(self.len)
    }

    pub fn line_count(&self) -> usize {
        self.newlines.len() + 1
    }
}

/// Collapse runs of whitespace (including newlines) into single spaces
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split a raw parameter list on top-level commas, dropping method receivers
pub fn split_params(raw: &str) -> Vec<String> {
    split_top_level(raw)
        .into_iter()
        .filter(|p| !is_receiver(p))
        .collect()
}

/// Split on commas that are not nested in brackets, parens, braces or generics
pub fn split_top_level(raw: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0i32;
    let mut prev = '\0';

    for c in raw.chars() {
        match c {
            '(' | '[' | '{' | '<' => depth += 1,
            ')' | ']' | '}' => depth -= 1,
            '>' if prev != '=' && prev != '-' => depth -= 1,
            ',' if depth <= 0 => {
                push_part(&mut parts, &current);
                current.clear();
                prev = c;
                continue;
            }
            _ => {}
        }
        current.push(c);
        prev = c;
    }
    push_part(&mut parts, &current);
    parts
}

fn push_part(parts: &mut Vec<String>, raw: &str) {
    let part = collapse_whitespace(raw);
    if !part.is_empty() {
        parts.push(part);
    }
}

fn is_receiver(param: &str) -> bool {
    if param == "cls" {
        return true;
    }
    let mut rest = param.trim_start_matches('&').trim_start();
    // Lifetime on a borrowed receiver: &'a self
    if let Some(stripped) = rest.strip_prefix('\'') {
        rest = stripped
            .split_once(char::is_whitespace)
            .map_or("", |(_, tail)| tail.trim_start());
    }
    let rest = rest.strip_prefix("mut ").unwrap_or(rest).trim_start();
    rest == "self" || rest.starts_with("self:") || rest.starts_with("self :")
}

/// Base identifier of a possibly generic type, `Repo<User>` becomes `Repo`
pub fn base_name(text: &str) -> String {
    text.split('<').next().unwrap_or(text).trim().to_string()
}

/// Iterator over bytes that are outside string literals and comments.
///
/// Newlines ending a line comment are still yielded so line tracking works.
pub struct CodeBytes<'a> {
    bytes: &'a [u8],
    pos: usize,
    end: usize,
}

impl<'a> CodeBytes<'a> {
    pub fn new(bytes: &'a [u8], from: usize, to: usize) -> Self {
        Self {
            bytes,
            pos: from,
            end: to.min(bytes.len()),
        }
    }

    fn closing_quote(&self, open: usize, quote: u8) -> Option<usize> {
        let mut j = open + 1;
        while j < self.end {
            match self.bytes[j] {
                b'\\' => j += 2,
                b if b == quote => return Some(j),
                b'\n' if quote != b'`' => return None,
                _ => j += 1,
            }
        }
        None
    }

    fn find_from(&self, from: usize, needle: &[u8]) -> usize {
        self.bytes[from.min(self.end)..self.end]
            .windows(needle.len())
            .position(|w| w == needle)
            .map_or(self.end, |p| from + p)
    }
}

impl Iterator for CodeBytes<'_> {
    type Item = (usize, u8);

    fn next(&mut self) -> Option<Self::Item> {
        while self.pos < self.end {
            let i = self.pos;
            let b = self.bytes[i];
            match b {
                b'"' | b'\'' | b'`' => {
                    // An unmatched quote on the line is a lifetime or apostrophe
                    if let Some(close) = self.closing_quote(i, b) {
                        self.pos = close + 1;
                        continue;
                    }
                }
                b'/' if self.bytes.get(i + 1) == Some(&b'/') => {
                    self.pos = self.find_from(i, b"\n");
                    continue;
                }
                b'/' if self.bytes.get(i + 1) == Some(&b'*') => {
                    self.pos = (self.find_from(i + 2, b"*/") + 2).min(self.end);
                    continue;
                }
                _ => {}
            }
            self.pos = i + 1;
            return Some((i, b));
        }
        None
    }
}

/// Locate a `{ ... }` body starting at or after `from`.
///
/// Returns `(open, close)` byte offsets. A `;` before any `{` means the
/// declaration has no body. Unbalanced bodies run to the end of the text.
pub fn brace_body(content: &str, from: usize) -> Option<(usize, usize)> {
    let bytes = content.as_bytes();
    let from = from.min(bytes.len());
    let rel = bytes[from..].iter().position(|&b| b == b'{' || b == b';')?;
    let open = from + rel;
    if bytes[open] == b';' {
        return None;
    }

    let mut depth = 0usize;
    for (i, b) in CodeBytes::new(bytes, open, bytes.len()) {
        match b {
            b'{' => depth += 1,
            b'}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some((open, i));
                }
            }
            _ => {}
        }
    }
    Some((open, bytes.len()))
}

/// Start offsets of the lines directly inside a brace body (nesting depth 1)
pub fn brace_level_lines(content: &str, open: usize, close: usize) -> Vec<usize> {
    let bytes = content.as_bytes();
    let mut starts = vec![open + 1];
    let mut depth = 0usize;

    for (i, b) in CodeBytes::new(bytes, open + 1, close) {
        match b {
            b'{' => depth += 1,
            b'}' => depth = depth.saturating_sub(1),
            b'\n' if depth == 0 && i + 1 < close => starts.push(i + 1),
            _ => {}
        }
    }
    starts
}

/// An indentation-delimited body (Python)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndentedBody {
    pub start: usize,
    pub end: usize,
    pub indent: usize,
}

fn indent_width(line: &str) -> usize {
    line.len() - line.trim_start_matches([' ', '\t']).len()
}

/// Body of a header ending at `header_end` whose own line is indented by
/// `header_indent`. `None` for one-line bodies such as `class A: pass`.
pub fn indented_body(
    content: &str,
    header_end: usize,
    header_indent: usize,
) -> Option<IndentedBody> {
    let start = content[header_end..].find('\n').map(|p| header_end + p + 1)?;
    let mut body_indent = None;
    let mut end = content.len();
    let mut offset = start;

    for line in content[start..].split_inclusive('\n') {
        let trimmed = line.trim();
        if !trimmed.is_empty() && !trimmed.starts_with('#') {
            let indent = indent_width(line);
            if indent <= header_indent {
                end = offset;
                break;
            }
            body_indent.get_or_insert(indent);
        }
        offset += line.len();
    }

    body_indent.map(|indent| IndentedBody { start, end, indent })
}

/// Start offsets of the non-blank lines at the body's own indentation
pub fn indented_level_lines(content: &str, body: IndentedBody) -> Vec<usize> {
    let mut starts = Vec::new();
    let mut offset = body.start;
    for line in content[body.start..body.end].split_inclusive('\n') {
        if !line.trim().is_empty() && indent_width(line) == body.indent {
            starts.push(offset);
        }
        offset += line.len();
    }
    starts
}

/// Slice of at most `max` bytes from `start`, bounded by `end`, on a char boundary
pub fn window(content: &str, start: usize, end: usize, max: usize) -> &str {
    let mut stop = end.min(start.saturating_add(max)).min(content.len());
    while stop > start && !content.is_char_boundary(stop) {
        stop -= 1;
    }
    &content[start.min(stop)..stop]
}
