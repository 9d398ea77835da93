//! Reading candidate files into cached analyses

use super::RetrievalEngine;
use crate::analyzer::LineIndex;
use crate::error::FileError;
use crate::indexer::Language;
use crate::paths::relative_path;
use crate::types::{Excerpt, FileAnalysis, MatchRange};
use std::path::Path;
use std::sync::Arc;
use std::time::SystemTime;

/// Most excerpts attached to one file
pub const MAX_EXCERPTS: usize = 5;

/// Bytes inspected by the binary sniff
const SNIFF_LEN: usize = 8192;

impl RetrievalEngine {
    /// Stat `path` and load it, rejecting anything over `max_size` bytes.
    /// The flag is true when the analysis came from the cache.
    pub(crate) fn load_path(
        &self,
        path: &Path,
        max_size: u64,
    ) -> Result<(Arc<FileAnalysis>, bool), FileError> {
        let display = path.display().to_string();
        let stat = self
            .fs
            .stat(path)
            .map_err(|e| FileError::from_io(&display, &e))?;
        if stat.is_dir {
            return Err(FileError::Unreadable {
                file: display,
                reason: "is a directory".to_string(),
            });
        }
        self.load_with_stat(path, stat.modified, stat.size, max_size)
    }

    /// Load a file whose metadata is already known, served from the cache
    /// while mtime and size are unchanged
    pub(crate) fn load_with_stat(
        &self,
        path: &Path,
        modified: SystemTime,
        size: u64,
        max_size: u64,
    ) -> Result<(Arc<FileAnalysis>, bool), FileError> {
        if let Some(hit) = self.cache.get(path, modified, size) {
            return Ok((hit, true));
        }
        if size > max_size {
            return Err(FileError::TooLarge {
                size,
                max: max_size,
            });
        }

        let display = path.display().to_string();
        let bytes = self
            .fs
            .read_file(path)
            .map_err(|e| FileError::from_io(&display, &e))?;
        // The file may have grown since it was listed
        if bytes.len() as u64 > max_size {
            return Err(FileError::TooLarge {
                size: bytes.len() as u64,
                max: max_size,
            });
        }
        let content = decode_content(&display, bytes)?;

        let language = Language::from_path(path);
        let structure = self.analyzer.analyze(&content, language);
        let analysis = Arc::new(FileAnalysis::new(
            display,
            relative_path(&self.root, path),
            content,
            language,
            structure,
        ));

        self.cache
            .insert(path.to_path_buf(), modified, size, analysis.clone());
        Ok((analysis, false))
    }
}

/// Decode file bytes as UTF-8 text.
///
/// Content with a NUL byte, or where more than 30% of the sniffed prefix is
/// control characters, is treated as binary. A leading byte-order mark is dropped.
pub fn decode_content(path: &str, bytes: Vec<u8>) -> Result<String, FileError> {
    let sniff = &bytes[..bytes.len().min(SNIFF_LEN)];
    if sniff.contains(&0) {
        return Err(FileError::Binary(path.to_string()));
    }
    let control = sniff
        .iter()
        .filter(|&&b| b < 0x20 && !matches!(b, b'\n' | b'\r' | b'\t' | 0x0c))
        .count();
    if !sniff.is_empty() && control * 10 > sniff.len() * 3 {
        return Err(FileError::Binary(path.to_string()));
    }

    let mut content =
        String::from_utf8(bytes).map_err(|_| FileError::InvalidUtf8(path.to_string()))?;
    if content.starts_with('\u{feff}') {
        content.drain(..'\u{feff}'.len_utf8());
    }
    Ok(content)
}

/// Line windows of `window` lines around each matched line.
///
/// Overlapping or touching windows are merged; at most [`MAX_EXCERPTS`]
/// are returned, in file order.
pub fn build_excerpts(content: &str, ranges: &[MatchRange], window: usize) -> Vec<Excerpt> {
    if ranges.is_empty() || content.is_empty() {
        return Vec::new();
    }
    let lines = LineIndex::new(content);
    let last = lines.line_count();

    let mut matched: Vec<usize> = ranges.iter().map(|r| r.line.clamp(1, last)).collect();
    matched.sort_unstable();
    matched.dedup();

    let mut spans: Vec<(usize, usize)> = Vec::new();
    for line in matched {
        let start = line.saturating_sub(window).max(1);
        let end = (line + window).min(last);
        match spans.last_mut() {
            Some((_, prev_end)) if start <= *prev_end + 1 => *prev_end = (*prev_end).max(end),
            _ => spans.push((start, end)),
        }
    }

    spans
        .into_iter()
        .take(MAX_EXCERPTS)
        .map(|(start, end)| Excerpt {
            start_line: start,
            end_line: end,
            text: content[lines.line_start(start)..lines.line_end(end)].to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at_line(line: usize) -> MatchRange {
        MatchRange {
            start: 0,
            end: 0,
            line,
        }
    }

    #[test]
    fn test_decode_rejects_nul_bytes() {
        let err = decode_content("a.bin", vec![b'a', 0, b'b']).unwrap_err();
        assert!(matches!(err, FileError::Binary(_)));
    }

    #[test]
    fn test_decode_rejects_control_heavy_content() {
        let bytes = vec![0x01, 0x02, 0x03, b'a', b'b'];
        assert!(matches!(
            decode_content("a.dat", bytes),
            Err(FileError::Binary(_))
        ));
    }

    #[test]
    fn test_decode_rejects_invalid_utf8() {
        let bytes = vec![b'a', 0xff, 0xfe, b'b'];
        assert!(matches!(
            decode_content("a.txt", bytes),
            Err(FileError::InvalidUtf8(_))
        ));
    }

    #[test]
    fn test_decode_strips_bom() {
        let mut bytes = "\u{feff}fn main() {}".as_bytes().to_vec();
        assert_eq!(decode_content("a.rs", bytes.clone()).unwrap(), "fn main() {}");
        bytes.clear();
        assert_eq!(decode_content("empty.rs", bytes).unwrap(), "");
    }

    #[test]
    fn test_excerpt_window() {
        let content = "l1\nl2\nl3\nl4\nl5\nl6\nl7";
        let excerpts = build_excerpts(content, &[at_line(4)], 1);
        assert_eq!(excerpts.len(), 1);
        assert_eq!(excerpts[0].start_line, 3);
        assert_eq!(excerpts[0].end_line, 5);
        assert_eq!(excerpts[0].text, "l3\nl4\nl5");
    }

    #[test]
    fn test_excerpts_merge_and_clamp() {
        let content = "l1\nl2\nl3\nl4\nl5\nl6\nl7";
        let excerpts = build_excerpts(content, &[at_line(1), at_line(3), at_line(7)], 1);
        assert_eq!(
            excerpts
                .iter()
                .map(|e| (e.start_line, e.end_line))
                .collect::<Vec<_>>(),
            vec![(1, 4), (6, 7)]
        );
    }

    #[test]
    fn test_excerpts_are_capped() {
        let content: String = (1..=100).map(|i| format!("line {}\n", i)).collect();
        let ranges: Vec<MatchRange> = (0..10).map(|i| at_line(i * 10 + 1)).collect();
        assert_eq!(build_excerpts(&content, &ranges, 0).len(), MAX_EXCERPTS);
    }

    #[test]
    fn test_zero_window_keeps_matched_line() {
        let excerpts = build_excerpts("a\nb\nc", &[at_line(2)], 0);
        assert_eq!(excerpts[0].text, "b");
    }
}
