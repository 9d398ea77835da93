//! Relevance scoring.
//!
//! [`RelevanceScorer::score`] turns one analyzed file and a [`QueryPlan`] into
//! a 0-100 score plus the byte ranges that satisfied the query. The strategy is
//! picked by the plan's search type.

mod fuzzy;
mod usage;

pub use fuzzy::{levenshtein_distance, similarity};
pub use usage::{Reference, ReferenceKind, find_references, word_occurrences};

use crate::analyzer::LineIndex;
use crate::search::QueryPlan;
use crate::types::{FileAnalysis, MatchRange, SearchType};
use std::collections::BTreeSet;

/// Most match ranges kept per file
pub const MAX_MATCH_RANGES: usize = 50;

/// Fixed weights of the scoring strategies.
///
/// Keyword components are summed per token and averaged over tokens. Symbol
/// tiers apply to function and class searches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreWeights {
    /// Ceiling of the term-frequency component
    pub text: f64,
    /// Occurrence count at which term frequency saturates
    pub text_saturation: f64,
    /// File name contains the token
    pub file_name: f64,
    /// A symbol name equals the token
    pub symbol_exact: f64,
    /// A symbol name contains the token
    pub symbol_partial: f64,
    pub exact: f64,
    pub case_insensitive: f64,
    /// Substring tier is `substring_base + substring_span * (short / long)`
    pub substring_base: f64,
    pub substring_span: f64,
    /// Fuzzy tier is `fuzzy_base + fuzzy_span * similarity`
    pub fuzzy_base: f64,
    pub fuzzy_span: f64,
    /// Multiplier on the keyword score for files without a symbol hit
    pub symbol_miss_factor: f64,
    /// Points per distinct reference kind
    pub usage_kind: f64,
    /// Ceiling of the occurrence-volume component
    pub usage_volume: f64,
    /// The file declares the identifier
    pub usage_definition: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            text: 40.0,
            text_saturation: 20.0,
            file_name: 25.0,
            symbol_exact: 35.0,
            symbol_partial: 25.0,
            exact: 100.0,
            case_insensitive: 95.0,
            substring_base: 60.0,
            substring_span: 25.0,
            fuzzy_base: 30.0,
            fuzzy_span: 30.0,
            symbol_miss_factor: 0.5,
            usage_kind: 15.0,
            usage_volume: 25.0,
            usage_definition: 10.0,
        }
    }
}

/// Outcome of scoring one file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scored {
    /// 0-100
    pub score: f64,
    /// Sorted by offset, at most [`MAX_MATCH_RANGES`]
    pub match_ranges: Vec<MatchRange>,
    /// Raw match count before the range cap
    pub matches: usize,
}

impl Scored {
    fn zero() -> Self {
        Self::default()
    }
}

/// Per-file view shared by the strategies
struct Subject<'a> {
    file: &'a FileAnalysis,
    lower: String,
    file_name: String,
    symbols: Vec<String>,
    lines: LineIndex,
}

impl<'a> Subject<'a> {
    fn new(file: &'a FileAnalysis) -> Self {
        Self {
            file,
            // ASCII lowering keeps byte offsets aligned with `content`
            lower: file.content.to_ascii_lowercase(),
            file_name: file.file_name().to_ascii_lowercase(),
            symbols: file.symbol_names().map(|s| s.to_ascii_lowercase()).collect(),
            lines: LineIndex::new(&file.content),
        }
    }

    fn range(&self, start: usize, len: usize) -> MatchRange {
        MatchRange {
            start,
            end: start + len,
            line: self.lines.line_of(start),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RelevanceScorer {
    weights: ScoreWeights,
}

impl RelevanceScorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_weights(weights: ScoreWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &ScoreWeights {
        &self.weights
    }

    /// Score `file` against `plan`, clamped to `[0, 100]`
    pub fn score(&self, file: &FileAnalysis, plan: &QueryPlan, fuzzy_threshold: f32) -> Scored {
        let subject = Subject::new(file);
        let mut scored = match plan.search_type {
            SearchType::Keyword => self.keyword(&subject, &plan.tokens),
            SearchType::Function | SearchType::Class => {
                self.symbol(&subject, plan, fuzzy_threshold)
            }
            SearchType::Usage => self.usage(&subject, plan.symbol.as_deref()),
            SearchType::Semantic => self.semantic(&subject, &plan.expansions),
        };
        scored.score = scored.score.clamp(0.0, 100.0);
        if !scored.score.is_finite() {
            scored.score = 0.0;
        }
        scored
    }

    /// Score of a single lowercase token plus the offsets where it occurs
    fn token_score(&self, subject: &Subject<'_>, token: &str) -> (f64, Vec<usize>) {
        if token.is_empty() {
            return (0.0, Vec::new());
        }
        let w = &self.weights;
        let hits: Vec<usize> = subject.lower.match_indices(token).map(|(i, _)| i).collect();

        let mut score = 0.0;
        if !hits.is_empty() {
            let tf = (1.0 + hits.len() as f64).ln() / (1.0 + w.text_saturation).ln();
            score += w.text * tf.min(1.0);
        }
        if subject.file_name.contains(token) {
            score += w.file_name;
        }
        if subject.symbols.iter().any(|s| s == token) {
            score += w.symbol_exact;
        } else if subject.symbols.iter().any(|s| s.contains(token)) {
            score += w.symbol_partial;
        }
        (score, hits)
    }

    fn keyword(&self, subject: &Subject<'_>, tokens: &[String]) -> Scored {
        if tokens.is_empty() {
            return Scored::zero();
        }
        let mut total = 0.0;
        let mut offsets = BTreeSet::new();
        let mut ranges = Vec::new();
        let mut matches = 0;

        for token in tokens {
            let (score, hits) = self.token_score(subject, token);
            total += score;
            matches += hits.len();
            for start in hits {
                if offsets.insert(start) {
                    ranges.push(subject.range(start, token.len()));
                }
            }
        }

        Scored {
            score: total / tokens.len() as f64,
            match_ranges: cap_ranges(ranges),
            matches,
        }
    }

    fn semantic(&self, subject: &Subject<'_>, terms: &[String]) -> Scored {
        let mut best = 0.0f64;
        let mut ranges = Vec::new();
        let mut offsets = BTreeSet::new();
        let mut matches = 0;

        for term in terms {
            let (score, hits) = self.token_score(subject, term);
            if score <= 0.0 {
                continue;
            }
            best = best.max(score);
            matches += hits.len();
            for start in hits {
                if offsets.insert(start) {
                    ranges.push(subject.range(start, term.len()));
                }
            }
        }

        Scored {
            score: best,
            match_ranges: cap_ranges(ranges),
            matches,
        }
    }

    /// Tier for one candidate name against the queried symbol
    fn name_tier(&self, name: &str, symbol: &str, fuzzy_threshold: f32) -> f64 {
        let w = &self.weights;
        if name == symbol {
            return w.exact;
        }
        if name.eq_ignore_ascii_case(symbol) {
            return w.case_insensitive;
        }

        let name_lower = name.to_ascii_lowercase();
        let symbol_lower = symbol.to_ascii_lowercase();
        let (short, long) = if name_lower.len() <= symbol_lower.len() {
            (&name_lower, &symbol_lower)
        } else {
            (&symbol_lower, &name_lower)
        };
        if !short.is_empty() && long.contains(short.as_str()) {
            return w.substring_base + w.substring_span * (short.len() as f64 / long.len() as f64);
        }

        let sim = similarity(name, symbol);
        if sim >= fuzzy_threshold {
            return w.fuzzy_base + w.fuzzy_span * f64::from(sim);
        }
        0.0
    }

    fn symbol(&self, subject: &Subject<'_>, plan: &QueryPlan, fuzzy_threshold: f32) -> Scored {
        let Some(symbol) = plan.symbol.as_deref().filter(|s| !s.is_empty()) else {
            return self.keyword(subject, &plan.tokens);
        };

        let file = subject.file;
        let candidates: Vec<&str> = match plan.search_type {
            SearchType::Class => file
                .classes
                .iter()
                .map(|c| c.name.as_str())
                .chain(file.interfaces.iter().map(|i| i.name.as_str()))
                .chain(file.types.iter().map(|t| t.name.as_str()))
                .collect(),
            _ => file.functions.iter().map(|f| f.name.as_str()).collect(),
        };

        let mut best: Option<(f64, &str)> = None;
        for name in candidates {
            let tier = self.name_tier(name, symbol, fuzzy_threshold);
            if tier > 0.0 && best.is_none_or(|(score, _)| tier > score) {
                best = Some((tier, name));
            }
        }

        match best {
            Some((score, name)) => {
                let hits: Vec<usize> = word_occurrences(&file.content, name).collect();
                let ranges = hits.iter().map(|&start| subject.range(start, name.len())).collect();
                Scored {
                    score,
                    match_ranges: cap_ranges(ranges),
                    matches: hits.len().max(1),
                }
            }
            None => {
                let mut fallback = self.keyword(subject, &plan.tokens);
                fallback.score *= self.weights.symbol_miss_factor;
                fallback
            }
        }
    }

    fn usage(&self, subject: &Subject<'_>, identifier: Option<&str>) -> Scored {
        let Some(identifier) = identifier.filter(|s| !s.is_empty()) else {
            return Scored::zero();
        };
        let w = &self.weights;
        let file = subject.file;

        let definition_lines = declaration_lines(file, identifier);
        let references = find_references(&file.content, identifier, &definition_lines);
        if references.is_empty() && definition_lines.is_empty() {
            return Scored::zero();
        }

        let kinds: BTreeSet<ReferenceKind> = references.iter().map(|r| r.kind).collect();
        let volume = ((1.0 + references.len() as f64).ln() / (1.0 + w.text_saturation).ln())
            .min(1.0);
        let mut score = w.usage_kind * kinds.len() as f64;
        if !references.is_empty() {
            score += w.usage_volume * volume;
        }
        if !definition_lines.is_empty() {
            score += w.usage_definition;
        }

        let mut ranges: Vec<MatchRange> = references
            .iter()
            .map(|r| MatchRange {
                start: r.start,
                end: r.end,
                line: r.line,
            })
            .collect();
        for line in &definition_lines {
            let start = subject.lines.line_start(*line);
            let end = subject.lines.line_end(*line);
            if let Some(pos) = word_occurrences(&file.content[start..end], identifier).next() {
                ranges.push(subject.range(start + pos, identifier.len()));
            }
        }
        ranges.sort_by_key(|r| r.start);

        Scored {
            score,
            matches: ranges.len(),
            match_ranges: cap_ranges(ranges),
        }
    }
}

/// Lines where this file declares `identifier`
fn declaration_lines(file: &FileAnalysis, identifier: &str) -> Vec<usize> {
    let mut lines: Vec<usize> = file
        .functions
        .iter()
        .filter(|f| f.name == identifier)
        .map(|f| f.line)
        .chain(file.classes.iter().filter(|c| c.name == identifier).map(|c| c.line))
        .chain(file.interfaces.iter().filter(|i| i.name == identifier).map(|i| i.line))
        .chain(file.types.iter().filter(|t| t.name == identifier).map(|t| t.line))
        .collect();
    lines.sort_unstable();
    lines.dedup();
    lines
}

fn cap_ranges(mut ranges: Vec<MatchRange>) -> Vec<MatchRange> {
    ranges.sort_by_key(|r| r.start);
    ranges.truncate(MAX_MATCH_RANGES);
    ranges
}

#[cfg(test)]
mod tests;
