//! Search strategy dispatch.
//!
//! A [`QueryPlan`] is built once per call: it fixes the search type (explicit
//! or classified), the keyword tokens, the symbol a function/class/usage
//! search targets, and the expanded terms a semantic search scores.

mod classify;
mod expansion;

pub use classify::{CLASS_KEYWORDS, classify, is_code_identifier, words};
pub use expansion::{expand, split_identifier, stem, tokenize};

use crate::types::SearchType;

/// Everything the scorer needs to know about a query
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    /// Query as given, trimmed
    pub query: String,
    pub search_type: SearchType,
    /// Lowercase keyword tokens
    pub tokens: Vec<String>,
    /// Identifier targeted by symbol and usage searches, original case
    pub symbol: Option<String>,
    /// Lowercase terms for semantic scoring, query tokens first
    pub expansions: Vec<String>,
}

impl QueryPlan {
    /// Plan a query, classifying it unless `search_type` is given
    pub fn new(query: &str, search_type: Option<SearchType>) -> Self {
        let query = query.trim();
        let search_type = search_type.unwrap_or_else(|| classify(query));
        let tokens = tokenize(query);
        let symbol = extract_symbol(query);
        let expansions = if search_type == SearchType::Semantic {
            let kept: Vec<&str> = words(query)
                .into_iter()
                .filter(|w| tokens.contains(&w.to_ascii_lowercase()))
                .collect();
            expand(&kept)
        } else {
            tokens.clone()
        };

        tracing::debug!(
            "Planned query '{}' as {} ({} tokens, symbol {:?}, {} terms)",
            query,
            search_type,
            tokens.len(),
            symbol,
            expansions.len()
        );

        Self {
            query: query.to_string(),
            search_type,
            tokens,
            symbol,
            expansions,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty() && self.symbol.is_none()
    }
}

/// The identifier a symbol search is about.
///
/// Prefers a word shaped like a code identifier, then the first word that is
/// neither a class keyword nor a stopword. `greet()` and `.greet` both yield `greet`.
fn extract_symbol(query: &str) -> Option<String> {
    let words = words(query);
    words
        .iter()
        .find(|w| is_code_identifier(w))
        .or_else(|| {
            words.iter().find(|w| {
                let lower = w.to_ascii_lowercase();
                !CLASS_KEYWORDS.contains(&lower.as_str()) && tokenize(&lower).contains(&lower)
            })
        })
        .map(|w| w.to_string())
}
