//! Heuristic query classification

use crate::types::SearchType;

/// Words that put a query in class context
pub const CLASS_KEYWORDS: &[&str] = &[
    "class", "interface", "struct", "trait", "type", "enum", "record",
];

/// Whitespace-separated words with surrounding punctuation stripped
pub fn words(query: &str) -> Vec<&str> {
    query
        .split_whitespace()
        .map(|w| {
            w.trim_matches(|c: char| !(c.is_alphanumeric() || c == '_' || c == '$'))
        })
        .filter(|w| !w.is_empty())
        .collect()
}

/// camelCase, PascalCase or snake_case identifier
pub fn is_code_identifier(word: &str) -> bool {
    let mut chars = word.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(first.is_ascii_alphabetic() || first == '_' || first == '$') {
        return false;
    }
    if !word.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$') {
        return false;
    }

    let snake = word.trim_matches('_').contains('_');
    let has_lower = word.chars().any(|c| c.is_ascii_lowercase());
    let inner_upper = word.chars().skip(1).any(|c| c.is_ascii_uppercase());
    let camel = first.is_ascii_lowercase() && inner_upper;
    let pascal = first.is_ascii_uppercase() && has_lower && inner_upper;
    snake || camel || pascal
}

/// Single capitalized word such as `Router`
fn is_capitalized(word: &str) -> bool {
    word.chars().next().is_some_and(|c| c.is_ascii_uppercase())
        && word.chars().any(|c| c.is_ascii_lowercase())
        && word.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn is_class_keyword(word: &str) -> bool {
    CLASS_KEYWORDS.iter().any(|k| word.eq_ignore_ascii_case(k))
}

/// Pick a search type for a query that did not name one.
///
/// Rules run in order and anything ambiguous lands on `Keyword`:
/// 1. at most three words, one shaped like a code identifier, no class keyword: `Function`
/// 2. a class keyword next to a capitalized or identifier word, or one capitalized
///    word alone: `Class`
/// 3. more than three words and no identifier: `Semantic`
pub fn classify(query: &str) -> SearchType {
    let raw_words: Vec<&str> = query.split_whitespace().collect();
    let words = words(query);
    let count = raw_words.len();
    let has_identifier = words.iter().any(|w| is_code_identifier(w));
    let class_context = words.iter().any(|w| is_class_keyword(w));
    let called = raw_words.iter().any(|w| w.ends_with("()"));

    if count == 0 {
        return SearchType::Keyword;
    }

    if count <= 3 && (has_identifier || called) && !class_context {
        return SearchType::Function;
    }

    if class_context {
        let named = words.iter().enumerate().any(|(i, w)| {
            is_class_keyword(w)
                && [i.checked_sub(1), Some(i + 1)]
                    .into_iter()
                    .flatten()
                    .filter_map(|j| words.get(j))
                    .any(|n| !is_class_keyword(n) && (is_capitalized(n) || is_code_identifier(n)))
        });
        if named {
            return SearchType::Class;
        }
    } else if count == 1 && words.first().is_some_and(|w| is_capitalized(w)) {
        return SearchType::Class;
    }

    if count > 3 && !has_identifier {
        return SearchType::Semantic;
    }

    SearchType::Keyword
}
