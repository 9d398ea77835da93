//! Query tokenization and semantic term expansion

use std::collections::HashSet;

/// Words with no retrieval value on their own
const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "code", "do", "does", "for", "from", "how",
    "in", "is", "it", "me", "of", "on", "or", "show", "that", "the", "this", "to", "what", "where",
    "which", "who", "why", "with", "work", "works",
];

/// Concept groups. A token belonging to a group expands to every member.
const CONCEPTS: &[&[&str]] = &[
    &[
        "auth",
        "authenticate",
        "authentication",
        "login",
        "logout",
        "signin",
        "credential",
        "password",
        "token",
        "session",
    ],
    &["permission", "authorize", "authorization", "role", "access", "policy"],
    &["user", "account", "profile", "member"],
    &["config", "configuration", "settings", "options", "preferences", "env"],
    &["database", "db", "repository", "query", "sql", "storage", "persist"],
    &["error", "exception", "failure", "fault", "panic"],
    &["http", "request", "response", "api", "endpoint", "route", "handler", "fetch"],
    &["test", "spec", "mock", "fixture", "assert"],
    &["cache", "memo", "memoize", "lru"],
    &["log", "logger", "logging", "trace"],
    &["parse", "parser", "tokenize", "lexer", "deserialize"],
    &["file", "path", "directory", "folder"],
    &["notification", "notify", "email", "message", "alert"],
    &["payment", "billing", "invoice", "charge", "checkout"],
    &["search", "find", "lookup", "index"],
    &["validate", "validation", "validator", "sanitize"],
];

const SUFFIXES: &[&str] = &["ations", "ation", "ing", "ers", "er", "ed", "es", "s"];

pub fn is_stopword(word: &str) -> bool {
    STOPWORDS.contains(&word)
}

/// Lowercase tokens of a query, stopwords and one-letter words dropped
pub fn tokenize(query: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    query
        .split(|c: char| !(c.is_alphanumeric() || c == '_' || c == '$'))
        .map(str::to_ascii_lowercase)
        .filter(|t| t.chars().count() > 1 && !is_stopword(t))
        .filter(|t| seen.insert(t.clone()))
        .collect()
}

/// Split an identifier into lowercase words: `parseHTTPConfig` becomes
/// `parse`, `http`, `config`; `max_file_size` becomes `max`, `file`, `size`.
pub fn split_identifier(ident: &str) -> Vec<String> {
    let mut parts = Vec::new();
    for piece in ident.split(['_', '-', '$']).filter(|p| !p.is_empty()) {
        let chars: Vec<char> = piece.chars().collect();
        let mut current = String::new();
        for (i, &c) in chars.iter().enumerate() {
            let boundary = i > 0
                && c.is_uppercase()
                && (chars[i - 1].is_lowercase()
                    || chars[i - 1].is_ascii_digit()
                    || chars.get(i + 1).is_some_and(|n| n.is_lowercase()));
            if boundary && !current.is_empty() {
                parts.push(current.to_ascii_lowercase());
                current.clear();
            }
            current.push(c);
        }
        if !current.is_empty() {
            parts.push(current.to_ascii_lowercase());
        }
    }
    parts
}

/// Crude suffix stripping, never below four characters
pub fn stem(word: &str) -> &str {
    for suffix in SUFFIXES {
        if let Some(base) = word.strip_suffix(suffix)
            && base.len() >= 4
        {
            return base;
        }
    }
    word
}

fn in_concept(token: &str, member: &str) -> bool {
    token == member
        || (member.len() >= 4 && token.starts_with(member))
        || (token.len() >= 4 && member.starts_with(token))
}

/// Expand tokens into a deterministic, duplicate-free list of search terms.
///
/// Each token contributes itself, its identifier parts, its stem and every
/// member of any concept group it belongs to.
pub fn expand(words: &[&str]) -> Vec<String> {
    let mut terms = Vec::new();
    let mut seen = HashSet::new();
    let mut push = |term: &str| {
        let term = term.to_ascii_lowercase();
        if term.chars().count() > 1 && !is_stopword(&term) && seen.insert(term.clone()) {
            terms.push(term);
        }
    };

    for word in words {
        let mut pieces = vec![word.to_ascii_lowercase()];
        pieces.extend(split_identifier(word));

        for piece in &pieces {
            push(piece.as_str());
            push(stem(piece));
        }
        for piece in &pieces {
            for group in CONCEPTS {
                if group.iter().any(|member| in_concept(piece, member)) {
                    for &member in *group {
                        push(member);
                    }
                }
            }
        }
    }
    terms
}
