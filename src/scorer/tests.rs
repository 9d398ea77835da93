use super::*;
use crate::analyzer::FileStructure;
use crate::indexer::Language;
use crate::types::{ClassInfo, FunctionInfo};
use std::path::Path;

fn file(relative: &str, content: &str) -> FileAnalysis {
    FileAnalysis::new(
        format!("/ws/{}", relative),
        relative.to_string(),
        content.to_string(),
        Language::from_path(Path::new(relative)),
        FileStructure::default(),
    )
}

fn function(name: &str, line: usize) -> FunctionInfo {
    FunctionInfo {
        name: name.to_string(),
        line,
        parameters: vec![],
        return_type: None,
        is_exported: true,
        owner: None,
    }
}

fn class(name: &str, line: usize) -> ClassInfo {
    ClassInfo {
        name: name.to_string(),
        line,
        methods: vec![],
        properties: vec![],
        extends: None,
        implements: vec![],
        is_exported: true,
    }
}

fn score(file: &FileAnalysis, query: &str, search_type: SearchType) -> Scored {
    RelevanceScorer::new().score(file, &QueryPlan::new(query, Some(search_type)), 0.6)
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 0.01
}

#[test]
fn test_keyword_file_name_boost() {
    let content = "fn evict() {}\n// cache eviction\n";
    let named = score(&file("src/cache.rs", content), "cache", SearchType::Keyword);
    let other = score(&file("src/other.rs", content), "cache", SearchType::Keyword);

    assert!(approx(named.score - other.score, 25.0));
    assert_eq!(other.match_ranges.len(), 1);
    assert_eq!(other.match_ranges[0].line, 2);
    assert_eq!(&content[other.match_ranges[0].start..other.match_ranges[0].end], "cache");
}

#[test]
fn test_keyword_symbol_boost_beats_plain_text() {
    let content = "function evictCache() {}\n";
    let mut with_symbol = file("src/a.ts", content);
    with_symbol.functions.push(function("evictCache", 1));
    let plain = file("src/b.ts", content);

    let boosted = score(&with_symbol, "cache", SearchType::Keyword);
    let unboosted = score(&plain, "cache", SearchType::Keyword);
    assert!(approx(boosted.score - unboosted.score, 25.0));

    let mut exact = file("src/c.ts", "function cache() {}\n");
    exact.functions.push(function("cache", 1));
    let exact_score = score(&exact, "cache", SearchType::Keyword).score;
    assert!(exact_score > boosted.score);
}

#[test]
fn test_keyword_averages_over_tokens() {
    let content = "token rotation\n";
    let single = score(&file("src/x.ts", content), "token", SearchType::Keyword);
    let double = score(&file("src/x.ts", content), "token missing", SearchType::Keyword);
    assert!(approx(single.score / 2.0, double.score));
}

#[test]
fn test_keyword_matches_non_ascii_terms() {
    let content = "// Überprüfung der Benutzer\n";
    let scored = score(&file("src/check.ts", content), "Überprüfung", SearchType::Keyword);
    assert!(scored.score > 0.0);
    assert_eq!(scored.matches, 1);
    let range = &scored.match_ranges[0];
    assert_eq!(&content[range.start..range.end], "Überprüfung");
}

#[test]
fn test_keyword_caps_match_ranges() {
    let content = "xx ".repeat(100);
    let scored = score(&file("src/x.ts", &content), "xx", SearchType::Keyword);
    assert_eq!(scored.matches, 100);
    assert_eq!(scored.match_ranges.len(), MAX_MATCH_RANGES);
    assert!(scored.score <= 100.0);
}

#[test]
fn test_empty_query_scores_zero() {
    let scored = score(&file("src/x.ts", "anything"), "the of", SearchType::Keyword);
    assert_eq!(scored.score, 0.0);
    assert!(scored.match_ranges.is_empty());
}

#[test]
fn test_function_tiers() {
    let mut target = file(
        "src/auth.ts",
        "function authenticate(user) {\n  return check(user);\n}\n",
    );
    target.functions.push(function("authenticate", 1));

    assert_eq!(score(&target, "authenticate", SearchType::Function).score, 100.0);
    assert_eq!(score(&target, "Authenticate", SearchType::Function).score, 95.0);
    assert!(approx(
        score(&target, "auth", SearchType::Function).score,
        60.0 + 25.0 * 4.0 / 12.0
    ));
    assert!(approx(
        score(&target, "authentcate", SearchType::Function).score,
        30.0 + 30.0 * (11.0 / 12.0)
    ));

    let exact = score(&target, "authenticate", SearchType::Function);
    assert_eq!(exact.match_ranges.len(), 1);
    assert_eq!(exact.match_ranges[0].line, 1);
}

#[test]
fn test_fuzzy_threshold_gates_lower_tier() {
    let mut target = file("src/auth.ts", "function authenticate() {}\n");
    target.functions.push(function("authenticate", 1));

    let plan = QueryPlan::new("authentcate", Some(SearchType::Function));
    let strict = RelevanceScorer::new().score(&target, &plan, 0.95);
    assert_eq!(strict.score, 0.0);
}

#[test]
fn test_function_miss_falls_back_to_half_keyword() {
    let content = "// login happens elsewhere\n";
    let target = file("src/notes.ts", content);
    let keyword = score(&target, "login", SearchType::Keyword).score;
    let function = score(&target, "login", SearchType::Function).score;
    assert!(keyword > 0.0);
    assert!(approx(function, keyword * 0.5));
}

#[test]
fn test_class_search_ignores_functions() {
    let mut functions_only = file("src/a.ts", "function UserService() {}\n");
    functions_only.functions.push(function("UserService", 1));
    let mut with_class = file("src/b.ts", "class UserService {}\n");
    with_class.classes.push(class("UserService", 1));

    assert_eq!(score(&with_class, "UserService", SearchType::Class).score, 100.0);
    assert!(score(&functions_only, "UserService", SearchType::Class).score < 100.0);
}

#[test]
fn test_usage_rewards_distinct_kinds() {
    let varied = file(
        "src/app.ts",
        "import { greet } from './greet';\ngreet('a');\nconst g = new Greeter();\n",
    );
    let repetitive = file("src/loop.ts", &"greet();\n".repeat(5));

    let varied_score = score(&varied, "greet", SearchType::Usage);
    let repetitive_score = score(&repetitive, "greet", SearchType::Usage);

    assert!(varied_score.score > repetitive_score.score);
    assert_eq!(varied_score.match_ranges.len(), 3);
    assert_eq!(repetitive_score.match_ranges.len(), 5);
}

#[test]
fn test_usage_definition_only() {
    let mut definer = file("src/greet.ts", "function greet() {}\n");
    definer.functions.push(function("greet", 1));

    let scored = score(&definer, "greet", SearchType::Usage);
    assert_eq!(scored.score, 10.0);
    assert_eq!(scored.match_ranges.len(), 1);
    assert_eq!(scored.match_ranges[0].start, 9);
}

#[test]
fn test_usage_absent_identifier() {
    let scored = score(&file("src/x.ts", "const greeting = 1;"), "greet", SearchType::Usage);
    assert_eq!(scored, Scored::default());
}

#[test]
fn test_semantic_scores_expansions() {
    let mut related = file(
        "src/user_service.ts",
        "export class AuthToken {}\nexport class UserService {}\n",
    );
    related.classes.push(class("AuthToken", 1));
    related.classes.push(class("UserService", 2));
    let unrelated = file("src/math.ts", "export function add(a, b) { return a + b; }\n");

    let query = "user authentication system";
    let related_score = score(&related, query, SearchType::Semantic);
    let unrelated_score = score(&unrelated, query, SearchType::Semantic);

    assert!(related_score.score > 50.0);
    assert_eq!(unrelated_score.score, 0.0);
    // Ranges from every contributing term, e.g. "auth" inside AuthToken
    assert!(related_score.match_ranges.iter().any(|r| r.line == 1));
}

#[test]
fn test_semantic_is_best_single_term() {
    let mut related = file(
        "src/user_service.ts",
        "export class AuthToken {}\nexport class UserService {}\n",
    );
    related.classes.push(class("AuthToken", 1));
    related.classes.push(class("UserService", 2));

    let semantic = score(&related, "user authentication system", SearchType::Semantic).score;
    let best_term = score(&related, "user", SearchType::Keyword).score;
    assert!(approx(semantic, best_term));
}

#[test]
fn test_custom_weights() {
    let weights = ScoreWeights {
        file_name: 0.0,
        ..ScoreWeights::default()
    };
    let scorer = RelevanceScorer::with_weights(weights);
    let target = file("src/cache.rs", "nothing here");
    let plan = QueryPlan::new("cache", Some(SearchType::Keyword));
    assert_eq!(scorer.score(&target, &plan, 0.6).score, 0.0);
    assert_eq!(scorer.weights().file_name, 0.0);
}
