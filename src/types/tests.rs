use super::*;

fn analysis(path: &str) -> FileAnalysis {
    FileAnalysis {
        path: format!("/ws/{}", path),
        relative_path: path.to_string(),
        content: String::new(),
        size_bytes: 0,
        language: Some(Language::TypeScript),
        relevance_score: 42.0,
        functions: vec![FunctionInfo {
            name: "login".to_string(),
            line: 3,
            parameters: vec!["user".to_string()],
            return_type: None,
            is_exported: true,
            owner: None,
        }],
        classes: vec![ClassInfo {
            name: "AuthService".to_string(),
            line: 1,
            methods: vec!["login".to_string()],
            properties: vec![],
            extends: None,
            implements: vec![],
            is_exported: true,
        }],
        interfaces: vec![Declaration {
            name: "Credentials".to_string(),
            line: 10,
            is_exported: false,
        }],
        types: vec![],
        imports: vec!["./db".to_string()],
        exports: vec![],
        match_ranges: vec![
            MatchRange {
                start: 40,
                end: 45,
                line: 4,
            },
            MatchRange {
                start: 10,
                end: 15,
                line: 2,
            },
        ],
        excerpts: vec![],
    }
}

#[test]
fn test_search_type_round_trip_str() {
    for ty in [
        SearchType::Keyword,
        SearchType::Function,
        SearchType::Class,
        SearchType::Usage,
        SearchType::Semantic,
    ] {
        assert_eq!(ty.as_str().parse::<SearchType>().unwrap(), ty);
    }
    assert!("fuzzy".parse::<SearchType>().is_err());
    assert_eq!(" Semantic ".parse::<SearchType>().unwrap(), SearchType::Semantic);
}

#[test]
fn test_search_type_serde_lowercase() {
    let json = serde_json::to_string(&SearchType::Usage).unwrap();
    assert_eq!(json, "\"usage\"");
}

#[test]
fn test_symbol_names_and_first_match() {
    let file = analysis("src/auth.ts");
    let names: Vec<&str> = file.symbol_names().collect();
    assert_eq!(names, vec!["login", "AuthService", "Credentials"]);
    assert_eq!(file.first_match_line(), 2);
    assert_eq!(file.file_name(), "auth.ts");
}

#[test]
fn test_without_score_clears_query_fields() {
    let file = analysis("src/auth.ts").without_score();
    assert_eq!(file.relevance_score, 0.0);
    assert!(file.match_ranges.is_empty());
    assert_eq!(file.first_match_line(), usize::MAX);
    assert_eq!(file.functions.len(), 1);
}

#[test]
fn test_file_analysis_camel_case_json() {
    let json = serde_json::to_value(analysis("src/auth.ts")).unwrap();
    assert!(json.get("relevanceScore").is_some());
    assert!(json.get("matchRanges").is_some());
    assert_eq!(json["functions"][0]["isExported"], true);
}

#[test]
fn test_options_deserialize_from_host_shape() {
    let options: SearchOptions = serde_json::from_str(
        r#"{"maxFiles": -4, "includeTests": true, "searchType": "class", "fuzzyThreshold": 3.5}"#,
    )
    .unwrap();
    assert_eq!(options.max_files, Some(-4));
    assert!(options.include_tests);
    assert_eq!(options.search_type, Some(SearchType::Class));
}

#[test]
fn test_resolve_defaults_per_search_type() {
    let config = Config::default();
    let options = SearchOptions::default();

    assert_eq!(options.resolve(&config, SearchType::Keyword).max_files, 10);
    assert_eq!(options.resolve(&config, SearchType::Function).max_files, 8);
    assert_eq!(options.resolve(&config, SearchType::Usage).max_files, 15);
    assert_eq!(options.resolve(&config, SearchType::Semantic).max_files, 12);

    let resolved = options.resolve(&config, SearchType::Keyword);
    assert!(resolved.adjustments.is_empty());
    assert_eq!(resolved.timeout_ms, Some(10_000));
    assert_eq!(resolved.max_hops, 2);
}

#[test]
fn test_resolve_clamps_malformed_values() {
    let config = Config::default();
    let options = SearchOptions {
        max_files: Some(-3),
        fuzzy_threshold: Some(1.7),
        max_file_size: Some(0),
        context_window: Some(-1),
        max_hops: Some(9),
        ..SearchOptions::default()
    };

    let resolved = options.resolve(&config, SearchType::Keyword);
    assert_eq!(resolved.max_files, 10);
    assert_eq!(resolved.fuzzy_threshold, 0.6);
    assert_eq!(resolved.max_file_size, 1_048_576);
    assert_eq!(resolved.context_window, 3);
    assert_eq!(resolved.max_hops, 3);
    assert_eq!(resolved.adjustments.len(), 5);
}

#[test]
fn test_resolve_caps_large_values() {
    let config = Config::default();
    let options = SearchOptions {
        max_files: Some(10_000),
        context_window: Some(500),
        fuzzy_threshold: Some(f64::NAN),
        ..SearchOptions::default()
    };

    let resolved = options.resolve(&config, SearchType::Keyword);
    assert_eq!(resolved.max_files, 50);
    assert_eq!(resolved.context_window, MAX_CONTEXT_WINDOW);
    assert_eq!(resolved.fuzzy_threshold, 0.6);
}

#[test]
fn test_resolve_zero_timeout_disables_deadline() {
    let config = Config::default();
    let options = SearchOptions {
        timeout_ms: Some(0),
        ..SearchOptions::default()
    };
    assert_eq!(options.resolve(&config, SearchType::Keyword).timeout_ms, None);
}

#[test]
fn test_resolve_merges_exclude_patterns() {
    let config = Config::default();
    let options = SearchOptions {
        exclude_patterns: vec!["generated".to_string(), "target".to_string()],
        ..SearchOptions::default()
    };
    let resolved = options.resolve(&config, SearchType::Keyword);
    assert!(resolved.exclude_patterns.contains(&"generated".to_string()));
    assert_eq!(
        resolved
            .exclude_patterns
            .iter()
            .filter(|p| p.as_str() == "target")
            .count(),
        1
    );
}

#[test]
fn test_empty_context() {
    let context = RetrievalContext::empty(SearchMetadata {
        query: "x".to_string(),
        search_type: SearchType::Keyword,
        time_ms: 0,
        total_files_scanned: 0,
        included_languages: vec![],
        excluded_patterns: vec![],
        timed_out: false,
        adjustments: vec![],
        cache_hits: 0,
    });
    assert!(context.is_empty());
    assert_eq!(context.total_matches, 0);
    assert!(!context.contains("src/auth.ts"));
}
