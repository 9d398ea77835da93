//! The blocking retrieval pipeline run on the worker pool

use super::RetrievalEngine;
use super::loader::build_excerpts;
use crate::analyzer::LineIndex;
use crate::indexer::{FileCandidate, FileWalker};
use crate::paths::resolve_in_workspace;
use crate::relations::{EdgeDirection, RelatedFile};
use crate::scorer::Scored;
use crate::search::QueryPlan;
use crate::types::{
    FileAnalysis, MatchRange, ResolvedOptions, RetrievalContext, SearchMetadata, SearchOptions,
    SearchType,
};
use rayon::prelude::*;
use std::cmp::Ordering as CmpOrdering;
use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Deadline and cancellation shared by the workers of one call
struct StopSignal<'a> {
    deadline: Option<Instant>,
    cancel: &'a CancellationToken,
    tripped: AtomicBool,
}

impl<'a> StopSignal<'a> {
    fn new(timeout_ms: Option<u64>, cancel: &'a CancellationToken) -> Self {
        Self {
            deadline: timeout_ms.map(|ms| Instant::now() + Duration::from_millis(ms)),
            cancel,
            tripped: AtomicBool::new(false),
        }
    }

    /// True once the deadline passed or the caller cancelled; latches
    fn should_stop(&self) -> bool {
        if self.tripped.load(Ordering::Relaxed) {
            return true;
        }
        let stop = self.cancel.is_cancelled() || self.deadline.is_some_and(|d| Instant::now() >= d);
        if stop {
            self.tripped.store(true, Ordering::Relaxed);
        }
        stop
    }

    fn tripped(&self) -> bool {
        self.tripped.load(Ordering::Relaxed)
    }
}

/// Counters shared by the workers of one call
#[derive(Default)]
struct Progress {
    scanned: AtomicUsize,
    cache_hits: AtomicUsize,
}

impl Progress {
    fn record(&self, cached: bool) {
        self.scanned.fetch_add(1, Ordering::Relaxed);
        if cached {
            self.cache_hits.fetch_add(1, Ordering::Relaxed);
        }
    }
}

impl RetrievalEngine {
    fn walker(&self, options: &ResolvedOptions) -> FileWalker {
        FileWalker::new(self.fs.clone(), self.root.as_path(), options.max_file_size)
            .with_patterns(&self.config.walker.include_patterns, &options.exclude_patterns)
            .with_languages(options.include_languages.clone())
            .with_tests(options.include_tests)
            .with_docs(options.include_docs)
            .with_ignore_files(self.config.walker.respect_ignore_files)
    }

    fn metadata(
        &self,
        query: &str,
        search_type: SearchType,
        options: &ResolvedOptions,
    ) -> SearchMetadata {
        SearchMetadata {
            query: query.to_string(),
            search_type,
            time_ms: 0,
            total_files_scanned: 0,
            included_languages: options.include_languages.clone(),
            excluded_patterns: options.exclude_patterns.clone(),
            timed_out: false,
            adjustments: options.adjustments.clone(),
            cache_hits: 0,
        }
    }

    /// Load and score one candidate; `None` for skipped or non-matching files
    fn score_candidate(
        &self,
        candidate: &FileCandidate,
        plan: &QueryPlan,
        options: &ResolvedOptions,
        progress: &Progress,
    ) -> Option<(Arc<FileAnalysis>, Scored)> {
        let (analysis, cached) = match self.load_with_stat(
            &candidate.path,
            candidate.modified,
            candidate.size,
            options.max_file_size,
        ) {
            Ok(loaded) => loaded,
            Err(e) => {
                tracing::debug!("Skipping {}: {}", candidate.relative_path, e);
                return None;
            }
        };
        progress.record(cached);

        let scored = self.scorer.score(&analysis, plan, options.fuzzy_threshold);
        let min_score = self.config.search.min_score;
        if scored.score <= 0.0 || scored.score < min_score {
            return None;
        }
        Some((analysis, scored))
    }

    pub(crate) fn run_query(
        &self,
        query: &str,
        options: &SearchOptions,
        cancel: &CancellationToken,
    ) -> RetrievalContext {
        let started = Instant::now();
        let plan = QueryPlan::new(query, options.search_type);
        let resolved = options.resolve(&self.config, plan.search_type);
        let mut metadata = self.metadata(&plan.query, plan.search_type, &resolved);

        if plan.is_empty() {
            tracing::debug!("Query '{}' has no searchable terms", query);
            metadata.time_ms = started.elapsed().as_millis() as u64;
            return RetrievalContext::empty(metadata);
        }

        tracing::info!(
            "Retrieving context for '{}' ({}, max {} files)",
            plan.query,
            plan.search_type,
            resolved.max_files
        );

        let walker = self.walker(&resolved);
        let stop = StopSignal::new(resolved.timeout_ms, cancel);
        let progress = Progress::default();

        // The walk feeds the pool lazily; workers stop pulling once the call is out of time
        let mut hits: Vec<(Arc<FileAnalysis>, Scored)> = self.pool.install(|| {
            walker
                .walk()
                .take_while(|_| !stop.should_stop())
                .par_bridge()
                .filter_map(|candidate| {
                    if stop.should_stop() {
                        return None;
                    }
                    self.score_candidate(&candidate, &plan, &resolved, &progress)
                })
                .collect()
        });

        let total_matches: usize = hits.iter().map(|(_, s)| s.matches).sum();
        if metadata.included_languages.is_empty() {
            let seen: BTreeSet<&str> = hits
                .iter()
                .filter_map(|(a, _)| a.language.map(|l| l.name()))
                .collect();
            metadata.included_languages = seen.into_iter().map(str::to_string).collect();
        }

        hits.sort_by(|(a, sa), (b, sb)| rank(a, sa, b, sb));
        hits.truncate(resolved.max_files);

        let files: Vec<FileAnalysis> = hits
            .into_iter()
            .map(|(analysis, scored)| {
                let excerpts = build_excerpts(
                    &analysis.content,
                    &scored.match_ranges,
                    resolved.context_window,
                );
                FileAnalysis {
                    relevance_score: scored.score,
                    match_ranges: scored.match_ranges,
                    excerpts,
                    ..(*analysis).clone()
                }
            })
            .collect();

        metadata.total_files_scanned = progress.scanned.load(Ordering::Relaxed);
        metadata.cache_hits = progress.cache_hits.load(Ordering::Relaxed);
        metadata.timed_out = stop.tripped();
        metadata.time_ms = started.elapsed().as_millis() as u64;

        if metadata.timed_out {
            tracing::warn!(
                "Retrieval for '{}' stopped early after {} files ({}ms)",
                plan.query,
                metadata.total_files_scanned,
                metadata.time_ms
            );
        }
        tracing::info!(
            "Found {} of {} scanned files for '{}' in {}ms",
            files.len(),
            metadata.total_files_scanned,
            plan.query,
            metadata.time_ms
        );

        finish(files, total_matches, metadata)
    }

    pub(crate) fn run_related(
        &self,
        path: &str,
        options: &SearchOptions,
        cancel: &CancellationToken,
    ) -> RetrievalContext {
        let started = Instant::now();
        let mut resolved = options.resolve(&self.config, SearchType::Keyword);
        if options.max_files.is_none() {
            let limit = self.config.search.max_files_limit.max(1);
            resolved.max_files = self.config.relations.max_files.clamp(1, limit);
        }
        let mut metadata = self.metadata(path, SearchType::Keyword, &resolved);

        let start_path = resolve_in_workspace(&self.root, path);
        let start = match self.load_path(&start_path, resolved.max_file_size) {
            Ok((analysis, _)) => analysis,
            Err(e) => {
                tracing::debug!("find_related_files: {}", e);
                metadata.time_ms = started.elapsed().as_millis() as u64;
                return RetrievalContext::empty(metadata);
            }
        };

        tracing::info!(
            "Finding files related to {} ({} hops, max {} files)",
            start.relative_path,
            resolved.max_hops,
            resolved.max_files
        );

        let walker = self.walker(&resolved);
        let stop = StopSignal::new(resolved.timeout_ms, cancel);
        let progress = Progress::default();

        let mut related = self.relations.traverse(
            &start,
            resolved.max_hops,
            resolved.max_files,
            |target| {
                if stop.should_stop() {
                    return None;
                }
                let candidate = walker.admit(target)?;
                let (analysis, cached) = self
                    .load_with_stat(
                        &candidate.path,
                        candidate.modified,
                        candidate.size,
                        resolved.max_file_size,
                    )
                    .ok()?;
                progress.record(cached);
                Some(analysis)
            },
        );

        if related.len() < resolved.max_files && !stop.should_stop() {
            let known: HashSet<PathBuf> = related
                .iter()
                .map(|r| PathBuf::from(&r.analysis.path))
                .chain(std::iter::once(start_path.clone()))
                .collect();
            let mut importers =
                self.importers_of(&start_path, &walker, &known, &resolved, &stop, &progress);
            importers.sort_by(|a, b| a.analysis.path.cmp(&b.analysis.path));
            let room = resolved.max_files - related.len();
            related.extend(importers.into_iter().take(room));
        }

        let total_matches = related.len();
        let mut files: Vec<FileAnalysis> = related
            .into_iter()
            .map(|rel| related_analysis(&rel, resolved.context_window))
            .collect();
        files.sort_by(|a, b| {
            b.relevance_score
                .total_cmp(&a.relevance_score)
                .then_with(|| a.relative_path.len().cmp(&b.relative_path.len()))
                .then_with(|| a.path.cmp(&b.path))
        });

        if metadata.included_languages.is_empty() {
            let seen: BTreeSet<&str> = files
                .iter()
                .filter_map(|f| f.language.map(|l| l.name()))
                .collect();
            metadata.included_languages = seen.into_iter().map(str::to_string).collect();
        }
        metadata.total_files_scanned = progress.scanned.load(Ordering::Relaxed);
        metadata.cache_hits = progress.cache_hits.load(Ordering::Relaxed);
        metadata.timed_out = stop.tripped();
        metadata.time_ms = started.elapsed().as_millis() as u64;

        tracing::info!(
            "Found {} files related to {} in {}ms",
            files.len(),
            start.relative_path,
            metadata.time_ms
        );

        finish(files, total_matches, metadata)
    }

    /// Workspace files whose imports resolve to `target`
    fn importers_of(
        &self,
        target: &Path,
        walker: &FileWalker,
        known: &HashSet<PathBuf>,
        options: &ResolvedOptions,
        stop: &StopSignal<'_>,
        progress: &Progress,
    ) -> Vec<RelatedFile> {
        self.pool.install(|| {
            walker
                .walk()
                .take_while(|_| !stop.should_stop())
                .filter(|candidate| !known.contains(&candidate.path))
                .par_bridge()
                .filter_map(|candidate| {
                    let (analysis, cached) = self
                        .load_with_stat(
                            &candidate.path,
                            candidate.modified,
                            candidate.size,
                            options.max_file_size,
                        )
                        .ok()?;
                    progress.record(cached);
                    let via = self.relations.import_of(&analysis, target)?;
                    Some(RelatedFile {
                        analysis,
                        hops: 1,
                        via,
                        direction: EdgeDirection::ImportedBy,
                    })
                })
                .collect()
        })
    }
}

/// Result order: score, then shallower path, then earlier first match, then path
fn rank(a: &FileAnalysis, sa: &Scored, b: &FileAnalysis, sb: &Scored) -> CmpOrdering {
    sb.score
        .total_cmp(&sa.score)
        .then_with(|| a.relative_path.len().cmp(&b.relative_path.len()))
        .then_with(|| first_line(&sa.match_ranges).cmp(&first_line(&sb.match_ranges)))
        .then_with(|| a.path.cmp(&b.path))
}

fn first_line(ranges: &[MatchRange]) -> usize {
    ranges.iter().map(|r| r.line).min().unwrap_or(usize::MAX)
}

/// Scored copy of a related file; importers highlight their import line
fn related_analysis(rel: &RelatedFile, context_window: usize) -> FileAnalysis {
    let content = &rel.analysis.content;
    let match_ranges: Vec<MatchRange> = match rel.direction {
        EdgeDirection::ImportedBy if !rel.via.is_empty() => content
            .find(&rel.via)
            .map(|start| MatchRange {
                start,
                end: start + rel.via.len(),
                line: LineIndex::new(content).line_of(start),
            })
            .into_iter()
            .collect(),
        _ => Vec::new(),
    };
    let excerpts = build_excerpts(content, &match_ranges, context_window);
    FileAnalysis {
        relevance_score: rel.score(),
        match_ranges,
        excerpts,
        ..(*rel.analysis).clone()
    }
}

fn finish(
    files: Vec<FileAnalysis>,
    total_matches: usize,
    metadata: SearchMetadata,
) -> RetrievalContext {
    let relevance_score = if files.is_empty() {
        0.0
    } else {
        files.iter().map(|f| f.relevance_score).sum::<f64>() / files.len() as f64 / 100.0
    };
    RetrievalContext {
        files,
        relevance_score,
        total_matches,
        search_metadata: metadata,
    }
}
