//! Retrieval engine: the public entry point of the crate
//!
//! This module provides [`RetrievalEngine`], a cheaply clonable service object
//! that binds one workspace root and coordinates the walker, analyzer, scorer,
//! dispatcher and dependency resolver.

mod loader;
mod pipeline;

pub use loader::{MAX_EXCERPTS, build_excerpts, decode_content};

use crate::analyzer::StructuralAnalyzer;
use crate::cache::{AnalysisCache, CacheStats};
use crate::config::Config;
use crate::error::{ContextError, Result, WorkspaceError};
use crate::fs::{FileSystem, LocalFileSystem};
use crate::paths::{normalize_lexically, resolve_in_workspace};
use crate::relations::{DependencyResolver, WorkspaceResolver};
use crate::scorer::RelevanceScorer;
use crate::types::{FileAnalysis, RetrievalContext, SearchOptions, SearchType};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Main engine for retrieving code context from a workspace
///
/// All operations are read-only and safe to call concurrently; the only
/// shared mutable state is the analysis cache.
///
/// # Example
///
/// ```no_run
/// use code_context::{Config, RetrievalEngine, SearchOptions};
///
/// #[tokio::main]
/// async fn main() -> code_context::Result<()> {
///     let engine = RetrievalEngine::with_config(Config::for_workspace("/path/to/repo"))?;
///
///     let context = engine
///         .retrieve_context("authenticate", SearchOptions::default())
///         .await?;
///     for file in &context.files {
///         println!("{} ({:.1})", file.relative_path, file.relevance_score);
///     }
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct RetrievalEngine {
    pub(crate) root: Arc<PathBuf>,
    pub(crate) fs: Arc<dyn FileSystem>,
    pub(crate) analyzer: StructuralAnalyzer,
    pub(crate) scorer: Arc<RelevanceScorer>,
    pub(crate) relations: DependencyResolver,
    // Read-through cache of unscored analyses, keyed by path + mtime
    pub(crate) cache: Arc<AnalysisCache>,
    pub(crate) config: Arc<Config>,
    // Bounded pool for the per-file analysis fan-out
    pub(crate) pool: Arc<rayon::ThreadPool>,
}

impl RetrievalEngine {
    /// Create an engine from the layered configuration (file + environment)
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or names no
    /// usable workspace root.
    pub fn new() -> Result<Self> {
        let config = Config::new()?;
        Self::with_config(config)
    }

    /// Create an engine over the local file system
    pub fn with_config(config: Config) -> Result<Self> {
        Self::with_file_system(config, Arc::new(LocalFileSystem))
    }

    /// Create an engine over any [`FileSystem`] implementation
    pub fn with_file_system(config: Config, fs: Arc<dyn FileSystem>) -> Result<Self> {
        config.validate()?;

        let root = config
            .workspace
            .root
            .clone()
            .ok_or(WorkspaceError::NotConfigured)?;
        let root = if root.is_absolute() {
            normalize_lexically(&root)
        } else {
            normalize_lexically(&std::env::current_dir()?.join(root))
        };

        match fs.stat(&root) {
            Ok(stat) if stat.is_dir => {}
            Ok(_) => return Err(WorkspaceError::NotADirectory(root.display().to_string()).into()),
            Err(_) => return Err(WorkspaceError::RootNotFound(root.display().to_string()).into()),
        }

        let threads = match config.engine.worker_threads {
            0 => std::thread::available_parallelism().map_or(4, |n| n.get()),
            n => n,
        };
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("code-context-worker-{}", i))
            .build()
            .map_err(|e| ContextError::other(format!("Failed to build worker pool: {}", e)))?;

        let cache = if config.cache.enabled {
            AnalysisCache::new(config.cache.capacity)
        } else {
            AnalysisCache::disabled()
        };

        tracing::info!("Initializing retrieval engine for {}", root.display());
        tracing::debug!("Worker threads: {}", threads);
        tracing::debug!(
            "Analysis cache: {} (capacity {})",
            if cache.is_enabled() { "enabled" } else { "disabled" },
            config.cache.capacity
        );

        let analyzer = StructuralAnalyzer::new()?;
        tracing::debug!(
            "Structural analysis for: {:?}",
            analyzer.registry().languages()
        );
        let relations =
            DependencyResolver::new(Arc::new(WorkspaceResolver::new(fs.clone(), root.clone())));

        Ok(Self {
            root: Arc::new(root),
            fs,
            analyzer,
            scorer: Arc::new(RelevanceScorer::new()),
            relations,
            cache: Arc::new(cache),
            config: Arc::new(config),
            pool: Arc::new(pool),
        })
    }

    /// Replace the scorer, e.g. to run with custom weights
    pub fn with_scorer(mut self, scorer: RelevanceScorer) -> Self {
        self.scorer = Arc::new(scorer);
        self
    }

    /// Workspace root the engine is bound to
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the full pipeline: classify, walk, analyze, score, truncate
    pub async fn retrieve_context(
        &self,
        query: &str,
        options: SearchOptions,
    ) -> Result<RetrievalContext> {
        self.retrieve_context_with_cancel(query, options, CancellationToken::new())
            .await
    }

    /// [`Self::retrieve_context`] that stops early when `cancel` fires.
    ///
    /// A cancelled call still succeeds and returns what was scored so far,
    /// with `search_metadata.timed_out` set.
    pub async fn retrieve_context_with_cancel(
        &self,
        query: &str,
        options: SearchOptions,
        cancel: CancellationToken,
    ) -> Result<RetrievalContext> {
        let engine = self.clone();
        let query = query.to_string();
        tokio::task::spawn_blocking(move || engine.run_query(&query, &options, &cancel))
            .await
            .map_err(|e| ContextError::TaskFailed(e.to_string()))
    }

    /// Retrieve with the semantic strategy regardless of the query's shape
    pub async fn semantic_search(
        &self,
        query: &str,
        options: SearchOptions,
    ) -> Result<RetrievalContext> {
        self.retrieve_context(query, options.with_search_type(SearchType::Semantic))
            .await
    }

    /// Files referencing `identifier`, ranked by how many kinds of reference they hold
    pub async fn find_usages(
        &self,
        identifier: &str,
        options: SearchOptions,
    ) -> Result<RetrievalContext> {
        self.retrieve_context(identifier, options.with_search_type(SearchType::Usage))
            .await
    }

    /// Files connected to `path` through import edges.
    ///
    /// A path that does not exist yields an empty context, not an error.
    pub async fn find_related_files(
        &self,
        path: &str,
        options: SearchOptions,
    ) -> Result<RetrievalContext> {
        let engine = self.clone();
        let path = path.to_string();
        tokio::task::spawn_blocking(move || {
            engine.run_related(&path, &options, &CancellationToken::new())
        })
        .await
        .map_err(|e| ContextError::TaskFailed(e.to_string()))
    }

    /// Structural analysis of one file, `None` when it does not exist or
    /// cannot be read as text
    pub async fn analyze_file(&self, path: &str) -> Result<Option<FileAnalysis>> {
        let engine = self.clone();
        let path = path.to_string();
        tokio::task::spawn_blocking(move || engine.analyze_path(&path))
            .await
            .map_err(|e| ContextError::TaskFailed(e.to_string()))
    }

    pub(crate) fn analyze_path(&self, path: &str) -> Option<FileAnalysis> {
        let absolute = resolve_in_workspace(&self.root, path);
        match self.load_path(&absolute, self.config.walker.max_file_size) {
            Ok((analysis, _)) => Some(analysis.without_score()),
            Err(e) => {
                tracing::debug!("analyze_file: {}", e);
                None
            }
        }
    }

    /// Drop every cached analysis
    pub fn invalidate(&self) {
        tracing::debug!("Invalidating analysis cache");
        self.cache.invalidate_all();
    }

    /// Drop the cached analysis of one path. Returns whether it was cached.
    pub fn invalidate_path(&self, path: &str) -> bool {
        self.cache.invalidate(&resolve_in_workspace(&self.root, path))
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}
