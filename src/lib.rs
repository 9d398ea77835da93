//! # Code Context - Workspace-wide Code Context Retrieval
//!
//! A Rust library (and CLI) that answers a natural-language or identifier query
//! with the most relevant source files of a workspace, ready to be placed into
//! a language model prompt.
//!
//! ## Overview
//!
//! Nothing is indexed ahead of time. Every call walks the workspace, extracts a
//! structural outline of each candidate file with per-language heuristics,
//! scores it against the query with a strategy picked from the query's shape,
//! and returns the top files with match ranges and excerpts.
//!
//! ## Key Features
//!
//! - **Query Classification**: keyword, function, class, usage and semantic strategies
//! - **Structural Analysis**: functions, classes, interfaces, types, imports and exports
//!   for TypeScript, JavaScript, Python, Rust, Go, Java and C#
//! - **Concept Expansion**: semantic queries are widened with related terms and stems
//! - **Related Files**: breadth-first import traversal plus reverse importers
//! - **Bounded Work**: worker pool, per-call deadline and cancellation
//! - **Analysis Cache**: in-memory LRU keyed by path and modification time
//!
//! ## Architecture
//!
//! ```text
//!            query
//!              |
//!     +--------v---------+
//!     | RetrievalEngine  |  classify -> QueryPlan
//!     +--------+---------+
//!              |
//!   FileWalker | lazy candidates
//!              v
//!   +----------+----------+
//!   |  rayon worker pool  |  load (cache) -> analyze -> score
//!   +----------+----------+
//!              |
//!      sort, truncate, excerpts
//!              v
//!       RetrievalContext  --> format_context / JSON
//! ```
//!
//! ## Modules
//!
//! - [`engine`]: The [`RetrievalEngine`] orchestrator
//! - [`indexer`]: Language detection and workspace walking
//! - [`analyzer`]: Rule-based structural extraction
//! - [`scorer`]: Relevance scoring strategies
//! - [`search`]: Query classification and expansion
//! - [`relations`]: Import resolution and related-file traversal
//! - [`cache`]: In-memory analysis cache
//! - [`format`]: Markdown rendering of results
//! - [`config`]: Configuration management with environment variable support
//! - [`types`]: Request/response data model with JSON schema
//! - [`error`]: Error types and result aliases
//!
//! ## Usage Example
//!
//! ```no_run
//! use code_context::{Config, RetrievalEngine, SearchOptions};
//! use code_context::format::{FormatOptions, format_context};
//!
//! #[tokio::main]
//! async fn main() -> code_context::Result<()> {
//!     let engine = RetrievalEngine::with_config(Config::for_workspace("."))?;
//!     let context = engine
//!         .retrieve_context("where is the user authentication handled", SearchOptions::default())
//!         .await?;
//!
//!     println!("{}", format_context(&context, &FormatOptions::default()));
//!     Ok(())
//! }
//! ```

/// Heuristic structural extraction driven by per-language rule sets
pub mod analyzer;

/// Bounded in-memory cache of file analyses
pub mod cache;

/// Configuration management with environment variable overrides
pub mod config;

/// Retrieval engine orchestrating walk, analysis and scoring
pub mod engine;

/// Error types and utilities
pub mod error;

/// Markdown prompt rendering for retrieval results
pub mod format;

/// File system abstraction used by the engine
pub mod fs;

/// Exclusion/inclusion pattern matching
pub mod glob_utils;

/// File walking and language detection
pub mod indexer;

/// Path normalization and utility functions
pub mod paths;

/// Import resolution and related-file discovery
pub mod relations;

/// Relevance scoring
pub mod scorer;

/// Query classification, tokenization and expansion
pub mod search;

/// Request/response types with JSON schema definitions
pub mod types;

pub use config::Config;
pub use engine::RetrievalEngine;
pub use error::{ContextError, Result};
pub use types::{FileAnalysis, RetrievalContext, SearchMetadata, SearchOptions, SearchType};
