use anyhow::{Context as _, Result};
use clap::{Args, Parser, Subcommand};
use code_context::format::{FormatOptions, format_context};
use code_context::{
    Config, FileAnalysis, RetrievalContext, RetrievalEngine, SearchOptions, SearchType,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GIT_COMMIT_HASH"),
    ", built ",
    env!("BUILD_TIMESTAMP"),
    ")"
);

#[derive(Parser, Debug)]
#[command(
    name = "code-context",
    version = VERSION,
    about = "Retrieve relevant code context from a workspace"
)]
struct Cli {
    /// Workspace root (defaults to the configured root, then the current directory)
    #[arg(long, global = true, env = "CODE_CONTEXT_WORKSPACE")]
    root: Option<PathBuf>,

    /// Configuration file to load instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Retrieve context for a query, classifying it unless --type is given
    Search {
        query: String,
        /// keyword, function, class, usage or semantic
        #[arg(long = "type")]
        search_type: Option<SearchType>,
        #[command(flatten)]
        args: SearchArgs,
    },
    /// Concept-expanded search for a natural-language question
    Semantic {
        query: String,
        #[command(flatten)]
        args: SearchArgs,
    },
    /// Files referencing an identifier
    Usages {
        identifier: String,
        #[command(flatten)]
        args: SearchArgs,
    },
    /// Files connected to a file through imports
    Related {
        path: String,
        /// Import hops to follow (1-3)
        #[arg(long)]
        max_hops: Option<i64>,
        #[command(flatten)]
        args: SearchArgs,
    },
    /// Structural outline of one file
    Analyze { path: String },
    /// Print the effective configuration as TOML
    Config,
}

#[derive(Args, Debug)]
struct SearchArgs {
    /// Maximum number of files returned
    #[arg(long, short = 'n')]
    max_files: Option<i64>,
    /// Include test files
    #[arg(long)]
    tests: bool,
    /// Include documentation files
    #[arg(long)]
    docs: bool,
    /// Restrict to languages (names or extensions), repeatable
    #[arg(long = "lang")]
    languages: Vec<String>,
    /// Extra exclusion patterns, repeatable
    #[arg(long)]
    exclude: Vec<String>,
    /// Lines of context around each match
    #[arg(long)]
    context: Option<i64>,
    /// Deadline in milliseconds, 0 disables it
    #[arg(long)]
    timeout_ms: Option<u64>,
    /// Upper bound on text output length
    #[arg(long, default_value_t = 24_000)]
    max_chars: usize,
}

impl SearchArgs {
    fn options(&self) -> SearchOptions {
        SearchOptions {
            max_files: self.max_files,
            include_tests: self.tests,
            include_docs: self.docs,
            include_languages: (!self.languages.is_empty()).then(|| self.languages.clone()),
            context_window: self.context,
            exclude_patterns: self.exclude.clone(),
            timeout_ms: self.timeout_ms,
            ..Default::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    if let Commands::Config = cli.command {
        print!("{}", toml::to_string_pretty(&config).context("serialize configuration")?);
        return Ok(());
    }

    let engine = RetrievalEngine::with_config(config)?;
    match cli.command {
        Commands::Search {
            query,
            search_type,
            args,
        } => {
            let mut options = args.options();
            options.search_type = search_type;
            let context = engine.retrieve_context(&query, options).await?;
            print_context(&context, &args, cli.json)
        }
        Commands::Semantic { query, args } => {
            let context = engine.semantic_search(&query, args.options()).await?;
            print_context(&context, &args, cli.json)
        }
        Commands::Usages { identifier, args } => {
            let context = engine.find_usages(&identifier, args.options()).await?;
            print_context(&context, &args, cli.json)
        }
        Commands::Related {
            path,
            max_hops,
            args,
        } => {
            let options = SearchOptions {
                max_hops,
                ..args.options()
            };
            let context = engine.find_related_files(&path, options).await?;
            print_context(&context, &args, cli.json)
        }
        Commands::Analyze { path } => match engine.analyze_file(&path).await? {
            Some(analysis) if cli.json => {
                println!("{}", serde_json::to_string_pretty(&analysis)?);
                Ok(())
            }
            Some(analysis) => {
                print_outline(&analysis);
                Ok(())
            }
            None => anyhow::bail!("cannot analyze {}: not found or not a text file", path),
        },
        Commands::Config => Ok(()),
    }
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            let mut config = Config::from_file(path)?;
            config.apply_env_overrides();
            config
        }
        None => Config::new()?,
    };
    if let Some(root) = &cli.root {
        config.workspace.root = Some(root.clone());
    }
    if config.workspace.root.is_none() {
        config.workspace.root =
            Some(std::env::current_dir().context("determine current directory")?);
    }
    config.validate()?;
    Ok(config)
}

fn print_context(context: &RetrievalContext, args: &SearchArgs, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(context)?);
    } else {
        let options = FormatOptions {
            max_chars: args.max_chars,
            ..Default::default()
        };
        println!("{}", format_context(context, &options));
    }
    Ok(())
}

fn print_outline(analysis: &FileAnalysis) {
    let language = analysis.language.map_or("unknown", |l| l.name());
    println!(
        "{} ({}, {} bytes)",
        analysis.relative_path, language, analysis.size_bytes
    );

    for class in &analysis.classes {
        let mut header = format!("  class {} (line {})", class.name, class.line);
        if let Some(base) = &class.extends {
            header.push_str(&format!(" extends {}", base));
        }
        if !class.implements.is_empty() {
            header.push_str(&format!(" implements {}", class.implements.join(", ")));
        }
        println!("{}", header);
    }
    for interface in &analysis.interfaces {
        println!("  interface {} (line {})", interface.name, interface.line);
    }
    for ty in &analysis.types {
        println!("  type {} (line {})", ty.name, ty.line);
    }
    for function in &analysis.functions {
        let owner = function
            .owner
            .as_deref()
            .map(|o| format!("{}.", o))
            .unwrap_or_default();
        let ret = function
            .return_type
            .as_deref()
            .map(|r| format!(" -> {}", r))
            .unwrap_or_default();
        println!(
            "  fn {}{}({}){} (line {})",
            owner,
            function.name,
            function.parameters.join(", "),
            ret,
            function.line
        );
    }
    if !analysis.imports.is_empty() {
        println!("  imports: {}", analysis.imports.join("; "));
    }
    if !analysis.exports.is_empty() {
        println!("  exports: {}", analysis.exports.join(", "));
    }
}
