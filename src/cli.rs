use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Find which JavaScript/TypeScript files import a given file.
///
/// depfind parses every candidate file under the query file's directory (or `--root`)
/// and reports the ones whose import or require statements resolve to it.
#[derive(Parser, Debug)]
#[command(
    name = "depfind",
    version,
    about,
    long_about = None,
    propagate_version = true,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Log progress to stderr (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Output format for query results.
#[derive(Clone, Debug, ValueEnum, Default)]
pub enum OutputFormat {
    /// One line per file and per edge (default).
    #[default]
    Compact,
    /// Pretty-printed JSON object keyed by input path.
    Json,
}

/// Options shared by both queries.
#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Glob patterns selecting the files to query (e.g. "src/**/*.js").
    #[arg(required = true)]
    pub globs: Vec<String>,

    /// Read aliases and exclusions from this file instead of ./depfind.toml.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Include imported binding names in each edge.
    #[arg(long)]
    pub specifiers: bool,

    /// Flag edges whose other end imports the file straight back.
    #[arg(long)]
    pub circular: bool,

    /// Keep only circular edges.
    #[arg(long)]
    pub only_circular: bool,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Compact)]
    pub format: OutputFormat,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the files that import each query file.
    ///
    /// Candidates are all .js/.ts files under the query file's directory, excluding
    /// node_modules, *.spec.js, *.d.ts and hidden paths. Each candidate is reported
    /// at most once, with its first matching import.
    Dependents {
        #[command(flatten)]
        scan: ScanArgs,

        /// Search this directory instead of each query file's own directory.
        #[arg(long)]
        root: Option<PathBuf>,

        /// Report only query files that nothing imports.
        #[arg(long)]
        only_not_found: bool,
    },

    /// List the imports declared by each query file.
    Dependencies {
        #[command(flatten)]
        scan: ScanArgs,
    },
}
