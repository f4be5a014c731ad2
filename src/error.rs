use std::path::PathBuf;

use thiserror::Error;

/// Failures that can occur while scanning a source tree.
///
/// Every variant except [`ScanError::Glob`] and [`ScanError::Config`] is scoped to a single
/// file: callers log it and move on to the next candidate.
#[derive(Debug, Error)]
pub enum ScanError {
    /// A candidate or input file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// tree-sitter produced a tree containing error or missing nodes.
    #[error("syntax error in {} at line {line}, column {column}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        column: usize,
    },

    /// A query pattern given on the command line is not a valid glob.
    #[error("invalid glob pattern {pattern:?}: {source}")]
    Glob {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    /// An explicitly requested `depfind.toml` could not be loaded.
    #[error("invalid config {}: {message}", path.display())]
    Config { path: PathBuf, message: String },
}

pub type Result<T> = std::result::Result<T, ScanError>;
