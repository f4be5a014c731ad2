mod cli;
mod config;
mod error;
mod language;
mod parser;
mod query;
mod resolver;
mod walker;

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, ScanArgs};
use config::DepfindConfig;
use query::ScanOptions;
use query::output::format_report;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "depfind=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cwd = std::env::current_dir().context("cannot determine the working directory")?;

    match cli.command {
        Commands::Dependents {
            scan,
            root,
            only_not_found,
        } => {
            let options = ScanOptions {
                root,
                only_not_found,
                ..scan_options(&scan, &cwd)?
            };
            let inputs = walker::expand_globs(&scan.globs, &cwd)?;
            tracing::debug!("querying {} file(s)", inputs.len());
            let report = query::dependents::find_dependents(&inputs, &options);
            if report.is_empty() {
                tracing::debug!("nothing to report");
            }
            format_report(&report, &scan.format);
        }
        Commands::Dependencies { scan } => {
            let options = scan_options(&scan, &cwd)?;
            let inputs = walker::expand_globs(&scan.globs, &cwd)?;
            tracing::debug!("querying {} file(s)", inputs.len());
            let report = query::dependencies::find_dependencies(&inputs, &options);
            format_report(&report, &scan.format);
        }
    }

    Ok(())
}

/// Build the options shared by both queries, loading the config file.
fn scan_options(scan: &ScanArgs, cwd: &Path) -> Result<ScanOptions> {
    let config = match &scan.config {
        Some(path) => DepfindConfig::load_file(&cwd.join(path))?,
        None => DepfindConfig::load(cwd),
    };

    Ok(ScanOptions {
        cwd: cwd.to_path_buf(),
        aliases: config.alias_table(cwd),
        exclude: config.exclude_patterns(),
        specifiers: scan.specifiers,
        circular: scan.circular,
        only_circular: scan.only_circular,
        ..ScanOptions::default()
    })
}
