use std::fmt::Write as _;

use serde::Serialize;

use crate::cli::OutputFormat;
use crate::parser::imports::ImportSpecifier;
use crate::query::{ImportEdge, Report, ReportEntry};

/// Format and print a report to stdout according to the selected output format.
pub fn format_report<E: ReportEntry + Serialize>(report: &Report<E>, format: &OutputFormat) {
    match format {
        OutputFormat::Compact => print!("{}", render_compact(report)),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(report).unwrap_or_default()
        ),
    }
}

/// One header line per input, one indented line per edge, then a summary line.
///
/// ```text
/// src/a.js 2 dependents
///   src/b.js imports ./a.js {a, b as c}
///   src/c.ts imports ./a circular
/// 1 files queried
/// ```
pub fn render_compact<E: ReportEntry>(report: &Report<E>) -> String {
    let mut out = String::new();
    for (key, entry) in report.iter() {
        let _ = writeln!(out, "{} {} {}", key, entry.edges().len(), E::EDGE_LABEL);
        for edge in entry.edges() {
            let _ = writeln!(out, "  {}", edge_line(edge));
        }
    }
    let _ = writeln!(out, "{} files queried", report.len());
    out
}

fn edge_line(edge: &ImportEdge) -> String {
    let mut line = format!("{} imports {}", edge.file_path, edge.import_path);
    if !edge.specifiers.is_empty() {
        let names: Vec<String> = edge.specifiers.iter().map(specifier_label).collect();
        let _ = write!(line, " {{{}}}", names.join(", "));
    }
    if edge.is_circular_dependency == Some(true) {
        line.push_str(" circular");
    }
    line
}

fn specifier_label(spec: &ImportSpecifier) -> String {
    match (spec.is_default, spec.alias.is_empty()) {
        (true, _) => format!("default {}", spec.name),
        (false, true) => spec.name.clone(),
        (false, false) => format!("{} as {}", spec.name, spec.alias),
    }
}
