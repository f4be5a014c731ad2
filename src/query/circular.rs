use std::path::{Path, PathBuf};

use super::ScanOptions;
use super::dependencies::find_dependencies;

/// Returns true if `file` directly imports `other` (a one-hop cycle test when `other` is
/// already known to import `file`).
///
/// Runs dependency discovery on `file` with [`ScanOptions::nested`]: circularity disabled and
/// `root` cleared, so the nested call never comes back here. Files that do not exist (bare
/// package specifiers, unresolved paths) import nothing.
pub fn is_circular_dependency(file: &Path, other: &Path, options: &ScanOptions) -> bool {
    if !file.is_file() {
        return false;
    }

    let nested = options.nested();
    let report = find_dependencies(&[PathBuf::from(file)], &nested);

    report
        .iter()
        .flat_map(|(_, entry)| entry.dependencies.iter())
        .any(|dependency| dependency.import_absolute_path == other)
}
