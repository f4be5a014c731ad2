use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::{Result, ScanError};
use crate::language::{CANDIDATE_EXTENSIONS, EXCLUDED_SUFFIXES};
use crate::resolver::normalize_path;

/// Expand query glob patterns against `cwd`.
///
/// Patterns are expanded in the order given and each one yields its matches in the `glob`
/// crate's (alphabetical) order. Relative patterns produce paths relative to `cwd`, absolute
/// patterns absolute paths. Duplicates and directories are dropped. A pattern that matches
/// nothing contributes nothing; an invalid pattern is an error.
pub fn expand_globs(patterns: &[String], cwd: &Path) -> Result<Vec<PathBuf>> {
    let mut seen = HashSet::new();
    let mut files = Vec::new();

    for pattern in patterns {
        let relative = !Path::new(pattern).is_absolute();
        let full_pattern = if relative {
            let base = glob::Pattern::escape(&cwd.to_string_lossy());
            format!("{}/{}", base.trim_end_matches('/'), pattern)
        } else {
            pattern.clone()
        };

        let entries = glob::glob(&full_pattern).map_err(|source| ScanError::Glob {
            pattern: pattern.clone(),
            source,
        })?;

        for entry in entries {
            let path = match entry {
                Ok(p) => p,
                Err(err) => {
                    tracing::warn!("{err}");
                    continue;
                }
            };
            if !path.is_file() {
                continue;
            }
            let path = if relative {
                path.strip_prefix(cwd).map(Path::to_path_buf).unwrap_or(path)
            } else {
                path
            };
            if seen.insert(path.clone()) {
                files.push(path);
            }
        }
    }

    Ok(files)
}

/// Enumerate the files under `dir` that could import `query`.
///
/// Skips hidden files and directories, always excludes `node_modules`, `*.spec.js`, `*.d.ts`
/// and the query file itself, applies the `exclude` patterns, and keeps only `.js`/`.ts`
/// files. Ignore files (`.gitignore`, `.ignore`) are not consulted.
/// Entries are sorted by file name within each directory so repeated runs visit candidates
/// in the same order. Returned paths are absolute and normalized.
pub fn candidate_files(dir: &Path, query: &Path, exclude: &[String]) -> Vec<PathBuf> {
    let exclude: Vec<glob::Pattern> = exclude
        .iter()
        .filter_map(|p| match glob::Pattern::new(p) {
            Ok(pattern) => Some(pattern),
            Err(err) => {
                tracing::warn!("ignoring exclude pattern {p:?}: {err}");
                None
            }
        })
        .collect();

    let walker = ignore::WalkBuilder::new(dir)
        .standard_filters(false)
        .hidden(true)
        .sort_by_file_name(|a, b| a.cmp(b))
        .build();

    let mut files = Vec::new();
    for result in walker {
        let entry = match result {
            Ok(e) => e,
            Err(err) => {
                tracing::warn!("{err}");
                continue;
            }
        };

        if entry.file_type().map(|ft| ft.is_dir()).unwrap_or(false) {
            continue;
        }

        let path = normalize_path(entry.path());
        let relative = path.strip_prefix(dir).unwrap_or(&path);

        if path_contains_node_modules(relative) || is_excluded(relative, &exclude) {
            continue;
        }

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if !CANDIDATE_EXTENSIONS.contains(&ext) {
            continue;
        }

        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        if EXCLUDED_SUFFIXES.iter().any(|suffix| name.ends_with(suffix)) {
            continue;
        }

        if path == query {
            continue;
        }

        files.push(path);
    }

    files
}

/// Returns true if any component of `path` is named `node_modules`.
fn path_contains_node_modules(path: &Path) -> bool {
    path.components().any(|c| {
        c.as_os_str()
            .to_str()
            .map(|s| s == "node_modules")
            .unwrap_or(false)
    })
}

/// Returns true if `path` (relative to the search directory), or any of its components,
/// matches an exclusion pattern.
fn is_excluded(path: &Path, patterns: &[glob::Pattern]) -> bool {
    patterns.iter().any(|pattern| {
        pattern.matches_path(path)
            || path
                .components()
                .filter_map(|c| c.as_os_str().to_str())
                .any(|s| pattern.matches(s))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("tempdir")
    }

    fn touch(dir: &Path, rel: &str) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    fn names(dir: &Path, files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|f| f.strip_prefix(dir).unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_candidates_skip_excluded_kinds() {
        let dir = tmp();
        let root = dir.path();
        for rel in [
            "a.js",
            "b.ts",
            "c.spec.js",
            "types.d.ts",
            "README.md",
            "comp.tsx",
            "node_modules/pkg/index.js",
            "query.js",
        ] {
            touch(root, rel);
        }

        let files = candidate_files(root, &root.join("query.js"), &[]);
        assert_eq!(names(root, &files), vec!["a.js", "b.ts"]);
    }

    #[test]
    fn test_candidates_sorted_and_recursive() {
        let dir = tmp();
        let root = dir.path();
        for rel in ["z.js", "lib/m.js", "a.ts", "lib/b.js"] {
            touch(root, rel);
        }
        let files = candidate_files(root, &root.join("none.js"), &[]);
        assert_eq!(names(root, &files), vec!["a.ts", "lib/b.js", "lib/m.js", "z.js"]);

        // Same tree, same order.
        assert_eq!(files, candidate_files(root, &root.join("none.js"), &[]));
    }

    #[test]
    fn test_candidates_respect_exclude_patterns() {
        let dir = tmp();
        let root = dir.path();
        for rel in ["src/a.js", "dist/bundle.js", "gen/x.generated.js"] {
            touch(root, rel);
        }

        let exclude = vec!["dist".to_string(), "*.generated.js".to_string()];
        let files = candidate_files(root, &root.join("q.js"), &exclude);
        assert_eq!(names(root, &files), vec!["src/a.js"]);
    }

    #[test]
    fn test_candidates_ignore_gitignore_but_skip_hidden() {
        let dir = tmp();
        let root = dir.path();
        for rel in ["build/b.js", "src/a.js", ".cache/c.js", ".hidden.js"] {
            touch(root, rel);
        }
        fs::write(root.join(".gitignore"), "build/
").unwrap();
        fs::write(root.join(".ignore"), "src/
").unwrap();

        let files = candidate_files(root, &root.join("q.js"), &[]);
        assert_eq!(names(root, &files), vec!["build/b.js", "src/a.js"]);
    }

    #[test]
    fn test_expand_globs_relative_order_and_dedup() {
        let dir = tmp();
        let root = dir.path();
        for rel in ["src/b.js", "src/a.js", "src/c.ts"] {
            touch(root, rel);
        }
        fs::create_dir_all(root.join("src/dir.js")).unwrap();

        let patterns = vec!["src/*.ts".to_string(), "src/*.js".to_string(), "src/a.js".to_string()];
        let files = expand_globs(&patterns, root).unwrap();
        assert_eq!(
            files,
            vec![
                PathBuf::from("src/c.ts"),
                PathBuf::from("src/a.js"),
                PathBuf::from("src/b.js"),
            ]
        );
    }

    #[test]
    fn test_expand_globs_no_match_is_empty() {
        let dir = tmp();
        let files = expand_globs(&["nothing/*.js".to_string()], dir.path()).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_expand_globs_invalid_pattern() {
        let dir = tmp();
        let err = expand_globs(&["src/[".to_string()], dir.path()).unwrap_err();
        assert!(matches!(err, ScanError::Glob { .. }));
    }
}
