use std::path::{Path, PathBuf};

use super::{normalize_path, relative_specifier};

/// One configured alias. Keys ending in `$` only match the exact specifier (webpack style).
#[derive(Debug, Clone, PartialEq, Eq)]
struct AliasEntry {
    key: String,
    exact: bool,
    target: PathBuf,
}

/// Alias prefixes mapped to absolute directories (or files, for exact aliases).
///
/// Immutable once built; the scanner only ever reads it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasTable {
    /// Sorted by key length, longest first, so the most specific alias wins.
    entries: Vec<AliasEntry>,
}

/// Where an aliased specifier points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasTarget {
    /// The target expressed relative to the importing file's directory.
    pub module: String,
    pub module_abs_path: PathBuf,
    /// The written specifier names a specific file; do not complete its extension.
    pub keep_relative: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AliasResolution {
    /// No alias key matches the specifier.
    Unaliased,
    /// A key matches but its target does not exist.
    Unresolvable,
    Resolved(AliasTarget),
}

impl AliasTable {
    /// Build a table from `(key, path)` pairs. Relative paths are taken from `base_dir`
    /// (the directory holding the config file).
    pub fn new(entries: impl IntoIterator<Item = (String, PathBuf)>, base_dir: &Path) -> Self {
        let mut entries: Vec<AliasEntry> = entries
            .into_iter()
            .filter_map(|(key, path)| {
                let (key, exact) = match key.strip_suffix('$') {
                    Some(k) => (k.to_owned(), true),
                    None => (key, false),
                };
                let key = key.trim_end_matches('/').to_owned();
                if key.is_empty() {
                    return None;
                }
                Some(AliasEntry {
                    key,
                    exact,
                    target: normalize_path(&base_dir.join(path)),
                })
            })
            .collect();
        entries.sort_by(|a, b| b.key.len().cmp(&a.key.len()).then(a.key.cmp(&b.key)));
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Substitute the alias prefix of `specifier`, as imported from `importer_dir`.
    pub fn resolve(&self, specifier: &str, importer_dir: &Path) -> AliasResolution {
        for entry in &self.entries {
            let rest = if specifier == entry.key {
                Some("")
            } else if entry.exact {
                None
            } else {
                specifier
                    .strip_prefix(entry.key.as_str())
                    .and_then(|r| r.strip_prefix('/'))
            };
            let Some(rest) = rest else {
                continue;
            };

            // A whole-specifier alias may name a file whose extension is inferred later, so
            // only its directory has to exist.
            let reachable = entry.target.exists()
                || (rest.is_empty() && entry.target.parent().is_some_and(Path::is_dir));
            if !reachable {
                return AliasResolution::Unresolvable;
            }

            let module_abs_path = if rest.is_empty() {
                entry.target.clone()
            } else {
                normalize_path(&entry.target.join(rest))
            };
            return AliasResolution::Resolved(AliasTarget {
                module: relative_specifier(importer_dir, &module_abs_path),
                module_abs_path,
                keep_relative: entry.exact,
            });
        }
        AliasResolution::Unaliased
    }

    /// The aliased spelling of `file` (`key/rest/of/path`, extension dropped), if it lives
    /// under an alias root. The deepest matching root wins.
    pub fn alias_for(&self, file: &Path) -> Option<String> {
        self.entries
            .iter()
            .filter_map(|entry| {
                let stripped = file.with_extension("");
                if entry.exact {
                    let target = entry.target.with_extension("");
                    return (target == stripped).then(|| (entry, entry.key.clone()));
                }
                let rest = stripped.strip_prefix(&entry.target).ok()?;
                let rest: Vec<_> = rest
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect();
                if rest.is_empty() {
                    return None;
                }
                Some((entry, format!("{}/{}", entry.key, rest.join("/"))))
            })
            .max_by_key(|(entry, _)| entry.target.components().count())
            .map(|(_, name)| name)
    }
}
