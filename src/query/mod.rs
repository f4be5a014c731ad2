pub mod circular;
pub mod dependencies;
pub mod dependents;
pub mod output;

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::ser::SerializeMap;

use crate::error::{Result, ScanError};
use crate::language::Dialect;
use crate::parser::imports::{ImportInfo, ImportSpecifier};
use crate::parser::parse_imports;
use crate::resolver::{AliasTable, Resolution, ResolveRequest, absolutize, display_path, resolve_import};

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Everything a scan needs to know, passed explicitly and never mutated during a run.
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// Directory relative inputs and reported paths are interpreted against.
    pub cwd: PathBuf,
    /// Search this directory for dependents instead of each query file's own directory.
    pub root: Option<PathBuf>,
    pub aliases: Option<AliasTable>,
    /// Extra exclusion patterns from the config file.
    pub exclude: Vec<String>,
    /// Populate specifier lists. When off they are left empty.
    pub specifiers: bool,
    pub circular: bool,
    /// Report only circular edges (implies computing the flag).
    pub only_circular: bool,
    /// Report only query files nobody imports.
    pub only_not_found: bool,
}

impl ScanOptions {
    pub fn wants_circular(&self) -> bool {
        self.circular || self.only_circular
    }

    /// A copy for nested lookups: circularity off, `root` cleared. The nested call can
    /// therefore never recurse again, which caps the mutual delegation at one level.
    pub fn nested(&self) -> Self {
        Self {
            root: None,
            circular: false,
            only_circular: false,
            only_not_found: false,
            ..self.clone()
        }
    }
}

// ---------------------------------------------------------------------------
// Files and edges
// ---------------------------------------------------------------------------

/// A file taking part in a scan, either under query or as a candidate.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// The path as reported: as given for inputs, relative to `cwd` for discovered files.
    pub display: String,
    pub absolute: PathBuf,
    pub dialect: Dialect,
}

impl SourceFile {
    /// A file named on the command line (or by a nested lookup).
    pub fn from_input(path: &Path, cwd: &Path) -> Self {
        Self {
            display: path.to_string_lossy().into_owned(),
            absolute: absolutize(path, cwd),
            dialect: Dialect::for_path(path),
        }
    }

    /// A file found by the walker (already absolute).
    pub fn discovered(absolute: PathBuf, cwd: &Path) -> Self {
        Self {
            display: display_path(&absolute, cwd),
            dialect: Dialect::for_path(&absolute),
            absolute,
        }
    }

    /// Read and parse the file, returning its normalized import statements.
    pub fn read_imports(&self, with_specifiers: bool) -> Result<Vec<ImportInfo>> {
        let source = self.read()?;
        parse_imports(&self.absolute, self.dialect, &source, with_specifiers)
    }

    /// Raw file contents. Not required to be valid UTF-8.
    pub fn read(&self) -> Result<Vec<u8>> {
        std::fs::read(&self.absolute).map_err(|source| ScanError::Io {
            path: self.absolute.clone(),
            source,
        })
    }

    /// Resolve one import statement of this file into an edge.
    ///
    /// `target` is the dialect of the file being searched for, if any. Returns `None` when
    /// the resolver discards the edge.
    pub fn resolve_edge(
        &self,
        import: ImportInfo,
        target: Option<Dialect>,
        aliases: Option<&AliasTable>,
    ) -> Option<ImportEdge> {
        let request = ResolveRequest {
            importer: &self.absolute,
            importer_dialect: self.dialect,
            target_dialect: target,
        };
        tracing::trace!("{}: {:?} {}", self.display, import.kind, import.module_path);
        match resolve_import(&import.module_path, &request, aliases) {
            Resolution::Resolved {
                import_path,
                absolute_path,
            } => Some(ImportEdge {
                file_path: self.display.clone(),
                file_absolute_path: self.absolute.clone(),
                import_path,
                import_absolute_path: absolute_path,
                is_circular_dependency: None,
                specifiers: import.specifiers,
            }),
            Resolution::Discarded => None,
        }
    }
}

/// One resolved import relationship: `file_path` imports `import_absolute_path`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportEdge {
    pub file_path: String,
    pub file_absolute_path: PathBuf,
    pub import_path: String,
    pub import_absolute_path: PathBuf,
    /// `None` until the circular check has run.
    pub is_circular_dependency: Option<bool>,
    pub specifiers: Vec<ImportSpecifier>,
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Files importing one query file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DependentsEntry {
    pub absolute_path: PathBuf,
    pub files: usize,
    pub dependents: Vec<ImportEdge>,
}

/// Imports declared by one input file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DependenciesEntry {
    pub absolute_path: PathBuf,
    pub files: usize,
    pub dependencies: Vec<ImportEdge>,
}

/// Shared view over both entry kinds, used by the output layer.
pub trait ReportEntry {
    /// Noun for the edges, e.g. `"dependents"`.
    const EDGE_LABEL: &'static str;
    fn edges(&self) -> &[ImportEdge];
}

impl ReportEntry for DependentsEntry {
    const EDGE_LABEL: &'static str = "dependents";

    fn edges(&self) -> &[ImportEdge] {
        &self.dependents
    }
}

impl ReportEntry for DependenciesEntry {
    const EDGE_LABEL: &'static str = "dependencies";

    fn edges(&self) -> &[ImportEdge] {
        &self.dependencies
    }
}

/// An insertion-ordered map from input path to entry. Serializes as a JSON object whose
/// keys appear in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report<E> {
    entries: Vec<(String, E)>,
}

impl<E> Default for Report<E> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<E> Report<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the entry for `key`, keeping its original position on replace.
    pub fn insert(&mut self, key: String, entry: E) {
        match self.entries.iter().position(|(k, _)| *k == key) {
            Some(pos) => self.entries[pos].1 = entry,
            None => self.entries.push((key, entry)),
        }
    }

    #[cfg(test)]
    pub fn get(&self, key: &str) -> Option<&E> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, e)| e)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &E)> {
        self.entries.iter().map(|(k, e)| (k.as_str(), e))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<E: Serialize> Serialize for Report<E> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, entry) in &self.entries {
            map.serialize_entry(key, entry)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(path: &str) -> DependentsEntry {
        DependentsEntry {
            absolute_path: PathBuf::from(path),
            files: 0,
            dependents: Vec::new(),
        }
    }

    #[test]
    fn test_report_serializes_in_insertion_order() {
        let mut report = Report::new();
        report.insert("z.js".to_owned(), entry("/p/z.js"));
        report.insert("a.js".to_owned(), entry("/p/a.js"));
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.find("\"z.js\"").unwrap() < json.find("\"a.js\"").unwrap());
        assert!(json.contains("\"absolutePath\":\"/p/z.js\""));
        assert!(json.contains("\"files\":0"));
    }

    #[test]
    fn test_report_insert_replaces_in_place() {
        let mut report = Report::new();
        report.insert("a.js".to_owned(), entry("/old"));
        report.insert("b.js".to_owned(), entry("/b"));
        report.insert("a.js".to_owned(), entry("/new"));
        assert_eq!(report.len(), 2);
        assert_eq!(report.get("a.js").unwrap().absolute_path, PathBuf::from("/new"));
        assert_eq!(report.iter().next().unwrap().0, "a.js");
    }

    #[test]
    fn test_edge_serializes_camel_case_with_null_flag() {
        let edge = ImportEdge {
            file_path: "b.js".to_owned(),
            file_absolute_path: PathBuf::from("/p/b.js"),
            import_path: "./a.js".to_owned(),
            import_absolute_path: PathBuf::from("/p/a.js"),
            is_circular_dependency: None,
            specifiers: vec![ImportSpecifier {
                name: "a".to_owned(),
                alias: String::new(),
                is_default: true,
            }],
        };
        let value = serde_json::to_value(&edge).unwrap();
        assert_eq!(value["filePath"], "b.js");
        assert_eq!(value["importAbsolutePath"], "/p/a.js");
        assert!(value["isCircularDependency"].is_null());
        assert_eq!(value["specifiers"][0]["isDefault"], true);
        assert_eq!(value["specifiers"][0]["alias"], "");
    }

    #[test]
    fn test_nested_options_disable_recursion() {
        let options = ScanOptions {
            root: Some(PathBuf::from("/p")),
            circular: true,
            only_circular: true,
            specifiers: true,
            ..ScanOptions::default()
        };
        let nested = options.nested();
        assert!(!nested.wants_circular());
        assert!(nested.root.is_none());
        assert!(nested.specifiers);
        // The original is untouched.
        assert!(options.wants_circular());
        assert_eq!(options.root, Some(PathBuf::from("/p")));
    }
}
