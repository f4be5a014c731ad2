pub mod alias;

pub use alias::{AliasResolution, AliasTable};

use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

use crate::language::Dialect;

/// Who is importing, and (when scanning for dependents) what kind of file is being looked for.
#[derive(Debug, Clone, Copy)]
pub struct ResolveRequest<'a> {
    /// Absolute path of the importing file.
    pub importer: &'a Path,
    pub importer_dialect: Dialect,
    /// Dialect of the file under query. `None` when listing a file's own dependencies.
    pub target_dialect: Option<Dialect>,
}

/// The outcome of resolving one import specifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// `import_path` is the specifier as it should be reported (alias-rewritten and
    /// extension-completed where applicable); `absolute_path` is lexically normalized.
    Resolved {
        import_path: String,
        absolute_path: PathBuf,
    },
    /// The edge can never point at the target: an unresolvable alias, or a TypeScript
    /// importer whose extensionless specifier binds to a `.ts` sibling.
    Discarded,
}

/// Result of probing for a missing extension.
#[derive(Debug, PartialEq, Eq)]
enum Inference {
    Extension(&'static str),
    Discard,
    Unchanged,
}

/// Resolve `specifier` as written in `request.importer`.
///
/// 1. Alias substitution when a table is configured (an unresolvable alias discards the edge).
/// 2. Otherwise the specifier is joined onto the importer's directory and normalized.
/// 3. When the result has no extension or does not exist, `.ts` / `.js` are probed according
///    to the importer and target dialects, and a found extension is appended to the reported
///    specifier too unless the alias asked to keep it literal.
///
/// Nothing is canonicalized: symlinks and letter case are left as written.
pub fn resolve_import(
    specifier: &str,
    request: &ResolveRequest,
    aliases: Option<&AliasTable>,
) -> Resolution {
    let importer_dir = request.importer.parent().unwrap_or(Path::new("/"));

    let mut import_path = specifier.to_owned();
    let mut keep_relative = false;
    let mut aliased_path = None;

    if let Some(table) = aliases {
        match table.resolve(specifier, importer_dir) {
            AliasResolution::Unresolvable => return Resolution::Discarded,
            AliasResolution::Resolved(target) => {
                import_path = target.module;
                keep_relative = target.keep_relative;
                aliased_path = Some(target.module_abs_path);
            }
            AliasResolution::Unaliased => {}
        }
    }

    let mut absolute_path =
        aliased_path.unwrap_or_else(|| join_specifier(importer_dir, &import_path));

    if absolute_path.extension().is_none() || !absolute_path.exists() {
        match infer_extension(&absolute_path, request) {
            Inference::Discard => return Resolution::Discarded,
            Inference::Extension(ext) => absolute_path = append_extension(&absolute_path, ext),
            Inference::Unchanged => {}
        }

        if !keep_relative
            && Path::new(&import_path).extension().is_none()
            && absolute_path.exists()
            && let Some(ext) = absolute_path.extension().and_then(|e| e.to_str())
        {
            import_path.push('.');
            import_path.push_str(ext);
        }
    }

    Resolution::Resolved {
        import_path,
        absolute_path,
    }
}

/// Decide which extension, if any, completes `path`.
///
/// With a known target dialect:
/// - TS importer, TS target: `.ts` only.
/// - TS importer, JS target, `.ts` sibling present: the import binds to the sibling, discard.
/// - JS target: `.js`.
///
/// Without one, a TS importer prefers `.ts` over `.js`; anything else probes `.js`.
fn infer_extension(path: &Path, request: &ResolveRequest) -> Inference {
    let importer_ts = request.importer_dialect.is_typescript();
    let probe = |ext: &'static str| append_extension(path, ext).exists();
    let ts = Dialect::TypeScript.extension();
    let js = Dialect::JavaScript.extension();

    match request.target_dialect {
        Some(target) if target.is_typescript() => {
            if importer_ts && probe(ts) {
                Inference::Extension(ts)
            } else {
                Inference::Unchanged
            }
        }
        Some(_) => {
            if importer_ts && probe(ts) {
                Inference::Discard
            } else if probe(js) {
                Inference::Extension(js)
            } else {
                Inference::Unchanged
            }
        }
        None => {
            if importer_ts && probe(ts) {
                Inference::Extension(ts)
            } else if probe(js) {
                Inference::Extension(js)
            } else {
                Inference::Unchanged
            }
        }
    }
}

/// `foo.config` + `js` -> `foo.config.js` (appends, never replaces).
fn append_extension(path: &Path, ext: &str) -> PathBuf {
    let mut s: OsString = path.as_os_str().to_owned();
    s.push(".");
    s.push(ext);
    PathBuf::from(s)
}

/// Join a specifier onto a directory the way a path join does: a leading `/` does not reset
/// the base.
fn join_specifier(dir: &Path, specifier: &str) -> PathBuf {
    normalize_path(&dir.join(specifier.trim_start_matches('/')))
}

/// Make `path` absolute against `cwd` and normalize it lexically.
pub fn absolutize(path: &Path, cwd: &Path) -> PathBuf {
    normalize_path(&cwd.join(path))
}

/// Normalize a path by resolving `.` and `..` components without touching
/// the filesystem (no symlink resolution). `..` never climbs above the root.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut components: Vec<Component> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match components.last() {
                Some(Component::Normal(_)) => {
                    components.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => components.push(component),
            },
            other => components.push(other),
        }
    }
    components.iter().collect()
}

/// Express `to` relative to the directory `from`, as an import specifier
/// (`./x`, `../x`, forward slashes).
pub fn relative_specifier(from: &Path, to: &Path) -> String {
    let from: Vec<Component> = from.components().collect();
    let to: Vec<Component> = to.components().collect();
    let common = from
        .iter()
        .zip(to.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<String> = Vec::new();
    for _ in common..from.len() {
        parts.push("..".to_owned());
    }
    for component in &to[common..] {
        parts.push(component.as_os_str().to_string_lossy().into_owned());
    }

    if parts.first().map(String::as_str) == Some("..") {
        parts.join("/")
    } else if parts.is_empty() {
        ".".to_owned()
    } else {
        format!("./{}", parts.join("/"))
    }
}

/// Render a path relative to `cwd` when it lies underneath it, else as given.
pub fn display_path(path: &Path, cwd: &Path) -> String {
    path.strip_prefix(cwd)
        .unwrap_or(path)
        .to_string_lossy()
        .into_owned()
}
