use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, warn};

use super::circular::is_circular_dependency;
use super::{DependentsEntry, ImportEdge, Report, ScanOptions, SourceFile};
use crate::error::Result;
use crate::parser::parse_imports;
use crate::resolver::absolutize;
use crate::walker::candidate_files;

// ---------------------------------------------------------------------------
// Query file
// ---------------------------------------------------------------------------

/// The file whose dependents are being searched for.
#[derive(Debug, Clone)]
pub struct QueryFile {
    pub file: SourceFile,
    /// File name with extension, e.g. `utils.js`.
    pub base_name: String,
    /// File name without extension, e.g. `utils`.
    pub stem: String,
    /// Aliased spelling of the file when it lives under an alias root, e.g. `@/utils`.
    pub alias: Option<String>,
}

impl QueryFile {
    pub fn new(input: &Path, options: &ScanOptions) -> Self {
        let file = SourceFile::from_input(input, &options.cwd);
        let base_name = file_name(input, Path::file_name);
        let stem = file_name(input, Path::file_stem);
        let alias = options
            .aliases
            .as_ref()
            .and_then(|table| table.alias_for(&file.absolute));
        Self {
            file,
            base_name,
            stem,
            alias,
        }
    }

    /// Where candidates are looked for: `root` when set, else the query file's directory.
    fn search_dir(&self, options: &ScanOptions) -> PathBuf {
        match &options.root {
            Some(root) => absolutize(root, &options.cwd),
            None => self
                .file
                .absolute
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| options.cwd.clone()),
        }
    }
}

fn file_name(path: &Path, part: fn(&Path) -> Option<&std::ffi::OsStr>) -> String {
    part(path)
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Pre-filter
// ---------------------------------------------------------------------------

static IMPORT_TOKEN: OnceLock<Regex> = OnceLock::new();

/// Matches anything that could start a supported statement: `require(` (whitespace allowed
/// before the parenthesis) or the `import` keyword.
fn import_token() -> &'static Regex {
    IMPORT_TOKEN.get_or_init(|| {
        Regex::new(r"\brequire\s*\(|\bimport\b").expect("invalid import token regex")
    })
}

/// Cheap textual rejection of candidates that cannot reference the query file.
///
/// A candidate is skipped only when it contains no import/require token AND never mentions
/// the query's base name (with or without extension) before a closing quote, nor its alias
/// after an opening quote. Every supported statement contains a token, so nothing that
/// parses into a matching edge is ever skipped.
#[derive(Debug)]
struct Prefilter {
    /// `None` if the pattern could not be built; every candidate then passes.
    mentions: Option<Regex>,
}

impl Prefilter {
    fn for_query(query: &QueryFile) -> Self {
        let mut alternatives = vec![format!(
            "(?:{}|{})[\"'`]",
            regex::escape(&query.base_name),
            regex::escape(&query.stem)
        )];
        if let Some(alias) = &query.alias {
            alternatives.push(format!("[\"'`]{}", regex::escape(alias)));
        }

        let mentions = match Regex::new(&alternatives.join("|")) {
            Ok(re) => Some(re),
            Err(err) => {
                warn!("pre-filter disabled for {}: {err}", query.file.display);
                None
            }
        };
        Self { mentions }
    }

    fn may_reference(&self, text: &str) -> bool {
        import_token().is_match(text) || self.mentions.as_ref().is_none_or(|re| re.is_match(text))
    }
}

// ---------------------------------------------------------------------------
// Scan
// ---------------------------------------------------------------------------

/// Whether the candidate loop should keep going.
#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Stop,
}

/// Accumulated result of scanning the candidates of one query file.
#[derive(Debug, Default)]
struct ScanState {
    dependents: Vec<ImportEdge>,
    /// At least one candidate imports the query, whether or not it was recorded.
    found: bool,
}

impl ScanState {
    fn record(&mut self, mut edge: ImportEdge, query: &QueryFile, options: &ScanOptions) -> Flow {
        self.found = true;
        if options.only_not_found {
            return Flow::Stop;
        }

        if options.wants_circular() {
            edge.is_circular_dependency = Some(is_circular_dependency(
                &query.file.absolute,
                &edge.file_absolute_path,
                options,
            ));
        }

        if !options.only_circular || edge.is_circular_dependency == Some(true) {
            self.dependents.push(edge);
        }
        Flow::Continue
    }

    fn into_entry(self, absolute_path: PathBuf) -> DependentsEntry {
        DependentsEntry {
            absolute_path,
            files: self.dependents.len(),
            dependents: self.dependents,
        }
    }
}

/// Find the files that directly import each input file.
///
/// Inputs are processed one at a time, in order. The report is keyed by the input path as
/// given. With `only_not_found`, only inputs that nothing imports are reported.
pub fn find_dependents(inputs: &[PathBuf], options: &ScanOptions) -> Report<DependentsEntry> {
    let mut report = Report::new();

    for input in inputs {
        let query = QueryFile::new(input, options);
        let state = scan(&query, options);

        if options.only_not_found && state.found {
            debug!("{} has dependents, omitted", query.file.display);
            continue;
        }

        let key = query.file.display.clone();
        report.insert(key, state.into_entry(query.file.absolute));
    }

    report
}

fn scan(query: &QueryFile, options: &ScanOptions) -> ScanState {
    let search_dir = query.search_dir(options);
    let prefilter = Prefilter::for_query(query);
    let mut state = ScanState::default();

    debug!(
        "scanning {} for dependents of {} ({})",
        search_dir.display(),
        query.file.display,
        query.file.dialect.display_name()
    );

    for path in candidate_files(&search_dir, &query.file.absolute, &options.exclude) {
        let candidate = SourceFile::discovered(path, &options.cwd);

        let edge = match first_matching_edge(query, &candidate, &prefilter, options) {
            Ok(Some(edge)) => edge,
            Ok(None) => continue,
            Err(err) => {
                warn!("skipping {}: {err}", candidate.display);
                continue;
            }
        };

        if state.record(edge, query, options) == Flow::Stop {
            break;
        }
    }

    state
}

/// The first statement of `candidate` that resolves to the query file, if any.
fn first_matching_edge(
    query: &QueryFile,
    candidate: &SourceFile,
    prefilter: &Prefilter,
    options: &ScanOptions,
) -> Result<Option<ImportEdge>> {
    let source = candidate.read()?;
    if !prefilter.may_reference(&String::from_utf8_lossy(&source)) {
        debug!("pre-filter skipped {}", candidate.display);
        return Ok(None);
    }

    let imports = parse_imports(
        &candidate.absolute,
        candidate.dialect,
        &source,
        options.specifiers,
    )?;

    Ok(imports
        .into_iter()
        .filter_map(|import| {
            candidate.resolve_edge(import, Some(query.file.dialect), options.aliases.as_ref())
        })
        .find(|edge| edge.import_absolute_path == query.file.absolute))
}
