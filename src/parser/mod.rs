pub mod imports;
pub mod languages;

use std::cell::RefCell;
use std::path::Path;

use tree_sitter::{Node, Parser, Tree};
use tracing::debug;

use crate::error::{Result, ScanError};
use crate::language::Dialect;

use imports::{ImportInfo, normalize, raw_import_nodes};
use languages::language_for;

// One Parser per dialect, initialised lazily and reused for every file on this thread.
thread_local! {
    static PARSER_TS: RefCell<Parser> = RefCell::new({
        let mut p = Parser::new();
        p.set_language(&language_for(Dialect::TypeScript))
            .expect("typescript grammar matches the tree-sitter ABI");
        p
    });
    static PARSER_JS: RefCell<Parser> = RefCell::new({
        let mut p = Parser::new();
        p.set_language(&language_for(Dialect::JavaScript))
            .expect("javascript grammar matches the tree-sitter ABI");
        p
    });
}

/// Parse `source` with the grammar for `dialect`.
///
/// tree-sitter recovers from malformed input instead of failing, so a tree containing
/// `ERROR` or missing nodes is reported as [`ScanError::Parse`] with the position of the
/// first offending node. The caller decides whether to skip the file.
///
/// JavaScript files that do not parse as plain JavaScript are retried with the TypeScript
/// grammar, which accepts Flow-style annotations (`x: number`, `import type`).
pub fn parse_tree(path: &Path, dialect: Dialect, source: &[u8]) -> Result<Tree> {
    let tree = parse_with(path, dialect, source)?;
    let Some(at) = first_error(tree.root_node()) else {
        return Ok(tree);
    };

    if dialect == Dialect::JavaScript
        && let Ok(typed) = parse_with(path, Dialect::TypeScript, source)
        && !typed.root_node().has_error()
    {
        debug!("{} parsed with the TypeScript grammar", path.display());
        return Ok(typed);
    }

    let pos = at.start_position();
    Err(ScanError::Parse {
        path: path.to_path_buf(),
        line: pos.row + 1,
        column: pos.column + 1,
    })
}

fn parse_with(path: &Path, dialect: Dialect, source: &[u8]) -> Result<Tree> {
    let tree = match dialect {
        Dialect::TypeScript => PARSER_TS.with(|p| p.borrow_mut().parse(source, None)),
        Dialect::JavaScript => PARSER_JS.with(|p| p.borrow_mut().parse(source, None)),
    };
    tree.ok_or_else(|| ScanError::Parse {
        path: path.to_path_buf(),
        line: 1,
        column: 1,
    })
}

/// Parse a file and return every recognised import/require statement, in source order.
///
/// When `with_specifiers` is false the specifier lists are left empty.
pub fn parse_imports(
    path: &Path,
    dialect: Dialect,
    source: &[u8],
    with_specifiers: bool,
) -> Result<Vec<ImportInfo>> {
    let tree = parse_tree(path, dialect, source)?;
    Ok(raw_import_nodes(&tree)
        .into_iter()
        .filter_map(|node| normalize(node, source, dialect, with_specifiers))
        .collect())
}

/// Depth-first search for the first `ERROR` or missing node. `None` for a clean tree.
fn first_error(node: Node) -> Option<Node> {
    if !node.has_error() {
        return None;
    }
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if (child.has_error() || child.is_missing())
            && let Some(found) = first_error(child)
        {
            return Some(found);
        }
    }
    Some(node)
}
