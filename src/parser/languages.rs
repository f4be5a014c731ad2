use tree_sitter::Language;

use crate::language::Dialect;

/// Return the tree-sitter [`Language`] for a dialect.
///
/// - TypeScript -> `LANGUAGE_TYPESCRIPT` (not TSX: angle-bracket type assertions must parse)
/// - JavaScript -> the JavaScript grammar, which also accepts JSX
pub fn language_for(dialect: Dialect) -> Language {
    match dialect {
        Dialect::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
        Dialect::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
    }
}
