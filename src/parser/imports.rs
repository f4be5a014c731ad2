use serde::Serialize;
use tree_sitter::{Node, Tree};

use crate::language::Dialect;

// ---------------------------------------------------------------------------
// Data structures
// ---------------------------------------------------------------------------

/// The statement shape an import was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
    /// `const x = require('./module')`, or `import x = require('./module')` in TypeScript.
    Require,
    /// ESM static import: `import { X } from './module'`
    Import,
}

/// A single binding introduced by an import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSpecifier {
    /// The exported name being imported (the local name for default and namespace bindings).
    pub name: String,
    /// The local rename in `import { name as alias }`; empty when there is none.
    pub alias: String,
    /// True for default bindings: `import React from 'react'`, `const fs = require('fs')`.
    pub is_default: bool,
}

impl ImportSpecifier {
    pub(crate) fn default_binding(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            alias: String::new(),
            is_default: true,
        }
    }

    pub(crate) fn named(name: &str, alias: &str) -> Self {
        Self {
            name: name.to_owned(),
            alias: alias.to_owned(),
            is_default: false,
        }
    }
}

/// An import statement normalized to the fields the resolver needs.
#[derive(Debug, Clone)]
pub struct ImportInfo {
    pub kind: ImportKind,
    /// The module specifier exactly as written, e.g. `"./utils"` or `"react"`.
    pub module_path: String,
    /// Bindings in source order. Duplicates are kept.
    pub specifiers: Vec<ImportSpecifier>,
}

// ---------------------------------------------------------------------------
// Helper utilities
// ---------------------------------------------------------------------------

fn node_text<'a>(node: Node<'a>, source: &'a [u8]) -> &'a str {
    node.utf8_text(source).unwrap_or("")
}

/// Contents of a plain string literal, without its quotes. Template strings are not literals.
fn string_literal(node: Node, source: &[u8]) -> Option<String> {
    if node.kind() != "string" {
        return None;
    }
    let text = node_text(node, source);
    text.get(1..text.len().saturating_sub(1)).map(str::to_owned)
}

/// Text of a name node; string-literal names (`import { "a-b" as c }`) lose their quotes.
fn name_text(node: Node, source: &[u8]) -> String {
    string_literal(node, source).unwrap_or_else(|| node_text(node, source).to_owned())
}

/// Find the first direct child of `node` with the given kind.
fn find_child_of_kind<'a>(node: Node<'a>, kind: &str) -> Option<Node<'a>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).find(|c| c.kind() == kind)
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Collect every `variable_declarator` and `import_statement` node, in document order.
///
/// Both grammars share these node kinds, so extraction is dialect-agnostic; only
/// [`normalize`] looks at the dialect.
pub fn raw_import_nodes(tree: &Tree) -> Vec<Node<'_>> {
    let mut nodes = Vec::new();
    let mut cursor = tree.walk();

    loop {
        let node = cursor.node();
        if matches!(node.kind(), "variable_declarator" | "import_statement") {
            nodes.push(node);
        }

        if cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return nodes;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Turn one raw node into an [`ImportInfo`].
///
/// Returns `None` for declarators that are not `require` calls with a string literal
/// argument, and for statements whose module path is empty.
pub fn normalize(
    node: Node,
    source: &[u8],
    dialect: Dialect,
    with_specifiers: bool,
) -> Option<ImportInfo> {
    let info = match node.kind() {
        "variable_declarator" => normalize_require(node, source, with_specifiers),
        "import_statement" => normalize_import(node, source, dialect, with_specifiers),
        _ => None,
    }?;

    if info.module_path.is_empty() {
        return None;
    }
    Some(info)
}

/// `const x = require('./m')` / `const { a, b } = require('./m')`
fn normalize_require(declarator: Node, source: &[u8], with_specifiers: bool) -> Option<ImportInfo> {
    let call = declarator.child_by_field_name("value")?;
    if call.kind() != "call_expression" {
        return None;
    }
    let function = call.child_by_field_name("function")?;
    if function.kind() != "identifier" || node_text(function, source) != "require" {
        return None;
    }
    let arguments = call.child_by_field_name("arguments")?;
    let mut cursor = arguments.walk();
    let first = arguments
        .named_children(&mut cursor)
        .find(|n| n.kind() != "comment")?;
    let module_path = string_literal(first, source)?;

    let mut specifiers = Vec::new();
    if with_specifiers && let Some(binding) = declarator.child_by_field_name("name") {
        extract_binding_pattern(binding, source, &mut specifiers);
    }

    Some(ImportInfo {
        kind: ImportKind::Require,
        module_path,
        specifiers,
    })
}

/// A lone identifier is a default binding; an object pattern binds one specifier per
/// property, named by the property key. Array patterns bind nothing.
fn extract_binding_pattern(binding: Node, source: &[u8], specifiers: &mut Vec<ImportSpecifier>) {
    match binding.kind() {
        "identifier" => {
            specifiers.push(ImportSpecifier::default_binding(node_text(binding, source)));
        }
        "object_pattern" => {
            let mut cursor = binding.walk();
            for property in binding.named_children(&mut cursor) {
                let key = match property.kind() {
                    "shorthand_property_identifier_pattern" => Some(property),
                    "pair_pattern" => property.child_by_field_name("key"),
                    // `{ a = 1 }`
                    "object_assignment_pattern" => property
                        .child_by_field_name("left")
                        .filter(|l| l.kind() == "shorthand_property_identifier_pattern"),
                    _ => None,
                };
                if let Some(key) = key {
                    specifiers.push(ImportSpecifier::named(&name_text(key, source), ""));
                }
            }
        }
        _ => {}
    }
}

/// `import ... from './m'`, `import './m'`, and TypeScript's `import x = require('./m')`.
fn normalize_import(
    stmt: Node,
    source: &[u8],
    dialect: Dialect,
    with_specifiers: bool,
) -> Option<ImportInfo> {
    if dialect.is_typescript()
        && let Some(clause) = find_child_of_kind(stmt, "import_require_clause")
    {
        return normalize_import_require(clause, source, with_specifiers);
    }

    let source_node = stmt
        .child_by_field_name("source")
        .or_else(|| find_child_of_kind(stmt, "string"))?;
    let module_path = string_literal(source_node, source)?;

    let mut specifiers = Vec::new();
    if with_specifiers && let Some(clause) = find_child_of_kind(stmt, "import_clause") {
        extract_import_clause(clause, source, &mut specifiers);
    }

    Some(ImportInfo {
        kind: ImportKind::Import,
        module_path,
        specifiers,
    })
}

/// `import fs = require('fs')`: a require with a single default binding.
fn normalize_import_require(
    clause: Node,
    source: &[u8],
    with_specifiers: bool,
) -> Option<ImportInfo> {
    let source_node = clause
        .child_by_field_name("source")
        .or_else(|| find_child_of_kind(clause, "string"))?;
    let module_path = string_literal(source_node, source)?;

    let mut specifiers = Vec::new();
    if with_specifiers && let Some(name) = find_child_of_kind(clause, "identifier") {
        specifiers.push(ImportSpecifier::default_binding(node_text(name, source)));
    }

    Some(ImportInfo {
        kind: ImportKind::Require,
        module_path,
        specifiers,
    })
}

/// Handles `React`, `{ a, b as c }`, `* as ns` and combinations such as `React, { useState }`.
fn extract_import_clause(clause: Node, source: &[u8], specifiers: &mut Vec<ImportSpecifier>) {
    let mut cursor = clause.walk();
    for child in clause.children(&mut cursor) {
        match child.kind() {
            "identifier" => {
                specifiers.push(ImportSpecifier::default_binding(node_text(child, source)));
            }
            "named_imports" => extract_named_imports(child, source, specifiers),
            "namespace_import" => {
                if let Some(ident) = find_child_of_kind(child, "identifier") {
                    specifiers.push(ImportSpecifier::named(node_text(ident, source), ""));
                }
            }
            _ => {}
        }
    }
}

/// In `import { foo as bar }` the grammar puts `foo` in the `name` field and `bar` in `alias`.
fn extract_named_imports(named: Node, source: &[u8], specifiers: &mut Vec<ImportSpecifier>) {
    let mut cursor = named.walk();
    for child in named.children(&mut cursor) {
        if child.kind() != "import_specifier" {
            continue;
        }
        let Some(name_node) = child.child_by_field_name("name") else {
            continue;
        };
        let name = name_text(name_node, source);
        let alias = child
            .child_by_field_name("alias")
            .map(|a| name_text(a, source))
            .filter(|a| *a != name)
            .unwrap_or_default();
        specifiers.push(ImportSpecifier::named(&name, &alias));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
