use std::path::Path;

/// The syntax dialect a source file is parsed with.
///
/// Selected once per file from its extension: `.ts` files are TypeScript, everything else
/// that reaches the parser is treated as JavaScript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    TypeScript,
    JavaScript,
}

impl Dialect {
    /// Pick the dialect for a path by its extension.
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("ts") => Dialect::TypeScript,
            _ => Dialect::JavaScript,
        }
    }

    pub fn is_typescript(self) -> bool {
        self == Dialect::TypeScript
    }

    /// Extension (without the dot) probed when an import omits one.
    pub fn extension(self) -> &'static str {
        match self {
            Dialect::TypeScript => "ts",
            Dialect::JavaScript => "js",
        }
    }

    /// Human-readable name for log lines.
    pub fn display_name(self) -> &'static str {
        match self {
            Dialect::TypeScript => "TypeScript",
            Dialect::JavaScript => "JavaScript",
        }
    }
}

/// Extensions of files considered as possible dependents.
pub const CANDIDATE_EXTENSIONS: &[&str] = &["js", "ts"];

/// File name suffixes that are never scanned: test specs and type declarations.
pub const EXCLUDED_SUFFIXES: &[&str] = &[".spec.js", ".d.ts"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialect_for_path() {
        assert_eq!(Dialect::for_path(Path::new("src/a.ts")), Dialect::TypeScript);
        assert_eq!(Dialect::for_path(Path::new("src/a.js")), Dialect::JavaScript);
        // Only `.ts` selects the TypeScript grammar.
        assert_eq!(Dialect::for_path(Path::new("src/a.tsx")), Dialect::JavaScript);
        assert_eq!(Dialect::for_path(Path::new("src/a.mjs")), Dialect::JavaScript);
        assert_eq!(Dialect::for_path(Path::new("Makefile")), Dialect::JavaScript);
    }

    #[test]
    fn test_extension() {
        assert_eq!(Dialect::TypeScript.extension(), "ts");
        assert_eq!(Dialect::JavaScript.extension(), "js");
        assert!(Dialect::TypeScript.is_typescript());
        assert!(!Dialect::JavaScript.is_typescript());
    }
}
