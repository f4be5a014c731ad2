use std::path::PathBuf;

use tracing::warn;

use super::circular::is_circular_dependency;
use super::{DependenciesEntry, ImportEdge, Report, ScanOptions, SourceFile};

/// List the imports declared by each input file.
///
/// Every recognised statement becomes an edge, resolved without a target dialect: a
/// TypeScript file's extensionless import prefers a `.ts` sibling, otherwise `.js` is
/// probed. Edges whose target does not exist (packages, typos) are still listed. An input
/// that cannot be read or parsed is reported with no dependencies.
///
/// With `circular`, each edge is flagged when its target imports the input straight back.
pub fn find_dependencies(inputs: &[PathBuf], options: &ScanOptions) -> Report<DependenciesEntry> {
    let mut report = Report::new();

    for input in inputs {
        let file = SourceFile::from_input(input, &options.cwd);

        let mut dependencies: Vec<ImportEdge> = match file.read_imports(options.specifiers) {
            Ok(imports) => imports
                .into_iter()
                .filter_map(|import| file.resolve_edge(import, None, options.aliases.as_ref()))
                .collect(),
            Err(err) => {
                warn!("skipping {}: {err}", file.display);
                Vec::new()
            }
        };

        if options.wants_circular() {
            for edge in &mut dependencies {
                edge.is_circular_dependency = Some(is_circular_dependency(
                    &edge.import_absolute_path,
                    &file.absolute,
                    options,
                ));
            }
            if options.only_circular {
                dependencies.retain(|edge| edge.is_circular_dependency == Some(true));
            }
        }

        report.insert(
            file.display.clone(),
            DependenciesEntry {
                absolute_path: file.absolute,
                files: dependencies.len(),
                dependencies,
            },
        );
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn fixture(files: &[(&str, &str)]) -> TempDir {
        let dir = tempfile::tempdir().expect("tempdir");
        for (rel, contents) in files {
            let path = dir.path().join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, contents).unwrap();
        }
        dir
    }

    fn options(dir: &TempDir) -> ScanOptions {
        ScanOptions {
            cwd: dir.path().to_path_buf(),
            specifiers: true,
            ..ScanOptions::default()
        }
    }

    #[test]
    fn test_lists_every_import_in_order() {
        let dir = fixture(&[
            (
                "main.ts",
                "import React from 'react';\nimport { a as b } from './a';\nconst c = require('./lib/c');\n",
            ),
            ("a.ts", ""),
            ("a.js", ""),
            ("lib/c.js", ""),
        ]);
        let report = find_dependencies(&[PathBuf::from("main.ts")], &options(&dir));
        let entry = report.get("main.ts").unwrap();
        assert_eq!(entry.files, 3);

        let targets: Vec<_> = entry
            .dependencies
            .iter()
            .map(|d| (d.import_path.as_str(), d.import_absolute_path.clone()))
            .collect();
        assert_eq!(
            targets,
            vec![
                ("react", dir.path().join("react")),
                ("./a.ts", dir.path().join("a.ts")),
                ("./lib/c.js", dir.path().join("lib/c.js")),
            ]
        );
        assert_eq!(entry.dependencies[1].specifiers[0].alias, "b");
        assert!(entry.dependencies.iter().all(|d| d.is_circular_dependency.is_none()));
    }

    #[test]
    fn test_circular_flags() {
        let dir = fixture(&[
            ("a.js", "import b from './b';\nimport c from './c';\n"),
            ("b.js", "const a = require('./a');\n"),
            ("c.js", "export default 3;\n"),
        ]);
        let opts = ScanOptions {
            circular: true,
            ..options(&dir)
        };
        let report = find_dependencies(&[PathBuf::from("a.js")], &opts);
        let flags: Vec<_> = report
            .get("a.js")
            .unwrap()
            .dependencies
            .iter()
            .map(|d| d.is_circular_dependency)
            .collect();
        assert_eq!(flags, vec![Some(true), Some(false)]);

        let opts = ScanOptions {
            only_circular: true,
            ..options(&dir)
        };
        let report = find_dependencies(&[PathBuf::from("a.js")], &opts);
        let entry = report.get("a.js").unwrap();
        assert_eq!(entry.files, 1);
        assert_eq!(entry.dependencies[0].import_path, "./b.js");
    }

    #[test]
    fn test_unreadable_input_yields_empty_entry() {
        let dir = fixture(&[]);
        let report = find_dependencies(&[PathBuf::from("ghost.js")], &options(&dir));
        let entry = report.get("ghost.js").unwrap();
        assert_eq!(entry.files, 0);
        assert_eq!(entry.absolute_path, dir.path().join("ghost.js"));
    }

    #[test]
    fn test_absolute_input_keyed_as_given() {
        let dir = fixture(&[("x.js", "import y from './y';\n"), ("y.js", "")]);
        let input = dir.path().join("x.js");
        let report = find_dependencies(&[input.clone()], &options(&dir));
        let key = input.to_string_lossy().into_owned();
        assert_eq!(report.get(&key).unwrap().dependencies[0].file_path, key);
    }
}
