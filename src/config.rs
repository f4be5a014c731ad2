use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Result, ScanError};
use crate::resolver::AliasTable;

/// Configuration loaded from `depfind.toml`.
///
/// ```toml
/// exclude = ["dist", "*.generated.js"]
///
/// [alias]
/// "@" = "src"
/// "config$" = "src/config/index.js"
/// ```
#[derive(Debug, Deserialize, Default)]
pub struct DepfindConfig {
    /// Additional path patterns to exclude from scanning (beyond .gitignore and node_modules).
    pub exclude: Option<Vec<String>>,
    /// Import path aliases, relative to the config file's directory.
    #[serde(default)]
    pub alias: BTreeMap<String, PathBuf>,
    /// Directory the config was loaded from; alias paths are relative to it.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl DepfindConfig {
    pub const FILE_NAME: &'static str = "depfind.toml";

    /// Load `depfind.toml` from `dir` if present.
    ///
    /// Returns a default (empty) configuration if the file does not exist or cannot be parsed.
    pub fn load(dir: &Path) -> Self {
        let config_path = dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Self::with_base(dir);
        }

        match Self::load_file(&config_path) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!("{err}. Using defaults.");
                Self::with_base(dir)
            }
        }
    }

    /// Load an explicitly requested config file. Unlike [`DepfindConfig::load`], any failure
    /// is an error.
    pub fn load_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| ScanError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Self = toml::from_str(&contents).map_err(|err| ScanError::Config {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        config.base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Ok(config)
    }

    fn with_base(dir: &Path) -> Self {
        Self {
            base_dir: dir.to_path_buf(),
            ..Self::default()
        }
    }

    /// The configured aliases, or `None` when the `[alias]` table is absent or empty.
    pub fn alias_table(&self, cwd: &Path) -> Option<AliasTable> {
        let table = AliasTable::new(self.alias.clone(), &cwd.join(&self.base_dir));
        (!table.is_empty()).then_some(table)
    }

    pub fn exclude_patterns(&self) -> Vec<String> {
        self.exclude.clone().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("tempdir")
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tmp();
        let config = DepfindConfig::load(dir.path());
        assert!(config.exclude.is_none());
        assert!(config.alias.is_empty());
        assert!(config.alias_table(dir.path()).is_none());
    }

    #[test]
    fn test_load_alias_and_exclude() {
        let dir = tmp();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::write(
            dir.path().join(DepfindConfig::FILE_NAME),
            "exclude = [\"dist\"]\n\n[alias]\n\"@\" = \"src\"\n",
        )
        .unwrap();

        let config = DepfindConfig::load(dir.path());
        assert_eq!(config.exclude_patterns(), vec!["dist".to_string()]);
        let table = config.alias_table(dir.path()).expect("alias table");
        assert_eq!(
            table.alias_for(&dir.path().join("src/a.js")),
            Some("@/a".to_owned())
        );
    }

    #[test]
    fn test_malformed_file_falls_back_to_defaults() {
        let dir = tmp();
        fs::write(dir.path().join(DepfindConfig::FILE_NAME), "exclude = [").unwrap();
        let config = DepfindConfig::load(dir.path());
        assert!(config.exclude.is_none());
    }

    #[test]
    fn test_explicit_malformed_file_is_an_error() {
        let dir = tmp();
        let path = dir.path().join("custom.toml");
        fs::write(&path, "[alias]\n\"@\" = 3\n").unwrap();
        assert!(matches!(
            DepfindConfig::load_file(&path),
            Err(ScanError::Config { .. })
        ));
        assert!(matches!(
            DepfindConfig::load_file(&dir.path().join("absent.toml")),
            Err(ScanError::Io { .. })
        ));
    }
}
