//! TOML run settings.
//!
//! Every key is optional and mirrors a command-line flag; flags given on the command line take
//! precedence.
//!
//! ```toml
//! parent = "Export/People"
//! identifier = "Emp_Id"
//! namespace = "urn:people"
//! file_number_sheet = "numbers.csv"
//! dialect = "postgres"
//! single_transaction = true
//! jobs = 4
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use xmlsql_model::SqlDialect;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunSettings {
    pub parent: Option<String>,
    pub record: Option<String>,
    pub identifier: Option<String>,
    pub namespace: Option<String>,
    pub file_number_sheet: Option<PathBuf>,
    pub template: Option<PathBuf>,
    pub dialect: Option<SqlDialect>,
    pub single_transaction: Option<bool>,
    pub recurse: Option<bool>,
    pub jobs: Option<usize>,
}

impl RunSettings {
    /// Loads settings from a TOML file. Relative paths inside it resolve against its directory.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("read settings: {}", path.display()))?;
        let mut settings: Self = toml::from_str(&contents)
            .with_context(|| format!("parse settings: {}", path.display()))?;
        if let Some(base) = path.parent() {
            settings.file_number_sheet = settings.file_number_sheet.map(|p| base.join(p));
            settings.template = settings.template.map(|p| base.join(p));
        }
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_keys() {
        let settings: RunSettings = toml::from_str(
            r#"
            parent = "Export/People"
            record = "Person"
            identifier = "Emp_Id"
            namespace = "urn:people"
            file_number_sheet = "numbers.csv"
            template = "wrap.tmpl"
            dialect = "postgres"
            single_transaction = true
            recurse = false
            jobs = 2
            "#,
        )
        .unwrap();
        assert_eq!(settings.parent.as_deref(), Some("Export/People"));
        assert_eq!(settings.dialect, Some(SqlDialect::Postgres));
        assert_eq!(settings.single_transaction, Some(true));
        assert_eq!(settings.jobs, Some(2));
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(toml::from_str::<RunSettings>("identifer = \"x\"").is_err());
    }

    #[test]
    fn load_resolves_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.toml");
        std::fs::write(&path, "file_number_sheet = \"numbers.csv\"\n").unwrap();
        let settings = RunSettings::load(&path).unwrap();
        assert_eq!(
            settings.file_number_sheet,
            Some(dir.path().join("numbers.csv"))
        );
        assert!(settings.template.is_none());
    }
}
