use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Target SQL flavour; only affects identifier quoting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SqlDialect {
    /// Back-tick quoted identifiers.
    #[default]
    Mysql,
    /// Double-quoted identifiers.
    Postgres,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    Converted,
    /// The parent/record path matched nothing in the document.
    NoRecords,
    Failed,
}

/// Outcome of converting one input file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileReport {
    pub source: PathBuf,
    pub output: Option<PathBuf>,
    pub file_number: String,
    pub status: FileStatus,
    pub records: usize,
    pub converted: usize,
    pub skipped: usize,
    pub rows: usize,
    pub errors: Vec<String>,
}

impl FileReport {
    pub fn new(source: impl Into<PathBuf>, file_number: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            output: None,
            file_number: file_number.into(),
            status: FileStatus::Converted,
            records: 0,
            converted: 0,
            skipped: 0,
            rows: 0,
            errors: Vec::new(),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.status == FileStatus::Failed
    }
}

/// Whole-run outcome, serialized for `--report`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub schema: String,
    pub schema_version: u32,
    pub generated_at: String,
    pub config: PathBuf,
    pub output_dir: PathBuf,
    pub files: Vec<FileReport>,
}

impl RunReport {
    pub fn failed_files(&self) -> usize {
        self.files.iter().filter(|file| file.is_failed()).count()
    }

    pub fn total_rows(&self) -> usize {
        self.files.iter().map(|file| file.rows).sum()
    }

    pub fn total_skipped(&self) -> usize {
        self.files.iter().map(|file| file.skipped).sum()
    }
}
