use std::path::PathBuf;
use std::time::Duration;

use xmlsql_model::{RunReport, SqlDialect, TableSummary};

/// How records are located and mapped, after merging settings and flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingOptions {
    pub config: PathBuf,
    pub parent: Option<String>,
    pub record: Option<String>,
    pub identifier: String,
    pub namespace: Option<String>,
}

/// Fully resolved options for one `convert` run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertOptions {
    pub source: PathBuf,
    pub output_dir: PathBuf,
    pub mapping: MappingOptions,
    pub file_number_sheet: Option<PathBuf>,
    pub template: Option<PathBuf>,
    pub dialect: SqlDialect,
    pub single_transaction: bool,
    pub recurse: bool,
    pub jobs: usize,
    pub dry_run: bool,
    pub report: Option<PathBuf>,
}

#[derive(Debug)]
pub struct ConvertResult {
    pub report: RunReport,
    pub report_path: Option<PathBuf>,
    pub dry_run: bool,
    pub elapsed: Duration,
}

impl ConvertResult {
    pub fn has_errors(&self) -> bool {
        self.report.failed_files() > 0
    }
}

#[derive(Debug)]
pub struct CheckResult {
    pub config: PathBuf,
    pub record_tag: String,
    pub identifier: String,
    pub tables: Vec<TableSummary>,
}
