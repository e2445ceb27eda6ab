//! Conversion pipeline with explicit stages.
//!
//! 1. **Mapping**: compile the config document once per run
//! 2. **Records**: parse each input and locate its records
//! 3. **Convert**: walk, emit and template every record in document order
//! 4. **Output**: append each record block to the file's `.sql` output
//!
//! Files are independent and are spread over a pool of scoped worker threads; the records of
//! one file are always handled by a single worker, so output order is document order.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{Span, debug, error, info, info_span, warn};

use xmlsql_ingest::{FileNumberIndex, read_document};
use xmlsql_map::{
    NamespaceNormalizer, RecordError, RecordWalker, compile_config, locate_records, split_path,
};
use xmlsql_model::{ConfigTree, FileReport, FileStatus, RunReport, XmlElement};
use xmlsql_output::{SqlEmitter, SqlFileWriter, Template, output_path};

use crate::logging::redact_value;
use crate::types::MappingOptions;

/// Schema name written into JSON run reports.
pub const REPORT_SCHEMA: &str = "xmlsql.run-report";
/// Schema version written into JSON run reports.
pub const REPORT_SCHEMA_VERSION: u32 = 1;

// ============================================================================
// Stage 1: Mapping
// ============================================================================

/// Compiled mapping shared by every file of a run.
#[derive(Debug, Clone)]
pub struct Mapping {
    pub config: PathBuf,
    pub tree: ConfigTree,
    pub normalizer: NamespaceNormalizer,
    pub parent_path: Vec<String>,
}

/// Reads and compiles the mapping config.
pub fn load_mapping(options: &MappingOptions) -> Result<Mapping> {
    let document = read_document(&options.config)
        .with_context(|| format!("load config: {}", options.config.display()))?;
    let tree = compile_config(&document, &options.identifier, options.record.as_deref())
        .with_context(|| format!("compile config: {}", options.config.display()))?;
    let parent_path = options
        .parent
        .as_deref()
        .map(split_path)
        .unwrap_or_default();
    Ok(Mapping {
        config: options.config.clone(),
        tree,
        normalizer: NamespaceNormalizer::new(options.namespace.as_deref()),
        parent_path,
    })
}

// ============================================================================
// Stage 3: Convert
// ============================================================================

/// SQL produced for one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordOutput {
    pub identifier: String,
    pub rows: usize,
    /// Templated block, ready to append to the output file.
    pub block: String,
}

/// Turns one record into its templated SQL block.
#[derive(Debug, Clone, Copy)]
pub struct RecordProcessor<'a> {
    walker: RecordWalker<'a>,
    emitter: SqlEmitter,
    template: &'a Template,
}

impl<'a> RecordProcessor<'a> {
    pub fn new(mapping: &'a Mapping, emitter: SqlEmitter, template: &'a Template) -> Self {
        Self {
            walker: RecordWalker::new(&mapping.tree, &mapping.normalizer),
            emitter,
            template,
        }
    }

    pub fn process(
        &self,
        record: &XmlElement,
        file_number: &str,
    ) -> Result<RecordOutput, RecordError> {
        let rows = self.walker.walk(record, file_number)?;
        let identifier = rows
            .first()
            .and_then(|row| row.get(xmlsql_model::ID_COLUMN))
            .unwrap_or_default()
            .to_string();
        let data = self.emitter.emit(&rows);
        let block = self.template.render(&data, &identifier, file_number);
        Ok(RecordOutput {
            identifier,
            rows: rows.len(),
            block,
        })
    }
}

// ============================================================================
// Stage 2-4: Per-file processing
// ============================================================================

/// Everything a worker needs to convert one file.
#[derive(Debug, Clone, Copy)]
pub struct FileContext<'a> {
    pub mapping: &'a Mapping,
    pub emitter: SqlEmitter,
    pub template: &'a Template,
    pub file_numbers: &'a FileNumberIndex,
    /// `None` for dry runs.
    pub output_dir: Option<&'a Path>,
    pub single_transaction: bool,
}

/// Converts one input file. Failures are recorded in the returned report, never raised.
pub fn process_file(ctx: &FileContext<'_>, path: &Path) -> FileReport {
    let file_number = ctx.file_numbers.lookup_path(path).to_string();
    let span = info_span!("file", path = %path.display(), file_number = %file_number);
    let _guard = span.enter();
    let start = Instant::now();
    let mut report = FileReport::new(path, file_number.clone());

    let document = match read_document(path) {
        Ok(document) => document,
        Err(error) => {
            error!(%error, "skipping unreadable file");
            return fail(report, error.to_string());
        }
    };

    let records = locate_records(
        &document,
        &ctx.mapping.parent_path,
        ctx.mapping.tree.record_tag(),
        &ctx.mapping.normalizer,
    );
    report.records = records.len();
    if records.is_empty() {
        warn!(
            parent = %ctx.mapping.parent_path.join("/"),
            record = %ctx.mapping.tree.record_tag(),
            "unresolvable parent or record path; no records found"
        );
        report.status = FileStatus::NoRecords;
        return report;
    }

    let mut writer = match ctx.output_dir {
        Some(dir) => match SqlFileWriter::create(&output_path(dir, path), ctx.single_transaction) {
            Ok(writer) => Some(writer),
            Err(error) => {
                error!(%error, "cannot create output file");
                return fail(report, error.to_string());
            }
        },
        None => None,
    };

    let processor = RecordProcessor::new(ctx.mapping, ctx.emitter, ctx.template);
    for (index, record) in records.iter().enumerate() {
        match processor.process(record, &file_number) {
            Ok(output) => {
                debug!(
                    record = index + 1,
                    id = %redact_value(&output.identifier),
                    rows = output.rows,
                    "converted record"
                );
                report.converted += 1;
                report.rows += output.rows;
                if let Some(active) = writer.as_mut()
                    && let Err(error) = active.write_block(&output.block)
                {
                    error!(%error, "output write failed");
                    if let Some(partial) = writer {
                        partial.discard();
                    }
                    return fail(report, error.to_string());
                }
            }
            Err(error) => {
                warn!(record = index + 1, %error, "skipping record");
                report.skipped += 1;
                report.errors.push(format!("record {}: {error}", index + 1));
            }
        }
    }

    if let Some(writer) = writer {
        match writer.finish() {
            Ok(written) => report.output = Some(written),
            Err(error) => {
                error!(%error, "output write failed");
                return fail(report, error.to_string());
            }
        }
    }

    info!(
        records = report.records,
        converted = report.converted,
        skipped = report.skipped,
        rows = report.rows,
        duration_ms = start.elapsed().as_millis(),
        "file complete"
    );
    report
}

fn fail(mut report: FileReport, message: String) -> FileReport {
    report.status = FileStatus::Failed;
    report.errors.push(message);
    report
}

/// Converts `files` on up to `jobs` worker threads.
///
/// Workers claim files through a shared cursor. `on_done` runs on the worker after each file.
/// Reports come back in input order.
pub fn convert_files<F>(
    ctx: &FileContext<'_>,
    files: &[PathBuf],
    jobs: usize,
    on_done: F,
) -> Vec<FileReport>
where
    F: Fn(&FileReport) + Sync,
{
    let workers = jobs.clamp(1, files.len().max(1));
    let cursor = &AtomicUsize::new(0);
    let parent = &Span::current();
    let on_done = &on_done;

    let mut reports: Vec<(usize, FileReport)> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..workers)
            .map(|_| {
                scope.spawn(move || {
                    parent.in_scope(|| {
                        let mut done = Vec::new();
                        loop {
                            let index = cursor.fetch_add(1, Ordering::Relaxed);
                            let Some(path) = files.get(index) else {
                                break;
                            };
                            let report = process_file(ctx, path);
                            on_done(&report);
                            done.push((index, report));
                        }
                        done
                    })
                })
            })
            .collect();

        handles
            .into_iter()
            .flat_map(|handle| match handle.join() {
                Ok(done) => done,
                Err(panic) => std::panic::resume_unwind(panic),
            })
            .collect()
    });

    reports.sort_by_key(|(index, _)| *index);
    reports.into_iter().map(|(_, report)| report).collect()
}

// ============================================================================
// Run report
// ============================================================================

/// Builds the run report for a finished run.
pub fn build_run_report(mapping: &Mapping, output_dir: &Path, files: Vec<FileReport>) -> RunReport {
    RunReport {
        schema: REPORT_SCHEMA.to_string(),
        schema_version: REPORT_SCHEMA_VERSION,
        generated_at: Utc::now().to_rfc3339(),
        config: mapping.config.clone(),
        output_dir: output_dir.to_path_buf(),
        files,
    }
}

/// Writes the run report as pretty JSON.
pub fn write_run_report(path: &Path, report: &RunReport) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create report directory: {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(report).context("serialize run report")?;
    std::fs::write(path, format!("{json}\n"))
        .with_context(|| format!("write run report: {}", path.display()))?;
    Ok(())
}
