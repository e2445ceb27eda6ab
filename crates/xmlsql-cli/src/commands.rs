use std::collections::BTreeMap;
use std::io::{self, IsTerminal};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, anyhow, bail};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, info_span};

use xmlsql_cli::pipeline::{
    FileContext, build_run_report, convert_files, load_mapping, write_run_report,
};
use xmlsql_cli::settings::RunSettings;
use xmlsql_cli::types::{CheckResult, ConvertOptions, ConvertResult, MappingOptions};
use xmlsql_ingest::{FileNumberIndex, list_xml_files};
use xmlsql_model::SqlDialect;
use xmlsql_output::{SqlEmitter, Template, ensure_output_dir, output_path};

use crate::cli::{CheckArgs, ConvertArgs, DialectArg, MappingArgs};

pub fn run_convert(args: &ConvertArgs) -> Result<ConvertResult> {
    let settings = load_settings(args.mapping.settings.as_deref())?;
    let options = resolve_convert_options(args, &settings)?;
    let span = info_span!("convert", source = %options.source.display());
    let _guard = span.enter();
    let start = Instant::now();

    // =========================================================================
    // Stage 1: Mapping and run-wide inputs
    // =========================================================================
    let mapping = load_mapping(&options.mapping)?;
    let file_numbers = match &options.file_number_sheet {
        Some(path) => FileNumberIndex::load(path)
            .with_context(|| format!("load file-number sheet: {}", path.display()))?,
        None => FileNumberIndex::default(),
    };
    let template = match &options.template {
        Some(path) => Template::load(path).context("load template")?,
        None => Template::default(),
    };

    let files = list_xml_files(&options.source, options.recurse).context("list xml inputs")?;
    check_output_collisions(&files, &options.output_dir)?;
    if !options.dry_run {
        ensure_output_dir(&options.output_dir).context("prepare output directory")?;
    }
    info!(
        files = files.len(),
        jobs = options.jobs,
        dialect = ?options.dialect,
        dry_run = options.dry_run,
        "starting conversion"
    );

    // =========================================================================
    // Stage 2-4: Records, convert, output
    // =========================================================================
    let ctx = FileContext {
        mapping: &mapping,
        emitter: SqlEmitter::new(options.dialect),
        template: &template,
        file_numbers: &file_numbers,
        output_dir: (!options.dry_run).then_some(options.output_dir.as_path()),
        single_transaction: options.single_transaction,
    };
    let progress = progress_bar(files.len())?;
    let reports = convert_files(&ctx, &files, options.jobs, |report| {
        progress.set_message(report.source.display().to_string());
        progress.inc(1);
    });
    progress.finish_and_clear();

    let report = build_run_report(&mapping, &options.output_dir, reports);
    if let Some(path) = &options.report {
        write_run_report(path, &report)?;
    }
    info!(
        files = report.files.len(),
        failed = report.failed_files(),
        rows = report.total_rows(),
        skipped = report.total_skipped(),
        duration_ms = start.elapsed().as_millis(),
        "conversion complete"
    );

    Ok(ConvertResult {
        report,
        report_path: options.report.clone(),
        dry_run: options.dry_run,
        elapsed: start.elapsed(),
    })
}

pub fn run_check(args: &CheckArgs) -> Result<CheckResult> {
    let settings = load_settings(args.mapping.settings.as_deref())?;
    let options = resolve_mapping(&args.mapping, &settings)?;
    let mapping = load_mapping(&options)?;
    let identifier = if mapping.tree.identifier_path.is_empty() {
        format!("<{}> text", mapping.tree.record_tag())
    } else {
        mapping.tree.identifier_path.join("/")
    };
    Ok(CheckResult {
        config: mapping.config.clone(),
        record_tag: mapping.tree.record_tag().to_string(),
        identifier,
        tables: mapping.tree.tables(),
    })
}

fn load_settings(path: Option<&Path>) -> Result<RunSettings> {
    match path {
        Some(path) => RunSettings::load(path),
        None => Ok(RunSettings::default()),
    }
}

/// Merges flags over settings; flags win.
fn resolve_mapping(args: &MappingArgs, settings: &RunSettings) -> Result<MappingOptions> {
    let identifier = args
        .identifier
        .clone()
        .or_else(|| settings.identifier.clone())
        .ok_or_else(|| anyhow!("an identifier path is required (--identifier or `identifier` in settings)"))?;
    Ok(MappingOptions {
        config: args.config.clone(),
        parent: args.parent.clone().or_else(|| settings.parent.clone()),
        record: args.record.clone().or_else(|| settings.record.clone()),
        identifier,
        namespace: args.namespace.clone().or_else(|| settings.namespace.clone()),
    })
}

fn resolve_convert_options(args: &ConvertArgs, settings: &RunSettings) -> Result<ConvertOptions> {
    let jobs = match args.jobs.or(settings.jobs) {
        Some(0) => bail!("--jobs must be at least 1"),
        Some(jobs) => jobs,
        None => std::thread::available_parallelism().map_or(1, NonZeroUsize::get),
    };
    let dialect = match args.dialect {
        Some(DialectArg::Mysql) => SqlDialect::Mysql,
        Some(DialectArg::Postgres) => SqlDialect::Postgres,
        None => settings.dialect.unwrap_or_default(),
    };
    Ok(ConvertOptions {
        source: args.xml_source.clone(),
        output_dir: args.output.clone(),
        mapping: resolve_mapping(&args.mapping, settings)?,
        file_number_sheet: args
            .file_number_sheet
            .clone()
            .or_else(|| settings.file_number_sheet.clone()),
        template: args.template.clone().or_else(|| settings.template.clone()),
        dialect,
        single_transaction: args.single_transaction || settings.single_transaction.unwrap_or(false),
        recurse: args.recurse || settings.recurse.unwrap_or(false),
        jobs,
        dry_run: args.dry_run,
        report: args.report.clone(),
    })
}

/// Inputs with the same stem would overwrite each other's output file.
fn check_output_collisions(files: &[PathBuf], output_dir: &Path) -> Result<()> {
    let mut targets: BTreeMap<PathBuf, &Path> = BTreeMap::new();
    for file in files {
        if let Some(previous) = targets.insert(output_path(output_dir, file), file) {
            bail!(
                "{} and {} would both write {}",
                previous.display(),
                file.display(),
                output_path(output_dir, file).display()
            );
        }
    }
    Ok(())
}

fn progress_bar(len: usize) -> Result<ProgressBar> {
    if !io::stderr().is_terminal() {
        return Ok(ProgressBar::hidden());
    }
    let bar = ProgressBar::new(len as u64);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {wide_msg}")?
            .progress_chars("=>-"),
    );
    Ok(bar)
}
