//! CLI argument definitions for xmlsql.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "xmlsql",
    version,
    about = "Convert nested XML records into SQL INSERT statements",
    long_about = "Convert nested XML records into SQL INSERT statements.\n\n\
                  A mapping config mirrors the shape of one record and declares which\n\
                  elements open table rows and which elements and attributes fill columns."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Include record identifiers and values in log output.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Convert XML files into per-file SQL scripts.
    Convert(ConvertArgs),

    /// Compile the mapping config and list the tables it produces.
    Check(CheckArgs),
}

/// Options that describe how records are found and mapped.
#[derive(Args, Clone, Default)]
pub struct MappingArgs {
    /// Mapping config: an XML document shaped like one record.
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: PathBuf,

    /// TOML run settings; command-line flags take precedence.
    #[arg(long = "settings", value_name = "FILE")]
    pub settings: Option<PathBuf>,

    /// `/`-separated path from the document root to the element holding the records.
    #[arg(short = 'p', long = "parent", value_name = "PATH")]
    pub parent: Option<String>,

    /// Tag of one record (defaults to the config root tag).
    #[arg(short = 'r', long = "record", value_name = "TAG")]
    pub record: Option<String>,

    /// `/`-separated path from the record to the element holding its identifier.
    #[arg(short = 'i', long = "identifier", value_name = "PATH")]
    pub identifier: Option<String>,

    /// Namespace URI of the XML elements.
    #[arg(short = 'n', long = "namespace", value_name = "URI")]
    pub namespace: Option<String>,
}

#[derive(Args)]
pub struct ConvertArgs {
    /// XML file, or directory of XML files.
    #[arg(value_name = "XML_SOURCE")]
    pub xml_source: PathBuf,

    #[command(flatten)]
    pub mapping: MappingArgs,

    /// Directory for the generated `.sql` files.
    #[arg(short = 'o', long = "output", value_name = "DIR")]
    pub output: PathBuf,

    /// CSV of `file_name,number` rows used for file-number columns.
    #[arg(short = 'l', long = "file-number-sheet", value_name = "CSV")]
    pub file_number_sheet: Option<PathBuf>,

    /// Per-record template with `$data`, `$id` and `$file_number`.
    #[arg(short = 't', long = "template", value_name = "FILE")]
    pub template: Option<PathBuf>,

    /// SQL dialect used for identifier quoting.
    #[arg(long = "dialect", value_enum)]
    pub dialect: Option<DialectArg>,

    /// Wrap each output file in a single transaction.
    #[arg(short = 's', long = "single-transaction")]
    pub single_transaction: bool,

    /// Search subdirectories of XML_SOURCE for XML files.
    #[arg(short = 'z', long = "recurse")]
    pub recurse: bool,

    /// Number of files converted in parallel (default: available cores).
    #[arg(short = 'j', long = "jobs", value_name = "N")]
    pub jobs: Option<usize>,

    /// Convert and report without writing output files.
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Write a JSON run report to this path.
    #[arg(long = "report", value_name = "JSON")]
    pub report: Option<PathBuf>,
}

#[derive(Args)]
pub struct CheckArgs {
    #[command(flatten)]
    pub mapping: MappingArgs,
}

/// CLI SQL dialect choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum DialectArg {
    Mysql,
    Postgres,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
