//! Error types for input loading.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading inputs.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// Input path is neither a file nor a directory.
    #[error("input not found: {path}")]
    InputNotFound { path: PathBuf },

    /// Failed to read directory entries.
    #[error("failed to read directory {path}: {source}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to read file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === XML Errors ===
    /// Document is not well-formed.
    #[error("malformed XML in {path} at byte {position}: {message}")]
    XmlParse {
        path: PathBuf,
        position: u64,
        message: String,
    },

    /// Document has no root element.
    #[error("XML document has no root element: {path}")]
    EmptyDocument { path: PathBuf },

    // === CSV Errors ===
    /// Failed to parse the file-number sheet.
    #[error("failed to parse CSV {path}: {message}")]
    CsvParse { path: PathBuf, message: String },
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;
