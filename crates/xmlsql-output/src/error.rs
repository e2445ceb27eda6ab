//! Error types for SQL output.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while writing SQL files.
#[derive(Debug, Error)]
pub enum OutputError {
    /// Failed to create the output directory.
    #[error("failed to create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to create an output file.
    #[error("failed to create {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write to an output file.
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while loading a template.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// Template without a `$data` substitution point.
    #[error("template {origin} has no $data placeholder")]
    MissingData { origin: String },

    /// Failed to read the template file.
    #[error("failed to read template {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for output operations.
pub type Result<T> = std::result::Result<T, OutputError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TemplateError::MissingData {
            origin: "wrap.tmpl".to_string(),
        };
        assert_eq!(err.to_string(), "template wrap.tmpl has no $data placeholder");
    }
}
