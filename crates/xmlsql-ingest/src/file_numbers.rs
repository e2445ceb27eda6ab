//! File-number index loaded from a two-column CSV sheet.

use std::collections::BTreeMap;
use std::path::Path;

use csv::ReaderBuilder;
use tracing::debug;

use crate::error::{IngestError, Result};

/// File number used for inputs that the sheet does not list.
pub const MISSING_FILE_NUMBER: &str = "-1";

/// Maps input file names to file numbers.
///
/// The sheet has no header; each row is `file_name,number`. Later rows override earlier ones
/// for the same file name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileNumberIndex {
    numbers: BTreeMap<String, String>,
}

impl FileNumberIndex {
    /// Loads the sheet at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| IngestError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let index = Self::from_reader(bytes.as_slice(), path)?;
        debug!(path = %path.display(), entries = index.len(), "loaded file-number sheet");
        Ok(index)
    }

    /// Parses sheet content; `path` is only used for error context.
    pub fn from_reader(reader: impl std::io::Read, path: &Path) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut numbers = BTreeMap::new();
        for (line, record) in reader.records().enumerate() {
            let record = record.map_err(|e| IngestError::CsvParse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
            if record.iter().all(|field| field.trim().is_empty()) {
                continue;
            }
            let (Some(name), Some(number)) = (record.get(0), record.get(1)) else {
                return Err(IngestError::CsvParse {
                    path: path.to_path_buf(),
                    message: format!("row {} needs a file name and a number", line + 1),
                });
            };
            numbers.insert(
                name.trim_matches('\u{feff}').trim().to_string(),
                number.trim().to_string(),
            );
        }
        Ok(Self { numbers })
    }

    /// File number for `file_name`, or [`MISSING_FILE_NUMBER`] when unlisted.
    pub fn lookup(&self, file_name: &str) -> &str {
        self.numbers
            .get(file_name)
            .map_or(MISSING_FILE_NUMBER, String::as_str)
    }

    /// File number for the file name component of `path`.
    pub fn lookup_path(&self, path: &Path) -> &str {
        path.file_name()
            .and_then(|name| name.to_str())
            .map_or(MISSING_FILE_NUMBER, |name| self.lookup(name))
    }

    pub fn len(&self) -> usize {
        self.numbers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.numbers.is_empty()
    }
}
