//! Input file discovery.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{IngestError, Result};

/// Lists the XML inputs named by `input`.
///
/// A file is returned as-is, whatever its extension. A directory yields its `.xml` files
/// (case-insensitive), descending into subdirectories when `recurse` is set. Results are sorted
/// by path.
pub fn list_xml_files(input: &Path, recurse: bool) -> Result<Vec<PathBuf>> {
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }
    if !input.is_dir() {
        return Err(IngestError::InputNotFound {
            path: input.to_path_buf(),
        });
    }

    let mut files = Vec::new();
    collect_xml_files(input, recurse, &mut files)?;
    files.sort();
    debug!(dir = %input.display(), count = files.len(), recurse, "discovered xml inputs");
    Ok(files)
}

fn collect_xml_files(dir: &Path, recurse: bool, files: &mut Vec<PathBuf>) -> Result<()> {
    let entries = std::fs::read_dir(dir).map_err(|e| IngestError::DirectoryRead {
        path: dir.to_path_buf(),
        source: e,
    })?;

    for entry_result in entries {
        let entry = entry_result.map_err(|e| IngestError::DirectoryRead {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();

        if path.is_dir() {
            if recurse {
                collect_xml_files(&path, recurse, files)?;
            }
            continue;
        }

        if path.is_file() && is_xml(&path) {
            files.push(path);
        }
    }
    Ok(())
}

fn is_xml(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("xml"))
}
