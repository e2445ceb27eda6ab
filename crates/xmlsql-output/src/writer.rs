//! Per-input SQL output files.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{OutputError, Result};

const BEGIN: &str = "BEGIN;";
const COMMIT: &str = "COMMIT;";

/// Output path for an input file: `<output_dir>/<input stem>.sql`.
pub fn output_path(output_dir: &Path, input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map_or_else(|| "output".into(), |stem| stem.to_string_lossy());
    output_dir.join(format!("{stem}.sql"))
}

/// Creates the output directory and its parents.
pub fn ensure_output_dir(output_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(output_dir).map_err(|e| OutputError::CreateDir {
        path: output_dir.to_path_buf(),
        source: e,
    })
}

/// Buffered writer for one SQL file.
///
/// Each record block is written followed by a newline. With `single_transaction` the file is
/// wrapped in `BEGIN;` / `COMMIT;`; the closing statement is only written by [`finish`].
///
/// [`finish`]: SqlFileWriter::finish
#[derive(Debug)]
pub struct SqlFileWriter {
    path: PathBuf,
    out: BufWriter<File>,
    single_transaction: bool,
    blocks: usize,
}

impl SqlFileWriter {
    pub fn create(path: &Path, single_transaction: bool) -> Result<Self> {
        let file = File::create(path).map_err(|e| OutputError::Create {
            path: path.to_path_buf(),
            source: e,
        })?;
        let mut writer = Self {
            path: path.to_path_buf(),
            out: BufWriter::new(file),
            single_transaction,
            blocks: 0,
        };
        if single_transaction {
            writer.write_line(BEGIN)?;
        }
        Ok(writer)
    }

    /// Appends one rendered record block.
    pub fn write_block(&mut self, block: &str) -> Result<()> {
        self.write_line(block)?;
        self.blocks += 1;
        Ok(())
    }

    /// Closes the transaction if one was opened and flushes the file.
    ///
    /// On failure the partial file is removed.
    pub fn finish(mut self) -> Result<PathBuf> {
        let closed = if self.single_transaction {
            self.write_line(COMMIT)
        } else {
            Ok(())
        };
        let flushed = closed.and_then(|()| {
            self.out.flush().map_err(|e| OutputError::Write {
                path: self.path.clone(),
                source: e,
            })
        });
        if let Err(error) = flushed {
            self.discard();
            return Err(error);
        }
        debug!(path = %self.path.display(), blocks = self.blocks, "wrote sql file");
        Ok(self.path)
    }

    /// Drops unwritten output and removes the file from disk.
    pub fn discard(self) {
        let Self { path, out, .. } = self;
        // Buffered bytes are dropped without a final flush.
        let _ = out.into_parts();
        match std::fs::remove_file(&path) {
            Ok(()) => debug!(path = %path.display(), "removed partial sql file"),
            Err(error) => warn!(path = %path.display(), %error, "cannot remove partial sql file"),
        }
    }

    fn write_line(&mut self, text: &str) -> Result<()> {
        self.out
            .write_all(text.as_bytes())
            .and_then(|()| self.out.write_all(b"\n"))
            .map_err(|e| OutputError::Write {
                path: self.path.clone(),
                source: e,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_path_uses_stem() {
        assert_eq!(
            output_path(Path::new("out"), Path::new("/data/in/people.v2.xml")),
            PathBuf::from("out/people.v2.sql")
        );
    }

    #[test]
    fn writes_blocks_with_transaction() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("people.sql");
        let mut writer = SqlFileWriter::create(&path, true).unwrap();
        writer.write_block("INSERT 1;").unwrap();
        writer.write_block("INSERT 2;\nINSERT 3;").unwrap();
        let written = writer.finish().unwrap();
        assert_eq!(
            std::fs::read_to_string(written).unwrap(),
            "BEGIN;\nINSERT 1;\nINSERT 2;\nINSERT 3;\nCOMMIT;\n"
        );
    }

    #[test]
    fn writes_blocks_without_transaction() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("people.sql");
        let mut writer = SqlFileWriter::create(&path, false).unwrap();
        writer.write_block("INSERT 1;").unwrap();
        writer.finish().unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "INSERT 1;\n");
    }

    #[test]
    fn discard_removes_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("people.sql");
        let mut writer = SqlFileWriter::create(&path, true).unwrap();
        writer.write_block("INSERT 1;").unwrap();
        assert!(path.exists());
        writer.discard();
        assert!(!path.exists());
        assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
    }

    #[test]
    fn create_fails_in_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = SqlFileWriter::create(&dir.path().join("missing/x.sql"), false).unwrap_err();
        assert!(matches!(err, OutputError::Create { .. }));
    }
}
