//! Input loading for xmlsql: XML documents, input discovery, and the file-number sheet.

pub mod discovery;
pub mod error;
pub mod file_numbers;
pub mod xml;

pub use discovery::list_xml_files;
pub use error::{IngestError, Result};
pub use file_numbers::{FileNumberIndex, MISSING_FILE_NUMBER};
pub use xml::{parse_document, read_document};
