//! Tests for input discovery and document loading.

use std::fs;
use std::path::{Path, PathBuf};

use xmlsql_ingest::{FileNumberIndex, IngestError, list_xml_files, read_document};

fn touch(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent");
    }
    fs::write(&path, content).expect("write file");
    path
}

#[test]
fn discovers_and_reads_documents() {
    let dir = tempfile::tempdir().expect("temp dir");
    let _ = touch(dir.path(), "2024/people.xml", "<People><Person/></People>");
    let _ = touch(dir.path(), "index.xml", "<People/>");
    let _ = touch(dir.path(), "readme.md", "# notes");

    let flat = list_xml_files(dir.path(), false).expect("list xml");
    assert_eq!(flat.len(), 1);

    let all = list_xml_files(dir.path(), true).expect("list xml recursively");
    assert_eq!(all.len(), 2);
    assert!(all[0].ends_with("2024/people.xml"));

    let root = read_document(&all[0]).expect("read document");
    assert_eq!(root.name, "People");
    assert_eq!(root.child_elements().count(), 1);
}

#[test]
fn malformed_document_reports_path() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = touch(dir.path(), "broken.xml", "<People><Person></People>");
    let err = read_document(&path).expect_err("malformed");
    match err {
        IngestError::XmlParse { path: reported, .. } => assert_eq!(reported, path),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn file_number_sheet_from_disk() {
    let dir = tempfile::tempdir().expect("temp dir");
    let sheet = touch(dir.path(), "numbers.csv", "people.xml,15\nindex.xml,16\n");
    let index = FileNumberIndex::load(&sheet).expect("load sheet");
    assert_eq!(index.lookup_path(&dir.path().join("people.xml")), "15");
    assert_eq!(index.lookup("missing.xml"), "-1");
}

#[test]
fn missing_sheet_is_a_read_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let err = FileNumberIndex::load(&dir.path().join("absent.csv")).expect_err("missing");
    assert!(matches!(err, IngestError::FileRead { .. }));
}
