//! Unit tests for zipped-submission staging.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::config::ScanConfig;
use crate::scanner::staging::collect_from_zipped;

const CORE_XML: &str = r#"<cp:coreProperties xmlns:cp="c" xmlns:dc="d" xmlns:dcterms="t">
  <dc:creator>Jana Nováková</dc:creator>
</cp:coreProperties>"#;

fn offline_config() -> ScanConfig {
    ScanConfig {
        exiftool_path: PathBuf::from("/nonexistent/bin/exiftool"),
        ..ScanConfig::default()
    }
}

/// In-memory docx bytes with just a core part.
fn docx_bytes() -> Vec<u8> {
    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut writer = ZipWriter::new(&mut cursor);
        writer
            .start_file("docProps/core.xml", SimpleFileOptions::default())
            .expect("start core part");
        writer.write_all(CORE_XML.as_bytes()).expect("write core part");
        writer.finish().expect("finish docx");
    }
    cursor.into_inner()
}

fn write_submission_zip(dir: &Path, name: &str, members: &[(&str, &[u8])]) -> PathBuf {
    let path = dir.join(name);
    let file = fs::File::create(&path).expect("create submission zip");
    let mut writer = ZipWriter::new(file);
    let options = SimpleFileOptions::default();
    for (member_name, content) in members {
        writer.start_file(*member_name, options).expect("start member");
        writer.write_all(content).expect("write member");
    }
    writer.finish().expect("finish submission zip");
    path
}

#[test]
fn stages_supported_members_and_reports_entry_names() {
    let dir = TempDir::new().unwrap();
    let docx = docx_bytes();
    let zip_path = write_submission_zip(
        dir.path(),
        "2021_0001.zip",
        &[
            ("odovzdane/príloha.docx", docx.as_slice()),
            ("odovzdane/poznamky.txt", b"ignore me".as_slice()),
        ],
    );

    let records = collect_from_zipped(&zip_path, &offline_config());
    assert_eq!(records.len(), 1);
    // The record points at the decoded entry name, not the staging path.
    assert_eq!(records[0].source_path, PathBuf::from("príloha.docx"));
    assert_eq!(records[0].file_name, "príloha.docx");
    assert_eq!(records[0].file_extension, "docx");
    assert_eq!(records[0].creator.as_deref(), Some("Jana Nováková"));
}

#[test]
fn not_a_zip_yields_empty_with_no_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("2021_0002.zip");
    fs::write(&path, b"definitely not an archive").unwrap();

    assert!(collect_from_zipped(&path, &offline_config()).is_empty());
    assert!(collect_from_zipped(&dir.path().join("missing.zip"), &offline_config()).is_empty());
}

#[test]
fn one_corrupt_member_does_not_abort_the_archive() {
    let dir = TempDir::new().unwrap();
    let docx = docx_bytes();
    let zip_path = write_submission_zip(
        dir.path(),
        "2021_0003.zip",
        &[
            ("pokazene.docx", b"not a package at all".as_slice()),
            ("esej.docx", docx.as_slice()),
        ],
    );

    let records = collect_from_zipped(&zip_path, &offline_config());
    assert_eq!(records.len(), 2);
    // The corrupt member still yields its (all-absent) record.
    let broken = records
        .iter()
        .find(|r| r.file_name == "pokazene.docx")
        .expect("record for corrupt member");
    assert!(broken.creator.is_none());
    let good = records
        .iter()
        .find(|r| r.file_name == "esej.docx")
        .expect("record for good member");
    assert_eq!(good.creator.as_deref(), Some("Jana Nováková"));
}

#[test]
fn directory_entries_and_unsupported_members_are_skipped() {
    let dir = TempDir::new().unwrap();
    let zip_path = dir.path().join("2021_0004.zip");
    {
        let file = fs::File::create(&zip_path).unwrap();
        let mut writer = ZipWriter::new(file);
        let options = SimpleFileOptions::default();
        writer.add_directory("odovzdane/", options).expect("add dir entry");
        writer.start_file("odovzdane/data.xyz", options).unwrap();
        writer.write_all(b"x").unwrap();
        writer.finish().unwrap();
    }

    assert!(collect_from_zipped(&zip_path, &offline_config()).is_empty());
}
