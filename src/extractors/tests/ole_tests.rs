//! Unit tests for the legacy-binary extractor and its property-set reader.

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime};
use tempfile::TempDir;

use crate::decoding::NameDecoder;
use crate::extractors::ole::property_set::{self, filetime_to_datetime};
use crate::extractors::ole::{
    edit_seconds_to_minutes, is_valid_container, normalize_last_printed,
};
use crate::extractors::{Extract, ExtractContext, OleExtractor};
use crate::types::metadata::MetadataRecord;

/// FILETIME value of the Unix epoch, 1970-01-01T00:00:00Z.
const UNIX_EPOCH_FILETIME: u64 = 116_444_736_000_000_000;

const VT_I4: u32 = 3;
const VT_LPSTR: u32 = 30;
const VT_FILETIME: u32 = 64;

fn push_u32(buf: &mut Vec<u8>, value: u32) {
    buf.extend_from_slice(&value.to_le_bytes());
}

fn lpstr(text: &[u8]) -> Vec<u8> {
    let mut value = Vec::new();
    push_u32(&mut value, VT_LPSTR);
    push_u32(&mut value, (text.len() + 1) as u32);
    value.extend_from_slice(text);
    value.push(0);
    value
}

fn filetime(ticks: u64) -> Vec<u8> {
    let mut value = Vec::new();
    push_u32(&mut value, VT_FILETIME);
    value.extend_from_slice(&ticks.to_le_bytes());
    value
}

fn vt_i4(number: i32) -> Vec<u8> {
    let mut value = Vec::new();
    push_u32(&mut value, VT_I4);
    value.extend_from_slice(&number.to_le_bytes());
    value
}

/// Assemble a single-section property-set stream from (pid, value) pairs.
fn build_summary_stream(properties: &[(u32, Vec<u8>)]) -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(&0xFFFEu16.to_le_bytes()); // byte order
    data.extend_from_slice(&0u16.to_le_bytes()); // version
    push_u32(&mut data, 0x0002_0005); // system id
    data.extend_from_slice(&[0u8; 16]); // clsid
    push_u32(&mut data, 1); // one property set
    data.extend_from_slice(&[0u8; 16]); // fmtid
    push_u32(&mut data, 48); // section offset
    assert_eq!(data.len(), 48);

    let table_len = 8 + properties.len() * 8;
    let mut table = Vec::new();
    let mut values = Vec::new();
    for (pid, value) in properties {
        push_u32(&mut table, *pid);
        push_u32(&mut table, (table_len + values.len()) as u32);
        values.extend_from_slice(value);
    }
    push_u32(&mut data, (table_len + values.len()) as u32); // section size
    push_u32(&mut data, properties.len() as u32);
    data.extend_from_slice(&table);
    data.extend_from_slice(&values);
    data
}

fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, mo, d)
        .unwrap()
        .and_hms_opt(h, mi, s)
        .unwrap()
}

#[test]
fn parses_summary_information_properties() {
    // "Tomáš" in CP852 bytes; strings stay raw at this layer.
    let author = b"Tom\xA0\xE7";
    let stream = build_summary_stream(&[
        (4, lpstr(author)),
        (8, lpstr(b"admin")),
        (7, lpstr(b"Normal.dot")),
        (10, filetime(125 * 10_000_000)),
        (12, filetime(UNIX_EPOCH_FILETIME)),
        (14, vt_i4(3)),
    ]);

    let info = property_set::parse(&stream).expect("valid property set");
    assert_eq!(info.author.as_deref(), Some(&author[..]));
    assert_eq!(info.last_saved_by.as_deref(), Some(&b"admin"[..]));
    assert_eq!(info.template.as_deref(), Some(&b"Normal.dot"[..]));
    assert_eq!(info.total_edit_secs, Some(125));
    assert_eq!(info.create_time, Some(at(1970, 1, 1, 0, 0, 0)));
    assert_eq!(info.page_count, Some(3));
    assert_eq!(info.last_printed, None);
}

#[test]
fn rejects_wrong_byte_order_and_truncation() {
    assert!(property_set::parse(&[0x00, 0x00, 0x00]).is_err());
    let mut stream = build_summary_stream(&[(14, vt_i4(1))]);
    stream[0] = 0xFF;
    stream[1] = 0xFF;
    assert!(property_set::parse(&stream).is_err());
    // Chopping the value table off must fail cleanly, not panic.
    let full = build_summary_stream(&[(14, vt_i4(1))]);
    assert!(property_set::parse(&full[..52]).is_err());
}

#[test]
fn filetime_conversion_handles_zero_and_epoch() {
    assert_eq!(filetime_to_datetime(0), None);
    assert_eq!(
        filetime_to_datetime(UNIX_EPOCH_FILETIME),
        Some(at(1970, 1, 1, 0, 0, 0))
    );
}

#[test]
fn edit_time_is_floor_divided_into_minutes() {
    assert_eq!(edit_seconds_to_minutes(125), 2);
    assert_eq!(edit_seconds_to_minutes(60), 1);
    assert_eq!(edit_seconds_to_minutes(59), 0);
    // Zero is a real value, not absence.
    assert_eq!(edit_seconds_to_minutes(0), 0);
}

#[test]
fn pre_1900_last_printed_is_never_printed() {
    let bogus = at(1899, 12, 31, 0, 0, 0);
    assert_eq!(normalize_last_printed(Some(bogus)), None);
    let real = at(2021, 12, 9, 20, 8, 0);
    assert_eq!(normalize_last_printed(Some(real)), Some(real));
    assert_eq!(normalize_last_printed(None), None);
}

#[test]
fn magic_check_accepts_real_containers_only() {
    let dir = TempDir::new().unwrap();

    let container_path = dir.path().join("platne.doc");
    {
        let comp = cfb::create(&container_path).expect("create compound file");
        drop(comp);
    }
    assert!(is_valid_container(&container_path).unwrap());

    let text_path = dir.path().join("obycajny.doc");
    fs::write(&text_path, b"just some renamed text file").unwrap();
    assert!(!is_valid_container(&text_path).unwrap());

    let short_path = dir.path().join("kratky.doc");
    fs::write(&short_path, b"ab").unwrap();
    assert!(!is_valid_container(&short_path).unwrap());
}

fn extract(path: &std::path::Path) -> MetadataRecord {
    let decoder = NameDecoder::default();
    OleExtractor.extract(
        path,
        ExtractContext {
            decoder: &decoder,
            exiftool: None,
        },
    )
}

fn write_container_with_summary(dir: &TempDir, name: &str, stream: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    let mut comp = cfb::create(&path).expect("create compound file");
    let mut summary = comp
        .create_stream("/\u{5}SummaryInformation")
        .expect("create summary stream");
    summary.write_all(stream).expect("write summary stream");
    summary.flush().expect("flush summary stream");
    drop(summary);
    drop(comp);
    path
}

#[test]
fn extracts_decoded_fields_from_container() {
    let dir = TempDir::new().unwrap();
    let stream = build_summary_stream(&[
        (4, lpstr(b"Tom\xA0\xE7")),
        (8, lpstr(b"admin")),
        (10, filetime(125 * 10_000_000)),
        (12, filetime(UNIX_EPOCH_FILETIME)),
        (14, vt_i4(3)),
    ]);
    let path = write_container_with_summary(&dir, "esej.doc", &stream);

    let record = extract(&path);
    assert_eq!(record.creator.as_deref(), Some("Tomáš"));
    assert_eq!(record.last_modified_by.as_deref(), Some("admin"));
    assert_eq!(record.total_edit_minutes, Some(2));
    assert_eq!(record.date_created, Some(at(1970, 1, 1, 0, 0, 0)));
    assert_eq!(record.page_count, Some(3));
    assert!(record.template.is_none());
}

#[test]
fn undecodable_text_property_stays_absent() {
    let dir = TempDir::new().unwrap();
    // Control bytes fail every decode candidate; the field must not echo
    // raw bytes.
    let stream = build_summary_stream(&[(4, lpstr(b"\x01\x02\x03")), (14, vt_i4(1))]);
    let path = write_container_with_summary(&dir, "esej.doc", &stream);

    let record = extract(&path);
    assert!(record.creator.is_none());
    assert_eq!(record.page_count, Some(1));
}

#[test]
fn non_container_doc_yields_empty_record_without_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("premenovane.doc");
    fs::write(&path, b"plain text masquerading as .doc").unwrap();

    let record = extract(&path);
    assert_eq!(record, MetadataRecord::new(&path));
}

#[test]
fn container_without_summary_stream_yields_empty_record() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("prazdny.doc");
    {
        let comp = cfb::create(&path).expect("create compound file");
        drop(comp);
    }

    let record = extract(&path);
    assert_eq!(record, MetadataRecord::new(&path));
}
