//! Legacy-binary (`.doc`) extractor.
//!
//! The file is a compound-file container whose `\x05SummaryInformation`
//! stream carries the authorship property set. A file with the wrong magic
//! is an expected condition (submissions get renamed all the time) and
//! yields an all-absent record, not an error.

use std::fs;
use std::io::Read;
use std::path::Path;

use chrono::{Datelike, NaiveDateTime};

use crate::extractors::{Extract, ExtractContext};
use crate::types::errors::{ScanError, ScanResult};
use crate::types::metadata::MetadataRecord;

pub mod property_set;

use property_set::SummaryInformation;

/// Compound File Binary signature (first 8 bytes).
pub const COMPOUND_FILE_MAGIC: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

const SUMMARY_INFORMATION_STREAM: &str = "/\u{5}SummaryInformation";

pub struct OleExtractor;

impl Extract for OleExtractor {
    fn extract(&self, path: &Path, ctx: ExtractContext<'_>) -> MetadataRecord {
        let mut record = MetadataRecord::new(path);

        match is_valid_container(path) {
            Ok(true) => {}
            Ok(false) => {
                log::warn!("not a valid compound-file container: {}", path.display());
                return record;
            }
            Err(e) => {
                log::warn!("cannot read {}: {e}", path.display());
                return record;
            }
        }

        let summary = match read_summary_information(path) {
            Ok(summary) => summary,
            Err(e) => {
                log::warn!("no usable property set in {}: {e}", path.display());
                return record;
            }
        };

        // Free-text properties arrive as code-page bytes; they go through
        // the nullable decoder path, so an undecodable value stays absent
        // rather than echoing raw bytes into the report.
        record.creator = summary
            .author
            .as_deref()
            .and_then(|bytes| ctx.decoder.decode_nullable(bytes));
        record.last_modified_by = summary
            .last_saved_by
            .as_deref()
            .and_then(|bytes| ctx.decoder.decode_nullable(bytes));
        record.template = summary
            .template
            .as_deref()
            .and_then(|bytes| ctx.decoder.decode_nullable(bytes));

        record.date_created = summary.create_time;
        record.date_modified = summary.last_saved_time;
        record.last_printed = normalize_last_printed(summary.last_printed);
        record.total_edit_minutes = summary.total_edit_secs.map(edit_seconds_to_minutes);
        record.page_count = summary.page_count.map(i64::from);

        record
    }
}

/// Cheap signature check, separate from full container parsing so renamed
/// non-documents bail out before any structure is touched.
pub fn is_valid_container(path: &Path) -> std::io::Result<bool> {
    let mut file = fs::File::open(path)?;
    let mut magic = [0u8; 8];
    match file.read_exact(&mut magic) {
        Ok(()) => Ok(magic == COMPOUND_FILE_MAGIC),
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => Ok(false),
        Err(e) => Err(e),
    }
}

fn read_summary_information(path: &Path) -> ScanResult<SummaryInformation> {
    let mut container = cfb::open(path)
        .map_err(|e| ScanError::FormatMismatch(format!("{}: {e}", path.display())))?;
    let mut stream = container
        .open_stream(SUMMARY_INFORMATION_STREAM)
        .map_err(|e| ScanError::FormatMismatch(format!("no summary information stream: {e}")))?;
    let mut data = Vec::new();
    stream.read_to_end(&mut data)?;
    property_set::parse(&data)
}

/// The raw property is a duration in seconds; the report wants whole
/// minutes. Zero is a real value ("no recorded editing"), not absence.
pub(crate) fn edit_seconds_to_minutes(seconds: u64) -> i64 {
    (seconds / 60) as i64
}

/// Some legacy writers emit a bogus 1899 date instead of leaving the
/// last-printed property out; anything before 1900 means "never printed".
pub(crate) fn normalize_last_printed(value: Option<NaiveDateTime>) -> Option<NaiveDateTime> {
    value.filter(|printed| printed.year() >= 1900)
}
