//! Per-format metadata extractors behind one polymorphic contract.
//!
//! An extractor never lets a failure escape its own boundary: whatever goes
//! wrong inside, the caller gets a record back (partial or all-absent) plus
//! a log line. One unreadable file must never abort a batch.

use std::path::Path;

use chrono::{DateTime, NaiveDateTime};

use crate::decoding::NameDecoder;
use crate::exiftool::ExifTool;
use crate::types::metadata::MetadataRecord;

pub mod ole;
pub mod opc;
pub mod pdf;

#[cfg(test)]
mod tests;

pub use ole::OleExtractor;
pub use opc::OpcExtractor;
pub use pdf::PdfExtractor;

/// The three supported document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// Legacy binary `.doc` (compound-file container).
    LegacyDoc,
    /// Zip-packaged `.docx`.
    PackagedDoc,
    /// Portable `.pdf`.
    PortableDoc,
}

impl DocumentKind {
    /// Classify a filesystem entry by lower-cased extension. `None` means
    /// unsupported, dropped silently by callers, since submission
    /// directories routinely contain unrelated files.
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_string_lossy().to_lowercase();
        match extension.as_str() {
            "doc" => Some(DocumentKind::LegacyDoc),
            "docx" => Some(DocumentKind::PackagedDoc),
            "pdf" => Some(DocumentKind::PortableDoc),
            _ => None,
        }
    }

    /// The extractor implementation for this kind, fixed at classification
    /// time.
    pub fn extractor(self) -> &'static dyn Extract {
        match self {
            DocumentKind::LegacyDoc => &OleExtractor,
            DocumentKind::PackagedDoc => &OpcExtractor,
            DocumentKind::PortableDoc => &PdfExtractor,
        }
    }
}

/// Shared resources an extraction may need: the filename decoder always,
/// the external process handle only for formats that delegate to it.
pub struct ExtractContext<'a> {
    pub decoder: &'a NameDecoder,
    pub exiftool: Option<&'a mut ExifTool>,
}

/// One capability, three implementations.
pub trait Extract {
    /// Produce a record for `path`. Infallible by contract: internal
    /// failures downgrade to absent fields.
    fn extract(&self, path: &Path, ctx: ExtractContext<'_>) -> MetadataRecord;
}

/// OPC core-properties timestamps: fixed ISO-8601-with-Z pattern.
const ISO_UTC_PATTERN: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Exiftool timestamps, e.g. `2021:12:14 17:52:05+00:00`.
const EXIF_DATETIME_PATTERN: &str = "%Y:%m:%d %H:%M:%S%z";
const EXIF_DATETIME_NAIVE_PATTERN: &str = "%Y:%m:%d %H:%M:%S";

pub(crate) fn parse_iso_utc(value: &str) -> Option<NaiveDateTime> {
    if value.is_empty() {
        return None;
    }
    match NaiveDateTime::parse_from_str(value, ISO_UTC_PATTERN) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            log::warn!("unparseable timestamp {value:?}: {e}");
            None
        }
    }
}

/// Zone offset is optional in the wild; offset-bearing values are pinned to
/// their UTC instant, bare ones (with or without a `Z` suffix) parse naive.
pub(crate) fn parse_exif_datetime(value: &str) -> Option<NaiveDateTime> {
    if value.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_str(value, EXIF_DATETIME_PATTERN) {
        return Some(parsed.naive_utc());
    }
    match NaiveDateTime::parse_from_str(value.trim_end_matches('Z'), EXIF_DATETIME_NAIVE_PATTERN) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            log::warn!("unparseable timestamp {value:?}: {e}");
            None
        }
    }
}
