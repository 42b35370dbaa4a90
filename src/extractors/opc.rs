//! Packaged-document (`.docx`) extractor.
//!
//! The file is a zip package holding two conventional XML parts. Each part
//! is optional on its own: a package without `app.xml` still yields the
//! core fields, and vice versa.

use std::fs;
use std::io::Read;
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;
use zip::result::ZipError;
use zip::ZipArchive;

use crate::extractors::{parse_iso_utc, Extract, ExtractContext};
use crate::types::errors::{ScanError, ScanResult};
use crate::types::metadata::MetadataRecord;

const CORE_PART: &str = "docProps/core.xml";
const APP_PART: &str = "docProps/app.xml";

pub struct OpcExtractor;

impl Extract for OpcExtractor {
    fn extract(&self, path: &Path, _ctx: ExtractContext<'_>) -> MetadataRecord {
        let mut record = MetadataRecord::new(path);

        let file = match fs::File::open(path) {
            Ok(f) => f,
            Err(e) => {
                log::warn!("cannot open {}: {e}", path.display());
                return record;
            }
        };
        let mut archive = match ZipArchive::new(file) {
            Ok(a) => a,
            Err(e) => {
                log::warn!("not a readable package: {}: {e}", path.display());
                return record;
            }
        };

        match read_part(&mut archive, CORE_PART) {
            Ok(Some(xml)) => apply_core_properties(&mut record, &xml),
            Ok(None) => log::warn!("document has no core part: {}", path.display()),
            Err(e) => log::warn!("core part unreadable in {}: {e}", path.display()),
        }
        match read_part(&mut archive, APP_PART) {
            Ok(Some(xml)) => apply_app_properties(&mut record, &xml),
            Ok(None) => log::warn!("document has no app part: {}", path.display()),
            Err(e) => log::warn!("app part unreadable in {}: {e}", path.display()),
        }

        record
    }
}

/// Extract one named part without materializing the archive.
/// `Ok(None)` = part absent, which is expected and not an error.
fn read_part(archive: &mut ZipArchive<fs::File>, name: &str) -> ScanResult<Option<String>> {
    let mut part = match archive.by_name(name) {
        Ok(part) => part,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(ScanError::Archive(format!("{name}: {e}"))),
    };
    let mut xml = String::new();
    part.read_to_string(&mut xml)
        .map_err(|e| ScanError::PartialMetadata(format!("{name}: {e}")))?;
    Ok(Some(xml))
}

fn apply_core_properties(record: &mut MetadataRecord, xml: &str) {
    record.creator = element_text(xml, "dc:creator").filter(|s| !s.is_empty());
    record.last_modified_by = element_text(xml, "cp:lastModifiedBy").filter(|s| !s.is_empty());
    record.date_created = element_text(xml, "dcterms:created").and_then(|s| parse_iso_utc(&s));
    record.date_modified = element_text(xml, "dcterms:modified").and_then(|s| parse_iso_utc(&s));
    record.last_printed = element_text(xml, "cp:lastPrinted").and_then(|s| parse_iso_utc(&s));
}

fn apply_app_properties(record: &mut MetadataRecord, xml: &str) {
    record.template = element_text(xml, "Template").filter(|s| !s.is_empty());
    // Already minutes in this format. Present-but-empty means "no recorded
    // editing", which is 0, distinct from the element missing entirely.
    record.total_edit_minutes = element_text(xml, "TotalTime").and_then(|s| {
        if s.is_empty() {
            Some(0)
        } else {
            parse_integer(&s, "TotalTime")
        }
    });
    record.page_count = element_text(xml, "Pages")
        .filter(|s| !s.is_empty())
        .and_then(|s| parse_integer(&s, "Pages"));
}

fn parse_integer(value: &str, element: &str) -> Option<i64> {
    match value.trim().parse() {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            log::warn!("non-numeric {element} value {value:?}: {e}");
            None
        }
    }
}

/// Text content of the first element with the given qualified name, or
/// `None` when the element is missing. A present-but-childless element
/// yields `Some("")` so callers can tell the two cases apart.
fn element_text(xml: &str, tag: &str) -> Option<String> {
    let mut reader = Reader::from_str(xml);
    let mut capturing = false;
    let mut text = String::new();
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.name().as_ref() == tag.as_bytes() && !capturing => {
                capturing = true;
            }
            Ok(Event::Empty(e)) if e.name().as_ref() == tag.as_bytes() && !capturing => {
                return Some(String::new());
            }
            Ok(Event::Text(t)) if capturing => {
                if let Ok(unescaped) = t.unescape() {
                    text.push_str(&unescaped);
                }
            }
            Ok(Event::End(e)) if capturing && e.name().as_ref() == tag.as_bytes() => {
                return Some(text);
            }
            Ok(Event::Eof) => return None,
            Err(e) => {
                log::warn!("malformed xml part: {e}");
                return None;
            }
            _ => {}
        }
    }
}
