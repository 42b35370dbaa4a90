//! Portable-document (`.pdf`) extractor.
//!
//! This format is not parsed in-process at all; everything comes from the
//! shared external metadata process. Without a usable handle the record
//! stays all-absent; the batch-level failure is reported once by the
//! pipeline, not per file.

use std::path::Path;

use serde_json::Value;

use crate::extractors::{parse_exif_datetime, Extract, ExtractContext};
use crate::types::metadata::MetadataRecord;

const KEY_PAGE_COUNT: &str = "PDF:PageCount";
const KEY_CREATOR: &str = "PDF:Creator";
const KEY_CREATE_DATE: &str = "PDF:CreateDate";
const KEY_MODIFY_DATE: &str = "PDF:ModifyDate";

pub struct PdfExtractor;

impl Extract for PdfExtractor {
    fn extract(&self, path: &Path, ctx: ExtractContext<'_>) -> MetadataRecord {
        let mut record = MetadataRecord::new(path);

        let Some(tool) = ctx.exiftool else {
            log::debug!("no metadata process for {}", path.display());
            return record;
        };

        let values = match tool.get_metadata(path) {
            Ok(values) => values,
            Err(e) => {
                log::error!("error reading metadata for {}: {e}", path.display());
                return record;
            }
        };

        record.page_count = values.get(KEY_PAGE_COUNT).and_then(Value::as_i64);
        record.creator = values
            .get(KEY_CREATOR)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_owned);
        record.date_created = values
            .get(KEY_CREATE_DATE)
            .and_then(Value::as_str)
            .and_then(parse_exif_datetime);
        record.date_modified = values
            .get(KEY_MODIFY_DATE)
            .and_then(Value::as_str)
            .and_then(parse_exif_datetime);

        record
    }
}
