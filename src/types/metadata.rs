use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde::Serialize;

/// Normalized metadata for one discovered document file.
///
/// Every field is independently optional: a record with all fields absent is
/// valid and means "file found, no metadata recoverable". Such records still
/// appear in the final report, they are never dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetadataRecord {
    /// Location of the original file. For archive members this is the
    /// archive entry name after filename decoding, not the staging path.
    pub source_path: PathBuf,
    /// Base name derived from `source_path`.
    pub file_name: String,
    /// Extension derived from `source_path`, lower-cased, without the dot.
    pub file_extension: String,
    pub creator: Option<String>,
    pub last_modified_by: Option<String>,
    pub template: Option<String>,
    pub date_created: Option<NaiveDateTime>,
    pub date_modified: Option<NaiveDateTime>,
    pub last_printed: Option<NaiveDateTime>,
    /// Total edit time in minutes. Legacy binary sources report seconds and
    /// are floor-divided during normalization.
    pub total_edit_minutes: Option<i64>,
    pub page_count: Option<i64>,
}

impl MetadataRecord {
    /// An empty record for the given file, with name and extension derived.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let source_path = path.into();
        let (file_name, file_extension) = derive_name_parts(&source_path);
        Self {
            source_path,
            file_name,
            file_extension,
            ..Self::default()
        }
    }

    /// Replace `source_path` and re-derive the name fields. Used when a
    /// staged archive member is reported under its decoded entry name.
    pub fn set_source_path(&mut self, path: PathBuf) {
        let (file_name, file_extension) = derive_name_parts(&path);
        self.source_path = path;
        self.file_name = file_name;
        self.file_extension = file_extension;
    }
}

fn derive_name_parts(path: &Path) -> (String, String) {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    (file_name, file_extension)
}
