//! Staging for zipped submissions.
//!
//! When the input root holds one archive per submission, supported members
//! are materialized into a temporary directory first, under their decoded
//! names, so the regular recursive reader can pick them up by extension.
//! The staging directory lives exactly as long as one archive's processing
//! and is removed on scope exit, success or failure.

use std::fs;
use std::io;
use std::path::Path;

use tempfile::TempDir;
use zip::ZipArchive;

use crate::config::ScanConfig;
use crate::decoding::NameDecoder;
use crate::extractors::DocumentKind;
use crate::scanner::collector::read_metadata_recursively;
use crate::types::metadata::MetadataRecord;

/// Extract metadata from every supported member of a submission archive.
///
/// Anything that is not a readable zip yields an empty list with a warning;
/// a single bad member is skipped, never the whole archive. Records come
/// back with `source_path` rewritten to the decoded entry name, not the
/// staging location.
pub fn collect_from_zipped(archive_path: &Path, config: &ScanConfig) -> Vec<MetadataRecord> {
    let file = match fs::File::open(archive_path) {
        Ok(file) => file,
        Err(e) => {
            log::warn!("cannot open {}: {e}", archive_path.display());
            return Vec::new();
        }
    };
    let mut archive = match ZipArchive::new(file) {
        Ok(archive) => archive,
        Err(e) => {
            log::warn!("not a zip file: {}: {e}", archive_path.display());
            return Vec::new();
        }
    };
    let staging = match TempDir::new() {
        Ok(staging) => staging,
        Err(e) => {
            log::error!("cannot create staging directory: {e}");
            return Vec::new();
        }
    };
    let decoder = NameDecoder::from_config(config);

    for index in 0..archive.len() {
        let mut entry = match archive.by_index(index) {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("unreadable archive entry {index} in {}: {e}", archive_path.display());
                continue;
            }
        };
        if entry.is_dir() {
            continue;
        }

        let stored_name = entry.name().to_string();
        let base = basename(&stored_name);
        if DocumentKind::from_path(Path::new(base)).is_none() {
            continue;
        }

        // The zip ecosystem has already force-decoded non-UTF-8 names under
        // CP437 at this point; recover the intended spelling where the
        // decoder can, otherwise keep the stored name.
        let display_name = match decoder.decode_mangled(base) {
            Some(decoded) => decoded,
            None => base.to_string(),
        };
        // Staging is flat and must stay inside the staging root, so only a
        // bare file name may reach the filesystem.
        let file_name = basename(&display_name).to_string();

        let target = staging.path().join(&file_name);
        let mut output = match fs::File::create(&target) {
            Ok(output) => output,
            Err(e) => {
                log::warn!("cannot stage {file_name}: {e}");
                continue;
            }
        };
        if let Err(e) = io::copy(&mut entry, &mut output) {
            log::warn!("failed to stage {file_name}: {e}");
            continue;
        }
    }

    let mut records = read_metadata_recursively(staging.path(), config);
    for record in &mut records {
        if let Ok(relative) = record.source_path.strip_prefix(staging.path()) {
            record.set_source_path(relative.to_path_buf());
        }
    }
    records
}

/// Last path segment of an archive entry name, whichever separator its
/// producer used.
fn basename(name: &str) -> &str {
    name.rsplit(['/', '\\']).next().unwrap_or(name)
}
