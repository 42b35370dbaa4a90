//! Batch extraction across a submission tree.
//!
//! Extraction is batched by document kind (legacy binaries, then packaged
//! documents, then portable documents sharing one external process), but
//! the returned records are merged back into the discovery order of the
//! walk, so callers see the tree order, not the batch order.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::ScanConfig;
use crate::decoding::NameDecoder;
use crate::exiftool::ExifTool;
use crate::extractors::{DocumentKind, ExtractContext};
use crate::scanner::walker::{collect_documents, FoundDocument};
use crate::scanner::staging;
use crate::types::errors::{ScanError, ScanResult};
use crate::types::metadata::MetadataRecord;

/// One top-level submission directory and the records found beneath it.
#[derive(Debug, Clone, Serialize)]
pub struct DirectoryGroup {
    pub directory: PathBuf,
    pub records: Vec<MetadataRecord>,
}

/// Extract metadata from every supported file under `root`.
///
/// A `root` that is not a directory yields an empty list with a warning,
/// not an error; stray files between submission directories are routine.
pub fn read_metadata_recursively(root: &Path, config: &ScanConfig) -> Vec<MetadataRecord> {
    if !root.is_dir() {
        log::warn!("path is not a directory: {}", root.display());
        return Vec::new();
    }
    let documents = collect_documents(root);
    extract_all(&documents, config)
}

/// Run the per-kind extraction batches and merge results back into the
/// discovery order of `documents`.
pub(crate) fn extract_all(documents: &[FoundDocument], config: &ScanConfig) -> Vec<MetadataRecord> {
    let decoder = NameDecoder::from_config(config);
    let mut slots: Vec<Option<MetadataRecord>> = vec![None; documents.len()];

    // In-process formats first; both are cheap per-file reads and any
    // failure is already downgraded inside the extractor.
    for kind in [DocumentKind::LegacyDoc, DocumentKind::PackagedDoc] {
        let extractor = kind.extractor();
        for (index, document) in documents.iter().enumerate() {
            if document.kind != kind {
                continue;
            }
            let ctx = ExtractContext {
                decoder: &decoder,
                exiftool: None,
            };
            slots[index] = Some(extractor.extract(&document.path, ctx));
        }
    }

    // Portable documents share a single external process, spawned once per
    // batch and dropped (shut down and reaped) on scope exit. If it cannot
    // start, the whole batch degrades to all-absent records and the failure
    // is reported once, not once per file.
    let portable: Vec<usize> = documents
        .iter()
        .enumerate()
        .filter(|(_, d)| d.kind == DocumentKind::PortableDoc)
        .map(|(index, _)| index)
        .collect();
    if !portable.is_empty() {
        let extractor = DocumentKind::PortableDoc.extractor();
        match ExifTool::spawn(&config.exiftool_path) {
            Ok(mut tool) => {
                for index in portable {
                    let ctx = ExtractContext {
                        decoder: &decoder,
                        exiftool: Some(&mut tool),
                    };
                    slots[index] = Some(extractor.extract(&documents[index].path, ctx));
                }
            }
            Err(e) => {
                log::error!(
                    "cannot extract portable document metadata, perhaps the tool is not installed: {e}"
                );
                for index in portable {
                    let ctx = ExtractContext {
                        decoder: &decoder,
                        exiftool: None,
                    };
                    slots[index] = Some(extractor.extract(&documents[index].path, ctx));
                }
            }
        }
    }

    slots.into_iter().flatten().collect()
}

/// Build the final ordered directory → records mapping.
///
/// Children of `input_dir` are visited in filesystem iteration order and
/// every child becomes a group, even when nothing extractable was found
/// beneath it; empty submissions must still show up in the report. The
/// only fatal condition is an unusable `input_dir` itself.
pub fn collect_metadata(
    input_dir: &Path,
    zipped: bool,
    config: &ScanConfig,
) -> ScanResult<Vec<DirectoryGroup>> {
    if !input_dir.is_dir() {
        return Err(ScanError::NotADirectory(input_dir.to_path_buf()));
    }

    let mut groups = Vec::new();
    for entry in fs::read_dir(input_dir)? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("skipping unreadable entry: {e}");
                continue;
            }
        };
        let path = entry.path();

        let records = if zipped {
            staging::collect_from_zipped(&path, config)
        } else {
            read_metadata_recursively(&path, config)
        };
        log::info!("dir {} has {} records", path.display(), records.len());

        groups.push(DirectoryGroup {
            directory: path,
            records,
        });
    }

    Ok(groups)
}
