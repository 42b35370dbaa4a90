//! Recursive discovery of submission files.
//! Uses the `walkdir` crate; symlinks are not followed.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::extractors::DocumentKind;

/// A classified file in discovery order.
#[derive(Debug, Clone)]
pub struct FoundDocument {
    pub path: PathBuf,
    pub kind: DocumentKind,
}

/// Walk all descendants of `root` and classify every file entry.
///
/// Directory entries are skipped, as is any entry whose own name starts
/// with a dot (files *inside* hidden directories are still visited, only
/// the hidden entry itself is excluded). Unsupported extensions are dropped
/// silently. Order of the result is discovery order of the walk.
pub fn collect_documents(root: &Path) -> Vec<FoundDocument> {
    let mut documents = Vec::new();

    let walker = WalkDir::new(root).follow_links(false).into_iter();
    for entry in walker.filter_map(|e| e.ok()) {
        if entry.file_type().is_dir() {
            continue;
        }
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }

        let path = entry.path();
        if let Some(kind) = DocumentKind::from_path(path) {
            log::info!("found submission file {}", path.display());
            documents.push(FoundDocument {
                path: path.to_path_buf(),
                kind,
            });
        }
    }

    documents
}
