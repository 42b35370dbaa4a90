use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// Failure taxonomy for the scan pipeline.
///
/// Only `NotADirectory` ever aborts a run; every other variant is caught at
/// the narrowest boundary (per file, or per batch for the shared external
/// process) and downgraded to a partial record.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("input path is not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("format mismatch: {0}")]
    FormatMismatch(String),
    #[error("partial metadata: {0}")]
    PartialMetadata(String),
    #[error("external process unavailable: {0}")]
    ExternalProcessUnavailable(String),
    #[error("archive error: {0}")]
    Archive(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Serialize for ScanError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.to_string().as_ref())
    }
}

pub type ScanResult<T> = Result<T, ScanError>;
