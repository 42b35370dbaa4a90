//! Authorship metadata extraction for student submission documents.
//!
//! Walks nested submission directories (or zipped submissions), classifies
//! the files it finds into the three supported document formats, and
//! normalizes whatever metadata each one exposes into a single record
//! schema. Filenames written under legacy DOS/Windows code pages are
//! recovered before anything else sees them.
//!
//! The library produces an ordered directory → records mapping; rendering
//! it (and the CLI around it) is the consumer's business.

pub mod config;
pub mod decoding;
pub mod exiftool;
pub mod extractors;
pub mod scanner;
pub mod types;

pub use config::ScanConfig;
pub use scanner::{collect_metadata, read_metadata_recursively, DirectoryGroup};
pub use types::errors::{ScanError, ScanResult};
pub use types::metadata::MetadataRecord;
