//! Collection pipeline: walk submission trees, classify files, batch the
//! per-kind extractors and hand back ordered directory groups.

pub mod collector;
pub mod staging;
pub mod walker;

#[cfg(test)]
mod tests;

pub use collector::{collect_metadata, read_metadata_recursively, DirectoryGroup};
pub use walker::{collect_documents, FoundDocument};
