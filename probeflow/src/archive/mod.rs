//! Retrieval and unpacking of GEO supplementary archives.
//!
//! This module provides:
//! - `ArchiveFetcher` - downloads the raw `.tar` to a deterministic path
//! - `ArchiveExtractor` - decompresses `.txt.gz` members and splits them into tables

mod extract;
mod fetch;

pub use extract::{member_dir_name, ArchiveExtractor, ExtractedMember, ExtractionSummary, MEMBER_SUFFIX};
pub use fetch::{partial_path, ArchiveFetcher};
