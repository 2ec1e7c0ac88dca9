//! Tabular data extracted from section-delimited text files.
//!
//! This module provides:
//! - `Table` - an in-memory tab-separated table with an optional header row
//! - `SectionParser` - splits one decompressed file into per-section tables

mod sections;
mod table;

pub use sections::{section_table_path, ParsedFile, SectionParser, HEADERLESS_SECTION};
pub use table::{Table, TableError};
