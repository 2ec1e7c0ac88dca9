//! Splitting section-delimited text into tables.
//!
//! A line starting with `[` opens a new section named by its bracketed text.
//! Every following line up to the next such line belongs to that section and
//! is parsed as TSV. Lines before the first section are discarded.

use super::{Table, TableError};
use crate::errors::{PipelineError, Result};
use regex::Regex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// The one section whose content has no header row.
pub const HEADERLESS_SECTION: &str = "Heading";

/// Tables produced from one decompressed file.
#[derive(Debug, Clone, Default)]
pub struct ParsedFile {
    /// The parsed input file.
    pub source: PathBuf,
    /// Written table files, by section key.
    pub tables: BTreeMap<String, PathBuf>,
}

/// Splits one decompressed file into per-section TSV tables.
#[derive(Debug, Clone)]
pub struct SectionParser {
    section_line: Regex,
}

impl Default for SectionParser {
    fn default() -> Self {
        Self::new()
    }
}

impl SectionParser {
    /// Creates a new parser.
    #[must_use]
    pub fn new() -> Self {
        Self {
            section_line: Regex::new(r"^\[(.*)\]$").expect("section line pattern is valid"),
        }
    }

    /// Extracts the key from a section line.
    fn section_key(&self, line: &str) -> String {
        let line = line.trim_end_matches(['\n', '\r']);
        self.section_line.captures(line).map_or_else(
            || line.trim_matches(['[', ']']).to_string(),
            |caps| caps[1].to_string(),
        )
    }

    /// Splits `text` into tables keyed by section name.
    ///
    /// A section closed by a following section line is parsed with a header
    /// row unless its key is `Heading`. The last section of the text is always
    /// parsed with a header row, even when it is `Heading`. A repeated key
    /// replaces the earlier table.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::Section`] if a section's payload is malformed.
    pub fn split(&self, text: &str) -> std::result::Result<BTreeMap<String, Table>, TableError> {
        let mut tables = BTreeMap::new();
        let mut current: Option<String> = None;
        let mut buffer = String::new();

        for line in text.split_inclusive('\n') {
            if line.starts_with('[') {
                if let Some(key) = current.take() {
                    let has_header = key != HEADERLESS_SECTION;
                    let table = Table::parse_tsv(&buffer, has_header)
                        .map_err(|e| e.in_section(&key))?;
                    tables.insert(key, table);
                }
                buffer.clear();
                let key = self.section_key(line);
                // An empty key behaves as no key: its lines are discarded.
                current = (!key.is_empty()).then_some(key);
                continue;
            }
            if current.is_some() {
                buffer.push_str(line);
            }
        }

        if let Some(key) = current {
            let table = Table::parse_tsv(&buffer, true).map_err(|e| e.in_section(&key))?;
            tables.insert(key, table);
        }

        Ok(tables)
    }

    /// Parses `path` and writes each section next to it as
    /// `<file stem>_<key>.tsv`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::MissingInput`] if `path` does not exist,
    /// [`PipelineError::DecodeFailure`] if it is not UTF-8 text or a section is
    /// malformed, and [`PipelineError::Io`] if a table cannot be written.
    pub fn parse_file(&self, path: &Path) -> Result<ParsedFile> {
        if !path.is_file() {
            return Err(PipelineError::missing_input(path));
        }
        let bytes = std::fs::read(path)?;
        let text = String::from_utf8(bytes).map_err(|e| PipelineError::decode(path, e))?;
        let sections = self.split(&text).map_err(|e| PipelineError::decode(path, e))?;

        let mut parsed = ParsedFile {
            source: path.to_path_buf(),
            tables: BTreeMap::new(),
        };
        if sections.is_empty() {
            debug!(path = %path.display(), "No sections found");
            return Ok(parsed);
        }

        for (key, table) in sections {
            let out = section_table_path(path, &key);
            table.write_tsv(&out).map_err(|e| match e {
                TableError::Io(io) => PipelineError::Io(io),
                other => PipelineError::decode(&out, other),
            })?;
            info!(path = %out.display(), key = %key, rows = table.len(), "Saved section table");
            parsed.tables.insert(key, out);
        }

        Ok(parsed)
    }
}

/// Location of the table for section `key` of the decompressed file at `source`.
#[must_use]
pub fn section_table_path(source: &Path, key: &str) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    source.with_file_name(format!("{stem}_{key}.tsv"))
}
