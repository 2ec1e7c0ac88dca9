//! Tab-separated tables.

use csv::{QuoteStyle, ReaderBuilder, Terminator, WriterBuilder};
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;
use thiserror::Error;

/// Errors raised while reading or writing a table.
#[derive(Debug, Error)]
pub enum TableError {
    /// The underlying TSV reader or writer failed.
    #[error("{0}")]
    Csv(#[from] csv::Error),

    /// A row has more fields than the table is wide.
    #[error("line {line}: expected {expected} fields, found {found}")]
    RaggedRow {
        /// 1-based line number within the parsed text.
        line: u64,
        /// Table width.
        expected: usize,
        /// Fields found on the line.
        found: usize,
    },

    /// An error inside a named section.
    #[error("section '{key}': {source}")]
    Section {
        /// The section key.
        key: String,
        /// The underlying error.
        #[source]
        source: Box<TableError>,
    },

    /// IO error.
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

impl TableError {
    /// Attaches a section key to this error.
    #[must_use]
    pub fn in_section(self, key: impl Into<String>) -> Self {
        Self::Section {
            key: key.into(),
            source: Box::new(self),
        }
    }
}

/// A rectangular table of string cells.
///
/// Every row has exactly [`Table::width`] cells. Rows that were shorter in the
/// source are padded with empty cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    header: Option<Vec<String>>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Creates a table from parts, padding short rows to the header width.
    #[must_use]
    pub fn new(header: Option<Vec<String>>, rows: Vec<Vec<String>>) -> Self {
        let mut table = Self { header, rows };
        let width = table.width();
        for row in &mut table.rows {
            row.resize(width.max(row.len()), String::new());
        }
        table
    }

    /// Parses tab-separated text.
    ///
    /// With `has_header`, the first non-blank line becomes the header and
    /// fixes the width; otherwise the first row does. Blank lines are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::RaggedRow`] if a row is wider than the table, or
    /// [`TableError::Csv`] for malformed quoting.
    pub fn parse_tsv(text: &str, has_header: bool) -> Result<Self, TableError> {
        Self::from_reader(text.as_bytes(), has_header)
    }

    /// Reads a headed TSV file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is malformed.
    pub fn read_tsv(path: &Path) -> Result<Self, TableError> {
        Self::from_reader(File::open(path)?, true)
    }

    fn from_reader(reader: impl Read, has_header: bool) -> Result<Self, TableError> {
        let mut rdr = ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut header: Option<Vec<String>> = None;
        let mut rows: Vec<Vec<String>> = Vec::new();
        let mut width: Option<usize> = None;

        for record in rdr.records() {
            let record = record?;
            let fields: Vec<String> = record.iter().map(str::to_string).collect();

            let Some(expected) = width else {
                width = Some(fields.len());
                if has_header {
                    header = Some(fields);
                } else {
                    rows.push(fields);
                }
                continue;
            };

            if fields.len() > expected {
                return Err(TableError::RaggedRow {
                    line: record.position().map_or(0, csv::Position::line),
                    expected,
                    found: fields.len(),
                });
            }
            rows.push(fields);
        }

        Ok(Self::new(header, rows))
    }

    /// Writes the table as TSV, header first when present.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or written.
    pub fn write_tsv(&self, path: &Path) -> Result<(), TableError> {
        let file = BufWriter::new(File::create(path)?);
        self.write_to(file)
    }

    /// Renders the table as TSV text.
    ///
    /// # Errors
    ///
    /// Returns an error if a cell cannot be encoded.
    pub fn to_tsv_string(&self) -> Result<String, TableError> {
        let mut buf = Vec::new();
        self.write_to(&mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    fn write_to(&self, out: impl Write) -> Result<(), TableError> {
        let mut wtr = WriterBuilder::new()
            .delimiter(b'\t')
            .quote_style(QuoteStyle::Necessary)
            .terminator(Terminator::Any(b'\n'))
            .from_writer(out);

        if let Some(header) = &self.header {
            wtr.write_record(header)?;
        }
        for row in &self.rows {
            wtr.write_record(row)?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// Returns the header row, if any.
    #[must_use]
    pub fn header(&self) -> Option<&[String]> {
        self.header.as_deref()
    }

    /// Returns the data rows.
    #[must_use]
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of columns.
    #[must_use]
    pub fn width(&self) -> usize {
        self.header
            .as_ref()
            .map(Vec::len)
            .or_else(|| self.rows.first().map(Vec::len))
            .unwrap_or(0)
    }

    /// Number of data rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if there are no data rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Removes every column whose header is in `names`.
    ///
    /// Names not present are ignored. Returns the removed column names in
    /// their original order.
    pub fn drop_columns(&mut self, names: &[&str]) -> Vec<String> {
        let Some(header) = &self.header else {
            return Vec::new();
        };

        let keep: Vec<bool> = header.iter().map(|h| !names.contains(&h.as_str())).collect();
        if keep.iter().all(|k| *k) {
            return Vec::new();
        }

        let removed = header
            .iter()
            .zip(&keep)
            .filter(|(_, k)| !**k)
            .map(|(h, _)| h.clone())
            .collect();

        let retain = |cells: &mut Vec<String>| {
            let mut i = 0;
            cells.retain(|_| {
                let kept = keep.get(i).copied().unwrap_or(true);
                i += 1;
                kept
            });
        };
        if let Some(header) = &mut self.header {
            retain(header);
        }
        for row in &mut self.rows {
            retain(row);
        }

        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn cells(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_string()).collect()
    }

    #[test]
    fn test_parse_with_header() {
        let table = Table::parse_tsv("ID_REF\tValue\n1\t0.5\n2\t0.7\n", true).unwrap();

        assert_eq!(table.header(), Some(cells(&["ID_REF", "Value"]).as_slice()));
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[1], cells(&["2", "0.7"]));
    }

    #[test]
    fn test_parse_headerless_width_from_first_row() {
        let table = Table::parse_tsv("a\tb\nc\n", false).unwrap();

        assert!(table.header().is_none());
        assert_eq!(table.width(), 2);
        assert_eq!(table.rows()[1], cells(&["c", ""]));
    }

    #[test]
    fn test_parse_skips_blank_lines() {
        let table = Table::parse_tsv("h1\th2\n\n1\t2\n\n", true).unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_parse_empty_text() {
        let table = Table::parse_tsv("", true).unwrap();
        assert!(table.header().is_none());
        assert!(table.is_empty());
        assert_eq!(table.to_tsv_string().unwrap(), "");
    }

    #[test]
    fn test_parse_rejects_wide_row() {
        let err = Table::parse_tsv("a\tb\n1\t2\t3\n", true).unwrap_err();
        assert!(matches!(
            err,
            TableError::RaggedRow {
                line: 2,
                expected: 2,
                found: 3
            }
        ));
    }

    #[test]
    fn test_drop_columns_preserves_order() {
        let mut table = Table::parse_tsv(
            "ID_REF\tDefinition\tSymbol\tProbe_Sequence\n1\tfoo\tTP53\tACGT\n",
            true,
        )
        .unwrap();

        let removed = table.drop_columns(&["Probe_Sequence", "Definition", "Synonyms"]);

        assert_eq!(removed, cells(&["Definition", "Probe_Sequence"]));
        assert_eq!(table.header(), Some(cells(&["ID_REF", "Symbol"]).as_slice()));
        assert_eq!(table.rows()[0], cells(&["1", "TP53"]));
    }

    #[test]
    fn test_drop_columns_without_header_is_noop() {
        let mut table = Table::parse_tsv("a\tb\n", false).unwrap();
        assert!(table.drop_columns(&["a"]).is_empty());
        assert_eq!(table.width(), 2);
    }

    #[test]
    fn test_write_and_read_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("t.tsv");
        let table = Table::new(
            Some(cells(&["ID_REF", "Note"])),
            vec![cells(&["1", "has\ttab"]), cells(&["2", "plain"])],
        );

        table.write_tsv(&path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "ID_REF\tNote\n1\t\"has\ttab\"\n2\tplain\n");
        assert_eq!(Table::read_tsv(&path).unwrap(), table);
    }

    #[test]
    fn test_headerless_written_without_header_line() {
        let table = Table::parse_tsv("a\tb\n", false).unwrap();
        assert_eq!(table.to_tsv_string().unwrap(), "a\tb\n");
    }
}
