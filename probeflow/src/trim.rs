//! Removal of annotation columns from `Probes` tables.

use crate::config::TRIMMED_MARKER_NAME;
use crate::errors::{PipelineError, Result};
use crate::tables::{Table, TableError};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use walkdir::WalkDir;

/// Suffix of the section tables this module trims.
pub const PROBES_SUFFIX: &str = "_Probes.tsv";

/// Suffix given to trimmed copies.
pub const TRIMMED_SUFFIX: &str = "_trimmed_Probes.tsv";

/// Columns removed from every `Probes` table when present.
pub const DROPPED_COLUMNS: [&str; 7] = [
    "Definition",
    "Ontology_Component",
    "Ontology_Process",
    "Ontology_Function",
    "Synonyms",
    "Obsolete_Probe_Id",
    "Probe_Sequence",
];

/// Content of the completion marker.
pub const TRIMMED_MARKER_PAYLOAD: &str = "Trimmed Probes processing completed.\n";

/// One successfully trimmed table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrimmedFile {
    /// The source `_Probes.tsv` table.
    pub source: PathBuf,
    /// The trimmed copy.
    pub output: PathBuf,
    /// Columns that were present and removed.
    pub removed_columns: Vec<String>,
}

/// A table that could not be trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrimFailure {
    /// The source table.
    pub path: PathBuf,
    /// What went wrong.
    pub reason: String,
}

/// Result of one trimming pass.
#[derive(Debug, Clone, Default)]
pub struct TrimReport {
    /// Tables trimmed, in discovery order.
    pub trimmed: Vec<TrimmedFile>,
    /// Tables skipped because of read or write errors.
    pub failures: Vec<TrimFailure>,
    /// The completion marker that was written.
    pub marker: PathBuf,
}

/// Writes trimmed copies of every `Probes` table under a directory.
#[derive(Debug, Clone, Default)]
pub struct ProbesTrimmer;

impl ProbesTrimmer {
    /// Creates a new trimmer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Recursively finds every `*_Probes.tsv` file under `dir`, sorted by path.
    ///
    /// Unreadable directory entries are logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::MissingInput`] if `dir` does not exist.
    pub fn discover(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        if !dir.is_dir() {
            return Err(PipelineError::missing_input(dir));
        }

        let mut found: Vec<PathBuf> = WalkDir::new(dir)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(err) => {
                    warn!(error = %err, "Skipping unreadable entry");
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| entry.file_name().to_string_lossy().ends_with(PROBES_SUFFIX))
            .map(walkdir::DirEntry::into_path)
            .collect();
        found.sort();
        Ok(found)
    }

    /// Trims every `Probes` table under `processed_dir` into `output_dir`,
    /// then writes the completion marker.
    ///
    /// Each table is handled independently; a table that fails is recorded in
    /// [`TrimReport::failures`] and the rest are still processed.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::NoInputFound`] (without writing the marker) if
    /// no table is found, and [`PipelineError::Io`] if the output directory or
    /// the marker cannot be written.
    pub fn trim(&self, processed_dir: &Path, output_dir: &Path) -> Result<TrimReport> {
        let sources = self.discover(processed_dir)?;
        if sources.is_empty() {
            error!(dir = %processed_dir.display(), "No Probes files found");
            return Err(PipelineError::no_input_found(
                processed_dir,
                format!("*{PROBES_SUFFIX}"),
            ));
        }

        fs::create_dir_all(output_dir)?;
        let mut report = TrimReport::default();

        for source in sources {
            info!(path = %source.display(), "Loading Probes file");
            match trim_one(&source, output_dir) {
                Ok(trimmed) => {
                    info!(
                        path = %trimmed.output.display(),
                        removed = trimmed.removed_columns.len(),
                        "Trimmed probes table saved"
                    );
                    report.trimmed.push(trimmed);
                }
                Err(err) => {
                    warn!(path = %source.display(), error = %err, "Could not trim Probes file");
                    report.failures.push(TrimFailure {
                        path: source,
                        reason: err.to_string(),
                    });
                }
            }
        }

        if !report.failures.is_empty() {
            error!(
                failed = report.failures.len(),
                trimmed = report.trimmed.len(),
                "Some Probes files could not be trimmed"
            );
        }

        let marker = output_dir.join(TRIMMED_MARKER_NAME);
        fs::write(&marker, TRIMMED_MARKER_PAYLOAD)?;
        report.marker = marker;
        Ok(report)
    }
}

fn trim_one(source: &Path, output_dir: &Path) -> std::result::Result<TrimmedFile, TableError> {
    let mut table = Table::read_tsv(source)?;
    let removed_columns = table.drop_columns(&DROPPED_COLUMNS);
    let output = output_dir.join(trimmed_file_name(source));
    table.write_tsv(&output)?;
    Ok(TrimmedFile {
        source: source.to_path_buf(),
        output,
        removed_columns,
    })
}

/// File name of the trimmed copy of `source`:
/// `GSM1_Probes.tsv` becomes `GSM1_trimmed_Probes.tsv`.
#[must_use]
pub fn trimmed_file_name(source: &Path) -> String {
    let name = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    match name.strip_suffix(PROBES_SUFFIX) {
        Some(base) => format!("{base}{TRIMMED_SUFFIX}"),
        None => name,
    }
}
