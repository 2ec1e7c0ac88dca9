//! Extraction of `.txt.gz` members from a tar archive.

use crate::errors::{PipelineError, Result};
use crate::tables::SectionParser;
use flate2::read::MultiGzDecoder;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Suffix of the archive members that are decompressed and parsed.
pub const MEMBER_SUFFIX: &str = ".txt.gz";

/// One decompressed and parsed archive member.
#[derive(Debug, Clone)]
pub struct ExtractedMember {
    /// Path of the member inside the archive.
    pub member: String,
    /// Where the decompressed text was written.
    pub decompressed: PathBuf,
    /// Table files written for its sections, by key.
    pub tables: BTreeMap<String, PathBuf>,
}

/// Result of extracting one archive.
#[derive(Debug, Clone, Default)]
pub struct ExtractionSummary {
    /// Members in archive order.
    pub members: Vec<ExtractedMember>,
}

impl ExtractionSummary {
    /// Total number of table files written.
    #[must_use]
    pub fn table_count(&self) -> usize {
        self.members.iter().map(|m| m.tables.len()).sum()
    }
}

/// Unpacks `.txt.gz` members of a tar archive and splits each into tables.
///
/// Member `GSM1.txt.gz` is decompressed to `<output>/GSM1.txt/GSM1.txt` and
/// its sections are written next to it.
#[derive(Debug, Clone, Default)]
pub struct ArchiveExtractor {
    parser: SectionParser,
}

impl ArchiveExtractor {
    /// Creates a new extractor.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Extracts every matching member of `archive` into `output_dir`.
    ///
    /// Any failure aborts the whole extraction. If `output_dir` did not exist
    /// before the call it is removed again on failure, so that a later run
    /// starts from scratch.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::MissingInput`] without touching the filesystem
    /// if `archive` does not exist, [`PipelineError::DecodeFailure`] for a
    /// malformed archive, member or section, and [`PipelineError::Io`] for
    /// write failures.
    pub fn extract(&self, archive: &Path, output_dir: &Path) -> Result<ExtractionSummary> {
        if !archive.is_file() {
            return Err(PipelineError::missing_input(archive));
        }

        let created = !output_dir.exists();
        fs::create_dir_all(output_dir)?;
        info!(archive = %archive.display(), output = %output_dir.display(), "Extracting archive");

        match self.extract_members(archive, output_dir) {
            Ok(summary) => {
                info!(
                    members = summary.members.len(),
                    tables = summary.table_count(),
                    "All files extracted and processed"
                );
                Ok(summary)
            }
            Err(err) => {
                if created {
                    if let Err(cleanup) = fs::remove_dir_all(output_dir) {
                        warn!(path = %output_dir.display(), error = %cleanup, "Could not remove partial extraction");
                    }
                }
                Err(err)
            }
        }
    }

    fn extract_members(&self, archive_path: &Path, output_dir: &Path) -> Result<ExtractionSummary> {
        let decode = |e: std::io::Error| PipelineError::decode(archive_path, e);

        let mut archive = tar::Archive::new(BufReader::new(File::open(archive_path)?));
        let mut summary = ExtractionSummary::default();

        for entry in archive.entries().map_err(decode)? {
            let mut entry = entry.map_err(decode)?;
            let member = entry.path().map_err(decode)?.to_string_lossy().into_owned();

            if !entry.header().entry_type().is_file() {
                continue;
            }
            let Some(dir_name) = member_dir_name(&member) else {
                debug!(member = %member, "Skipping member");
                continue;
            };

            let member_dir = output_dir.join(&dir_name);
            fs::create_dir_all(&member_dir)?;
            let decompressed = member_dir.join(&dir_name);
            info!(member = %member, dir = %member_dir.display(), "Extracting member");

            let mut content = Vec::new();
            MultiGzDecoder::new(&mut entry)
                .read_to_end(&mut content)
                .map_err(|e| PipelineError::decode(archive_path.join(&member), e))?;
            fs::write(&decompressed, &content)?;
            info!(path = %decompressed.display(), bytes = content.len(), "File extracted and saved");

            let parsed = self.parser.parse_file(&decompressed)?;
            summary.members.push(ExtractedMember {
                member,
                decompressed,
                tables: parsed.tables,
            });
        }

        Ok(summary)
    }
}

/// Directory (and decompressed file) name for a member, or `None` if the
/// member is not a `.txt.gz` file.
///
/// Only the last path component is used, so members inside archive
/// subdirectories land directly under the output directory.
#[must_use]
pub fn member_dir_name(member: &str) -> Option<String> {
    let file_name = Path::new(member).file_name()?.to_str()?;
    if !file_name.ends_with(MEMBER_SUFFIX) {
        return None;
    }
    file_name.strip_suffix(".gz").map(str::to_string)
}
