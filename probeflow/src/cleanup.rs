//! Deletion of intermediate per-sample data once trimming is done.

use crate::config::CLEANUP_MARKER_NAME;
use crate::errors::Result;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

/// Content of the cleanup marker, followed by a count line.
pub const CLEANUP_MARKER_PAYLOAD: &str = "Original data deleted.\n";

/// Kind of filesystem entry a deletion targeted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// A regular file or symlink.
    File,
    /// A directory.
    Directory,
}

/// Outcome of one deletion attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DeletionOutcome {
    /// The entry was removed.
    Deleted,
    /// The entry could not be removed and was left in place.
    Failed {
        /// Why removal failed.
        reason: String,
    },
}

/// One attempted deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeletionRecord {
    /// The targeted path.
    pub path: PathBuf,
    /// What kind of entry it was.
    pub kind: EntryKind,
    /// Whether it was removed.
    pub outcome: DeletionOutcome,
}

impl DeletionRecord {
    fn attempt(path: PathBuf, kind: EntryKind, result: io::Result<()>) -> Self {
        let outcome = match result {
            Ok(()) => {
                info!(path = %path.display(), kind = ?kind, "Deleted");
                DeletionOutcome::Deleted
            }
            Err(err) => {
                warn!(path = %path.display(), kind = ?kind, error = %err, "Failed to delete");
                DeletionOutcome::Failed {
                    reason: err.to_string(),
                }
            }
        };
        Self { path, kind, outcome }
    }

    /// Returns true if the entry was removed.
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.outcome == DeletionOutcome::Deleted
    }
}

/// Result of one cleanup pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CleanupReport {
    /// Every attempted deletion, files first and then directories bottom-up.
    pub records: Vec<DeletionRecord>,
    /// The completion marker that was written.
    pub marker: PathBuf,
}

impl CleanupReport {
    /// Number of entries removed.
    #[must_use]
    pub fn deleted(&self) -> usize {
        self.records.iter().filter(|r| r.is_deleted()).count()
    }

    /// Records of entries that could not be removed.
    #[must_use]
    pub fn failures(&self) -> Vec<&DeletionRecord> {
        self.records.iter().filter(|r| !r.is_deleted()).collect()
    }
}

/// Removes a single filesystem entry.
pub type RemoveFn = fn(&Path) -> io::Result<()>;

fn remove_file(path: &Path) -> io::Result<()> {
    fs::remove_file(path)
}

fn remove_dir(path: &Path) -> io::Result<()> {
    fs::remove_dir(path)
}

/// Removes everything under the processed directory.
///
/// Deletion failures never abort the pass; they are logged and recorded.
#[derive(Debug, Clone, Copy)]
pub struct OriginalDataCleaner {
    remove_file: RemoveFn,
    remove_dir: RemoveFn,
}

impl Default for OriginalDataCleaner {
    fn default() -> Self {
        Self::new()
    }
}

impl OriginalDataCleaner {
    /// Creates a cleaner that deletes through [`std::fs`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            remove_file,
            remove_dir,
        }
    }

    /// Replaces the functions used to delete files and empty directories.
    #[must_use]
    pub fn with_removers(mut self, remove_file: RemoveFn, remove_dir: RemoveFn) -> Self {
        self.remove_file = remove_file;
        self.remove_dir = remove_dir;
        self
    }

    /// Deletes the contents of `processed_dir` and the directory itself, then
    /// recreates it holding only the cleanup marker.
    ///
    /// A missing or empty directory is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`crate::PipelineError::Io`] only if the directory cannot be
    /// recreated or the marker cannot be written.
    pub fn clean(&self, processed_dir: &Path) -> Result<CleanupReport> {
        let mut report = CleanupReport::default();

        if processed_dir.is_dir() {
            let (dirs, files): (Vec<_>, Vec<_>) = WalkDir::new(processed_dir)
                .min_depth(1)
                .contents_first(true)
                .into_iter()
                .filter_map(|entry| match entry {
                    Ok(entry) => Some(entry),
                    Err(err) => {
                        warn!(error = %err, "Skipping unreadable entry");
                        None
                    }
                })
                .partition(|entry| entry.file_type().is_dir());

            if files.is_empty() && dirs.is_empty() {
                warn!(dir = %processed_dir.display(), "No files found to delete");
            }

            for entry in files {
                let path = entry.into_path();
                let result = (self.remove_file)(&path);
                report.records.push(DeletionRecord::attempt(path, EntryKind::File, result));
            }
            // contents_first yields children before parents
            for entry in dirs {
                let path = entry.into_path();
                let result = (self.remove_dir)(&path);
                report
                    .records
                    .push(DeletionRecord::attempt(path, EntryKind::Directory, result));
            }
            let result = (self.remove_dir)(processed_dir);
            report.records.push(DeletionRecord::attempt(
                processed_dir.to_path_buf(),
                EntryKind::Directory,
                result,
            ));
        } else {
            warn!(dir = %processed_dir.display(), "Directory to clean does not exist");
        }

        fs::create_dir_all(processed_dir)?;
        let marker = processed_dir.join(CLEANUP_MARKER_NAME);
        fs::write(
            &marker,
            format!("{CLEANUP_MARKER_PAYLOAD}{} entries removed.\n", report.deleted()),
        )?;
        info!(marker = %marker.display(), deleted = report.deleted(), "Original data deleted");
        report.marker = marker;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn populate(root: &Path) {
        let sample = root.join("GSM1.txt");
        fs::create_dir_all(&sample).unwrap();
        fs::write(sample.join("GSM1.txt"), "[Probes]\nID\n1\n").unwrap();
        fs::write(sample.join("GSM1_Probes.tsv"), "ID\n1\n").unwrap();
        fs::create_dir_all(root.join("nested").join("empty")).unwrap();
    }

    #[test]
    fn test_clean_removes_everything_and_writes_marker() {
        let dir = TempDir::new().unwrap();
        let processed = dir.path().join("processed");
        populate(&processed);

        let report = OriginalDataCleaner::new().clean(&processed).unwrap();

        assert!(report.failures().is_empty());
        // 2 files + GSM1.txt, nested/empty, nested + root
        assert_eq!(report.deleted(), 6);
        let remaining: Vec<_> = fs::read_dir(&processed)
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(remaining, vec![std::ffi::OsString::from(CLEANUP_MARKER_NAME)]);
        let marker = fs::read_to_string(&report.marker).unwrap();
        assert!(marker.starts_with(CLEANUP_MARKER_PAYLOAD));
    }

    #[test]
    fn test_files_deleted_before_directories() {
        let dir = TempDir::new().unwrap();
        let processed = dir.path().join("processed");
        populate(&processed);

        let report = OriginalDataCleaner::new().clean(&processed).unwrap();

        let first_dir = report
            .records
            .iter()
            .position(|r| r.kind == EntryKind::Directory)
            .unwrap();
        assert!(report.records[..first_dir].iter().all(|r| r.kind == EntryKind::File));
        assert_eq!(report.records.last().unwrap().path, processed);
    }

    fn deny(path: &Path) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::PermissionDenied,
            format!("refusing to remove {}", path.display()),
        ))
    }

    fn keep_probes_table(path: &Path) -> io::Result<()> {
        if path.ends_with("GSM1_Probes.tsv") {
            deny(path)
        } else {
            fs::remove_file(path)
        }
    }

    fn keep_empty_dir(path: &Path) -> io::Result<()> {
        if path.ends_with("empty") {
            deny(path)
        } else {
            fs::remove_dir(path)
        }
    }

    #[test]
    fn test_failed_deletions_are_recorded_and_pass_continues() {
        let dir = TempDir::new().unwrap();
        let processed = dir.path().join("processed");
        populate(&processed);

        let report = OriginalDataCleaner::new()
            .with_removers(keep_probes_table, keep_empty_dir)
            .clean(&processed)
            .unwrap();

        // 2 files, GSM1.txt, nested/empty, nested, root
        assert_eq!(report.records.len(), 6);
        assert_eq!(report.deleted(), 1);

        let failed: Vec<_> = report.failures().iter().map(|r| r.path.clone()).collect();
        let sample = processed.join("GSM1.txt");
        assert!(failed.contains(&sample.join("GSM1_Probes.tsv")));
        assert!(failed.contains(&processed.join("nested").join("empty")));
        // parents of kept entries are not empty, so they stay too
        assert!(failed.contains(&sample));
        assert!(failed.contains(&processed.join("nested")));
        assert_eq!(failed.last(), Some(&processed));

        let denied = report
            .failures()
            .into_iter()
            .find(|r| r.path.ends_with("GSM1_Probes.tsv"))
            .unwrap();
        assert_eq!(denied.kind, EntryKind::File);
        assert!(matches!(
            &denied.outcome,
            DeletionOutcome::Failed { reason } if reason.contains("refusing to remove")
        ));

        assert!(!sample.join("GSM1.txt").exists());
        assert!(sample.join("GSM1_Probes.tsv").is_file());
        assert!(processed.join("nested").join("empty").is_dir());
        let marker = fs::read_to_string(processed.join(CLEANUP_MARKER_NAME)).unwrap();
        assert_eq!(marker, format!("{CLEANUP_MARKER_PAYLOAD}1 entries removed.\n"));
        assert_eq!(report.marker, processed.join(CLEANUP_MARKER_NAME));
    }

    #[test]
    fn test_missing_dir_is_not_an_error() {
        let dir = TempDir::new().unwrap();
        let processed = dir.path().join("processed");

        let report = OriginalDataCleaner::new().clean(&processed).unwrap();

        assert!(report.records.is_empty());
        assert!(processed.join(CLEANUP_MARKER_NAME).is_file());
    }

    #[test]
    fn test_does_not_touch_siblings() {
        let dir = TempDir::new().unwrap();
        let processed = dir.path().join("processed");
        let trimmed = dir.path().join("trimmed");
        populate(&processed);
        fs::create_dir_all(&trimmed).unwrap();
        fs::write(trimmed.join("GSM1_trimmed_Probes.tsv"), "ID\n1\n").unwrap();

        OriginalDataCleaner::new().clean(&processed).unwrap();

        assert!(trimmed.join("GSM1_trimmed_Probes.tsv").is_file());
    }
}
