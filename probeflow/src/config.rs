//! Pipeline configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// File name of the trimming stage's completion marker.
pub const TRIMMED_MARKER_NAME: &str = "Probes_trimmed.tsv";

/// File name of the cleanup stage's completion marker.
pub const CLEANUP_MARKER_NAME: &str = "delete_original_data.done";

/// Configuration shared by every stage of one pipeline build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// GEO series accession, e.g. `GSE68849`.
    #[serde(default = "default_dataset_id")]
    pub dataset_id: String,
    /// Where the raw archive is downloaded to.
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,
    /// Where archive members are decompressed and split into tables.
    #[serde(default = "default_processed_dir")]
    pub processed_dir: PathBuf,
    /// Where trimmed probe tables are written.
    #[serde(default = "default_trimmed_dir")]
    pub trimmed_dir: PathBuf,
    /// Base URL of the GEO series tree.
    #[serde(default = "default_source_base_url")]
    pub source_base_url: String,
    /// Timeout for the whole archive download.
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_seconds: u64,
}

fn default_dataset_id() -> String {
    "GSE68849".to_string()
}

fn default_download_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_processed_dir() -> PathBuf {
    PathBuf::from("processed_data")
}

fn default_trimmed_dir() -> PathBuf {
    PathBuf::from("trimmed_probes")
}

fn default_source_base_url() -> String {
    "https://ftp.ncbi.nlm.nih.gov/geo/series".to_string()
}

fn default_fetch_timeout() -> u64 {
    600
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            dataset_id: default_dataset_id(),
            download_dir: default_download_dir(),
            processed_dir: default_processed_dir(),
            trimmed_dir: default_trimmed_dir(),
            source_base_url: default_source_base_url(),
            fetch_timeout_seconds: default_fetch_timeout(),
        }
    }
}

impl PipelineConfig {
    /// Creates a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the dataset identifier.
    #[must_use]
    pub fn with_dataset_id(mut self, dataset_id: impl Into<String>) -> Self {
        self.dataset_id = dataset_id.into();
        self
    }

    /// Sets the download directory.
    #[must_use]
    pub fn with_download_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.download_dir = dir.into();
        self
    }

    /// Sets the processed-output directory.
    #[must_use]
    pub fn with_processed_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.processed_dir = dir.into();
        self
    }

    /// Sets the trimmed-output directory.
    #[must_use]
    pub fn with_trimmed_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.trimmed_dir = dir.into();
        self
    }

    /// Sets the base URL of the series tree.
    #[must_use]
    pub fn with_source_base_url(mut self, url: impl Into<String>) -> Self {
        self.source_base_url = url.into();
        self
    }

    /// Local path of the raw archive.
    #[must_use]
    pub fn archive_path(&self) -> PathBuf {
        self.download_dir.join(format!("{}_RAW.tar", self.dataset_id))
    }

    /// Completion marker written by the trimming stage.
    #[must_use]
    pub fn trimmed_marker_path(&self) -> PathBuf {
        self.trimmed_dir.join(TRIMMED_MARKER_NAME)
    }

    /// Completion marker written by the cleanup stage.
    #[must_use]
    pub fn cleanup_marker_path(&self) -> PathBuf {
        self.processed_dir.join(CLEANUP_MARKER_NAME)
    }

    /// Remote location of the raw archive.
    #[must_use]
    pub fn source_url(&self) -> String {
        let id = &self.dataset_id;
        format!(
            "{}/{}/{id}/suppl/{id}_RAW.tar",
            self.source_base_url.trim_end_matches('/'),
            series_prefix(id),
        )
    }

    /// Download timeout as a [`Duration`].
    #[must_use]
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_seconds)
    }
}

/// GEO groups series into directories by replacing the last three digits of
/// the accession with `nnn` (`GSE68849` lives under `GSE68nnn`).
///
/// Only the trailing run of ASCII digits is shortened; anything before it is
/// kept as is.
#[must_use]
pub fn series_prefix(dataset_id: &str) -> String {
    let digit_count = dataset_id
        .bytes()
        .rev()
        .take_while(u8::is_ascii_digit)
        .count();
    // the trailing run is ASCII, so this split lands on a char boundary
    let (head, digits) = dataset_id.split_at(dataset_id.len() - digit_count);
    let kept = digit_count.saturating_sub(3);
    format!("{head}{}nnn", &digits[..kept])
}
