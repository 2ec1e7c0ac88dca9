//! HTTP download of the raw archive.

use crate::errors::{PipelineError, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

/// Downloads one remote file to a local path.
///
/// The body is streamed into `<dest>.part` and renamed into place only after
/// the transfer finished, so an interrupted download never leaves a file at
/// `dest`.
#[derive(Debug, Clone)]
pub struct ArchiveFetcher {
    timeout: Duration,
}

impl ArchiveFetcher {
    /// Creates a fetcher with the given whole-request timeout.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Downloads `url` to `dest`, creating parent directories as needed.
    ///
    /// Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Fetch`] for transport failures or a
    /// non-success status, and [`PipelineError::Io`] if the file cannot be
    /// written.
    pub async fn fetch(&self, url: &str, dest: &Path) -> Result<u64> {
        if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let partial = partial_path(dest);
        info!(url = %url, dest = %dest.display(), "Starting download");

        let written = match self.download(url, &partial).await {
            Ok(written) => written,
            Err(err) => {
                if let Err(cleanup) = tokio::fs::remove_file(&partial).await {
                    if cleanup.kind() != std::io::ErrorKind::NotFound {
                        warn!(path = %partial.display(), error = %cleanup, "Could not remove partial download");
                    }
                }
                return Err(err);
            }
        };

        tokio::fs::rename(&partial, dest).await?;
        info!(dest = %dest.display(), bytes = written, "Download finished");
        Ok(written)
    }

    async fn download(&self, url: &str, partial: &Path) -> Result<u64> {
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| PipelineError::fetch(url, e))?;

        let mut response = client
            .get(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| PipelineError::fetch(url, e))?;

        let mut file = tokio::fs::File::create(partial).await?;
        let mut written: u64 = 0;
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| PipelineError::fetch(url, e))?
        {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;
        Ok(written)
    }
}

/// Temporary path a download is streamed into before being renamed to `dest`.
#[must_use]
pub fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().map(ToOwned::to_owned).unwrap_or_default();
    name.push(".part");
    dest.with_file_name(name)
}
