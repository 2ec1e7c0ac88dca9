//! Retrieval of the raw series archive.

use super::Stage;
use crate::archive::ArchiveFetcher;
use crate::config::PipelineConfig;
use crate::context::RunContext;
use crate::errors::Result;
use async_trait::async_trait;
use serde_json::json;
use std::path::PathBuf;

/// Downloads `<download_dir>/<dataset>_RAW.tar`.
#[derive(Debug, Clone)]
pub struct DownloadStage {
    url: String,
    archive: PathBuf,
    fetcher: ArchiveFetcher,
}

impl DownloadStage {
    /// Creates the stage for a configuration.
    #[must_use]
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            url: config.source_url(),
            archive: config.archive_path(),
            fetcher: ArchiveFetcher::new(config.fetch_timeout()),
        }
    }
}

#[async_trait]
impl Stage for DownloadStage {
    fn name(&self) -> &str {
        crate::pipeline::DOWNLOAD
    }

    fn output_targets(&self) -> Vec<PathBuf> {
        vec![self.archive.clone()]
    }

    async fn run(&self, ctx: &RunContext) -> Result<()> {
        let bytes = self.fetcher.fetch(&self.url, &self.archive).await?;
        ctx.emit(
            "archive.downloaded",
            json!({ "url": self.url, "path": self.archive, "bytes": bytes }),
        );
        Ok(())
    }
}
