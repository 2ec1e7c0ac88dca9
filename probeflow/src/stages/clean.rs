//! Removal of the intermediate extraction output.

use super::{run_blocking, Stage};
use crate::cleanup::OriginalDataCleaner;
use crate::config::PipelineConfig;
use crate::context::RunContext;
use crate::errors::Result;
use async_trait::async_trait;
use serde_json::json;
use std::path::PathBuf;

/// Deletes the processed directory's contents and leaves the cleanup marker.
#[derive(Debug, Clone)]
pub struct CleanupStage {
    processed_dir: PathBuf,
    marker: PathBuf,
}

impl CleanupStage {
    /// Creates the stage for a configuration.
    #[must_use]
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            processed_dir: config.processed_dir.clone(),
            marker: config.cleanup_marker_path(),
        }
    }
}

#[async_trait]
impl Stage for CleanupStage {
    fn name(&self) -> &str {
        crate::pipeline::CLEAN
    }

    fn output_targets(&self) -> Vec<PathBuf> {
        vec![self.marker.clone()]
    }

    async fn run(&self, ctx: &RunContext) -> Result<()> {
        let processed = self.processed_dir.clone();
        let report = run_blocking(ctx, move || OriginalDataCleaner::new().clean(&processed)).await?;

        ctx.emit(
            "data.cleaned",
            json!({
                "deleted": report.deleted(),
                "failed": report.failures(),
            }),
        );
        Ok(())
    }
}
