//! Extraction of the archive into per-section tables.

use super::{run_blocking, Stage};
use crate::archive::ArchiveExtractor;
use crate::config::PipelineConfig;
use crate::context::RunContext;
use crate::errors::Result;
use async_trait::async_trait;
use serde_json::json;
use std::path::PathBuf;

/// Decompresses every `.txt.gz` member and splits it into section tables.
///
/// Complete once the processed directory exists.
#[derive(Debug, Clone)]
pub struct ExtractStage {
    archive: PathBuf,
    processed_dir: PathBuf,
}

impl ExtractStage {
    /// Creates the stage for a configuration.
    #[must_use]
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            archive: config.archive_path(),
            processed_dir: config.processed_dir.clone(),
        }
    }
}

#[async_trait]
impl Stage for ExtractStage {
    fn name(&self) -> &str {
        crate::pipeline::EXTRACT
    }

    fn output_targets(&self) -> Vec<PathBuf> {
        vec![self.processed_dir.clone()]
    }

    async fn run(&self, ctx: &RunContext) -> Result<()> {
        let archive = self.archive.clone();
        let output = self.processed_dir.clone();
        let summary =
            run_blocking(ctx, move || ArchiveExtractor::new().extract(&archive, &output)).await?;

        ctx.emit(
            "archive.extracted",
            json!({
                "members": summary.members.len(),
                "tables": summary.table_count(),
            }),
        );
        Ok(())
    }
}
