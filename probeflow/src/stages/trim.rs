//! Trimming of the `Probes` tables.

use super::{run_blocking, Stage};
use crate::config::PipelineConfig;
use crate::context::RunContext;
use crate::errors::Result;
use crate::trim::ProbesTrimmer;
use async_trait::async_trait;
use serde_json::json;
use std::path::PathBuf;

/// Writes trimmed copies of every `Probes` table and the trim marker.
#[derive(Debug, Clone)]
pub struct TrimStage {
    processed_dir: PathBuf,
    trimmed_dir: PathBuf,
    marker: PathBuf,
}

impl TrimStage {
    /// Creates the stage for a configuration.
    #[must_use]
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            processed_dir: config.processed_dir.clone(),
            trimmed_dir: config.trimmed_dir.clone(),
            marker: config.trimmed_marker_path(),
        }
    }
}

#[async_trait]
impl Stage for TrimStage {
    fn name(&self) -> &str {
        crate::pipeline::TRIM
    }

    fn output_targets(&self) -> Vec<PathBuf> {
        vec![self.marker.clone()]
    }

    async fn run(&self, ctx: &RunContext) -> Result<()> {
        let processed = self.processed_dir.clone();
        let trimmed = self.trimmed_dir.clone();
        let report =
            run_blocking(ctx, move || ProbesTrimmer::new().trim(&processed, &trimmed)).await?;

        ctx.emit(
            "probes.trimmed",
            json!({
                "trimmed": report.trimmed.len(),
                "failed": report
                    .failures
                    .iter()
                    .map(|f| f.path.display().to_string())
                    .collect::<Vec<_>>(),
            }),
        );
        Ok(())
    }
}
