//! Pipeline building and execution.
//!
//! This module provides:
//! - Stage specifications
//! - Pipeline builder with validation
//! - The sequential, target-driven orchestrator
//! - The GEO probe-processing pipeline

mod builder;
mod dag;
mod integration_tests;
mod spec;

pub use builder::PipelineBuilder;
pub use dag::{StageDescription, StageGraph};
pub use spec::StageSpec;

use crate::config::PipelineConfig;
use crate::errors::Result;
use crate::stages::{CleanupStage, DownloadStage, ExtractStage, TrimStage};
use std::sync::Arc;

/// Name of the archive download stage.
pub const DOWNLOAD: &str = "download";
/// Name of the extract-and-parse stage.
pub const EXTRACT: &str = "extract";
/// Name of the probe trimming stage.
pub const TRIM: &str = "trim";
/// Name of the cleanup stage.
pub const CLEAN: &str = "clean";

/// Every stage of [`geo_pipeline`], in dependency order.
pub const STAGE_NAMES: [&str; 4] = [DOWNLOAD, EXTRACT, TRIM, CLEAN];

/// Builds the `download -> extract -> trim -> clean` pipeline for `config`.
///
/// # Errors
///
/// Returns [`crate::PipelineError::Validation`] only if the stage wiring is
/// invalid.
pub fn geo_pipeline(config: &PipelineConfig) -> Result<StageGraph> {
    let graph = PipelineBuilder::new(format!("geo-{}", config.dataset_id))
        .stage(DOWNLOAD, Arc::new(DownloadStage::new(config)), &[])?
        .stage(EXTRACT, Arc::new(ExtractStage::new(config)), &[DOWNLOAD])?
        .stage(TRIM, Arc::new(TrimStage::new(config)), &[EXTRACT])?
        .stage(CLEAN, Arc::new(CleanupStage::new(config)), &[TRIM])?
        .build()?;
    Ok(graph)
}
