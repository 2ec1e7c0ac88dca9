//! Testing utilities for probeflow pipelines.
//!
//! This module provides:
//! - Builders for synthetic section files and tar archives of gzip members
//! - A one-shot local HTTP server standing in for the archive host
//! - Mock stages that record or fail their runs
//! - Assertions over build reports

mod assertions;
mod fixtures;
mod mocks;

pub use assertions::{assert_executed, assert_skipped, assert_stage_status};
pub use fixtures::{
    illumina_sample, serve_once, test_config, ArchiveBuilder, SectionFileBuilder,
};
pub use mocks::{FailingStage, RecordingStage};
