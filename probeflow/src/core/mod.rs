//! Core domain model types for probeflow.
//!
//! This module contains:
//! - The per-stage status state machine
//! - Stage and build reports returned by the orchestrator

mod report;
mod status;

pub use report::{BuildReport, StageReport};
pub use status::StageStatus;
