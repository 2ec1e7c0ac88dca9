//! # Probeflow
//!
//! A small, resumable pipeline that turns a GEO series `_RAW.tar` archive of
//! Illumina per-sample expression files into trimmed probe tables.
//!
//! The pipeline has four stages, each skipped when its outputs already exist:
//!
//! - **download**: fetch `<dataset>_RAW.tar` from the GEO series tree
//! - **extract**: decompress every `.txt.gz` member and split it into
//!   per-section TSV tables
//! - **trim**: drop annotation columns from every `Probes` table
//! - **clean**: delete the intermediate per-sample data
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use probeflow::prelude::*;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PipelineConfig::default().with_dataset_id("GSE68849");
//! let graph = geo_pipeline(&config)?;
//! let ctx = RunContext::new(RunIdentity::new(&config.dataset_id));
//!
//! let report = graph.build("trim", &ctx).await?;
//! assert!(report.is_success());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, missing_docs, rust_2018_idioms)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod archive;
pub mod cleanup;
pub mod config;
pub mod context;
pub mod core;
pub mod errors;
pub mod events;
pub mod observability;
pub mod pipeline;
pub mod stages;
pub mod tables;
pub mod testing;
pub mod trim;

pub use errors::{BuildError, PipelineError, Result};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::archive::{ArchiveExtractor, ArchiveFetcher, ExtractionSummary};
    pub use crate::cleanup::{CleanupReport, DeletionOutcome, DeletionRecord, OriginalDataCleaner};
    pub use crate::config::PipelineConfig;
    pub use crate::context::{RunContext, RunIdentity};
    pub use crate::core::{BuildReport, StageReport, StageStatus};
    pub use crate::errors::{
        BuildError, ContractErrorInfo, CycleDetectedError, PipelineError, PipelineValidationError,
    };
    pub use crate::events::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};
    pub use crate::pipeline::{geo_pipeline, PipelineBuilder, StageGraph, StageSpec};
    pub use crate::stages::Stage;
    pub use crate::tables::{SectionParser, Table};
    pub use crate::trim::{ProbesTrimmer, TrimReport};
}
