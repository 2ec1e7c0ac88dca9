//! Error types for the probeflow pipeline.
//!
//! Fatal failures unwind the whole build through [`PipelineError`]. Failed
//! deletions during cleanup are not errors; they are reported as
//! [`crate::cleanup::DeletionOutcome::Failed`] entries instead.

use crate::core::BuildReport;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for probeflow operations.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A required upstream file or directory is absent when a stage begins.
    #[error("Missing input: {} does not exist", path.display())]
    MissingInput {
        /// The path that was expected to exist.
        path: PathBuf,
    },

    /// Malformed archive, gzip or tabular content.
    #[error("Failed to decode {}: {reason}", path.display())]
    DecodeFailure {
        /// The file (or archive member) that could not be decoded.
        path: PathBuf,
        /// What went wrong.
        reason: String,
    },

    /// A discovery step yielded zero results.
    #[error("No files matching '{pattern}' found under {}", dir.display())]
    NoInputFound {
        /// The directory that was searched.
        dir: PathBuf,
        /// The file name pattern searched for.
        pattern: String,
    },

    /// The remote archive could not be retrieved.
    #[error("Failed to fetch {url}: {reason}")]
    Fetch {
        /// The requested URL.
        url: String,
        /// What went wrong.
        reason: String,
    },

    /// The requested stage is not part of the pipeline.
    #[error("Unknown stage '{name}'")]
    UnknownStage {
        /// The requested stage name.
        name: String,
    },

    /// A stage failed while running.
    #[error("Stage '{stage}' failed: {source}")]
    StageFailed {
        /// The stage name.
        stage: String,
        /// The underlying error.
        #[source]
        source: Box<PipelineError>,
    },

    /// The pipeline definition is invalid.
    #[error("Invalid pipeline: {0}")]
    Validation(#[from] PipelineValidationError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    /// Creates a missing input error.
    #[must_use]
    pub fn missing_input(path: impl Into<PathBuf>) -> Self {
        Self::MissingInput { path: path.into() }
    }

    /// Creates a decode failure error.
    #[must_use]
    pub fn decode(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::DecodeFailure {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Creates a no-input-found error.
    #[must_use]
    pub fn no_input_found(dir: impl Into<PathBuf>, pattern: impl Into<String>) -> Self {
        Self::NoInputFound {
            dir: dir.into(),
            pattern: pattern.into(),
        }
    }

    /// Creates a fetch error.
    #[must_use]
    pub fn fetch(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::Fetch {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// Wraps an error with the name of the stage it came from.
    #[must_use]
    pub fn in_stage(self, stage: impl Into<String>) -> Self {
        Self::StageFailed {
            stage: stage.into(),
            source: Box::new(self),
        }
    }

    /// Returns the innermost error, looking through [`PipelineError::StageFailed`].
    #[must_use]
    pub fn root(&self) -> &Self {
        match self {
            Self::StageFailed { source, .. } => source.root(),
            other => other,
        }
    }

    /// Short machine-readable kind used in emitted events.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self.root() {
            Self::MissingInput { .. } => "missing_input",
            Self::DecodeFailure { .. } => "decode_failure",
            Self::NoInputFound { .. } => "no_input_found",
            Self::Fetch { .. } => "fetch",
            Self::UnknownStage { .. } => "unknown_stage",
            Self::Validation(_) => "validation",
            Self::Io(_) => "io",
            Self::StageFailed { .. } => "stage_failed",
        }
    }
}

/// Metadata about a contract error for better diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ContractErrorInfo {
    /// Error code (e.g., "CONTRACT-004-CYCLE").
    pub code: String,
    /// Short summary of the error.
    pub summary: String,
    /// Hint for fixing the error.
    pub fix_hint: Option<String>,
    /// Additional context key-value pairs.
    #[serde(default)]
    pub context: HashMap<String, String>,
}

impl ContractErrorInfo {
    /// Creates a new contract error info.
    #[must_use]
    pub fn new(code: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            summary: summary.into(),
            fix_hint: None,
            context: HashMap::new(),
        }
    }

    /// Sets the fix hint.
    #[must_use]
    pub fn with_fix_hint(mut self, hint: impl Into<String>) -> Self {
        self.fix_hint = Some(hint.into());
        self
    }
}

/// Error raised when pipeline validation fails.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct PipelineValidationError {
    /// The error message.
    pub message: String,
    /// The stages involved in the error.
    pub stages: Vec<String>,
    /// Optional contract error info.
    pub error_info: Option<ContractErrorInfo>,
}

impl PipelineValidationError {
    /// Creates a new pipeline validation error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            stages: Vec::new(),
            error_info: None,
        }
    }

    /// Sets the stages involved.
    #[must_use]
    pub fn with_stages(mut self, stages: Vec<String>) -> Self {
        self.stages = stages;
        self
    }

    /// Sets the contract error info.
    #[must_use]
    pub fn with_error_info(mut self, info: ContractErrorInfo) -> Self {
        self.error_info = Some(info);
        self
    }

    /// Returns the contract error code, if any.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        self.error_info.as_ref().map(|info| info.code.as_str())
    }
}

/// Error raised when a cycle is detected in the pipeline graph.
#[derive(Debug, Clone, Error)]
#[error("Cycle detected in pipeline: {}", cycle_path.join(" -> "))]
pub struct CycleDetectedError {
    /// The path of stages forming the cycle.
    pub cycle_path: Vec<String>,
    /// Contract error info.
    pub error_info: ContractErrorInfo,
}

impl CycleDetectedError {
    /// Creates a new cycle detected error.
    #[must_use]
    pub fn new(cycle_path: Vec<String>) -> Self {
        let info = ContractErrorInfo::new(
            "CONTRACT-004-CYCLE",
            format!("Pipeline contains a dependency cycle: {}", cycle_path.join(" -> ")),
        )
        .with_fix_hint("Remove one of the dependencies in the cycle to break it.");

        Self {
            cycle_path,
            error_info: info,
        }
    }
}

impl From<CycleDetectedError> for PipelineValidationError {
    fn from(err: CycleDetectedError) -> Self {
        Self {
            message: err.to_string(),
            stages: err.cycle_path.clone(),
            error_info: Some(err.error_info),
        }
    }
}

/// A build that stopped before its target stage became available.
///
/// Carries the report of every stage evaluated up to and including the one
/// that failed.
#[derive(Debug, Error)]
#[error("Build of '{}' failed: {source}", report.target)]
pub struct BuildError {
    /// Stages evaluated before the build was aborted.
    pub report: BuildReport,
    /// Why the build was aborted.
    #[source]
    pub source: PipelineError,
}

impl BuildError {
    /// Creates a new build error.
    #[must_use]
    pub fn new(report: BuildReport, source: PipelineError) -> Self {
        Self { report, source }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T, E = PipelineError> = std::result::Result<T, E>;
