//! Reports produced by a pipeline build.

use super::StageStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of evaluating one stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageReport {
    /// Stage name.
    pub name: String,
    /// Final status reached.
    pub status: StageStatus,
    /// When evaluation of the stage began.
    pub started_at: DateTime<Utc>,
    /// Time spent running the stage body, zero when skipped.
    pub duration_ms: f64,
    /// Error message if the stage failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StageReport {
    /// Creates a report for a stage whose outputs already existed.
    #[must_use]
    pub fn skipped(name: impl Into<String>, started_at: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            status: StageStatus::Skipped,
            started_at,
            duration_ms: 0.0,
            error: None,
        }
    }

    /// Creates a report for a stage that ran to completion.
    #[must_use]
    pub fn done(name: impl Into<String>, started_at: DateTime<Utc>, duration_ms: f64) -> Self {
        Self {
            name: name.into(),
            status: StageStatus::Done,
            started_at,
            duration_ms,
            error: None,
        }
    }

    /// Creates a report for a stage that failed.
    #[must_use]
    pub fn failed(
        name: impl Into<String>,
        started_at: DateTime<Utc>,
        duration_ms: f64,
        error: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            status: StageStatus::Failed,
            started_at,
            duration_ms,
            error: Some(error.into()),
        }
    }
}

/// Result of building one target stage and its dependency chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildReport {
    /// The requested terminal stage.
    pub target: String,
    /// Per-stage reports in execution order.
    pub stages: Vec<StageReport>,
}

impl BuildReport {
    /// Creates an empty report for `target`.
    #[must_use]
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            stages: Vec::new(),
        }
    }

    /// Returns true if every evaluated stage is available to dependents.
    #[must_use]
    pub fn is_success(&self) -> bool {
        !self.stages.is_empty() && self.stages.iter().all(|s| s.status.is_available())
    }

    /// Returns the report for a stage by name.
    #[must_use]
    pub fn stage(&self, name: &str) -> Option<&StageReport> {
        self.stages.iter().find(|s| s.name == name)
    }

    /// Names of stages that were skipped.
    #[must_use]
    pub fn skipped(&self) -> Vec<&str> {
        self.names_with(StageStatus::Skipped)
    }

    /// Names of stages that ran.
    #[must_use]
    pub fn executed(&self) -> Vec<&str> {
        self.names_with(StageStatus::Done)
    }

    fn names_with(&self, status: StageStatus) -> Vec<&str> {
        self.stages
            .iter()
            .filter(|s| s.status == status)
            .map(|s| s.name.as_str())
            .collect()
    }
}
