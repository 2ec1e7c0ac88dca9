//! Mock stages for testing.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;

use crate::context::RunContext;
use crate::errors::{PipelineError, Result};
use crate::stages::Stage;

/// A stage that records each run and creates its output targets as files.
#[derive(Debug)]
pub struct RecordingStage {
    name: String,
    targets: Vec<PathBuf>,
    runs: Mutex<usize>,
    journal: Arc<Mutex<Vec<String>>>,
}

impl RecordingStage {
    /// Creates a new recording stage.
    #[must_use]
    pub fn new(name: impl Into<String>, targets: Vec<PathBuf>) -> Self {
        Self {
            name: name.into(),
            targets,
            runs: Mutex::new(0),
            journal: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Appends the stage name to a journal shared with other stages on every run.
    #[must_use]
    pub fn with_journal(mut self, journal: Arc<Mutex<Vec<String>>>) -> Self {
        self.journal = journal;
        self
    }

    /// Returns the number of times the stage ran.
    #[must_use]
    pub fn run_count(&self) -> usize {
        *self.runs.lock()
    }
}

#[async_trait]
impl Stage for RecordingStage {
    fn name(&self) -> &str {
        &self.name
    }

    fn output_targets(&self) -> Vec<PathBuf> {
        self.targets.clone()
    }

    async fn run(&self, _ctx: &RunContext) -> Result<()> {
        *self.runs.lock() += 1;
        self.journal.lock().push(self.name.clone());
        for target in &self.targets {
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(target, &self.name)?;
        }
        Ok(())
    }
}

/// A stage that always fails with [`PipelineError::MissingInput`].
#[derive(Debug)]
pub struct FailingStage {
    name: String,
    targets: Vec<PathBuf>,
    missing: PathBuf,
    runs: Mutex<usize>,
}

impl FailingStage {
    /// Creates a failing stage that reports `missing` as its absent input.
    #[must_use]
    pub fn new(name: impl Into<String>, targets: Vec<PathBuf>, missing: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            targets,
            missing: missing.into(),
            runs: Mutex::new(0),
        }
    }

    /// Returns the number of times the stage ran.
    #[must_use]
    pub fn run_count(&self) -> usize {
        *self.runs.lock()
    }
}

#[async_trait]
impl Stage for FailingStage {
    fn name(&self) -> &str {
        &self.name
    }

    fn output_targets(&self) -> Vec<PathBuf> {
        self.targets.clone()
    }

    async fn run(&self, _ctx: &RunContext) -> Result<()> {
        *self.runs.lock() += 1;
        Err(PipelineError::missing_input(&self.missing))
    }
}
