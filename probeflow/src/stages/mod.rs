//! Stage trait and the concrete pipeline stages.
//!
//! A stage is complete iff every path in its output targets exists; that
//! check is the only idempotency signal. Completed stages are skipped without
//! inspecting file contents.

mod clean;
mod download;
mod extract;
mod trim;

pub use clean::CleanupStage;
pub use download::DownloadStage;
pub use extract::ExtractStage;
pub use trim::TrimStage;

use crate::context::RunContext;
use crate::errors::{PipelineError, Result};
use async_trait::async_trait;
use std::fmt::Debug;
use std::path::PathBuf;

/// Trait for pipeline stages.
#[async_trait]
pub trait Stage: Send + Sync + Debug {
    /// Returns the name of the stage.
    fn name(&self) -> &str;

    /// Paths whose joint existence marks this stage as complete.
    fn output_targets(&self) -> Vec<PathBuf>;

    /// Returns true if every output target exists.
    ///
    /// A stage without output targets is never complete.
    fn is_complete(&self) -> bool {
        let targets = self.output_targets();
        !targets.is_empty() && targets.iter().all(|p| p.exists())
    }

    /// Executes the stage body.
    ///
    /// Only called when [`Stage::is_complete`] returned false and every
    /// dependency is available.
    async fn run(&self, ctx: &RunContext) -> Result<()>;
}

/// Runs blocking filesystem work off the async executor, inside the build's
/// tracing span.
pub(crate) async fn run_blocking<T, F>(ctx: &RunContext, work: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    let span = ctx.span().clone();
    tokio::task::spawn_blocking(move || span.in_scope(work))
        .await
        .map_err(|e| PipelineError::Io(std::io::Error::other(e)))?
}
