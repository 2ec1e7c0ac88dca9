//! Sequential, target-driven execution of a stage graph.
//!
//! A build evaluates only the dependency closure of the requested target, in
//! topological order, one stage at a time.

use super::StageSpec;
use crate::context::RunContext;
use crate::core::{BuildReport, StageReport, StageStatus};
use crate::errors::{BuildError, PipelineError};
use crate::observability::StageTimer;
use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use tracing::{debug, error, info, warn, Instrument};

/// Static description of one stage, for inspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageDescription {
    /// Stage name.
    pub name: String,
    /// Names of the stages it depends on.
    pub dependencies: Vec<String>,
    /// Paths whose existence marks the stage complete.
    pub output_targets: Vec<PathBuf>,
}

/// A directed acyclic graph of stages.
#[derive(Debug)]
pub struct StageGraph {
    /// The pipeline name.
    name: String,
    /// Stage specifications.
    stages: HashMap<String, StageSpec>,
    /// Execution order (topologically sorted).
    execution_order: Vec<String>,
}

impl StageGraph {
    /// Creates a new stage graph.
    #[must_use]
    pub fn new(name: String, stages: HashMap<String, StageSpec>, stage_order: Vec<String>) -> Self {
        let execution_order = topological_sort(&stages, &stage_order);

        Self {
            name,
            stages,
            execution_order,
        }
    }

    /// Returns the pipeline name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the number of stages.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Returns the execution order of the whole graph.
    #[must_use]
    pub fn execution_order(&self) -> &[String] {
        &self.execution_order
    }

    /// Describes every stage in execution order.
    #[must_use]
    pub fn describe(&self) -> Vec<StageDescription> {
        self.execution_order
            .iter()
            .filter_map(|name| self.stages.get(name))
            .map(|spec| StageDescription {
                name: spec.name.clone(),
                dependencies: spec.dependencies.clone(),
                output_targets: spec.runner.output_targets(),
            })
            .collect()
    }

    /// Returns the stages needed to build `target`, dependencies first.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::UnknownStage`] if `target` is not in the graph.
    pub fn resolve(&self, target: &str) -> Result<Vec<String>, PipelineError> {
        if !self.stages.contains_key(target) {
            return Err(PipelineError::UnknownStage {
                name: target.to_string(),
            });
        }

        let mut needed: HashSet<&str> = HashSet::new();
        let mut pending = vec![target];
        while let Some(name) = pending.pop() {
            if needed.insert(name) {
                if let Some(spec) = self.stages.get(name) {
                    pending.extend(spec.dependencies.iter().map(String::as_str));
                }
            }
        }

        Ok(self
            .execution_order
            .iter()
            .filter(|name| needed.contains(name.as_str()))
            .cloned()
            .collect())
    }

    /// Builds `target` and every stage it transitively depends on.
    ///
    /// Stages whose output targets all exist are skipped. The first stage
    /// that fails aborts the build; later stages are not evaluated.
    ///
    /// # Errors
    ///
    /// Returns a [`BuildError`] carrying the report so far if the target is
    /// unknown or a stage fails.
    pub async fn build(&self, target: &str, ctx: &RunContext) -> Result<BuildReport, BuildError> {
        self.build_in_span(target, ctx)
            .instrument(ctx.span().clone())
            .await
    }

    async fn build_in_span(&self, target: &str, ctx: &RunContext) -> Result<BuildReport, BuildError> {
        let mut report = BuildReport::new(target);
        let order = match self.resolve(target) {
            Ok(order) => order,
            Err(err) => {
                error!(build_target = %target, error = %err, "Cannot build");
                return Err(BuildError::new(report, err));
            }
        };

        info!(pipeline = %self.name, build_target = %target, stages = ?order, "Starting build");
        ctx.emit("pipeline.started", json!({ "target": target, "stages": order }));

        for name in &order {
            let Some(spec) = self.stages.get(name) else {
                continue;
            };
            if let Err(err) = self.evaluate(spec, ctx, &mut report).await {
                ctx.emit(
                    "pipeline.failed",
                    json!({ "target": target, "stage": name, "error": err.to_string() }),
                );
                return Err(BuildError::new(report, err));
            }
        }

        info!(
            build_target = %target,
            executed = report.executed().len(),
            skipped = report.skipped().len(),
            "Build finished"
        );
        ctx.emit(
            "pipeline.completed",
            json!({
                "target": target,
                "executed": report.executed(),
                "skipped": report.skipped(),
            }),
        );
        Ok(report)
    }

    /// Drives one stage through its state machine and records the outcome.
    async fn evaluate(
        &self,
        spec: &StageSpec,
        ctx: &RunContext,
        report: &mut BuildReport,
    ) -> Result<(), PipelineError> {
        let name = spec.name.as_str();
        let started_at = Utc::now();
        let mut status = StageStatus::default();

        advance(name, &mut status, StageStatus::Checking);
        ctx.emit_stage("stage.checking", name);

        if spec.runner.is_complete() {
            advance(name, &mut status, StageStatus::Skipped);
            info!(stage = %name, "Outputs already exist, skipping");
            ctx.emit_stage("stage.skipped", name);
            report.stages.push(StageReport::skipped(name, started_at));
            return Ok(());
        }

        advance(name, &mut status, StageStatus::Running);
        info!(stage = %name, "Running stage");
        ctx.emit_stage("stage.started", name);
        let timer = StageTimer::start();

        match spec.runner.run(ctx).await {
            Ok(()) => {
                let duration_ms = timer.finish();
                advance(name, &mut status, StageStatus::Done);
                if !spec.runner.is_complete() {
                    warn!(stage = %name, "Stage finished but its outputs are missing");
                }
                info!(stage = %name, duration_ms, "Stage completed");
                ctx.emit(
                    "stage.completed",
                    json!({ "stage": name, "duration_ms": duration_ms }),
                );
                report.stages.push(StageReport::done(name, started_at, duration_ms));
                Ok(())
            }
            Err(err) => {
                let duration_ms = timer.finish();
                advance(name, &mut status, StageStatus::Failed);
                error!(stage = %name, error = %err, "Stage failed");
                ctx.emit(
                    "stage.failed",
                    json!({
                        "stage": name,
                        "error": err.to_string(),
                        "kind": err.kind(),
                        "duration_ms": duration_ms,
                    }),
                );
                report
                    .stages
                    .push(StageReport::failed(name, started_at, duration_ms, err.to_string()));
                Err(err.in_stage(name))
            }
        }
    }
}

fn advance(stage: &str, status: &mut StageStatus, next: StageStatus) {
    debug_assert!(
        status.can_transition_to(next),
        "illegal transition {status} -> {next} for stage '{stage}'"
    );
    debug!(stage = %stage, from = %status, to = %next, "Stage status");
    *status = next;
}

/// Performs topological sort on the stage graph.
fn topological_sort(stages: &HashMap<String, StageSpec>, stage_order: &[String]) -> Vec<String> {
    fn visit(
        node: &str,
        stages: &HashMap<String, StageSpec>,
        visited: &mut HashSet<String>,
        temp_visited: &mut HashSet<String>,
        result: &mut Vec<String>,
    ) {
        if visited.contains(node) || temp_visited.contains(node) {
            return;
        }

        temp_visited.insert(node.to_string());

        if let Some(spec) = stages.get(node) {
            for dep in &spec.dependencies {
                visit(dep, stages, visited, temp_visited, result);
            }
        }

        temp_visited.remove(node);
        visited.insert(node.to_string());
        result.push(node.to_string());
    }

    let mut result = Vec::new();
    let mut visited = HashSet::new();
    let mut temp_visited = HashSet::new();

    // Visit in insertion order for determinism
    for name in stage_order {
        visit(name, stages, &mut visited, &mut temp_visited, &mut result);
    }

    result
}
