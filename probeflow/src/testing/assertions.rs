//! Assertions over build reports.

use crate::core::{BuildReport, StageStatus};

/// Asserts that `stage` reached `expected` in `report`.
///
/// # Panics
///
/// Panics if the stage is absent or has a different status.
pub fn assert_stage_status(report: &BuildReport, stage: &str, expected: StageStatus) {
    let Some(found) = report.stage(stage) else {
        panic!("stage '{stage}' not in report for '{}'", report.target);
    };
    assert_eq!(
        found.status, expected,
        "stage '{stage}' status: expected {expected}, got {}",
        found.status
    );
}

/// Asserts that exactly `stages` ran, in that order.
///
/// # Panics
///
/// Panics if the executed stages differ.
pub fn assert_executed(report: &BuildReport, stages: &[&str]) {
    assert_eq!(report.executed(), stages, "executed stages");
}

/// Asserts that exactly `stages` were skipped, in that order.
///
/// # Panics
///
/// Panics if the skipped stages differ.
pub fn assert_skipped(report: &BuildReport, stages: &[&str]) {
    assert_eq!(report.skipped(), stages, "skipped stages");
}
