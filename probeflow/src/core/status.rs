//! Stage status state machine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The evaluation status of a stage within one build.
///
/// Transitions: `Unresolved -> Checking -> (Skipped | Running -> (Done | Failed))`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    /// Not yet reached by the orchestrator.
    #[default]
    Unresolved,
    /// Output targets are being checked.
    Checking,
    /// All output targets already existed.
    Skipped,
    /// The stage body is executing.
    Running,
    /// The stage body finished successfully.
    Done,
    /// The stage body failed; the build is aborted.
    Failed,
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unresolved => write!(f, "unresolved"),
            Self::Checking => write!(f, "checking"),
            Self::Skipped => write!(f, "skipped"),
            Self::Running => write!(f, "running"),
            Self::Done => write!(f, "done"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

impl StageStatus {
    /// Returns true if downstream stages may rely on this stage's outputs.
    #[must_use]
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Skipped | Self::Done)
    }

    /// Returns true if `next` is a legal successor of this status.
    #[must_use]
    pub fn can_transition_to(&self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Unresolved, Self::Checking)
                | (Self::Checking, Self::Skipped | Self::Running)
                | (Self::Running, Self::Done | Self::Failed)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_status_display() {
        assert_eq!(StageStatus::Skipped.to_string(), "skipped");
        assert_eq!(StageStatus::Failed.to_string(), "failed");
        assert_eq!(StageStatus::default().to_string(), "unresolved");
    }

    #[test]
    fn test_available() {
        assert!(StageStatus::Skipped.is_available());
        assert!(StageStatus::Done.is_available());
        assert!(!StageStatus::Failed.is_available());
        assert!(!StageStatus::Running.is_available());
    }

    #[test]
    fn test_transitions() {
        assert!(StageStatus::Unresolved.can_transition_to(StageStatus::Checking));
        assert!(StageStatus::Checking.can_transition_to(StageStatus::Skipped));
        assert!(StageStatus::Running.can_transition_to(StageStatus::Failed));
        assert!(!StageStatus::Skipped.can_transition_to(StageStatus::Running));
        assert!(!StageStatus::Unresolved.can_transition_to(StageStatus::Done));
    }

    #[test]
    fn test_stage_status_serialize() {
        let json = serde_json::to_string(&StageStatus::Skipped).unwrap();
        assert_eq!(json, r#""skipped""#);
    }
}
