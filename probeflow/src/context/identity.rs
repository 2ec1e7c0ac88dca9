//! Run identity for tracking pipeline builds.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifies one orchestration invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunIdentity {
    /// The unique ID for this build.
    pub run_id: Uuid,
    /// The dataset being processed.
    pub dataset_id: String,
    /// When the build started.
    pub started_at: DateTime<Utc>,
}

impl RunIdentity {
    /// Creates a new run identity with a generated run ID.
    #[must_use]
    pub fn new(dataset_id: impl Into<String>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            dataset_id: dataset_id.into(),
            started_at: Utc::now(),
        }
    }

    /// Creates a run identity with a specific run ID.
    #[must_use]
    pub fn with_run_id(run_id: Uuid, dataset_id: impl Into<String>) -> Self {
        Self {
            run_id,
            dataset_id: dataset_id.into(),
            started_at: Utc::now(),
        }
    }
}
