// Build Status Model
// State of the remote build sequence as rendered by the wizard UI

use serde::{Deserialize, Serialize};

/// Where the remote build sequence currently stands. `Idle` is the state
/// before any sequence has been started (or after a cancellation); the other
/// four states are the lifecycle of one triggered sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum BuildStatus {
    Idle,
    Pending,
    #[serde(rename_all = "camelCase")]
    Running {
        #[serde(skip_serializing_if = "Option::is_none")]
        run_url: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Succeeded {
        artifact_url: String,
        run_url: String,
    },
    #[serde(rename_all = "camelCase")]
    Failed {
        reason: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        run_url: Option<String>,
    },
}

impl BuildStatus {
    /// True while a sequence is between trigger and terminal state
    pub fn is_in_flight(&self) -> bool {
        matches!(self, BuildStatus::Pending | BuildStatus::Running { .. })
    }
}
