use crate::error::PipelineError;
use serde::{Deserialize, Serialize};

/// Lifecycle of one pipeline run
///
/// `Running` covers every stage; the active index lives next to the status
/// in [`RunSnapshot`](crate::RunSnapshot).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Idle,
    Running,
    Settling,
    Done,
    Cancelled,
    Failed,
}

impl RunStatus {
    /// A run is live while a driver task owns it
    #[inline]
    #[must_use]
    pub fn is_live(self) -> bool {
        matches!(self, Self::Running | Self::Settling)
    }

    #[inline]
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Cancelled | Self::Failed)
    }
}

/// Validates a state transition.
pub fn validate_transition(from: RunStatus, to: RunStatus) -> Result<(), PipelineError> {
    if allowed(from, to) {
        Ok(())
    } else {
        Err(PipelineError::IllegalTransition { from, to })
    }
}

pub fn allowed_transitions(from: RunStatus) -> Vec<RunStatus> {
    use RunStatus::*;
    match from {
        Idle => vec![Running],
        // Running -> Running is the advance to the next stage
        Running => vec![Running, Settling, Cancelled, Failed],
        Settling => vec![Done, Cancelled],
        Done | Cancelled | Failed => vec![Running, Idle],
    }
}

fn allowed(from: RunStatus, to: RunStatus) -> bool {
    allowed_transitions(from).into_iter().any(|s| s == to)
}
