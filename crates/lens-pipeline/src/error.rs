//! Error types for the pipeline engine

use crate::state::RunStatus;

/// Errors returned by [`PipelineEngine`](crate::PipelineEngine) operations
///
/// Cancellation is not represented here: it is a normal terminal path.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PipelineError {
    /// Empty schedule, or a stage with a zero duration
    #[error("invalid schedule: {0}")]
    InvalidSchedule(String),

    /// `start` called while a run is Running or Settling
    #[error("pipeline already running")]
    DoubleStart,

    /// A completion callback is already waiting for this run
    #[error("completion callback already registered")]
    CallbackAlreadyRegistered,

    /// Transition not in the allowed table
    #[error("illegal transition: {from:?} -> {to:?}")]
    IllegalTransition { from: RunStatus, to: RunStatus },

    /// `start` called outside a tokio runtime
    #[error("no tokio runtime available to drive the pipeline")]
    NoRuntime,
}

impl PipelineError {
    /// Whether the caller can fix the problem by changing its input
    #[inline]
    #[must_use]
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidSchedule(_) | Self::DoubleStart | Self::CallbackAlreadyRegistered
        )
    }
}

/// Failure reported by a stage's unit of work
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize, thiserror::Error)]
#[error("{reason}")]
pub struct StageFailure {
    pub reason: String,
}

impl StageFailure {
    #[inline]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}
