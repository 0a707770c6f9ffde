//! Stage work
//!
//! The engine owns sequencing and cancellation; what a stage actually does
//! is delegated to a [`StageWork`] implementation.

use crate::error::StageFailure;
use crate::schedule::StageDefinition;

/// Unit of work performed while a stage is active
///
/// Returning `Err` moves the run to `Failed` at this stage instead of
/// advancing. The future is dropped on cancellation, so implementations must
/// tolerate being stopped at any await point.
#[async_trait::async_trait]
pub trait StageWork: Send + Sync {
    async fn run(&self, index: usize, stage: &StageDefinition) -> Result<(), StageFailure>;
}

/// Sleeps for the stage's configured duration and always succeeds
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedWork;

#[async_trait::async_trait]
impl StageWork for SimulatedWork {
    async fn run(&self, _index: usize, stage: &StageDefinition) -> Result<(), StageFailure> {
        tokio::time::sleep(stage.duration()).await;
        Ok(())
    }
}
