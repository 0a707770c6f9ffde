//! IncidentLens Pipeline
//!
//! A staged pipeline runner: an ordered list of named stages, each occupying
//! a fixed duration, executed strictly one after another. After the last
//! stage the run settles for a short delay and then reports Done exactly
//! once.
//!
//! ```text
//! Idle -> Running(0) -> ... -> Running(N-1) -> Settling -> Done
//!            \______________________/             |
//!                 Cancelled / Failed       Cancelled
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use lens_pipeline::prelude::*;
//!
//! let engine = PipelineEngine::default();
//! engine.on_done(|summary| tracing::info!(?summary, "investigation finished"))?;
//! engine.start_schedule(Schedule::default_investigation())?;
//!
//! if let Some(stage) = engine.current_stage() {
//!     println!("{}: {}", stage.index, stage.label);
//! }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod engine;
pub mod error;
pub mod schedule;
pub mod state;
pub mod work;

pub use engine::{CurrentStage, DoneCallback, PipelineEngine, RunOutcome, RunSnapshot, RunSummary};
pub use error::{PipelineError, StageFailure};
pub use schedule::{default_stages, Schedule, StageDefinition, DEFAULT_SETTLE_DELAY};
pub use state::{allowed_transitions, validate_transition, RunStatus};
pub use work::{SimulatedWork, StageWork};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::{
        CurrentStage, PipelineEngine, PipelineError, RunOutcome, RunSnapshot, RunStatus,
        RunSummary, Schedule, StageDefinition, StageWork,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
