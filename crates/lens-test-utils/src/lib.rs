//! Testing utilities for IncidentLens workspace
//!
//! Shared test helpers, fixtures, and recording collaborators.

#![allow(missing_docs)]

use lens_core::{InvestigationSession, LensConfig, NavigationSignal, Navigator};
use lens_evidence::RawFile;
use lens_pipeline::{StageDefinition, StageFailure, StageWork};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// Settle delay used by [`fast_config`]
pub const FAST_SETTLE: Duration = Duration::from_millis(50);

/// Navigator that remembers every signal in order
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    signals: Mutex<Vec<NavigationSignal>>,
}

impl RecordingNavigator {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn signals(&self) -> Vec<NavigationSignal> {
        self.signals.lock().clone()
    }

    pub fn last(&self) -> Option<NavigationSignal> {
        self.signals.lock().last().copied()
    }
}

impl Navigator for RecordingNavigator {
    fn signal(&self, signal: NavigationSignal) {
        self.signals.lock().push(signal);
    }
}

/// Stage work that fails at one index and sleeps through the others
#[derive(Debug, Clone)]
pub struct FailingWork {
    pub index: usize,
    pub reason: String,
}

impl FailingWork {
    pub fn at(index: usize) -> Arc<Self> {
        Arc::new(Self {
            index,
            reason: "metrics backend unreachable".to_string(),
        })
    }
}

#[async_trait::async_trait]
impl StageWork for FailingWork {
    async fn run(&self, index: usize, stage: &StageDefinition) -> Result<(), StageFailure> {
        tokio::time::sleep(stage.duration()).await;
        if index == self.index {
            return Err(StageFailure::new(self.reason.clone()));
        }
        Ok(())
    }
}

/// Three 100 ms stages
pub fn fast_schedule() -> Vec<StageDefinition> {
    vec![
        StageDefinition::new("Parsing logs", 100),
        StageDefinition::new("Analyzing metrics", 100),
        StageDefinition::new("Ranking hypotheses", 100),
    ]
}

/// Config with [`fast_schedule`] and [`FAST_SETTLE`]
pub fn fast_config() -> LensConfig {
    LensConfig::new()
        .with_schedule(fast_schedule())
        .with_settle_delay(FAST_SETTLE)
}

/// Total virtual time a [`fast_config`] run takes
pub fn fast_run_duration() -> Duration {
    Duration::from_millis(300) + FAST_SETTLE
}

/// The artifacts the canned report cites
pub fn sample_files() -> Vec<RawFile> {
    vec![
        RawFile::new("api-gateway-2026-02-14.txt", 2048),
        RawFile::new("incident-response-database.pdf", 524_288),
        RawFile::new("grafana-overview.png", 40_960),
    ]
}

/// Session on [`fast_config`] with a recording navigator attached
pub fn recorded_session() -> (InvestigationSession, Arc<RecordingNavigator>) {
    recorded_session_with(fast_config())
}

pub fn recorded_session_with(
    config: LensConfig,
) -> (InvestigationSession, Arc<RecordingNavigator>) {
    let navigator = RecordingNavigator::new();
    let session = InvestigationSession::new(config)
        .unwrap()
        .with_navigator(Arc::clone(&navigator) as Arc<dyn Navigator>);
    (session, navigator)
}
