//! Stage definitions and the static schedule a run follows

use crate::error::PipelineError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Pause between the last stage finishing and the run reporting Done
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(800);

/// One named, fixed-duration unit of the schedule
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StageDefinition {
    pub label: String,
    pub duration_ms: u64,
}

impl StageDefinition {
    #[inline]
    #[must_use]
    pub fn new(label: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            label: label.into(),
            duration_ms,
        }
    }

    #[inline]
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[inline]
    #[must_use]
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

/// Validated, immutable stage sequence
///
/// Never empty and every stage has a positive duration. Cloning shares the
/// underlying stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    stages: Arc<Vec<StageDefinition>>,
}

impl Schedule {
    /// Validate a stage list
    ///
    /// # Errors
    /// `PipelineError::InvalidSchedule` if the list is empty or a stage has
    /// a zero duration.
    pub fn new(stages: Vec<StageDefinition>) -> Result<Self, PipelineError> {
        if stages.is_empty() {
            return Err(PipelineError::InvalidSchedule(
                "schedule has no stages".to_string(),
            ));
        }
        if let Some(stage) = stages.iter().find(|s| s.duration_ms == 0) {
            return Err(PipelineError::InvalidSchedule(format!(
                "stage '{}' has a zero duration",
                stage.label
            )));
        }
        Ok(Self {
            stages: Arc::new(stages),
        })
    }

    /// The five-stage "Investigating Incident" schedule, 9.8 seconds in total
    #[must_use]
    pub fn default_investigation() -> Self {
        Self {
            stages: Arc::new(default_stages()),
        }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Always false; kept for API symmetry with slices
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&StageDefinition> {
        self.stages.get(index)
    }

    #[inline]
    #[must_use]
    pub fn stages(&self) -> &[StageDefinition] {
        &self.stages
    }

    pub fn iter(&self) -> std::slice::Iter<'_, StageDefinition> {
        self.stages.iter()
    }

    /// Sum of every stage duration, settle delay excluded
    #[must_use]
    pub fn total_duration(&self) -> Duration {
        self.stages.iter().map(StageDefinition::duration).sum()
    }
}

impl Default for Schedule {
    fn default() -> Self {
        Self::default_investigation()
    }
}

impl TryFrom<Vec<StageDefinition>> for Schedule {
    type Error = PipelineError;

    fn try_from(stages: Vec<StageDefinition>) -> Result<Self, Self::Error> {
        Self::new(stages)
    }
}

impl<'a> IntoIterator for &'a Schedule {
    type Item = &'a StageDefinition;
    type IntoIter = std::slice::Iter<'a, StageDefinition>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Stages of the default investigation schedule
#[must_use]
pub fn default_stages() -> Vec<StageDefinition> {
    vec![
        StageDefinition::new("Parsing logs", 1500),
        StageDefinition::new("Retrieving runbook context", 2000),
        StageDefinition::new("Analyzing metrics", 2500),
        StageDefinition::new("Ranking hypotheses", 2000),
        StageDefinition::new("Generating remediation plan", 1800),
    ]
}
