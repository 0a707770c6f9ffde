//! Session configuration
//!
//! Defaults reproduce the product: the five-stage schedule, an 800 ms settle
//! delay, only the summary panel open and lenient evidence references.
//! Overrides load from TOML:
//!
//! ```toml
//! settle_delay_ms = 200
//! default_open_sections = ["summary", "causes"]
//! strict_evidence_references = false
//!
//! [[schedule]]
//! label = "Parsing logs"
//! duration_ms = 500
//! ```

use crate::error::ConfigError;
use lens_pipeline::{default_stages, Schedule, StageDefinition, DEFAULT_SETTLE_DELAY};
use lens_report::{SectionId, DEFAULT_OPEN_SECTIONS};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Investigation session configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LensConfig {
    /// Pause after the last stage before Done
    pub settle_delay_ms: u64,
    /// Sections expanded when a report view opens
    pub default_open_sections: Vec<SectionId>,
    /// Reject reports citing evidence that was not supplied
    pub strict_evidence_references: bool,
    /// Ordered pipeline stages, written last as `[[schedule]]` tables
    pub schedule: Vec<StageDefinition>,
}

impl LensConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With a custom stage list
    #[inline]
    #[must_use]
    pub fn with_schedule(mut self, schedule: Vec<StageDefinition>) -> Self {
        self.schedule = schedule;
        self
    }

    /// With settle delay
    #[inline]
    #[must_use]
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// With the sections that start open
    #[inline]
    #[must_use]
    pub fn with_default_open(mut self, sections: Vec<SectionId>) -> Self {
        self.default_open_sections = sections;
        self
    }

    /// With strict evidence reference checking
    #[inline]
    #[must_use]
    pub fn with_strict_evidence_references(mut self, strict: bool) -> Self {
        self.strict_evidence_references = strict;
        self
    }

    #[inline]
    #[must_use]
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    /// Validated schedule
    ///
    /// # Errors
    /// `ConfigError::Schedule` if the stage list is empty or has a
    /// zero-duration stage.
    pub fn schedule(&self) -> Result<Schedule, ConfigError> {
        Schedule::new(self.schedule.clone()).map_err(ConfigError::Schedule)
    }

    /// # Errors
    /// See [`LensConfig::schedule`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.schedule().map(|_| ())
    }

    /// Parse and validate TOML
    ///
    /// # Errors
    /// `ConfigError::Parse` for malformed TOML or unknown keys, otherwise
    /// any validation error.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load, parse and validate a TOML file
    ///
    /// # Errors
    /// `ConfigError::Io` if the file cannot be read, otherwise as
    /// [`LensConfig::from_toml_str`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        tracing::debug!(path = %path.display(), "loading configuration");
        Self::from_toml_str(&source)
    }

    /// # Errors
    /// `ConfigError::Parse` if encoding fails.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

impl Default for LensConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: u64::try_from(DEFAULT_SETTLE_DELAY.as_millis()).unwrap_or(800),
            default_open_sections: DEFAULT_OPEN_SECTIONS.to_vec(),
            strict_evidence_references: false,
            schedule: default_stages(),
        }
    }
}
