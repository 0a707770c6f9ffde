//! Error types for IncidentLens Core
//!
//! Folds the pipeline and report errors into one session-level error.

use lens_pipeline::PipelineError;
use lens_report::ReportError;

/// Main session error type
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LensError {
    /// Start requested with an empty evidence queue
    #[error("no evidence has been added to the investigation")]
    NoEvidence,

    /// Pipeline engine rejected the operation
    #[error("pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Report production or validation failed
    #[error("report error: {0}")]
    Report(#[from] ReportError),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The run ended without producing a report
    #[error("investigation ended without a report: {0}")]
    NoReport(String),
}

impl LensError {
    /// Whether the user can resolve this by changing input
    #[inline]
    #[must_use]
    pub fn is_user_error(&self) -> bool {
        match self {
            Self::NoEvidence => true,
            Self::Pipeline(e) => e.is_caller_error(),
            Self::Config(_) => true,
            Self::Report(_) | Self::NoReport(_) => false,
        }
    }
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Could not read the configuration file
    #[error("cannot read {path}: {message}")]
    Io { path: String, message: String },

    /// TOML syntax or schema error
    #[error("invalid configuration: {0}")]
    Parse(String),

    /// Schedule rejected by the pipeline
    #[error("invalid schedule: {0}")]
    Schedule(PipelineError),
}
