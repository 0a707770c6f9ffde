//! Error types for report production and validation

/// Report contract violations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReportError {
    /// A report must rank at least one cause
    #[error("report has no ranked causes")]
    NoRankedCauses,

    /// Causes must be ordered by descending confidence
    #[error("ranked causes out of order at position {position}: {previous}% then {next}%")]
    UnsortedCauses {
        position: usize,
        previous: u8,
        next: u8,
    },

    /// Confidence outside `[0, 100]`
    #[error("confidence {0}% is outside 0..=100")]
    ConfidenceOutOfRange(u32),

    /// Evidence reference to an artifact that was not in the queue at start
    #[error("evidence '{source_name}' was not supplied for this investigation")]
    UnknownEvidence { source_name: String },

    /// Unrecognised section key
    #[error("unknown report section: {0}")]
    UnknownSection(String),

    /// JSON encoding or decoding failed
    #[error("report serialization failed: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for ReportError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value.to_string())
    }
}
