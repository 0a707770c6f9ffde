//! Confidence scores

use crate::error::ReportError;
use serde::{Deserialize, Serialize};

/// Integer percentage in `[0, 100]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct ConfidencePct(u8);

impl ConfidencePct {
    pub const MAX: u8 = 100;

    /// # Errors
    /// `ConfidenceOutOfRange` above 100.
    pub fn new(value: u32) -> Result<Self, ReportError> {
        u8::try_from(value)
            .ok()
            .filter(|v| *v <= Self::MAX)
            .map(Self)
            .ok_or(ReportError::ConfidenceOutOfRange(value))
    }

    /// For literals known to be in range
    pub(crate) const fn from_const(value: u8) -> Self {
        assert!(value <= Self::MAX);
        Self(value)
    }

    #[inline]
    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }

    #[must_use]
    pub fn tier(self) -> ConfidenceTier {
        match self.0 {
            80..=u8::MAX => ConfidenceTier::High,
            50..=79 => ConfidenceTier::Medium,
            _ => ConfidenceTier::Low,
        }
    }
}

impl TryFrom<u32> for ConfidencePct {
    type Error = ReportError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ConfidencePct> for u32 {
    fn from(value: ConfidencePct) -> Self {
        u32::from(value.0)
    }
}

impl std::fmt::Display for ConfidencePct {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}% confidence", self.0)
    }
}

/// Badge colour band for a confidence score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceTier {
    /// 80 and above
    High,
    /// 50 to 79
    Medium,
    /// Below 50
    Low,
}
