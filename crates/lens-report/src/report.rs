//! Investigation report
//!
//! The report is built from [`ReportParts`] and validated on construction,
//! including when it is deserialized. Once built it is read-only.
//!
//! # Invariants
//! - `ranked_causes` is non-empty
//! - `ranked_causes` is ordered by descending confidence (ties allowed);
//!   consumers rely on this and never re-sort
//! - every confidence is within `[0, 100]` (enforced by [`ConfidencePct`])

use crate::confidence::ConfidencePct;
use crate::error::ReportError;
use lens_evidence::EvidenceItem;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Where a finding came from and what was extracted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceReference {
    pub source_name: String,
    pub extraction_note: String,
}

impl EvidenceReference {
    #[must_use]
    pub fn new(source_name: impl Into<String>, extraction_note: impl Into<String>) -> Self {
        Self {
            source_name: source_name.into(),
            extraction_note: extraction_note.into(),
        }
    }
}

/// Candidate root cause with its confidence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedCause {
    pub description: String,
    pub confidence: ConfidencePct,
}

impl RankedCause {
    #[must_use]
    pub fn new(description: impl Into<String>, confidence: ConfidencePct) -> Self {
        Self {
            description: description.into(),
            confidence,
        }
    }
}

/// Post-incident write-up
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReportDraft {
    pub impact: String,
    pub root_cause: String,
    pub resolution: String,
    pub follow_up: String,
}

/// Unvalidated report contents
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReportParts {
    pub summary: String,
    pub symptoms: Vec<String>,
    pub evidence_used: Vec<EvidenceReference>,
    pub ranked_causes: Vec<RankedCause>,
    /// Execution order, not severity
    pub remediation_steps: Vec<String>,
    pub report_draft: ReportDraft,
}

/// Immutable output of one completed investigation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ReportParts")]
pub struct InvestigationReport {
    summary: String,
    symptoms: Vec<String>,
    evidence_used: Vec<EvidenceReference>,
    ranked_causes: Vec<RankedCause>,
    remediation_steps: Vec<String>,
    report_draft: ReportDraft,
}

impl InvestigationReport {
    /// Build without validation; callers guarantee the invariants
    pub(crate) fn new_unchecked(parts: ReportParts) -> Self {
        Self {
            summary: parts.summary,
            symptoms: parts.symptoms,
            evidence_used: parts.evidence_used,
            ranked_causes: parts.ranked_causes,
            remediation_steps: parts.remediation_steps,
            report_draft: parts.report_draft,
        }
    }

    /// Check the ranking invariants
    ///
    /// # Errors
    /// `NoRankedCauses` or `UnsortedCauses`.
    pub fn validate(&self) -> Result<(), ReportError> {
        validate_causes(&self.ranked_causes)
    }

    /// Check that every evidence reference names an artifact from `snapshot`
    ///
    /// # Errors
    /// `UnknownEvidence` for the first reference with no matching artifact.
    pub fn validate_references(&self, snapshot: &[EvidenceItem]) -> Result<(), ReportError> {
        let known: HashSet<&str> = snapshot.iter().map(EvidenceItem::name).collect();
        match self
            .evidence_used
            .iter()
            .find(|r| !known.contains(r.source_name.as_str()))
        {
            Some(missing) => Err(ReportError::UnknownEvidence {
                source_name: missing.source_name.clone(),
            }),
            None => Ok(()),
        }
    }

    #[inline]
    #[must_use]
    pub fn summary(&self) -> &str {
        &self.summary
    }

    #[inline]
    #[must_use]
    pub fn symptoms(&self) -> &[String] {
        &self.symptoms
    }

    #[inline]
    #[must_use]
    pub fn evidence_used(&self) -> &[EvidenceReference] {
        &self.evidence_used
    }

    /// Causes in descending confidence order
    #[inline]
    #[must_use]
    pub fn ranked_causes(&self) -> &[RankedCause] {
        &self.ranked_causes
    }

    #[inline]
    #[must_use]
    pub fn remediation_steps(&self) -> &[String] {
        &self.remediation_steps
    }

    #[inline]
    #[must_use]
    pub fn report_draft(&self) -> &ReportDraft {
        &self.report_draft
    }

    /// Confidence of the top-ranked cause
    #[must_use]
    pub fn overall_confidence(&self) -> ConfidencePct {
        self.ranked_causes
            .first()
            .map_or(ConfidencePct::from_const(0), |c| c.confidence)
    }

    /// # Errors
    /// `Serialization` if encoding fails.
    pub fn to_json_pretty(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decode and validate a report
    ///
    /// # Errors
    /// `Serialization` for malformed JSON or a violated invariant.
    pub fn from_json(json: &str) -> Result<Self, ReportError> {
        Ok(serde_json::from_str(json)?)
    }
}

impl TryFrom<ReportParts> for InvestigationReport {
    type Error = ReportError;

    fn try_from(parts: ReportParts) -> Result<Self, Self::Error> {
        validate_causes(&parts.ranked_causes)?;
        Ok(Self::new_unchecked(parts))
    }
}

fn validate_causes(causes: &[RankedCause]) -> Result<(), ReportError> {
    if causes.is_empty() {
        return Err(ReportError::NoRankedCauses);
    }
    for (position, pair) in causes.windows(2).enumerate() {
        let (previous, next) = (pair[0].confidence, pair[1].confidence);
        if next > previous {
            return Err(ReportError::UnsortedCauses {
                position: position + 1,
                previous: previous.value(),
                next: next.value(),
            });
        }
    }
    Ok(())
}
