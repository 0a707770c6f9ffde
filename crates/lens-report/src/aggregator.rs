//! Result aggregation
//!
//! A [`ResultAggregator`] turns the evidence snapshot taken at pipeline start
//! into an [`InvestigationReport`]. The shipped [`StaticAggregator`] returns
//! a pre-canned report; [`CheckedAggregator`] wraps any aggregator and
//! enforces the report contract on its output.

use crate::confidence::ConfidencePct;
use crate::error::ReportError;
use crate::report::{EvidenceReference, InvestigationReport, RankedCause, ReportDraft, ReportParts};
use lens_evidence::EvidenceItem;
use std::sync::Arc;

/// Produces the report for one completed run
pub trait ResultAggregator: Send + Sync {
    /// # Errors
    /// Any [`ReportError`] the implementation cannot recover from.
    fn produce(&self, evidence: &[EvidenceItem]) -> Result<InvestigationReport, ReportError>;
}

impl<A: ResultAggregator + ?Sized> ResultAggregator for Arc<A> {
    fn produce(&self, evidence: &[EvidenceItem]) -> Result<InvestigationReport, ReportError> {
        (**self).produce(evidence)
    }
}

/// Returns the same report for every run, whatever the evidence
#[derive(Debug, Clone)]
pub struct StaticAggregator {
    report: InvestigationReport,
}

impl StaticAggregator {
    #[must_use]
    pub fn new(report: InvestigationReport) -> Self {
        Self { report }
    }

    /// The API Gateway cascading-failure investigation
    #[must_use]
    pub fn canned() -> Self {
        Self::new(canned_report())
    }
}

impl Default for StaticAggregator {
    fn default() -> Self {
        Self::canned()
    }
}

impl ResultAggregator for StaticAggregator {
    fn produce(&self, evidence: &[EvidenceItem]) -> Result<InvestigationReport, ReportError> {
        tracing::debug!(evidence = evidence.len(), "returning canned report");
        Ok(self.report.clone())
    }
}

/// Enforces the report contract on another aggregator's output
///
/// Ranking invariants are always checked. Evidence references are checked
/// against the snapshot only when `strict_references` is set.
#[derive(Debug, Clone)]
pub struct CheckedAggregator<A> {
    inner: A,
    strict_references: bool,
}

impl<A: ResultAggregator> CheckedAggregator<A> {
    #[must_use]
    pub fn new(inner: A) -> Self {
        Self {
            inner,
            strict_references: false,
        }
    }

    #[must_use]
    pub fn with_strict_references(mut self, strict: bool) -> Self {
        self.strict_references = strict;
        self
    }
}

impl<A: ResultAggregator> ResultAggregator for CheckedAggregator<A> {
    fn produce(&self, evidence: &[EvidenceItem]) -> Result<InvestigationReport, ReportError> {
        let report = self.inner.produce(evidence)?;
        report.validate()?;
        if self.strict_references {
            report.validate_references(evidence)?;
        }
        Ok(report)
    }
}

/// The pre-canned investigation shown after every simulated run
#[must_use]
pub fn canned_report() -> InvestigationReport {
    InvestigationReport::new_unchecked(ReportParts {
        summary: "A cascading failure originating from the API Gateway service caused elevated \
                  latency and 5xx errors across multiple downstream services between 14:23 UTC \
                  and 15:07 UTC on February 14, 2026. Approximately 12% of requests during this \
                  window were affected."
            .to_string(),
        symptoms: vec![
            "HTTP 502/504 errors spiking to 340 req/min on the API Gateway".to_string(),
            "Connection pool saturation on the primary PostgreSQL cluster (max_connections hit)"
                .to_string(),
            "Memory utilization on auth-service pods exceeding 92%".to_string(),
            "Increased p99 latency from 120ms baseline to 4,200ms".to_string(),
        ],
        evidence_used: vec![
            EvidenceReference::new(
                "api-gateway-2026-02-14.txt",
                "Application logs (2,340 entries parsed)",
            ),
            EvidenceReference::new(
                "incident-response-database.pdf",
                "Runbook (12 pages analyzed)",
            ),
            EvidenceReference::new(
                "grafana-overview.png",
                "Dashboard screenshot (metrics extracted via OCR)",
            ),
        ],
        ranked_causes: vec![
            RankedCause::new(
                "Connection pool exhaustion due to long-running queries from batch job",
                ConfidencePct::from_const(87),
            ),
            RankedCause::new(
                "Memory leak in auth-service causing cascading timeouts",
                ConfidencePct::from_const(62),
            ),
            RankedCause::new(
                "Misconfigured retry policy amplifying request volume",
                ConfidencePct::from_const(41),
            ),
        ],
        remediation_steps: vec![
            "Immediately terminate the long-running batch query (PID 48291) on the primary database"
                .to_string(),
            "Increase max_connections from 100 to 200 and configure PgBouncer connection pooling"
                .to_string(),
            "Restart auth-service pods to clear memory leak (rolling restart recommended)"
                .to_string(),
            "Update retry policy to implement exponential backoff with jitter (max 3 retries)"
                .to_string(),
            "Add connection pool monitoring alerts at 80% utilization threshold".to_string(),
        ],
        report_draft: ReportDraft {
            impact: "12% of API requests returned errors over a 44-minute window. No data loss \
                     occurred."
                .to_string(),
            root_cause: "An unoptimized batch analytics query held open 87 database connections \
                         for 23+ minutes, exhausting the connection pool and starving the API \
                         Gateway of database access."
                .to_string(),
            resolution: "Batch query was terminated, connection limits were increased, and \
                         auth-service pods were recycled. Full recovery confirmed at 15:07 UTC."
                .to_string(),
            follow_up: "Implement query timeout limits, add PgBouncer, create runbook for \
                        connection pool incidents, schedule batch jobs to off-peak hours."
                .to_string(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canned_evidence() -> Vec<EvidenceItem> {
        vec![
            EvidenceItem::new("api-gateway-2026-02-14.txt", 2_396_160),
            EvidenceItem::new("incident-response-database.pdf", 512_000),
            EvidenceItem::new("grafana-overview.png", 204_800),
        ]
    }

    #[test]
    fn canned_report_satisfies_contract() {
        let report = canned_report();
        assert!(report.validate().is_ok());
        assert_eq!(report.ranked_causes().len(), 3);
        assert_eq!(report.overall_confidence().value(), 87);
        assert_eq!(report.remediation_steps().len(), 5);
    }

    #[test]
    fn static_aggregator_ignores_evidence() {
        let aggregator = StaticAggregator::canned();
        let a = aggregator.produce(&[]).unwrap();
        let b = aggregator.produce(&canned_evidence()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn strict_check_rejects_foreign_references() {
        let lenient = CheckedAggregator::new(StaticAggregator::canned());
        assert!(lenient.produce(&[EvidenceItem::new("mine.log", 1)]).is_ok());

        let strict = lenient.clone().with_strict_references(true);
        assert_eq!(
            strict.produce(&[EvidenceItem::new("mine.log", 1)]),
            Err(ReportError::UnknownEvidence {
                source_name: "api-gateway-2026-02-14.txt".to_string()
            })
        );
        assert!(strict.produce(&canned_evidence()).is_ok());
    }

    #[test]
    fn checked_aggregator_rejects_unsorted_output() {
        let broken = InvestigationReport::new_unchecked(ReportParts {
            ranked_causes: vec![
                RankedCause::new("low", ConfidencePct::from_const(10)),
                RankedCause::new("high", ConfidencePct::from_const(90)),
            ],
            ..ReportParts::default()
        });
        let checked = CheckedAggregator::new(StaticAggregator::new(broken));
        assert!(matches!(
            checked.produce(&[]),
            Err(ReportError::UnsortedCauses { position: 1, .. })
        ));
    }
}
