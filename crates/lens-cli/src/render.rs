//! Terminal rendering

use lens_evidence::EvidenceItem;
use lens_pipeline::{RunSnapshot, Schedule};
use lens_report::{section_lines, ConfidenceTier, DisclosurePanels, InvestigationReport, SectionId};

/// One line per queued artifact
pub(crate) fn evidence_lines(items: &[EvidenceItem]) -> Vec<String> {
    items
        .iter()
        .map(|item| {
            format!(
                "  {:<40} {:>10}  {}",
                item.name(),
                item.display_size(),
                item.kind()
            )
        })
        .collect()
}

/// Stage board for one snapshot
pub(crate) fn progress_lines(schedule: &Schedule, snapshot: &RunSnapshot) -> Vec<String> {
    schedule
        .iter()
        .enumerate()
        .map(|(index, stage)| {
            let marker = if snapshot.is_complete(index) {
                "[done]"
            } else if snapshot.is_active(index) {
                "[....]"
            } else {
                "[    ]"
            };
            format!("  {marker} {}", stage.label())
        })
        .collect()
}

/// The stage list with per-stage and total durations
pub(crate) fn schedule_lines(schedule: &Schedule, settle_ms: u64) -> Vec<String> {
    let mut lines: Vec<String> = schedule
        .iter()
        .enumerate()
        .map(|(i, stage)| format!("  {}. {:<32} {:>6} ms", i + 1, stage.label(), stage.duration_ms))
        .collect();
    let total = u64::try_from(schedule.total_duration().as_millis()).unwrap_or(u64::MAX);
    lines.push(format!("  settle {settle_ms} ms, total {} ms", total.saturating_add(settle_ms)));
    lines
}

fn tier_label(tier: ConfidenceTier) -> &'static str {
    match tier {
        ConfidenceTier::High => "high",
        ConfidenceTier::Medium => "medium",
        ConfidenceTier::Low => "low",
    }
}

/// Report with closed sections collapsed to their title
pub(crate) fn report_lines(report: &InvestigationReport, panels: &DisclosurePanels) -> Vec<String> {
    let overall = report.overall_confidence();
    let mut lines = vec![format!("Overall: {overall} ({})", tier_label(overall.tier()))];
    for section in SectionId::ALL {
        lines.push(String::new());
        if panels.is_open(section) {
            lines.push(format!("v {}", section.title()));
            lines.extend(section_lines(report, section).into_iter().map(|l| format!("    {l}")));
        } else {
            lines.push(format!("> {}", section.title()));
        }
    }
    lines
}
