//! Text rendering of reports
//!
//! `section_lines` gives the body of one panel; `render_markdown` writes the
//! whole report for export, every section expanded.

use crate::panels::SectionId;
use crate::report::InvestigationReport;

/// Body lines of one section, without its title
#[must_use]
pub fn section_lines(report: &InvestigationReport, section: SectionId) -> Vec<String> {
    match section {
        SectionId::Summary => vec![report.summary().to_string()],
        SectionId::Symptoms => report.symptoms().iter().map(|s| format!("- {s}")).collect(),
        SectionId::EvidenceUsed => report
            .evidence_used()
            .iter()
            .map(|e| format!("- {}: {}", e.source_name, e.extraction_note))
            .collect(),
        SectionId::RankedCauses => report
            .ranked_causes()
            .iter()
            .enumerate()
            .map(|(i, c)| format!("#{} {} ({})", i + 1, c.description, c.confidence))
            .collect(),
        SectionId::Remediation => report
            .remediation_steps()
            .iter()
            .enumerate()
            .map(|(i, s)| format!("{}. {s}", i + 1))
            .collect(),
        SectionId::ReportDraft => {
            let draft = report.report_draft();
            vec![
                format!("Impact: {}", draft.impact),
                format!("Root Cause: {}", draft.root_cause),
                format!("Resolution: {}", draft.resolution),
                format!("Follow-up Actions: {}", draft.follow_up),
            ]
        }
    }
}

/// Full Markdown document with every section
#[must_use]
pub fn render_markdown(report: &InvestigationReport, heading: &str) -> String {
    let mut out = format!("# {heading}\n\nOverall: {}\n\n", report.overall_confidence());
    for section in SectionId::ALL {
        out.push_str(&format!("## {}\n\n", section.title()));
        for line in section_lines(report, section) {
            out.push_str(&line);
            out.push('\n');
        }
        out.push('\n');
    }
    out
}
