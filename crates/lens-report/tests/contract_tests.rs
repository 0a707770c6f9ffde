//! Report contract properties

use lens_report::{ConfidencePct, InvestigationReport, RankedCause, ReportError, ReportParts};
use proptest::prelude::*;

fn parts_with(confidences: &[u32]) -> ReportParts {
    ReportParts {
        ranked_causes: confidences
            .iter()
            .map(|c| RankedCause::new(format!("cause at {c}"), ConfidencePct::new(*c).unwrap()))
            .collect(),
        ..ReportParts::default()
    }
}

proptest! {
    #[test]
    fn prop_accepted_reports_are_sorted_and_non_empty(
        confidences in prop::collection::vec(0u32..=100, 0..8)
    ) {
        match InvestigationReport::try_from(parts_with(&confidences)) {
            Ok(report) => {
                let values: Vec<u8> = report
                    .ranked_causes()
                    .iter()
                    .map(|c| c.confidence.value())
                    .collect();
                prop_assert!(!values.is_empty());
                prop_assert!(values.windows(2).all(|w| w[0] >= w[1]));
                prop_assert_eq!(report.overall_confidence().value(), values[0]);
            }
            Err(ReportError::NoRankedCauses) => prop_assert!(confidences.is_empty()),
            Err(ReportError::UnsortedCauses { .. }) => {
                prop_assert!(confidences.windows(2).any(|w| w[0] < w[1]));
            }
            Err(other) => prop_assert!(false, "unexpected error: {other}"),
        }
    }

    #[test]
    fn prop_sorting_descending_always_validates(
        mut confidences in prop::collection::vec(0u32..=100, 1..8)
    ) {
        confidences.sort_unstable_by(|a, b| b.cmp(a));
        prop_assert!(InvestigationReport::try_from(parts_with(&confidences)).is_ok());
    }
}
