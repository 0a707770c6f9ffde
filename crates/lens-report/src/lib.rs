//! IncidentLens Report
//!
//! The result aggregation contract and the panel model that presents it.
//!
//! - [`InvestigationReport`]: validated, read-only report
//! - [`ResultAggregator`]: produces a report from the evidence snapshot
//! - [`StaticAggregator`]: the pre-canned investigation
//! - [`CheckedAggregator`]: contract enforcement around any aggregator
//! - [`DisclosurePanels`]: per-section open/closed state
//!
//! # Example
//!
//! ```rust
//! use lens_report::{DisclosurePanels, ResultAggregator, SectionId, StaticAggregator};
//!
//! let report = StaticAggregator::canned().produce(&[]).unwrap();
//! assert_eq!(report.overall_confidence().value(), 87);
//!
//! let mut panels = DisclosurePanels::default();
//! panels.toggle(SectionId::RankedCauses);
//! assert!(panels.is_open(SectionId::Summary));
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod aggregator;
pub mod confidence;
pub mod error;
pub mod export;
pub mod panels;
pub mod report;

pub use aggregator::{canned_report, CheckedAggregator, ResultAggregator, StaticAggregator};
pub use confidence::{ConfidencePct, ConfidenceTier};
pub use error::ReportError;
pub use export::{render_markdown, section_lines};
pub use panels::{DisclosurePanels, SectionId, DEFAULT_OPEN_SECTIONS};
pub use report::{
    EvidenceReference, InvestigationReport, RankedCause, ReportDraft, ReportParts,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
