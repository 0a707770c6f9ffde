//! Core types for IncidentLens sessions

use lens_report::{DisclosurePanels, InvestigationReport};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use ulid::Ulid;

/// Unique session identifier (ULID for sortability)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Ulid);

impl SessionId {
    /// Generate new session ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One report view: the shared report plus this view's panel state
///
/// Panel state is discarded with the view.
#[derive(Debug, Clone)]
pub struct ReportView {
    pub report: Arc<InvestigationReport>,
    pub panels: DisclosurePanels,
}

impl ReportView {
    #[must_use]
    pub fn new(report: Arc<InvestigationReport>, panels: DisclosurePanels) -> Self {
        Self { report, panels }
    }
}
