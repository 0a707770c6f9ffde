//! Disclosure panels
//!
//! Each report section is a collapsible panel with its own open/closed flag.
//! Panels are independent: opening one never closes another. One
//! [`DisclosurePanels`] belongs to one report view.

use crate::error::ReportError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Report sections, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SectionId {
    #[serde(rename = "summary")]
    Summary,
    #[serde(rename = "symptoms")]
    Symptoms,
    #[serde(rename = "evidence")]
    EvidenceUsed,
    #[serde(rename = "causes")]
    RankedCauses,
    #[serde(rename = "remediation")]
    Remediation,
    #[serde(rename = "draft")]
    ReportDraft,
}

impl SectionId {
    pub const ALL: [SectionId; 6] = [
        SectionId::Summary,
        SectionId::Symptoms,
        SectionId::EvidenceUsed,
        SectionId::RankedCauses,
        SectionId::Remediation,
        SectionId::ReportDraft,
    ];

    /// Stable key used in configuration and on the command line
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::Summary => "summary",
            Self::Symptoms => "symptoms",
            Self::EvidenceUsed => "evidence",
            Self::RankedCauses => "causes",
            Self::Remediation => "remediation",
            Self::ReportDraft => "draft",
        }
    }

    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Summary => "Incident Summary",
            Self::Symptoms => "Observed Symptoms",
            Self::EvidenceUsed => "Evidence Used",
            Self::RankedCauses => "Ranked Root Causes",
            Self::Remediation => "Recommended Remediation Steps",
            Self::ReportDraft => "Post-Incident Report Draft",
        }
    }
}

impl FromStr for SectionId {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|id| id.key().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ReportError::UnknownSection(s.to_string()))
    }
}

impl std::fmt::Display for SectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Only the summary starts expanded
pub const DEFAULT_OPEN_SECTIONS: &[SectionId] = &[SectionId::Summary];

/// Open/closed state of every section in one report view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisclosurePanels {
    open: IndexMap<SectionId, bool>,
}

impl DisclosurePanels {
    /// Every section closed except those in `default_open`
    #[must_use]
    pub fn new(default_open: &[SectionId]) -> Self {
        let open = SectionId::ALL
            .into_iter()
            .map(|id| (id, default_open.contains(&id)))
            .collect();
        Self { open }
    }

    /// Flip one section; returns its new state
    pub fn toggle(&mut self, id: SectionId) -> bool {
        let flag = self.open.entry(id).or_insert(false);
        *flag = !*flag;
        tracing::trace!(section = %id, open = *flag, "panel toggled");
        *flag
    }

    #[must_use]
    pub fn is_open(&self, id: SectionId) -> bool {
        self.open.get(&id).copied().unwrap_or(false)
    }

    /// Open sections in display order
    pub fn open_sections(&self) -> impl Iterator<Item = SectionId> + '_ {
        self.open
            .iter()
            .filter(|(_, open)| **open)
            .map(|(id, _)| *id)
    }

    /// Every section with its state, in display order
    pub fn iter(&self) -> impl Iterator<Item = (SectionId, bool)> + '_ {
        self.open.iter().map(|(id, open)| (*id, *open))
    }
}

impl Default for DisclosurePanels {
    fn default() -> Self {
        Self::new(DEFAULT_OPEN_SECTIONS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_is_open_by_default() {
        let panels = DisclosurePanels::default();
        assert!(panels.is_open(SectionId::Summary));
        assert_eq!(panels.open_sections().collect::<Vec<_>>(), vec![SectionId::Summary]);
    }

    #[test]
    fn double_toggle_restores_state() {
        let mut panels = DisclosurePanels::default();
        let summary: SectionId = "summary".parse().unwrap();

        let original = panels.is_open(summary);
        assert_eq!(panels.toggle(summary), !original);
        panels.toggle(summary);
        assert_eq!(panels.is_open(summary), original);
    }

    #[test]
    fn panels_are_independent() {
        let mut panels = DisclosurePanels::default();
        panels.toggle(SectionId::RankedCauses);
        panels.toggle(SectionId::Remediation);

        assert!(panels.is_open(SectionId::Summary));
        assert!(panels.is_open(SectionId::RankedCauses));
        assert!(panels.is_open(SectionId::Remediation));
        assert!(!panels.is_open(SectionId::Symptoms));
    }

    #[test]
    fn section_keys_round_trip_through_parse() {
        for id in SectionId::ALL {
            assert_eq!(id.key().parse::<SectionId>().unwrap(), id);
        }
        assert_eq!(
            "timeline".parse::<SectionId>(),
            Err(ReportError::UnknownSection("timeline".to_string()))
        );
    }

    #[test]
    fn configured_defaults_are_honoured() {
        let panels = DisclosurePanels::new(&[SectionId::Symptoms, SectionId::ReportDraft]);
        assert!(!panels.is_open(SectionId::Summary));
        assert_eq!(
            panels.open_sections().collect::<Vec<_>>(),
            vec![SectionId::Symptoms, SectionId::ReportDraft]
        );
    }
}
