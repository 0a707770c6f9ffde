//! Evidence kind inference
//!
//! The kind of an artifact is derived from its file extension only. The
//! accepted list mirrors what the intake picker advertises; it is advisory
//! and nothing rejects an [`EvidenceKind::Other`] artifact.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Extensions the intake picker advertises
pub const ACCEPTED_EXTENSIONS: &[&str] = &["txt", "pdf", "png", "jpg", "jpeg", "log", "csv"];

/// Broad category of a user-supplied artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceKind {
    /// Application or system logs (`.txt`, `.log`)
    Log,
    /// Tabular metric exports (`.csv`)
    Metrics,
    /// Runbooks and other documents (`.pdf`)
    Runbook,
    /// Dashboard screenshots (`.png`, `.jpg`, `.jpeg`)
    Screenshot,
    /// Anything else, including names without an extension
    Other,
}

impl EvidenceKind {
    /// Infer the kind from a file name
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map_or(Self::Other, Self::from_extension)
    }

    /// Infer the kind from a bare extension (no leading dot)
    #[must_use]
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "txt" | "log" => Self::Log,
            "csv" => Self::Metrics,
            "pdf" => Self::Runbook,
            "png" | "jpg" | "jpeg" => Self::Screenshot,
            _ => Self::Other,
        }
    }

    /// Whether the picker advertises this kind
    #[inline]
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        !matches!(self, Self::Other)
    }

    /// Human label used in upload hints
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Log => "Logs",
            Self::Metrics => "Metrics export",
            Self::Runbook => "Runbooks",
            Self::Screenshot => "Screenshots",
            Self::Other => "Other",
        }
    }
}

impl std::fmt::Display for EvidenceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infers_known_extensions() {
        assert_eq!(EvidenceKind::from_name("api-gateway.txt"), EvidenceKind::Log);
        assert_eq!(EvidenceKind::from_name("worker.log"), EvidenceKind::Log);
        assert_eq!(EvidenceKind::from_name("latency.csv"), EvidenceKind::Metrics);
        assert_eq!(EvidenceKind::from_name("runbook.pdf"), EvidenceKind::Runbook);
        assert_eq!(EvidenceKind::from_name("grafana.png"), EvidenceKind::Screenshot);
        assert_eq!(EvidenceKind::from_name("photo.JPEG"), EvidenceKind::Screenshot);
    }

    #[test]
    fn unknown_or_missing_extension_is_other() {
        assert_eq!(EvidenceKind::from_name("core.dump"), EvidenceKind::Other);
        assert_eq!(EvidenceKind::from_name("Makefile"), EvidenceKind::Other);
        assert_eq!(EvidenceKind::from_name(".hidden"), EvidenceKind::Other);
        assert!(!EvidenceKind::Other.is_accepted());
    }

    #[test]
    fn accepted_list_maps_to_accepted_kinds() {
        for ext in ACCEPTED_EXTENSIONS {
            assert!(EvidenceKind::from_extension(ext).is_accepted(), "{ext}");
        }
    }
}
