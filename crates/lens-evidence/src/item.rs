//! Evidence items and the file handles they are derived from

use crate::kind::EvidenceKind;
use serde::{Deserialize, Serialize};

/// Anything the file intake collaborator can hand to the queue
///
/// The queue never reads contents; only the name and size are taken.
pub trait FileHandle {
    /// File name as presented to the user (no directory component)
    fn name(&self) -> &str;

    /// Size in bytes
    fn size_bytes(&self) -> u64;
}

/// Plain in-memory file handle
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RawFile {
    pub name: String,
    pub size_bytes: u64,
}

impl RawFile {
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            name: name.into(),
            size_bytes,
        }
    }
}

impl FileHandle for RawFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn size_bytes(&self) -> u64 {
        self.size_bytes
    }
}

impl<H: FileHandle + ?Sized> FileHandle for &H {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn size_bytes(&self) -> u64 {
        (**self).size_bytes()
    }
}

/// One user-supplied artifact awaiting pipeline start
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EvidenceItem {
    name: String,
    size_bytes: u64,
    kind: EvidenceKind,
}

impl EvidenceItem {
    /// Build an item, inferring its kind from the name
    #[must_use]
    pub fn new(name: impl Into<String>, size_bytes: u64) -> Self {
        let name = name.into();
        let kind = EvidenceKind::from_name(&name);
        Self {
            name,
            size_bytes,
            kind,
        }
    }

    /// Derive an item from a file handle
    #[must_use]
    pub fn from_handle<H: FileHandle + ?Sized>(handle: &H) -> Self {
        Self::new(handle.name(), handle.size_bytes())
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    #[must_use]
    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    #[inline]
    #[must_use]
    pub fn kind(&self) -> EvidenceKind {
        self.kind
    }

    /// Size formatted the way the upload list shows it, e.g. `2.0KB`
    #[must_use]
    pub fn display_size(&self) -> String {
        #[allow(clippy::cast_precision_loss)]
        let kib = self.size_bytes as f64 / 1024.0;
        format!("{kib:.1}KB")
    }
}

impl std::fmt::Display for EvidenceItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}, {})", self.name, self.kind, self.display_size())
    }
}
