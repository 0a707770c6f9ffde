//! Evidence queue
//!
//! Accumulates artifacts in insertion order until an investigation starts.
//! Every add appends: the same file dropped twice shows up twice.

use crate::item::{EvidenceItem, FileHandle};

/// Ordered, append-only collection of evidence for one session
#[derive(Debug, Clone, Default)]
pub struct EvidenceQueue {
    items: Vec<EvidenceItem>,
}

impl EvidenceQueue {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the item derived from each handle, in order
    pub fn add<I>(&mut self, handles: I)
    where
        I: IntoIterator,
        I::Item: FileHandle,
    {
        let before = self.items.len();
        self.items
            .extend(handles.into_iter().map(|h| EvidenceItem::from_handle(&h)));
        tracing::debug!(
            added = self.items.len() - before,
            total = self.items.len(),
            "evidence queued"
        );
    }

    /// Read-only view of the queued items
    #[inline]
    #[must_use]
    pub fn list(&self) -> &[EvidenceItem] {
        &self.items
    }

    /// Owned copy of the queue, taken when a run starts
    #[must_use]
    pub fn snapshot(&self) -> Vec<EvidenceItem> {
        self.items.clone()
    }

    pub fn clear(&mut self) {
        if !self.items.is_empty() {
            tracing::debug!(dropped = self.items.len(), "evidence queue cleared");
        }
        self.items.clear();
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn total_bytes(&self) -> u64 {
        self.items.iter().map(EvidenceItem::size_bytes).sum()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(EvidenceItem::name)
    }
}
