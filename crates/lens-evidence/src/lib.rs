//! IncidentLens Evidence Intake
//!
//! Holds the artifacts a user selects before an investigation starts.
//!
//! - [`EvidenceQueue`]: ordered, append-only, no deduplication
//! - [`EvidenceItem`]: name, size and inferred [`EvidenceKind`]
//! - [`FileHandle`]: what the file intake collaborator supplies
//!
//! # Example
//!
//! ```rust
//! use lens_evidence::{EvidenceKind, EvidenceQueue, RawFile};
//!
//! let mut queue = EvidenceQueue::new();
//! queue.add([RawFile::new("api-gateway-2026-02-14.txt", 2048)]);
//! queue.add([RawFile::new("grafana-overview.png", 40_960)]);
//!
//! assert_eq!(queue.len(), 2);
//! assert_eq!(queue.list()[1].kind(), EvidenceKind::Screenshot);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod item;
mod kind;
mod queue;

pub use item::{EvidenceItem, FileHandle, RawFile};
pub use kind::{EvidenceKind, ACCEPTED_EXTENSIONS};
pub use queue::EvidenceQueue;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
