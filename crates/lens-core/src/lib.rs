//! IncidentLens Core
//!
//! Wires evidence intake, the staged pipeline and the report contract into
//! one investigation session.
//!
//! # Architecture
//!
//! ```text
//! file intake ──► EvidenceQueue ──snapshot──► ResultAggregator ──► InvestigationReport
//!                      │                            ▲                    │
//!              start_investigation                 Done           open_report_view
//!                      ▼                            │                    ▼
//!                PipelineEngine ──progress──► presentation        DisclosurePanels
//! ```
//!
//! The session never routes. It emits a [`NavigationSignal`] at each
//! transition point and leaves the rest to the host.
//!
//! # Example
//!
//! ```rust,ignore
//! use lens_core::prelude::*;
//! use lens_evidence::RawFile;
//!
//! let mut session = InvestigationSession::new(LensConfig::default())?;
//! session.add_evidence([RawFile::new("api-gateway-2026-02-14.txt", 2048)]);
//! session.start_investigation()?;
//!
//! let report = session.wait_for_report().await?;
//! println!("{}", report.summary());
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod config;
pub mod error;
pub mod navigation;
pub mod session;
pub mod types;

pub use config::LensConfig;
pub use error::{ConfigError, LensError};
pub use navigation::{ChannelNavigator, NavigationSignal, Navigator, NullNavigator};
pub use session::{InvestigationSession, ReportState};
pub use types::{ReportView, SessionId};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::{
        InvestigationSession, LensConfig, LensError, NavigationSignal, Navigator, ReportView,
        SessionId,
    };
    pub use lens_report::{InvestigationReport, SectionId};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
