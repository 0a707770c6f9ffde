//! Navigation signals
//!
//! The core does not route. It tells a [`Navigator`] when one of the three
//! transition points is reached and the host decides what that means.

use serde::{Deserialize, Serialize};

/// Transition points the session reports to its host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationSignal {
    /// Evidence is queued and the run has been asked to start
    StartRequested,
    /// The pipeline reached Done and the report is ready
    PipelineDone,
    /// The user asked for a fresh investigation
    NewInvestigationRequested,
}

impl NavigationSignal {
    /// Page the web host shows for this signal
    #[must_use]
    pub fn route(self) -> &'static str {
        match self {
            Self::StartRequested => "/processing",
            Self::PipelineDone => "/results",
            Self::NewInvestigationRequested => "/dashboard",
        }
    }
}

impl std::fmt::Display for NavigationSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::StartRequested => "start requested",
            Self::PipelineDone => "pipeline done",
            Self::NewInvestigationRequested => "new investigation requested",
        };
        f.write_str(name)
    }
}

/// Receives navigation signals
///
/// `PipelineDone` is delivered from the pipeline's driver task, so
/// implementations must not block.
pub trait Navigator: Send + Sync {
    fn signal(&self, signal: NavigationSignal);
}

/// Drops every signal; for hosts that poll instead
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNavigator;

impl Navigator for NullNavigator {
    fn signal(&self, _signal: NavigationSignal) {}
}

/// Forwards signals into a tokio channel
#[derive(Debug, Clone)]
pub struct ChannelNavigator {
    sender: tokio::sync::mpsc::UnboundedSender<NavigationSignal>,
}

impl ChannelNavigator {
    #[must_use]
    pub fn new() -> (Self, tokio::sync::mpsc::UnboundedReceiver<NavigationSignal>) {
        let (sender, receiver) = tokio::sync::mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl Navigator for ChannelNavigator {
    fn signal(&self, signal: NavigationSignal) {
        if self.sender.send(signal).is_err() {
            tracing::debug!(%signal, "navigation receiver dropped");
        }
    }
}
