//! Investigation session
//!
//! Owns everything one investigation needs:
//! - the evidence queue the user fills before starting
//! - the pipeline engine that simulates the analysis
//! - the aggregator that produces the report on completion
//! - the navigator that hears about the three transition points
//!
//! # Workflow
//! 1. `add_evidence` any number of times
//! 2. `start_investigation` snapshots the queue and starts the engine
//! 3. on Done the aggregator runs against the snapshot, the report is stored
//!    and `PipelineDone` is signalled
//! 4. `open_report_view` hands the report out with fresh panel state
//! 5. `new_investigation` tears everything back down to an empty dashboard

use crate::config::LensConfig;
use crate::error::LensError;
use crate::navigation::{NavigationSignal, Navigator, NullNavigator};
use crate::types::{ReportView, SessionId};
use chrono::{DateTime, Utc};
use lens_evidence::{EvidenceItem, EvidenceQueue, FileHandle};
use lens_pipeline::{
    CurrentStage, PipelineEngine, RunOutcome, RunSnapshot, RunStatus, Schedule, StageWork,
};
use lens_report::{
    render_markdown, CheckedAggregator, DisclosurePanels, InvestigationReport, ReportError,
    ResultAggregator, StaticAggregator,
};
use std::sync::Arc;
use tokio::sync::watch;

/// Where the current run's report stands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportState {
    /// No report yet for the current run
    Pending,
    Ready(Arc<InvestigationReport>),
    /// The aggregator's output broke the report contract
    Rejected(ReportError),
}

impl ReportState {
    fn resolved(&self) -> Option<Result<Arc<InvestigationReport>, LensError>> {
        match self {
            Self::Pending => None,
            Self::Ready(report) => Some(Ok(Arc::clone(report))),
            Self::Rejected(e) => Some(Err(LensError::Report(e.clone()))),
        }
    }
}

/// One user's investigation, from evidence intake to report view
pub struct InvestigationSession {
    id: SessionId,
    config: LensConfig,
    schedule: Schedule,
    evidence: EvidenceQueue,
    engine: PipelineEngine,
    aggregator: Arc<dyn ResultAggregator>,
    navigator: Arc<dyn Navigator>,
    reports: Arc<watch::Sender<ReportState>>,
    started_at: Option<DateTime<Utc>>,
}

impl InvestigationSession {
    /// Create a session with the canned aggregator and no navigator
    ///
    /// # Errors
    /// `LensError::Config` if the configured schedule is invalid.
    pub fn new(config: LensConfig) -> Result<Self, LensError> {
        let schedule = config.schedule()?;
        let engine = PipelineEngine::new(config.settle_delay());
        let aggregator = checked(StaticAggregator::canned(), &config);
        let (reports, _) = watch::channel(ReportState::Pending);

        Ok(Self {
            id: SessionId::new(),
            config,
            schedule,
            evidence: EvidenceQueue::new(),
            engine,
            aggregator,
            navigator: Arc::new(NullNavigator),
            reports: Arc::new(reports),
            started_at: None,
        })
    }

    /// With a custom aggregator; the report contract is still enforced
    #[must_use]
    pub fn with_aggregator<A>(mut self, aggregator: A) -> Self
    where
        A: ResultAggregator + 'static,
    {
        self.aggregator = checked(aggregator, &self.config);
        self
    }

    /// With the navigation collaborator
    #[must_use]
    pub fn with_navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = navigator;
        self
    }

    /// With custom stage work in place of simulated delays
    #[must_use]
    pub fn with_stage_work(mut self, work: Arc<dyn StageWork>) -> Self {
        self.engine = PipelineEngine::with_work(self.config.settle_delay(), work);
        self
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &LensConfig {
        &self.config
    }

    #[inline]
    #[must_use]
    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    #[inline]
    #[must_use]
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// Queue artifacts from the file intake collaborator
    pub fn add_evidence<I>(&mut self, handles: I)
    where
        I: IntoIterator,
        I::Item: FileHandle,
    {
        self.evidence.add(handles);
    }

    #[inline]
    #[must_use]
    pub fn evidence(&self) -> &[EvidenceItem] {
        self.evidence.list()
    }

    /// Start the pipeline over the queued evidence
    ///
    /// # Errors
    /// - `NoEvidence` if nothing is queued
    /// - `Pipeline(DoubleStart)` if a run is still live
    /// - `Pipeline(NoRuntime)` outside a tokio runtime
    pub fn start_investigation(&mut self) -> Result<(), LensError> {
        if self.evidence.is_empty() {
            return Err(LensError::NoEvidence);
        }
        if self.engine.status().is_live() {
            return Err(LensError::Pipeline(lens_pipeline::PipelineError::DoubleStart));
        }

        let snapshot = self.evidence.snapshot();
        self.reports.send_replace(ReportState::Pending);

        let aggregator = Arc::clone(&self.aggregator);
        let navigator = Arc::clone(&self.navigator);
        let reports = Arc::clone(&self.reports);
        let session = self.id;
        self.engine.on_done(move |summary| {
            match aggregator.produce(&snapshot) {
                Ok(report) => {
                    tracing::info!(
                        %session,
                        causes = report.ranked_causes().len(),
                        confidence = report.overall_confidence().value(),
                        stages = summary.stages_completed,
                        "report ready"
                    );
                    reports.send_replace(ReportState::Ready(Arc::new(report)));
                    navigator.signal(NavigationSignal::PipelineDone);
                }
                Err(e) => {
                    tracing::warn!(%session, error = %e, "report rejected");
                    reports.send_replace(ReportState::Rejected(e));
                }
            }
        })?;

        if let Err(e) = self.engine.start_schedule(self.schedule.clone()) {
            self.engine.reset();
            return Err(e.into());
        }

        self.started_at = Some(Utc::now());
        tracing::info!(
            session = %self.id,
            evidence = self.evidence.len(),
            bytes = self.evidence.total_bytes(),
            "investigation started"
        );
        self.navigator.signal(NavigationSignal::StartRequested);
        Ok(())
    }

    /// Tear down a live run, e.g. when the host navigates away
    ///
    /// Returns `true` if a run was cancelled.
    pub fn cancel(&self) -> bool {
        self.engine.cancel()
    }

    /// Reset to an empty dashboard: cancel, clear evidence, drop the report
    pub fn new_investigation(&mut self) {
        self.engine.reset();
        self.evidence.clear();
        self.reports.send_replace(ReportState::Pending);
        self.started_at = None;
        tracing::info!(session = %self.id, "new investigation requested");
        self.navigator
            .signal(NavigationSignal::NewInvestigationRequested);
    }

    #[must_use]
    pub fn status(&self) -> RunStatus {
        self.engine.status()
    }

    #[must_use]
    pub fn current_stage(&self) -> Option<CurrentStage> {
        self.engine.current_stage()
    }

    #[must_use]
    pub fn is_stage_complete(&self, index: usize) -> bool {
        self.engine.is_complete(index)
    }

    #[must_use]
    pub fn progress(&self) -> RunSnapshot {
        self.engine.snapshot()
    }

    /// Progress updates for the presentation collaborator
    #[must_use]
    pub fn subscribe_progress(&self) -> watch::Receiver<RunSnapshot> {
        self.engine.subscribe()
    }

    #[must_use]
    pub fn report_state(&self) -> ReportState {
        self.reports.borrow().clone()
    }

    /// Report of the last completed run, if any
    #[must_use]
    pub fn report(&self) -> Option<Arc<InvestigationReport>> {
        match &*self.reports.borrow() {
            ReportState::Ready(report) => Some(Arc::clone(report)),
            ReportState::Pending | ReportState::Rejected(_) => None,
        }
    }

    /// Wait for the current run's report
    ///
    /// # Errors
    /// - `NoReport` if no run was started, or the run was cancelled or failed
    /// - `Report` if the aggregator's output was rejected
    pub async fn wait_for_report(&self) -> Result<Arc<InvestigationReport>, LensError> {
        let mut reports = self.reports.subscribe();
        let mut runs = self.engine.subscribe();
        loop {
            if let Some(result) = reports.borrow_and_update().resolved() {
                return result;
            }
            let run = runs.borrow_and_update().clone();
            match (run.status, run.outcome()) {
                (RunStatus::Idle, _) => {
                    return Err(LensError::NoReport(
                        "no investigation has been started".to_string(),
                    ))
                }
                (_, Some(RunOutcome::Cancelled)) => {
                    return Err(LensError::NoReport("investigation was cancelled".to_string()))
                }
                (_, Some(RunOutcome::Failed { stage, failure })) => {
                    return Err(LensError::NoReport(format!(
                        "stage {stage} failed: {failure}"
                    )))
                }
                _ => {}
            }
            tokio::select! {
                changed = reports.changed() => if changed.is_err() {
                    return Err(LensError::NoReport("session closed".to_string()));
                },
                changed = runs.changed() => if changed.is_err() {
                    return Err(LensError::NoReport("pipeline closed".to_string()));
                },
            }
        }
    }

    /// A new report view with the configured default panels
    #[must_use]
    pub fn open_report_view(&self) -> Option<ReportView> {
        self.report().map(|report| {
            ReportView::new(
                report,
                DisclosurePanels::new(&self.config.default_open_sections),
            )
        })
    }

    /// Markdown export of the current report
    #[must_use]
    pub fn export_markdown(&self) -> Option<String> {
        let report = self.report()?;
        let heading = match self.started_at {
            Some(at) => format!(
                "Investigation Results ({})",
                at.format("%Y-%m-%d %H:%M UTC")
            ),
            None => "Investigation Results".to_string(),
        };
        Some(render_markdown(&report, &heading))
    }
}

impl std::fmt::Debug for InvestigationSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvestigationSession")
            .field("id", &self.id)
            .field("evidence", &self.evidence.len())
            .field("engine", &self.engine)
            .field("started_at", &self.started_at)
            .finish_non_exhaustive()
    }
}

fn checked<A>(aggregator: A, config: &LensConfig) -> Arc<dyn ResultAggregator>
where
    A: ResultAggregator + 'static,
{
    Arc::new(
        CheckedAggregator::new(aggregator)
            .with_strict_references(config.strict_evidence_references),
    )
}
