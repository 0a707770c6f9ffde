//! Step Pipeline Engine
//!
//! Drives one run through a [`Schedule`]: stages execute strictly in order,
//! one at a time, then the run settles for a fixed delay and reports Done.
//!
//! # Ordering
//!
//! All run state sits behind one mutex. The driver task re-checks the run
//! generation under that lock before every transition, so a cancelled or
//! superseded driver can never move the state or fire the callback even if
//! it wakes before its abort lands.
//!
//! # Example
//!
//! ```rust,ignore
//! let engine = PipelineEngine::default();
//! engine.on_done(|summary| println!("done in {:?}", summary.elapsed))?;
//! engine.start(&default_stages())?;
//! let outcome = engine.wait().await;
//! ```

use crate::error::{PipelineError, StageFailure};
use crate::schedule::{Schedule, StageDefinition, DEFAULT_SETTLE_DELAY};
use crate::state::{validate_transition, RunStatus};
use crate::work::{SimulatedWork, StageWork};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::Instrument;

/// Completion callback, invoked at most once per run
pub type DoneCallback = Box<dyn FnOnce(RunSummary) + Send + 'static>;

/// Stage currently occupying the pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentStage {
    pub index: usize,
    pub label: String,
}

/// Timing of a completed run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub stages_completed: usize,
    /// Sum of the stage durations in the schedule
    pub scheduled: Duration,
    /// Wall time from start to Done, settle delay included
    pub elapsed: Duration,
}

/// Terminal result of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Done(RunSummary),
    Cancelled,
    Failed { stage: usize, failure: StageFailure },
}

/// Observable state published on every transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSnapshot {
    pub status: RunStatus,
    /// Number of finished stages; equals `stage_count` once Settling
    pub current_index: usize,
    pub stage_count: usize,
    pub summary: Option<RunSummary>,
    pub failure: Option<(usize, StageFailure)>,
    /// Bumped on every start and cancel
    pub generation: u64,
}

impl RunSnapshot {
    fn idle() -> Self {
        Self {
            generation: 0,
            status: RunStatus::Idle,
            current_index: 0,
            stage_count: 0,
            summary: None,
            failure: None,
        }
    }

    /// Whether stage `index` has finished
    #[inline]
    #[must_use]
    pub fn is_complete(&self, index: usize) -> bool {
        index < self.current_index
    }

    /// Whether stage `index` is the one currently executing
    #[inline]
    #[must_use]
    pub fn is_active(&self, index: usize) -> bool {
        self.status == RunStatus::Running && index == self.current_index
    }

    /// Terminal outcome, if the run has reached one
    #[must_use]
    pub fn outcome(&self) -> Option<RunOutcome> {
        match self.status {
            RunStatus::Done => self.summary.clone().map(RunOutcome::Done),
            RunStatus::Cancelled => Some(RunOutcome::Cancelled),
            RunStatus::Failed => self
                .failure
                .clone()
                .map(|(stage, failure)| RunOutcome::Failed { stage, failure }),
            RunStatus::Idle | RunStatus::Running | RunStatus::Settling => None,
        }
    }
}

struct RunState {
    schedule: Option<Schedule>,
    current_index: usize,
    status: RunStatus,
    generation: u64,
    started_at: Option<Instant>,
    on_done: Option<DoneCallback>,
    last_summary: Option<RunSummary>,
    failure: Option<(usize, StageFailure)>,
    driver: Option<JoinHandle<()>>,
}

impl RunState {
    fn snapshot(&self) -> RunSnapshot {
        RunSnapshot {
            status: self.status,
            current_index: self.current_index,
            stage_count: self.schedule.as_ref().map_or(0, Schedule::len),
            summary: self.last_summary.clone(),
            failure: self.failure.clone(),
            generation: self.generation,
        }
    }

    fn owns(&self, generation: u64, status: RunStatus) -> bool {
        self.generation == generation && self.status == status
    }
}

struct Inner {
    state: Mutex<RunState>,
    settle_delay: Duration,
    work: Arc<dyn StageWork>,
    snapshots: watch::Sender<RunSnapshot>,
}

impl Inner {
    fn publish(&self, state: &RunState) {
        self.snapshots.send_replace(state.snapshot());
    }

    /// Record that stage `index` finished; false if this driver is stale
    fn advance(&self, generation: u64, index: usize) -> bool {
        let mut state = self.state.lock();
        if !state.owns(generation, RunStatus::Running) {
            return false;
        }
        let count = state.schedule.as_ref().map_or(0, Schedule::len);
        let next = if index + 1 < count {
            RunStatus::Running
        } else {
            RunStatus::Settling
        };
        if let Err(e) = validate_transition(state.status, next) {
            tracing::error!("{e}");
            return false;
        }
        state.current_index = index + 1;
        state.status = next;
        match next {
            RunStatus::Running => tracing::debug!(stage = index + 1, "stage advanced"),
            _ => tracing::debug!("all stages complete, settling"),
        }
        self.publish(&state);
        true
    }

    fn finish(&self, generation: u64) {
        let (callback, summary) = {
            let mut state = self.state.lock();
            if !state.owns(generation, RunStatus::Settling) {
                return;
            }
            if let Err(e) = validate_transition(state.status, RunStatus::Done) {
                tracing::error!("{e}");
                return;
            }
            let scheduled = state
                .schedule
                .as_ref()
                .map(Schedule::total_duration)
                .unwrap_or_default();
            let summary = RunSummary {
                stages_completed: state.current_index,
                scheduled,
                elapsed: state.started_at.map(|t| t.elapsed()).unwrap_or_default(),
            };
            state.status = RunStatus::Done;
            state.last_summary = Some(summary.clone());
            state.driver = None;
            self.publish(&state);
            (state.on_done.take(), summary)
        };

        tracing::info!(
            stages = summary.stages_completed,
            elapsed_ms = u64::try_from(summary.elapsed.as_millis()).unwrap_or(u64::MAX),
            "pipeline done"
        );
        if let Some(callback) = callback {
            callback(summary);
        }
    }

    fn fail(&self, generation: u64, index: usize, failure: StageFailure) {
        let mut state = self.state.lock();
        if !state.owns(generation, RunStatus::Running) {
            return;
        }
        if let Err(e) = validate_transition(state.status, RunStatus::Failed) {
            tracing::error!("{e}");
            return;
        }
        tracing::error!(stage = index, reason = %failure, "stage failed");
        state.status = RunStatus::Failed;
        state.failure = Some((index, failure));
        state.on_done = None;
        state.driver = None;
        self.publish(&state);
    }
}

async fn drive(inner: Arc<Inner>, schedule: Schedule, generation: u64) {
    for (index, stage) in schedule.iter().enumerate() {
        tracing::debug!(stage = index, label = stage.label(), "stage started");
        if let Err(failure) = inner.work.run(index, stage).await {
            inner.fail(generation, index, failure);
            return;
        }
        if !inner.advance(generation, index) {
            return;
        }
    }
    tokio::time::sleep(inner.settle_delay).await;
    inner.finish(generation);
}

/// Sequential, cancellable staged pipeline
///
/// One engine drives at most one run at a time. Dropping the engine cancels
/// any live run.
pub struct PipelineEngine {
    inner: Arc<Inner>,
}

impl PipelineEngine {
    /// Create an engine that simulates each stage by sleeping
    #[must_use]
    pub fn new(settle_delay: Duration) -> Self {
        Self::with_work(settle_delay, Arc::new(SimulatedWork))
    }

    /// Create with custom stage work
    #[must_use]
    pub fn with_work(settle_delay: Duration, work: Arc<dyn StageWork>) -> Self {
        let (snapshots, _) = watch::channel(RunSnapshot::idle());
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(RunState {
                    schedule: None,
                    current_index: 0,
                    status: RunStatus::Idle,
                    generation: 0,
                    started_at: None,
                    on_done: None,
                    last_summary: None,
                    failure: None,
                    driver: None,
                }),
                settle_delay,
                work,
                snapshots,
            }),
        }
    }

    #[inline]
    #[must_use]
    pub fn settle_delay(&self) -> Duration {
        self.inner.settle_delay
    }

    /// Start a run over `stages`
    ///
    /// # Errors
    /// - `InvalidSchedule` if `stages` is empty or has a zero-duration stage;
    ///   the engine state is left untouched
    /// - `DoubleStart` if a run is Running or Settling
    /// - `NoRuntime` if called outside a tokio runtime
    pub fn start(&self, stages: &[StageDefinition]) -> Result<(), PipelineError> {
        let schedule = Schedule::new(stages.to_vec())?;
        self.start_schedule(schedule)
    }

    /// Start a run over an already validated schedule
    ///
    /// # Errors
    /// See [`PipelineEngine::start`].
    pub fn start_schedule(&self, schedule: Schedule) -> Result<(), PipelineError> {
        let runtime =
            tokio::runtime::Handle::try_current().map_err(|_| PipelineError::NoRuntime)?;

        let mut state = self.inner.state.lock();
        if state.status.is_live() {
            return Err(PipelineError::DoubleStart);
        }
        validate_transition(state.status, RunStatus::Running)?;

        state.generation += 1;
        let generation = state.generation;
        state.schedule = Some(schedule.clone());
        state.current_index = 0;
        state.status = RunStatus::Running;
        state.started_at = Some(Instant::now());
        state.last_summary = None;
        state.failure = None;
        self.inner.publish(&state);

        tracing::info!(
            stages = schedule.len(),
            scheduled_ms = u64::try_from(schedule.total_duration().as_millis()).unwrap_or(u64::MAX),
            "pipeline started"
        );

        let span = tracing::info_span!("pipeline_run", generation);
        let inner = Arc::clone(&self.inner);
        state.driver = Some(runtime.spawn(drive(inner, schedule, generation).instrument(span)));
        Ok(())
    }

    /// Register the completion callback for the current or next run
    ///
    /// The callback fires on the next transition into Done. On an engine that
    /// already sits in a terminal state it waits for the following run.
    ///
    /// # Errors
    /// `CallbackAlreadyRegistered` if a callback is already waiting.
    pub fn on_done<F>(&self, callback: F) -> Result<(), PipelineError>
    where
        F: FnOnce(RunSummary) + Send + 'static,
    {
        let mut state = self.inner.state.lock();
        if state.on_done.is_some() {
            return Err(PipelineError::CallbackAlreadyRegistered);
        }
        state.on_done = Some(Box::new(callback));
        Ok(())
    }

    /// Stop a live run without invoking the completion callback
    ///
    /// Returns `true` if a run was cancelled. Once this returns no further
    /// transitions or callbacks happen for that run.
    pub fn cancel(&self) -> bool {
        let mut state = self.inner.state.lock();
        if !state.status.is_live() {
            return false;
        }
        if validate_transition(state.status, RunStatus::Cancelled).is_err() {
            return false;
        }
        state.generation += 1;
        state.status = RunStatus::Cancelled;
        state.on_done = None;
        if let Some(driver) = state.driver.take() {
            driver.abort();
        }
        tracing::warn!(finished = state.current_index, "pipeline cancelled");
        self.inner.publish(&state);
        true
    }

    /// Return to Idle, cancelling a live run first
    pub fn reset(&self) {
        self.cancel();
        let mut state = self.inner.state.lock();
        if state.status == RunStatus::Idle {
            state.on_done = None;
            return;
        }
        if let Err(e) = validate_transition(state.status, RunStatus::Idle) {
            tracing::error!("{e}");
            return;
        }
        state.schedule = None;
        state.current_index = 0;
        state.status = RunStatus::Idle;
        state.started_at = None;
        state.on_done = None;
        state.last_summary = None;
        state.failure = None;
        tracing::debug!("pipeline reset");
        self.inner.publish(&state);
    }

    /// Active stage while Running, last stage while Settling
    #[must_use]
    pub fn current_stage(&self) -> Option<CurrentStage> {
        let state = self.inner.state.lock();
        let schedule = state.schedule.as_ref()?;
        let index = match state.status {
            RunStatus::Running => state.current_index,
            RunStatus::Settling => schedule.len().checked_sub(1)?,
            _ => return None,
        };
        schedule.get(index).map(|stage| CurrentStage {
            index,
            label: stage.label.clone(),
        })
    }

    /// Whether stage `index` has finished in the current run
    #[must_use]
    pub fn is_complete(&self, index: usize) -> bool {
        index < self.inner.state.lock().current_index
    }

    #[must_use]
    pub fn status(&self) -> RunStatus {
        self.inner.state.lock().status
    }

    #[must_use]
    pub fn snapshot(&self) -> RunSnapshot {
        self.inner.state.lock().snapshot()
    }

    /// Schedule of the current or last run
    #[must_use]
    pub fn schedule(&self) -> Option<Schedule> {
        self.inner.state.lock().schedule.clone()
    }

    /// Receive a snapshot on every transition
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<RunSnapshot> {
        self.inner.snapshots.subscribe()
    }

    /// Wait for the current run to reach a terminal state
    ///
    /// Resolves immediately if the engine already sits in one. On an Idle
    /// engine this waits for the next run to finish. A run that is cancelled,
    /// reset or superseded while being watched resolves as `Cancelled`.
    pub async fn wait(&self) -> RunOutcome {
        let mut rx = self.subscribe();
        let mut watched = None;
        loop {
            let snapshot = rx.borrow_and_update().clone();
            if watched.is_some_and(|generation| generation != snapshot.generation) {
                return RunOutcome::Cancelled;
            }
            if let Some(outcome) = snapshot.outcome() {
                return outcome;
            }
            if snapshot.status.is_live() {
                watched = Some(snapshot.generation);
            } else if watched.is_some() {
                return RunOutcome::Cancelled;
            }
            if rx.changed().await.is_err() {
                return RunOutcome::Cancelled;
            }
        }
    }
}

impl Default for PipelineEngine {
    fn default() -> Self {
        Self::new(DEFAULT_SETTLE_DELAY)
    }
}

impl Drop for PipelineEngine {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl std::fmt::Debug for PipelineEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineEngine")
            .field("settle_delay", &self.inner.settle_delay)
            .field("snapshot", &self.snapshot())
            .finish_non_exhaustive()
    }
}
