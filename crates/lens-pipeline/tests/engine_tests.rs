//! Pipeline engine timing tests
//!
//! All tests run on a paused tokio clock, so sleeps advance virtual time
//! deterministically.

use lens_pipeline::prelude::*;
use lens_pipeline::StageFailure;
use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

const SETTLE: Duration = Duration::from_millis(50);

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn two_stage() -> Vec<StageDefinition> {
    vec![
        StageDefinition::new("Parsing logs", 100),
        StageDefinition::new("Ranking", 100),
    ]
}

fn counting_engine() -> (PipelineEngine, Arc<AtomicUsize>) {
    let engine = PipelineEngine::new(SETTLE);
    let fired = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&fired);
    engine
        .on_done(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
    (engine, fired)
}

fn stage(engine: &PipelineEngine) -> Option<(usize, String)> {
    engine.current_stage().map(|s| (s.index, s.label))
}

#[tokio::test(start_paused = true)]
async fn two_stage_run_advances_and_fires_once() {
    let (engine, fired) = counting_engine();
    engine.start(&two_stage()).unwrap();

    sleep(ms(50)).await;
    assert_eq!(stage(&engine), Some((0, "Parsing logs".to_string())));
    assert!(!engine.is_complete(0));

    sleep(ms(100)).await;
    assert_eq!(stage(&engine), Some((1, "Ranking".to_string())));
    assert!(engine.is_complete(0));
    assert!(!engine.is_complete(1));

    sleep(ms(60)).await;
    assert_eq!(engine.status(), RunStatus::Settling);
    assert_eq!(stage(&engine), Some((1, "Ranking".to_string())));
    assert!(engine.is_complete(1));
    assert_eq!(fired.load(Ordering::SeqCst), 0);

    sleep(SETTLE).await;
    assert_eq!(engine.status(), RunStatus::Done);
    assert_eq!(fired.load(Ordering::SeqCst), 1);
    assert_eq!(stage(&engine), None);

    sleep(ms(1_000)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn empty_schedule_is_rejected_and_engine_stays_idle() {
    let (engine, fired) = counting_engine();

    let err = engine.start(&[]).unwrap_err();
    assert!(matches!(err, PipelineError::InvalidSchedule(_)));
    assert_eq!(engine.status(), RunStatus::Idle);

    sleep(ms(1_000)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn second_start_while_running_is_rejected() {
    let (engine, fired) = counting_engine();
    engine.start(&two_stage()).unwrap();

    sleep(ms(120)).await;
    assert_eq!(engine.start(&two_stage()), Err(PipelineError::DoubleStart));
    assert_eq!(stage(&engine).map(|(i, _)| i), Some(1));

    sleep(ms(100)).await;
    assert_eq!(engine.status(), RunStatus::Settling);
    assert_eq!(engine.start(&two_stage()), Err(PipelineError::DoubleStart));

    sleep(ms(1_000)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn cancel_while_running_suppresses_callback() {
    let (engine, fired) = counting_engine();
    engine.start(&two_stage()).unwrap();

    sleep(ms(150)).await;
    assert!(engine.cancel());
    assert_eq!(engine.status(), RunStatus::Cancelled);
    let frozen = engine.snapshot().current_index;

    sleep(ms(2_000)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 0);
    assert_eq!(engine.status(), RunStatus::Cancelled);
    assert_eq!(engine.snapshot().current_index, frozen);
    assert_eq!(engine.wait().await, RunOutcome::Cancelled);
}

#[tokio::test(start_paused = true)]
async fn cancel_while_settling_suppresses_callback() {
    let (engine, fired) = counting_engine();
    engine.start(&two_stage()).unwrap();

    sleep(ms(220)).await;
    assert_eq!(engine.status(), RunStatus::Settling);
    assert!(engine.cancel());

    sleep(ms(2_000)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 0);
    assert_eq!(engine.status(), RunStatus::Cancelled);
}

#[tokio::test(start_paused = true)]
async fn cancel_after_done_is_a_no_op() {
    let (engine, fired) = counting_engine();
    engine.start(&two_stage()).unwrap();
    sleep(ms(400)).await;

    assert!(!engine.cancel());
    assert_eq!(engine.status(), RunStatus::Done);
    assert_eq!(fired.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn dropping_the_engine_cancels_the_run() {
    let (engine, fired) = counting_engine();
    engine.start(&two_stage()).unwrap();
    sleep(ms(50)).await;

    drop(engine);
    sleep(ms(2_000)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn callback_can_only_be_registered_once() {
    let (engine, _fired) = counting_engine();
    assert_eq!(
        engine.on_done(|_| {}),
        Err(PipelineError::CallbackAlreadyRegistered)
    );
}

#[tokio::test(start_paused = true)]
async fn registration_after_done_waits_for_the_next_run() {
    let engine = PipelineEngine::new(SETTLE);
    engine.start(&two_stage()).unwrap();
    sleep(ms(400)).await;
    assert_eq!(engine.status(), RunStatus::Done);

    let fired = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&fired);
    engine
        .on_done(move |summary| {
            assert_eq!(summary.stages_completed, 2);
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
    sleep(ms(1_000)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 0);

    engine.start(&two_stage()).unwrap();
    sleep(ms(400)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn wait_reports_summary_timing() {
    let engine = PipelineEngine::new(SETTLE);
    engine.start(&two_stage()).unwrap();

    let RunOutcome::Done(summary) = engine.wait().await else {
        panic!("run did not complete");
    };
    assert_eq!(summary.stages_completed, 2);
    assert_eq!(summary.scheduled, ms(200));
    assert!(summary.elapsed >= ms(250));
}

#[tokio::test(start_paused = true)]
async fn restart_after_done_runs_a_fresh_timeline() {
    let (engine, fired) = counting_engine();
    engine.start(&two_stage()).unwrap();
    sleep(ms(400)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 1);

    let again = Arc::clone(&fired);
    engine
        .on_done(move |_| {
            again.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
    assert_eq!(fired.load(Ordering::SeqCst), 1);

    engine.start(&two_stage()).unwrap();
    assert!(!engine.is_complete(0));
    assert_eq!(engine.snapshot().summary, None);

    sleep(ms(240)).await;
    assert_eq!(engine.status(), RunStatus::Settling);
    assert_eq!(fired.load(Ordering::SeqCst), 1);

    sleep(ms(20)).await;
    assert_eq!(engine.status(), RunStatus::Done);
    assert_eq!(fired.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn reset_returns_to_idle() {
    let (engine, fired) = counting_engine();
    engine.start(&two_stage()).unwrap();
    sleep(ms(150)).await;

    engine.reset();
    assert_eq!(engine.status(), RunStatus::Idle);
    assert!(!engine.is_complete(0));
    assert_eq!(engine.snapshot().stage_count, 0);

    sleep(ms(1_000)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 0);
    assert_eq!(engine.status(), RunStatus::Idle);
}

#[tokio::test(start_paused = true)]
async fn wait_resolves_when_the_run_is_reset() {
    let engine = Arc::new(PipelineEngine::new(SETTLE));
    engine.start(&two_stage()).unwrap();

    let watcher = Arc::clone(&engine);
    let waiter = tokio::spawn(async move { watcher.wait().await });
    sleep(ms(50)).await;

    engine.reset();
    let outcome = tokio::time::timeout(ms(60_000), waiter)
        .await
        .expect("wait() hung after reset")
        .unwrap();
    assert_eq!(outcome, RunOutcome::Cancelled);
    assert_eq!(engine.status(), RunStatus::Idle);
}

#[tokio::test(start_paused = true)]
async fn wait_resolves_when_the_run_is_replaced() {
    let engine = Arc::new(PipelineEngine::new(SETTLE));
    engine.start(&two_stage()).unwrap();

    let watcher = Arc::clone(&engine);
    let waiter = tokio::spawn(async move { watcher.wait().await });
    sleep(ms(50)).await;

    engine.reset();
    engine.start(&two_stage()).unwrap();
    let outcome = tokio::time::timeout(ms(60_000), waiter)
        .await
        .expect("wait() followed the replacement run")
        .unwrap();
    assert_eq!(outcome, RunOutcome::Cancelled);
    assert_eq!(engine.status(), RunStatus::Running);
}

#[tokio::test(start_paused = true)]
async fn wait_on_idle_engine_follows_the_next_run() {
    let engine = Arc::new(PipelineEngine::new(SETTLE));
    let watcher = Arc::clone(&engine);
    let waiter = tokio::spawn(async move { watcher.wait().await });
    sleep(ms(10)).await;

    engine.start(&two_stage()).unwrap();
    let outcome = waiter.await.unwrap();
    assert!(matches!(outcome, RunOutcome::Done(_)));
}

#[tokio::test(start_paused = true)]
async fn observed_progress_is_monotonic() {
    let engine = PipelineEngine::new(SETTLE);
    let stages: Vec<_> = (0..5)
        .map(|i| StageDefinition::new(format!("stage {i}"), 30 + i * 17))
        .collect();
    engine.start(&stages).unwrap();

    let mut last = 0;
    for _ in 0..60 {
        sleep(ms(7)).await;
        let snapshot = engine.snapshot();
        assert!(snapshot.current_index >= last);
        last = snapshot.current_index;

        if let Some(current) = engine.current_stage() {
            assert!(current.index < stages.len());
        }
        for i in 0..stages.len() {
            assert_eq!(snapshot.is_complete(i), i < snapshot.current_index);
        }
    }
    assert_eq!(engine.status(), RunStatus::Done);
}

#[tokio::test(start_paused = true)]
async fn subscribers_see_every_stage_in_order() {
    let engine = PipelineEngine::new(SETTLE);
    let mut rx = engine.subscribe();
    engine.start(&two_stage()).unwrap();

    let mut seen = Vec::new();
    loop {
        rx.changed().await.unwrap();
        let snapshot = rx.borrow_and_update().clone();
        seen.push((snapshot.status, snapshot.current_index));
        if snapshot.status.is_terminal() {
            break;
        }
    }
    assert_eq!(
        seen,
        vec![
            (RunStatus::Running, 0),
            (RunStatus::Running, 1),
            (RunStatus::Settling, 2),
            (RunStatus::Done, 2),
        ]
    );
}

struct FailAt(usize);

#[async_trait::async_trait]
impl StageWork for FailAt {
    async fn run(&self, index: usize, stage: &StageDefinition) -> Result<(), StageFailure> {
        sleep(stage.duration()).await;
        if index == self.0 {
            return Err(StageFailure::new("metrics backend unreachable"));
        }
        Ok(())
    }
}

#[tokio::test(start_paused = true)]
async fn failing_stage_ends_in_failed_without_callback() {
    let engine = PipelineEngine::with_work(SETTLE, Arc::new(FailAt(1)));
    let fired = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&fired);
    engine
        .on_done(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
    engine.start(&two_stage()).unwrap();

    assert_eq!(
        engine.wait().await,
        RunOutcome::Failed {
            stage: 1,
            failure: StageFailure::new("metrics backend unreachable"),
        }
    );
    assert_eq!(engine.status(), RunStatus::Failed);
    assert!(engine.is_complete(0));
    assert!(!engine.is_complete(1));

    sleep(ms(1_000)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 0);
}
