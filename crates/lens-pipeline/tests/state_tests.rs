use lens_pipeline::{allowed_transitions, validate_transition, PipelineEngine, RunStatus, StageDefinition};
use proptest::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn any_status() -> impl Strategy<Value = RunStatus> {
    prop_oneof![
        Just(RunStatus::Idle),
        Just(RunStatus::Running),
        Just(RunStatus::Settling),
        Just(RunStatus::Done),
        Just(RunStatus::Cancelled),
        Just(RunStatus::Failed),
    ]
}

#[test]
fn live_states_cannot_restart_from_scratch() {
    assert!(validate_transition(RunStatus::Settling, RunStatus::Running).is_err());
    assert!(validate_transition(RunStatus::Running, RunStatus::Idle).is_err());
}

#[test]
fn terminal_states_can_start_again() {
    for from in [RunStatus::Done, RunStatus::Cancelled, RunStatus::Failed] {
        assert!(validate_transition(from, RunStatus::Running).is_ok());
        assert!(validate_transition(from, RunStatus::Idle).is_ok());
    }
}

proptest! {
    #[test]
    fn prop_validation_matches_table(from in any_status(), to in any_status()) {
        let res = validate_transition(from, to);
        let allowed = allowed_transitions(from);

        if res.is_ok() {
            prop_assert!(allowed.contains(&to));
        } else {
            prop_assert!(!allowed.contains(&to));
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_any_schedule_fires_done_exactly_once(
        durations in prop::collection::vec(1u64..500, 1..8),
        settle in 1u64..1_000,
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .start_paused(true)
            .build()
            .unwrap();

        let fired = runtime.block_on(async {
            let engine = PipelineEngine::new(Duration::from_millis(settle));
            let fired = Arc::new(AtomicUsize::new(0));
            let counter = Arc::clone(&fired);
            engine
                .on_done(move |_| {
                    counter.fetch_add(1, Ordering::SeqCst);
                })
                .unwrap();

            let stages: Vec<_> = durations
                .iter()
                .enumerate()
                .map(|(i, d)| StageDefinition::new(format!("stage {i}"), *d))
                .collect();
            engine.start(&stages).unwrap();

            let total: u64 = durations.iter().sum::<u64>() + settle;
            tokio::time::sleep(Duration::from_millis(total + 1)).await;
            assert_eq!(engine.status(), RunStatus::Done);

            tokio::time::sleep(Duration::from_millis(total)).await;
            fired.load(Ordering::SeqCst)
        });

        prop_assert_eq!(fired, 1);
    }
}
