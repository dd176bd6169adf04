//! Behavioral tests for the pipeline engine's public contract.
//!
//! Covers:
//! - Rejected starts (blank prompt, run in progress) leave state untouched
//! - Full success and failure at every stage position
//! - Strict stage ordering, observed from inside the backend and from events
//! - Unavailable backends

mod common;

use ap_core::backend::MockBackend;
use ap_core::catalog::StageCatalog;
use ap_core::engine::{PipelineEngine, BACKEND_UNAVAILABLE_MESSAGE};
use ap_protocol::ipc::{Event, RejectReason, RunOutcome};
use ap_protocol::stage_models::StageStatus;
use common::*;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

const STAGES: &[&str] = &["Architect", "Designer", "Coder", "Reviewer"];

#[tokio::test]
async fn test_blank_prompts_leave_state_unchanged() {
    let engine = PipelineEngine::new(Arc::new(MockBackend::success()), create_test_catalog(&["A"]));
    let before = engine.snapshot();

    for prompt in ["", " ", "\t\n  "] {
        engine.start(prompt).await;
        assert_eq!(engine.snapshot(), before, "prompt {prompt:?} changed state");
    }
    assert!(!engine.is_busy());
    assert_eq!(engine.snapshot().stages[0].status, StageStatus::Pending);
}

#[tokio::test(start_paused = true)]
async fn test_start_while_busy_is_ignored() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let backend = MockBackend::success().with_delay(Duration::from_secs(1));
    let engine = Arc::new(
        PipelineEngine::new(Arc::new(backend.clone()), create_test_catalog(STAGES))
            .with_events(tx),
    );

    let mut state_rx = engine.subscribe();
    let running = tokio::spawn({
        let engine = Arc::clone(&engine);
        async move { engine.start("first").await }
    });
    state_rx.wait_for(|s| s.is_busy).await.unwrap();

    let before = serde_json::to_vec(&engine.snapshot()).unwrap();
    engine.start("second").await;
    let after = serde_json::to_vec(&engine.snapshot()).unwrap();
    assert_eq!(before, after, "busy start must not touch the state");

    running.await.unwrap();

    let events = drain_events(&mut rx);
    assert!(events.contains(&Event::RunRejected {
        reason: RejectReason::Busy
    }));
    let state = engine.snapshot();
    assert_eq!(state.prompt, "first");
    assert!(state.is_complete());
    assert!(backend.calls().iter().all(|(_, prompt)| prompt == "first"));
}

#[tokio::test]
async fn test_all_stages_succeed() {
    let mut backend = MockBackend::success();
    for name in STAGES {
        backend = backend.with_response(name, &format!("{} says hi", name.to_lowercase()));
    }
    let engine = PipelineEngine::new(Arc::new(backend), create_test_catalog(STAGES));

    engine.start("a todo app").await;

    let state = engine.snapshot();
    assert_run_state_consistent(&state);
    assert!(!state.is_busy);
    assert!(state.active_index.is_none());
    assert!(state.run_error.is_none());
    for (record, name) in state.stages.iter().zip(STAGES) {
        assert_eq!(record.status, StageStatus::Complete);
        assert_eq!(
            record.output.as_deref(),
            Some(format!("{} says hi", name.to_lowercase()).as_str())
        );
    }
}

#[tokio::test]
async fn test_failure_at_every_position_halts_run() {
    for k in 0..STAGES.len() {
        let backend = MockBackend::success().with_failure(STAGES[k], "quota exceeded");
        let engine =
            PipelineEngine::new(Arc::new(backend.clone()), create_test_catalog(STAGES));

        engine.start("a todo app").await;

        let state = engine.snapshot();
        assert_run_state_consistent(&state);
        for (i, record) in state.stages.iter().enumerate() {
            let expected = if i < k {
                StageStatus::Complete
            } else if i == k {
                StageStatus::Error
            } else {
                StageStatus::Pending
            };
            assert_eq!(record.status, expected, "stage {i} with failure at {k}");
        }
        assert_eq!(state.stages[k].output.as_deref(), Some("quota exceeded"));
        assert!(state.stages[k + 1..].iter().all(|s| s.output.is_none()));
        assert_eq!(state.run_error.as_deref(), Some("quota exceeded"));
        assert!(state.active_index.is_none());
        assert!(!state.is_busy);
        assert_eq!(backend.call_count(), k + 1, "no calls after the failure");
    }
}

#[tokio::test]
async fn test_backend_sees_previous_stages_terminal() {
    let backend = ObservingBackend::new(MockBackend::success());
    let engine = PipelineEngine::new(Arc::new(backend.clone()), create_test_catalog(STAGES));
    backend.attach(engine.subscribe());

    engine.start("a todo app").await;

    let observations = backend.observations();
    assert_eq!(observations.len(), STAGES.len());
    for (i, (name, state)) in observations.iter().enumerate() {
        assert_eq!(name, STAGES[i]);
        assert_run_state_consistent(state);
        assert!(state.is_busy);
        assert_eq!(state.active_index, Some(i));
        assert_eq!(state.stages[i].status, StageStatus::Active);
        assert!(state.stages[..i]
            .iter()
            .all(|s| s.status == StageStatus::Complete));
        assert!(state.stages[i + 1..]
            .iter()
            .all(|s| s.status == StageStatus::Pending));
    }
}

#[tokio::test]
async fn test_event_replay_matches_final_state() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let backend = MockBackend::success().with_failure("Coder", "rate limited");
    let engine = PipelineEngine::new(Arc::new(backend), create_test_catalog(STAGES))
        .with_events(tx);

    engine.start("a todo app").await;

    let events = drain_events(&mut rx);
    assert_event_sequence(&events);
    assert!(matches!(
        events.last(),
        Some(Event::RunFinished {
            outcome: RunOutcome::Failed,
            ..
        })
    ));

    let replayed = replay_events(&events);
    let state = engine.snapshot();
    assert_eq!(replayed.stages, state.stages);
    assert_eq!(replayed.run_error, state.run_error);
    assert_eq!(replayed.is_busy, state.is_busy);
    assert_eq!(replayed.run_id, state.run_id);
}

#[tokio::test]
async fn test_unavailable_backend_reports_run_error() {
    let engine = PipelineEngine::new(
        Arc::new(MockBackend::unavailable()),
        create_test_catalog(STAGES),
    );

    engine.start("a todo app").await;

    let state = engine.snapshot();
    assert_run_state_consistent(&state);
    assert_eq!(state.run_error.as_deref(), Some(BACKEND_UNAVAILABLE_MESSAGE));
    assert_eq!(state.stages[0].status, StageStatus::Error);
    assert!(state.stages[1..]
        .iter()
        .all(|s| s.status == StageStatus::Pending));
    assert!(!state.is_busy);
}

#[tokio::test]
async fn test_next_run_resets_previous_failure() {
    let backend = MockBackend::success().with_failure("Architect", "flaky");
    let engine = PipelineEngine::new(Arc::new(backend), create_test_catalog(STAGES));

    engine.start("first").await;
    let first = engine.snapshot();
    assert!(first.run_error.is_some());

    // Same script, so the second run fails the same way but from a clean slate.
    engine.start("second").await;
    let second = engine.snapshot();
    assert_eq!(second.prompt, "second");
    assert_ne!(second.run_id, first.run_id);
    assert_eq!(second.run_error.as_deref(), Some("flaky"));
    assert_run_state_consistent(&second);
}

#[tokio::test]
async fn test_builtin_catalog_runs_seven_stages() {
    let backend = MockBackend::success();
    let engine = PipelineEngine::new(Arc::new(backend.clone()), StageCatalog::builtin());

    engine.start("a weather widget").await;

    let names: Vec<String> = backend.calls().into_iter().map(|(name, _)| name).collect();
    assert_eq!(
        names,
        vec![
            "Architect",
            "UI/UX Designer",
            "Code Generator",
            "Debugger & Optimizer",
            "Creative Enhancer",
            "Documentation Writer",
            "Integration Specialist",
        ]
    );
    assert!(engine.snapshot().is_complete());
}
