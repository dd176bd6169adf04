//! Custom assertion helpers over run state and event streams.

use ap_protocol::ipc::Event;
use ap_protocol::run_models::RunState;
use ap_protocol::stage_models::StageStatus;
use tokio::sync::mpsc;

/// Check every structural rule a published run state must satisfy.
pub fn assert_run_state_consistent(state: &RunState) {
    let active: Vec<usize> = state
        .stages
        .iter()
        .enumerate()
        .filter(|(_, s)| s.status == StageStatus::Active)
        .map(|(i, _)| i)
        .collect();
    assert!(active.len() <= 1, "More than one active stage: {active:?}");
    if let Some(&index) = active.first() {
        assert_eq!(
            state.active_index,
            Some(index),
            "Active stage is not the one at active_index"
        );
    }

    let failed = state.stages.iter().position(|s| s.status == StageStatus::Error);
    assert_eq!(
        state.run_error.is_some(),
        failed.is_some(),
        "run_error must be set exactly when a stage is in error"
    );
    if let Some(index) = failed {
        assert!(
            state.stages[index + 1..]
                .iter()
                .all(|s| s.status == StageStatus::Pending),
            "Stages after a failure must stay pending"
        );
    }

    if !state.is_busy {
        assert!(state.active_index.is_none(), "Idle run with an active index");
    }
}

/// Drain every event already sent on the channel.
#[allow(dead_code)]
pub fn drain_events(rx: &mut mpsc::UnboundedReceiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Rebuild the run state by applying events in order, asserting along the way
/// that no stage goes active before its predecessor is terminal.
///
/// Returns the state after the last event.
#[allow(dead_code)]
pub fn replay_events(events: &[Event]) -> RunState {
    let mut state = RunState::initial(&[]);

    for event in events {
        match event {
            Event::RunStarted {
                run_id,
                prompt,
                stages,
            } => {
                state.run_id = Some(*run_id);
                state.prompt = prompt.clone();
                state.stages = stages.clone();
                state.is_busy = true;
                state.active_index = None;
                state.run_error = None;
            }
            Event::StageStatusUpdate {
                index,
                status,
                output,
                ..
            } => {
                if *status == StageStatus::Active {
                    if *index > 0 {
                        assert!(
                            state.stages[index - 1].status.is_terminal(),
                            "Stage {index} went active before stage {} finished",
                            index - 1
                        );
                    }
                    state.active_index = Some(*index);
                }
                state.stages[*index].status = *status;
                if output.is_some() {
                    state.stages[*index].output = output.clone();
                }
            }
            Event::RunError { error, .. } => {
                state.run_error = Some(error.clone());
            }
            Event::RunFinished { .. } => {
                state.is_busy = false;
                state.active_index = None;
            }
            Event::RunRejected { .. } => {}
        }
    }

    state
}

/// Assert that events begin with `RunStarted` and end with `RunFinished`.
#[allow(dead_code)]
pub fn assert_event_sequence(events: &[Event]) {
    assert!(!events.is_empty(), "Event sequence is empty");
    assert!(
        matches!(events[0], Event::RunStarted { .. }),
        "First event should be RunStarted, got: {:?}",
        events[0]
    );
    let last = events.last().unwrap();
    assert!(
        matches!(last, Event::RunFinished { .. }),
        "Last event should be RunFinished, got: {last:?}"
    );
}
