//! Run state machine implementation.
//!
//! Each function applies one transition to a [`RunState`] and returns the
//! event(s) describing it. The functions never publish anything themselves;
//! the orchestrator applies them inside its state container and forwards the
//! returned events.

use ap_protocol::ipc::{Event, RejectReason, RunOutcome};
use ap_protocol::run_models::RunState;
use ap_protocol::stage_models::{StageDefinition, StageRecord, StageStatus};
use chrono::Utc;
use uuid::Uuid;

/// Check the preconditions of a new run.
///
/// # Errors
///
/// Returns the reason the run must be rejected: a blank prompt, or a run
/// that is still executing.
pub fn check_start(state: &RunState, prompt: &str) -> Result<(), RejectReason> {
    if prompt.trim().is_empty() {
        return Err(RejectReason::EmptyPrompt);
    }
    if state.is_busy {
        return Err(RejectReason::Busy);
    }
    Ok(())
}

/// Reset the state for a new run and mark it busy.
///
/// All stages go back to `Pending`, the run error is cleared and a new run
/// id is assigned.
pub fn begin_run(state: &mut RunState, definitions: &[StageDefinition], prompt: &str) -> Event {
    let run_id = Uuid::new_v4();

    state.run_id = Some(run_id);
    state.prompt = prompt.to_string();
    state.is_busy = true;
    state.active_index = None;
    state.run_error = None;
    state.stages = definitions.iter().map(StageRecord::pending).collect();
    state.started_at = Some(Utc::now());
    state.finished_at = None;

    Event::RunStarted {
        run_id,
        prompt: state.prompt.clone(),
        stages: state.stages.clone(),
    }
}

/// Mark stage `index` as the active stage.
pub fn activate_stage(state: &mut RunState, index: usize) -> Event {
    state.active_index = Some(index);
    if let Some(stage) = state.stages.get_mut(index) {
        stage.status = StageStatus::Active;
    }

    Event::StageStatusUpdate {
        run_id: run_id(state),
        index,
        status: StageStatus::Active,
        output: None,
    }
}

/// Record the backend's text for stage `index`.
pub fn complete_stage(state: &mut RunState, index: usize, output: String) -> Event {
    if let Some(stage) = state.stages.get_mut(index) {
        stage.status = StageStatus::Complete;
        stage.output = Some(output.clone());
    }

    Event::StageStatusUpdate {
        run_id: run_id(state),
        index,
        status: StageStatus::Complete,
        output: Some(output),
    }
}

/// Record a failure on stage `index` and promote it to the run error.
///
/// Returns the stage update followed by the run error event.
pub fn fail_stage(state: &mut RunState, index: usize, message: String) -> Vec<Event> {
    if let Some(stage) = state.stages.get_mut(index) {
        stage.status = StageStatus::Error;
        stage.output = Some(message.clone());
    }
    state.run_error = Some(message.clone());

    let run_id = run_id(state);
    vec![
        Event::StageStatusUpdate {
            run_id,
            index,
            status: StageStatus::Error,
            output: Some(message.clone()),
        },
        Event::RunError {
            run_id,
            error: message,
        },
    ]
}

/// End the run: no active stage, not busy.
pub fn finish_run(state: &mut RunState) -> Event {
    state.active_index = None;
    state.is_busy = false;
    state.finished_at = Some(Utc::now());

    let outcome = if state.run_error.is_some() {
        RunOutcome::Failed
    } else {
        RunOutcome::Completed
    };

    Event::RunFinished {
        run_id: run_id(state),
        outcome,
    }
}

fn run_id(state: &RunState) -> Uuid {
    state.run_id.unwrap_or_else(Uuid::nil)
}
