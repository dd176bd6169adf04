//! Event handling utilities for the TUI.
//!
//! This module provides functions for handling different types of events:
//! - Core events (from ap-core), applied to the local run state mirror
//! - Keyboard events (user input)
//! - Prompt submission

use crate::widgets::{OutputView, PromptInput};
use ap_protocol::{Event, Op, RunState, StageStatus};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::sync::mpsc::UnboundedSender;

/// Lines moved by `PageUp` / `PageDown` in the output view.
pub const PAGE_SIZE: usize = 10;

/// Apply an event received from the core to the local run state mirror.
///
/// Events that belong to a run other than the current one are dropped.
pub fn handle_core_event(run: &mut RunState, event: Event) {
    match event {
        Event::RunStarted {
            run_id,
            prompt,
            stages,
        } => {
            run.run_id = Some(run_id);
            run.prompt = prompt;
            run.stages = stages;
            run.is_busy = true;
            run.active_index = None;
            run.run_error = None;
            run.started_at = Some(chrono::Utc::now());
            run.finished_at = None;
        }
        Event::StageStatusUpdate {
            run_id,
            index,
            status,
            output,
        } => {
            if run.run_id != Some(run_id) {
                return;
            }
            let Some(stage) = run.stages.get_mut(index) else {
                return;
            };
            stage.status = status;
            if output.is_some() {
                stage.output = output;
            }
            if status == StageStatus::Active {
                run.active_index = Some(index);
            }
        }
        Event::RunError { run_id, error } => {
            if run.run_id == Some(run_id) {
                run.run_error = Some(error);
            }
        }
        Event::RunFinished { run_id, .. } => {
            if run.run_id == Some(run_id) {
                run.is_busy = false;
                run.active_index = None;
                run.finished_at = Some(chrono::Utc::now());
            }
        }
        Event::RunRejected { reason } => {
            tracing::debug!(?reason, "start request rejected by core");
        }
    }
}

/// Handle a keyboard event from the user.
///
/// Returns `true` if the application should exit, `false` otherwise.
pub fn handle_keyboard_event(
    key_event: KeyEvent,
    prompt: &mut PromptInput,
    selected_index: &mut usize,
    output_view: &mut OutputView,
    run: &RunState,
    op_tx: &UnboundedSender<Op>,
) -> bool {
    if key_event.kind != KeyEventKind::Press {
        return false;
    }

    if key_event.modifiers.contains(KeyModifiers::CONTROL) {
        return matches!(key_event.code, KeyCode::Char('c') | KeyCode::Char('d'));
    }

    match key_event.code {
        KeyCode::Esc => {
            return true;
        }
        KeyCode::Up => {
            if *selected_index > 0 {
                *selected_index -= 1;
                output_view.scroll_to_top();
            }
        }
        KeyCode::Down => {
            if *selected_index < run.stages.len().saturating_sub(1) {
                *selected_index += 1;
                output_view.scroll_to_top();
            }
        }
        KeyCode::PageUp => {
            output_view.page_up(PAGE_SIZE);
        }
        KeyCode::PageDown => {
            let max = run
                .stages
                .get(*selected_index)
                .map(OutputView::max_scroll)
                .unwrap_or(0);
            output_view.page_down(PAGE_SIZE, max);
        }
        KeyCode::Left => prompt.move_cursor_left(),
        KeyCode::Right => prompt.move_cursor_right(),
        KeyCode::Home => prompt.move_cursor_home(),
        KeyCode::End => prompt.move_cursor_end(),
        KeyCode::Char(c) => prompt.insert_char(c),
        KeyCode::Backspace => prompt.delete_char(),
        KeyCode::Enter => submit_prompt(prompt, run, op_tx),
        _ => {}
    }

    false
}

/// Send the typed prompt to the core.
///
/// Blank input and input typed while a run is executing stay in the field;
/// the core would reject both anyway.
fn submit_prompt(prompt: &mut PromptInput, run: &RunState, op_tx: &UnboundedSender<Op>) {
    if prompt.is_blank() || run.is_busy {
        return;
    }

    let _ = op_tx.send(Op::StartRun {
        prompt: prompt.take(),
    });
}
