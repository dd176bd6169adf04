//! TUI application state and event loop.
//!
//! This module defines the main `App` struct that mirrors the core's run
//! state and drives the event loop using `tokio::select!`.

use anyhow::Result;
use ap_protocol::{Event, Op, RunState, StageStatus};
use crossterm::event::KeyEvent;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use tokio::select;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio_stream::StreamExt;

use crate::event_handler;
use crate::tui::{Tui, TuiEvent};
use crate::widgets::{render_stage_table, OutputView, PromptInput};

/// Main TUI application state.
pub struct App {
    /// Local mirror of the core's run state, kept current by core events.
    pub run_state: RunState,
    /// Whether the generation backend initialized.
    pub backend_available: bool,
    /// Index of the stage whose output is shown.
    pub selected_index: usize,
    /// The prompt being typed.
    pub prompt: PromptInput,
    pub output_view: OutputView,
    /// Channel to send operations to the core.
    pub op_tx: UnboundedSender<Op>,
    /// Channel to receive events from the core.
    pub event_rx: UnboundedReceiver<Event>,
    /// Flag to indicate if the application should exit.
    pub should_exit: bool,
}

impl App {
    /// Create a new App from the core's current state and its channels.
    pub fn new(
        op_tx: UnboundedSender<Op>,
        event_rx: UnboundedReceiver<Event>,
        run_state: RunState,
        backend_available: bool,
    ) -> Self {
        Self {
            run_state,
            backend_available,
            selected_index: 0,
            prompt: PromptInput::new(),
            output_view: OutputView::new(),
            op_tx,
            event_rx,
            should_exit: false,
        }
    }

    /// Main event loop.
    ///
    /// Uses `tokio::select!` to handle keyboard input and core events
    /// concurrently. Sends `Op::Shutdown` once the user quits.
    pub async fn run(&mut self, tui: &mut Tui) -> Result<()> {
        let mut tui_events = tui.event_stream();
        let frames = tui.frame_requester();

        frames.schedule_frame();

        while !self.should_exit {
            select! {
                Some(event) = self.event_rx.recv() => {
                    self.handle_core_event(event);
                    frames.schedule_frame();
                }
                Some(tui_event) = tui_events.next() => {
                    let redraw = !matches!(tui_event, TuiEvent::Draw);
                    self.handle_tui_event(tui, tui_event)?;
                    if redraw {
                        frames.schedule_frame();
                    }
                }
                else => break,
            }
        }

        let _ = self.op_tx.send(Op::Shutdown);
        Ok(())
    }

    /// Handle events from the core (ap-core).
    ///
    /// The selection follows the stage that just became active.
    fn handle_core_event(&mut self, event: Event) {
        let follow = match &event {
            Event::RunStarted { .. } => Some(0),
            Event::StageStatusUpdate {
                index,
                status: StageStatus::Active,
                ..
            } => Some(*index),
            _ => None,
        };

        event_handler::handle_core_event(&mut self.run_state, event);

        if let Some(index) = follow {
            self.selected_index = index;
            self.output_view.scroll_to_top();
        }
    }

    /// Handle TUI events (keyboard input, paste, draw).
    fn handle_tui_event(&mut self, tui: &mut Tui, event: TuiEvent) -> Result<()> {
        match event {
            TuiEvent::Key(key_event) => {
                self.handle_key_event(key_event);
            }
            TuiEvent::Paste(text) => {
                self.prompt.insert_str(&text);
            }
            TuiEvent::Draw => {
                tui.draw(|frame| {
                    self.render(frame);
                })?;
            }
        }
        Ok(())
    }

    /// Handle keyboard events.
    fn handle_key_event(&mut self, key_event: KeyEvent) {
        self.should_exit = event_handler::handle_keyboard_event(
            key_event,
            &mut self.prompt,
            &mut self.selected_index,
            &mut self.output_view,
            &self.run_state,
            &self.op_tx,
        );
    }

    /// Render the TUI.
    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        // Status line (top), stage table, output of the selected stage, prompt input
        let table_height = (self.run_state.stages.len() as u16).saturating_add(3);
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(table_height),
                Constraint::Min(5),
                Constraint::Length(3),
            ])
            .split(area);

        self.render_status_line(frame, chunks[0]);
        render_stage_table(frame, chunks[1], &self.run_state, self.selected_index);
        self.output_view
            .render(frame, chunks[2], self.run_state.stages.get(self.selected_index));
        self.prompt
            .render(chunks[3], frame.buffer_mut(), self.run_state.is_busy);
    }

    /// One line summarizing the run, or the error that needs attention.
    fn render_status_line(&self, frame: &mut Frame, area: Rect) {
        let (label, text, color) = if !self.backend_available {
            (
                "BACKEND UNAVAILABLE",
                "set GEMINI_API_KEY or API_KEY and restart".to_string(),
                Color::Red,
            )
        } else if let Some(error) = &self.run_state.run_error {
            ("RUN FAILED", error.clone(), Color::Red)
        } else if self.run_state.is_busy {
            let stage = self
                .run_state
                .active_stage()
                .map(|s| s.name.as_str())
                .unwrap_or("starting");
            (
                "RUNNING",
                format!(
                    "{stage} ({}/{})",
                    self.run_state.active_index.map_or(0, |i| i + 1),
                    self.run_state.stages.len()
                ),
                Color::Yellow,
            )
        } else if self.run_state.is_complete() {
            ("DONE", self.run_state.prompt.clone(), Color::Green)
        } else {
            ("READY", "type a request and press Enter".to_string(), Color::Gray)
        };

        let line = Line::from(vec![
            Span::styled(
                format!(" {label} "),
                Style::default()
                    .fg(Color::Black)
                    .bg(color)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" "),
            Span::styled(text, Style::default().fg(color)),
        ]);

        frame.render_widget(Paragraph::new(line), area);
    }
}
