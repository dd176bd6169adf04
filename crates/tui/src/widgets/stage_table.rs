//! Stage table widget for displaying pipeline progress.
//!
//! Shows one row per catalog stage with its position, name, description
//! and color-coded status. The stage currently executing is marked.

use ap_protocol::{RunState, StageStatus};
use ratatui::layout::Constraint;
use ratatui::layout::Rect;
use ratatui::style::Color;
use ratatui::style::Modifier;
use ratatui::style::Style;
use ratatui::widgets::Block;
use ratatui::widgets::Borders;
use ratatui::widgets::Cell;
use ratatui::widgets::Row;
use ratatui::widgets::Table;
use ratatui::widgets::TableState;
use ratatui::Frame;

/// Renders the stage table for the current run.
///
/// # Arguments
/// * `frame` - The frame to render into
/// * `area` - The area to render the table in
/// * `run` - The run state mirror
/// * `selected` - Index of the stage whose output is shown
pub fn render_stage_table(frame: &mut Frame, area: Rect, run: &RunState, selected: usize) {
    let rows: Vec<Row> = run
        .stages
        .iter()
        .enumerate()
        .map(|(i, stage)| {
            let marker = if run.active_index == Some(i) { "▶" } else { "" };

            Row::new(vec![
                Cell::from(marker),
                Cell::from(format!("{}", i + 1)),
                Cell::from(stage.name.clone()),
                Cell::from(stage.description.clone()),
                Cell::from(stage.status.as_str().to_uppercase()).style(status_style(stage.status)),
            ])
        })
        .collect();

    let header = Row::new(vec![
        Cell::from(""),
        Cell::from("#"),
        Cell::from("Stage"),
        Cell::from("Description"),
        Cell::from("Status"),
    ])
    .style(
        Style::default()
            .add_modifier(Modifier::BOLD)
            .fg(Color::Cyan),
    );

    let widths = [
        Constraint::Length(1),
        Constraint::Length(2),
        Constraint::Length(24),
        Constraint::Min(20),
        Constraint::Length(10),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(
                    "Pipeline - {}/{} complete",
                    run.completed_count(),
                    run.stages.len()
                ))
                .style(Style::default().fg(Color::White)),
        )
        .row_highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol(">> ");

    let mut table_state = TableState::default();
    if !run.stages.is_empty() {
        table_state.select(Some(selected.min(run.stages.len() - 1)));
    }

    frame.render_stateful_widget(table, area, &mut table_state);
}

fn status_style(status: StageStatus) -> Style {
    match status {
        StageStatus::Pending => Style::default().fg(Color::DarkGray),
        StageStatus::Active => Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
        StageStatus::Complete => Style::default().fg(Color::Green),
        StageStatus::Error => Style::default().fg(Color::Red),
    }
}
