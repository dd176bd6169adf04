//! Output view widget for displaying a stage's output with scrolling support.
//!
//! Shows the generated text of the selected stage, or its failure message.
//! It supports PageUp/PageDown and shows a scrollbar when the text is longer
//! than the view.

use ap_protocol::{StageRecord, StageStatus};
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap},
    Frame,
};

/// Widget for displaying stage output with scrolling support.
pub struct OutputView {
    /// Current scroll offset (number of lines scrolled from the top).
    pub scroll_offset: usize,
}

impl OutputView {
    /// Create a new OutputView with scroll offset at the top.
    pub fn new() -> Self {
        Self { scroll_offset: 0 }
    }

    /// Number of text lines in a stage's output.
    pub fn line_count(stage: &StageRecord) -> usize {
        stage.output.as_deref().map(|o| o.lines().count()).unwrap_or(0)
    }

    /// Largest useful scroll offset for a stage: the last line stays visible.
    pub fn max_scroll(stage: &StageRecord) -> usize {
        Self::line_count(stage).saturating_sub(1)
    }

    /// Render the output of `stage`.
    pub fn render(&self, frame: &mut Frame, area: Rect, stage: Option<&StageRecord>) {
        let title = match stage {
            Some(stage) => format!("Output - {}", stage.name),
            None => "Output".to_string(),
        };
        let block = Block::default().borders(Borders::ALL).title(title);

        let (text, style) = match stage {
            None => ("No stage selected.".to_string(), Style::default()),
            Some(stage) => match (&stage.output, stage.status) {
                (Some(output), StageStatus::Error) => {
                    (output.clone(), Style::default().fg(Color::Red))
                }
                (Some(output), _) => (output.clone(), Style::default()),
                (None, StageStatus::Active) => (
                    "Generating...".to_string(),
                    Style::default().fg(Color::Yellow),
                ),
                (None, _) => (
                    "No output yet.".to_string(),
                    Style::default().fg(Color::DarkGray),
                ),
            },
        };

        let paragraph = Paragraph::new(text)
            .block(block)
            .style(style)
            .wrap(Wrap { trim: false })
            .scroll((self.scroll_offset.min(u16::MAX as usize) as u16, 0));

        frame.render_widget(paragraph, area);

        let total_lines = stage.map(Self::line_count).unwrap_or(0);
        let visible_lines = area.height.saturating_sub(2) as usize; // Subtract 2 for borders

        if total_lines > visible_lines {
            let mut scrollbar_state = ScrollbarState::default()
                .content_length(total_lines)
                .viewport_content_length(visible_lines)
                .position(self.scroll_offset);

            let scrollbar = Scrollbar::default()
                .orientation(ScrollbarOrientation::VerticalRight)
                .begin_symbol(Some("↑"))
                .end_symbol(Some("↓"));

            frame.render_stateful_widget(scrollbar, area, &mut scrollbar_state);
        }
    }

    /// Scroll up by a page.
    pub fn page_up(&mut self, page_size: usize) {
        self.scroll_offset = self.scroll_offset.saturating_sub(page_size);
    }

    /// Scroll down by a page, never past `max`.
    pub fn page_down(&mut self, page_size: usize, max: usize) {
        self.scroll_offset = (self.scroll_offset + page_size).min(max);
    }

    /// Reset scroll to the top.
    pub fn scroll_to_top(&mut self) {
        self.scroll_offset = 0;
    }
}

impl Default for OutputView {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn stage(status: StageStatus, output: Option<&str>) -> StageRecord {
        StageRecord {
            name: "Architect".to_string(),
            description: "Plans".to_string(),
            status,
            output: output.map(str::to_string),
        }
    }

    fn render(view: &OutputView, stage: Option<&StageRecord>, height: u16) -> String {
        let backend = TestBackend::new(60, height);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| {
                let area = frame.area();
                view.render(frame, area, stage);
            })
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_render_placeholder_states() {
        let view = OutputView::new();

        assert!(render(&view, None, 5).contains("No stage selected."));
        assert!(render(&view, Some(&stage(StageStatus::Pending, None)), 5)
            .contains("No output yet."));
        assert!(render(&view, Some(&stage(StageStatus::Active, None)), 5)
            .contains("Generating..."));
    }

    #[test]
    fn test_render_output_with_title() {
        let view = OutputView::new();
        let content = render(
            &view,
            Some(&stage(StageStatus::Complete, Some("plan text"))),
            5,
        );

        assert!(content.contains("Output - Architect"));
        assert!(content.contains("plan text"));
    }

    #[test]
    fn test_render_scrolled_output() {
        let output = (1..=20)
            .map(|i| format!("line {i:02}"))
            .collect::<Vec<_>>()
            .join("\n");
        let record = stage(StageStatus::Complete, Some(&output));
        let mut view = OutputView::new();
        view.page_down(10, OutputView::max_scroll(&record));

        let content = render(&view, Some(&record), 6);

        assert!(content.contains("line 11"));
        assert!(!content.contains("line 01"));
        assert!(content.contains("↓"), "scrollbar should be shown");
    }

    #[test]
    fn test_scroll_bounds() {
        let record = stage(StageStatus::Complete, Some("a\nb\nc"));
        let mut view = OutputView::new();

        view.page_down(10, OutputView::max_scroll(&record));
        assert_eq!(view.scroll_offset, 2);

        view.page_up(1);
        assert_eq!(view.scroll_offset, 1);

        view.scroll_to_top();
        assert_eq!(view.scroll_offset, 0);
    }
}
