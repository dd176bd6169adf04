//! Prompt input widget.
//!
//! A single-line text field for the user request sent to the pipeline.
//! The cursor position counts characters, not bytes.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

/// Prompt input state.
#[derive(Debug, Clone, Default)]
pub struct PromptInput {
    /// Current input text
    input: String,
    /// Cursor position, in characters
    cursor_pos: usize,
}

impl PromptInput {
    /// Create an empty prompt input.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the current input text.
    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn cursor_pos(&self) -> usize {
        self.cursor_pos
    }

    /// True when the input is empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        self.input.trim().is_empty()
    }

    /// Insert a character at the cursor position.
    pub fn insert_char(&mut self, c: char) {
        let at = self.byte_index();
        self.input.insert(at, c);
        self.cursor_pos += 1;
    }

    /// Insert pasted text at the cursor position. Line breaks become spaces.
    pub fn insert_str(&mut self, text: &str) {
        for c in text.chars() {
            self.insert_char(if c == '\n' || c == '\r' { ' ' } else { c });
        }
    }

    /// Delete the character before the cursor (backspace).
    pub fn delete_char(&mut self) {
        if self.cursor_pos == 0 {
            return;
        }
        self.cursor_pos -= 1;
        let at = self.byte_index();
        self.input.remove(at);
    }

    pub fn move_cursor_left(&mut self) {
        self.cursor_pos = self.cursor_pos.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        if self.cursor_pos < self.input.chars().count() {
            self.cursor_pos += 1;
        }
    }

    pub fn move_cursor_home(&mut self) {
        self.cursor_pos = 0;
    }

    pub fn move_cursor_end(&mut self) {
        self.cursor_pos = self.input.chars().count();
    }

    /// Take the current text, leaving the field empty.
    pub fn take(&mut self) -> String {
        self.cursor_pos = 0;
        std::mem::take(&mut self.input)
    }

    fn byte_index(&self) -> usize {
        self.input
            .char_indices()
            .nth(self.cursor_pos)
            .map(|(i, _)| i)
            .unwrap_or(self.input.len())
    }

    /// Render the input field.
    ///
    /// While a run is executing the field is dimmed and the title says so.
    pub fn render(&self, area: Rect, buf: &mut Buffer, busy: bool) {
        let title = if busy {
            "Prompt (running...)"
        } else {
            "Prompt (Enter to run, Esc to quit)"
        };
        let block = Block::default().borders(Borders::ALL).title(title);

        let inner = block.inner(area);
        block.render(area, buf);

        let text_style = if busy {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default().fg(Color::Yellow)
        };

        let (before, after) = self.input.split_at(self.byte_index());
        let mut after_chars = after.chars();
        let under_cursor = after_chars
            .next()
            .map(|c| c.to_string())
            .unwrap_or_else(|| " ".to_string());

        let line = Line::from(vec![
            Span::styled("> ", text_style),
            Span::styled(before.to_string(), text_style),
            Span::styled(under_cursor, text_style.add_modifier(Modifier::REVERSED)),
            Span::styled(after_chars.as_str().to_string(), text_style),
        ]);

        Paragraph::new(line).render(inner, buf);
    }
}
