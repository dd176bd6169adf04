//! TUI widgets module.
//!
//! This module contains the widgets composed by the main screen.

pub mod output_view;
pub mod prompt_input;
pub mod stage_table;

pub use output_view::OutputView;
pub use prompt_input::PromptInput;
pub use stage_table::render_stage_table;
