//! # ap-tui
//!
//! Terminal User Interface for agent-pipeline.
//!
//! This crate provides the interactive TUI for starting runs and watching
//! each stage progress. It communicates with `ap-core` via channels using
//! the `Op` and `Event` protocol defined in `ap-protocol`.

pub mod app;
pub mod core_task;
pub mod event_handler;
pub mod tui;
pub mod widgets;

pub use app::App;
pub use tui::Tui;

use anyhow::Result;
use ap_core::engine::PipelineEngine;
use ap_protocol::Event;
use std::sync::Arc;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

/// Run the TUI until the user quits.
///
/// `event_rx` must receive the events of `engine` (see
/// [`PipelineEngine::with_events`]).
pub async fn run_app(engine: Arc<PipelineEngine>, event_rx: UnboundedReceiver<Event>) -> Result<()> {
    let (op_tx, op_rx) = unbounded_channel();
    let core = tokio::spawn(core_task::serve_ops(Arc::clone(&engine), op_rx));

    let mut app = App::new(op_tx, event_rx, engine.snapshot(), engine.backend_available());

    let mut tui = Tui::init()?;
    tui.clear()?;
    tracing::info!(stages = app.run_state.stages.len(), "tui started");

    let result = app.run(&mut tui).await;
    tui.restore()?;

    core.await?;
    tracing::info!("tui exited");
    result
}
