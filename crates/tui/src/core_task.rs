//! The core side of the TUI: turns `Op`s into engine calls.

use ap_core::engine::PipelineEngine;
use ap_protocol::Op;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;

/// Serve operations from the presentation layer until `Op::Shutdown` or
/// until every sender is gone.
///
/// Each `StartRun` is driven on its own task so the loop keeps receiving;
/// the engine rejects starts that overlap a running pipeline.
pub async fn serve_ops(engine: Arc<PipelineEngine>, mut op_rx: UnboundedReceiver<Op>) {
    while let Some(op) = op_rx.recv().await {
        match op {
            Op::StartRun { prompt } => {
                let engine = Arc::clone(&engine);
                tokio::spawn(async move {
                    engine.start(&prompt).await;
                });
            }
            Op::Shutdown => {
                tracing::debug!("shutdown requested");
                break;
            }
        }
    }
}
