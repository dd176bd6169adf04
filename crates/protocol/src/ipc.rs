//! Inter-process communication protocol.
//!
//! This module defines the message types exchanged between the presentation
//! layer (TUI) and the orchestrator (Core).
//!
//! The protocol follows an Operation/Event pattern:
//! - `Op`: Commands sent from the presentation layer to Core
//! - `Event`: State transitions sent from Core to the presentation layer
//!
//! Every individual stage transition produces its own event, so a consumer
//! that applies events in order observes every intermediate state of a run.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::stage_models::{StageRecord, StageStatus};

/// Operations sent from the presentation layer to Core.
///
/// Uses tagged enum serialization for TypeScript compatibility:
/// ```json
/// {
///   "type": "startRun",
///   "payload": { "prompt": "build a button" }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum Op {
    /// Start a new run for the given prompt.
    ///
    /// Ignored by Core when the prompt is blank or a run is in progress.
    StartRun { prompt: String },

    /// The presentation layer is exiting.
    Shutdown,
}

/// How a finished run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunOutcome {
    /// Every stage completed.
    Completed,
    /// A stage failed and the run halted.
    Failed,
}

/// Why a start request was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectReason {
    /// The prompt was empty or whitespace only.
    EmptyPrompt,
    /// Another run is still executing.
    Busy,
}

/// Events sent from Core to the presentation layer.
///
/// ```json
/// {
///   "type": "stageStatusUpdate",
///   "payload": {
///     "run_id": "uuid-here",
///     "index": 2,
///     "status": "active",
///     "output": null
///   }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum Event {
    /// A run was accepted; all stages were reset to pending.
    RunStarted {
        #[ts(type = "string")]
        run_id: Uuid,
        prompt: String,
        stages: Vec<StageRecord>,
    },

    /// A single stage changed status.
    ///
    /// `output` carries the generated text for `complete` and the failure
    /// message for `error`.
    StageStatusUpdate {
        #[ts(type = "string")]
        run_id: Uuid,
        index: usize,
        status: StageStatus,
        output: Option<String>,
    },

    /// A stage failure was promoted to the run-level error.
    RunError {
        #[ts(type = "string")]
        run_id: Uuid,
        error: String,
    },

    /// The run is over; Core is idle again.
    RunFinished {
        #[ts(type = "string")]
        run_id: Uuid,
        outcome: RunOutcome,
    },

    /// A start request was ignored. Run state was not touched.
    RunRejected { reason: RejectReason },
}
