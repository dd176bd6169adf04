//! Stage catalog entries and per-run stage records.
//!
//! A [`StageDefinition`] is an immutable catalog entry loaded once at startup.
//! A [`StageRecord`] is the mutable, per-run view of that stage which the
//! orchestrator advances through its lifecycle.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A single named step of the pipeline.
///
/// The name doubles as the key used to select the stage's prompt template,
/// so it must be unique within a catalog.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
pub struct StageDefinition {
    /// Unique identifier for this stage.
    pub name: String,

    /// Human-readable description shown next to the stage name.
    pub description: String,
}

impl StageDefinition {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Lifecycle status of a stage within one run.
///
/// A stage moves `Pending -> Active -> Complete` on success, or
/// `Pending -> Active -> Error` on failure. `Complete` and `Error` are
/// terminal: the stage is never mutated again during the same run.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default, TS)]
#[serde(rename_all = "lowercase")]
pub enum StageStatus {
    /// Not reached yet in the current run.
    #[default]
    Pending,

    /// Currently awaiting the generation backend.
    Active,

    /// The backend returned a result for this stage.
    Complete,

    /// The backend failed for this stage; the run halted here.
    Error,
}

impl StageStatus {
    /// Whether the stage has reached `Complete` or `Error`.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Complete | Self::Error)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Complete => "complete",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for StageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The state of one stage during a run.
///
/// `output` holds the generated text when the status is `Complete`, or the
/// failure message when the status is `Error`. It is `None` otherwise.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
pub struct StageRecord {
    pub name: String,
    pub description: String,
    pub status: StageStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub output: Option<String>,
}

impl StageRecord {
    /// Create a fresh `Pending` record for a catalog entry.
    pub fn pending(definition: &StageDefinition) -> Self {
        Self {
            name: definition.name.clone(),
            description: definition.description.clone(),
            status: StageStatus::Pending,
            output: None,
        }
    }
}
