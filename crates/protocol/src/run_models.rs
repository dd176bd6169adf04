//! Run-level state published by the orchestrator.
//!
//! [`RunState`] is the read model of the presentation layer. The orchestrator
//! is its only writer; everyone else observes snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::stage_models::{StageDefinition, StageRecord, StageStatus};

/// Snapshot of the orchestrator's run state.
///
/// Invariants maintained by the orchestrator:
/// - `stages` always has one record per catalog entry, in catalog order.
/// - At most one record is `Active`, and it is the one at `active_index`.
/// - `run_error` is set if and only if some record has status `Error`.
/// - `is_busy` is true exactly while a run is executing.
///
/// On the wire `active_index` is an integer where `-1` means no stage is
/// currently executing.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
#[serde(rename_all = "camelCase")]
pub struct RunState {
    /// Identifier of the current (or most recent) run, once one is accepted.
    #[ts(type = "string | null")]
    pub run_id: Option<Uuid>,

    /// The user prompt of the current run.
    pub prompt: String,

    /// True while a run is executing.
    pub is_busy: bool,

    /// Index of the stage presently being processed.
    #[serde(with = "active_index")]
    #[ts(type = "number")]
    pub active_index: Option<usize>,

    /// The failure message of the stage that halted the run.
    pub run_error: Option<String>,

    /// One record per catalog stage.
    pub stages: Vec<StageRecord>,

    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl RunState {
    /// The state before any run: every stage pending, nothing busy.
    pub fn initial(definitions: &[StageDefinition]) -> Self {
        Self {
            run_id: None,
            prompt: String::new(),
            is_busy: false,
            active_index: None,
            run_error: None,
            stages: definitions.iter().map(StageRecord::pending).collect(),
            started_at: None,
            finished_at: None,
        }
    }

    /// The record currently marked `Active`, if any.
    pub fn active_stage(&self) -> Option<&StageRecord> {
        self.active_index.and_then(|i| self.stages.get(i))
    }

    /// Number of stages that finished successfully.
    pub fn completed_count(&self) -> usize {
        self.stages
            .iter()
            .filter(|s| s.status == StageStatus::Complete)
            .count()
    }

    /// The first stage in `Error`, with its index.
    pub fn failed_stage(&self) -> Option<(usize, &StageRecord)> {
        self.stages
            .iter()
            .enumerate()
            .find(|(_, s)| s.status == StageStatus::Error)
    }

    /// Whether every stage completed successfully.
    pub fn is_complete(&self) -> bool {
        !self.stages.is_empty() && self.stages.iter().all(|s| s.status == StageStatus::Complete)
    }
}

/// `Option<usize>` <-> integer with `-1` for `None`.
mod active_index {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<usize>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(index) => serializer.serialize_u64(*index as u64),
            None => serializer.serialize_i64(-1),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<usize>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = i64::deserialize(deserializer)?;
        if raw < 0 {
            Ok(None)
        } else {
            usize::try_from(raw)
                .map(Some)
                .map_err(serde::de::Error::custom)
        }
    }
}
