//! Pipeline execution engine.
//!
//! The PipelineEngine drives one run at a time through every catalog stage
//! in order, invoking the generation backend once per stage and halting on
//! the first failure.
//!
//! The engine owns the run state. It is kept in a `watch` channel so readers
//! can take a snapshot or await changes at any time, and every individual
//! transition is also sent as an [`Event`] so no intermediate state is lost.

use crate::backend::base::{BackendError, GenerationBackend};
use crate::catalog::StageCatalog;
use crate::state::run::{
    activate_stage, begin_run, check_start, complete_stage, fail_stage, finish_run,
};
use ap_protocol::ipc::Event;
use ap_protocol::run_models::RunState;
use ap_protocol::stage_models::StageDefinition;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::watch;

/// Message recorded on the first stage when the backend never initialized.
pub const BACKEND_UNAVAILABLE_MESSAGE: &str =
    "The generation backend is not available. Check that an API key is configured.";

/// The sequential stage orchestrator.
///
/// Share it behind an `Arc` to start runs from spawned tasks; overlapping
/// `start` calls are rejected rather than queued.
pub struct PipelineEngine {
    backend: Arc<dyn GenerationBackend>,
    catalog: StageCatalog,
    definitions: Vec<StageDefinition>,
    stage_delay: Duration,
    state_tx: watch::Sender<RunState>,
    events_tx: Option<UnboundedSender<Event>>,
}

impl PipelineEngine {
    /// Create a new PipelineEngine.
    ///
    /// # Arguments
    ///
    /// * `backend` - The generation backend invoked once per stage
    /// * `catalog` - The ordered stages every run walks through
    pub fn new(backend: Arc<dyn GenerationBackend>, catalog: StageCatalog) -> Self {
        let definitions = catalog.definitions();
        let (state_tx, _) = watch::channel(RunState::initial(&definitions));

        Self {
            backend,
            catalog,
            definitions,
            stage_delay: Duration::ZERO,
            state_tx,
            events_tx: None,
        }
    }

    /// Pause this long before each stage's backend call.
    pub fn with_stage_delay(mut self, delay: Duration) -> Self {
        self.stage_delay = delay;
        self
    }

    /// Send every state transition to `events_tx`.
    pub fn with_events(mut self, events_tx: UnboundedSender<Event>) -> Self {
        self.events_tx = Some(events_tx);
        self
    }

    pub fn catalog(&self) -> &StageCatalog {
        &self.catalog
    }

    pub fn backend_available(&self) -> bool {
        self.backend.is_available()
    }

    /// A copy of the most recently published run state.
    pub fn snapshot(&self) -> RunState {
        self.state_tx.borrow().clone()
    }

    /// A receiver that observes every published run state.
    pub fn subscribe(&self) -> watch::Receiver<RunState> {
        self.state_tx.subscribe()
    }

    pub fn is_busy(&self) -> bool {
        self.state_tx.borrow().is_busy
    }

    /// Run every stage for `prompt`.
    ///
    /// The call is ignored, leaving the state untouched, when the prompt is
    /// blank or another run is in progress. Otherwise it returns once the
    /// last stage completed or the first stage failed. Failures are only
    /// reported through the run state and events, never as an error.
    pub async fn start(&self, prompt: &str) {
        let mut started = None;
        let mut rejected = None;

        // Check-and-set under the state lock so concurrent callers cannot both pass.
        self.state_tx
            .send_if_modified(|state| match check_start(state, prompt) {
                Ok(()) => {
                    started = Some(begin_run(state, &self.definitions, prompt));
                    true
                }
                Err(reason) => {
                    rejected = Some(reason);
                    false
                }
            });

        if let Some(reason) = rejected {
            tracing::debug!(?reason, "start request ignored");
            self.emit(Event::RunRejected { reason });
            return;
        }
        let Some(started) = started else {
            return;
        };
        self.emit(started);

        let available = self.backend.is_available();
        tracing::info!(
            stages = self.definitions.len(),
            backend_available = available,
            "pipeline run started"
        );

        for (index, definition) in self.definitions.iter().enumerate() {
            self.transition(|state| vec![activate_stage(state, index)]);
            tracing::debug!(index, stage = %definition.name, "stage active");

            if !self.stage_delay.is_zero() {
                tokio::time::sleep(self.stage_delay).await;
            }

            let outcome = if available {
                let full_prompt = self.catalog.build_prompt(&definition.name, prompt);
                self.backend.invoke(&definition.name, &full_prompt).await
            } else {
                Err(BackendError::NotAvailable(
                    BACKEND_UNAVAILABLE_MESSAGE.to_string(),
                ))
            };

            match outcome {
                Ok(output) => {
                    tracing::debug!(index, stage = %definition.name, bytes = output.len(), "stage complete");
                    self.transition(|state| vec![complete_stage(state, index, output)]);
                }
                Err(err) => {
                    tracing::warn!(index, stage = %definition.name, error = %err, "stage failed, halting run");
                    self.transition(|state| fail_stage(state, index, err.to_string()));
                    break;
                }
            }
        }

        self.transition(|state| vec![finish_run(state)]);
        let state = self.state_tx.borrow();
        tracing::info!(
            completed = state.completed_count(),
            failed = state.run_error.is_some(),
            "pipeline run finished"
        );
    }

    /// Apply one transition, publish the new state, then forward its events.
    fn transition<F>(&self, apply: F)
    where
        F: FnOnce(&mut RunState) -> Vec<Event>,
    {
        let mut events = Vec::new();
        self.state_tx.send_modify(|state| events = apply(state));
        for event in events {
            self.emit(event);
        }
    }

    fn emit(&self, event: Event) {
        if let Some(events_tx) = &self.events_tx {
            let _ = events_tx.send(event);
        }
    }
}
