//! Instrumented backends for integration tests.

use ap_core::backend::{BackendError, GenerationBackend, MockBackend};
use ap_protocol::run_models::RunState;
use async_trait::async_trait;
use std::sync::{Arc, Mutex, OnceLock};
use tokio::sync::watch;

/// Wraps a [`MockBackend`] and records the published run state at the moment
/// each stage is invoked.
///
/// Call [`ObservingBackend::attach`] with the engine's subscription before
/// starting a run.
#[derive(Clone)]
pub struct ObservingBackend {
    inner: MockBackend,
    state: Arc<OnceLock<watch::Receiver<RunState>>>,
    seen: Arc<Mutex<Vec<(String, RunState)>>>,
}

#[allow(dead_code)]
impl ObservingBackend {
    pub fn new(inner: MockBackend) -> Self {
        Self {
            inner,
            state: Arc::new(OnceLock::new()),
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn attach(&self, state: watch::Receiver<RunState>) {
        let _ = self.state.set(state);
    }

    /// `(stage_name, state)` for every invocation, in call order.
    pub fn observations(&self) -> Vec<(String, RunState)> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationBackend for ObservingBackend {
    fn is_available(&self) -> bool {
        self.inner.is_available()
    }

    async fn invoke(&self, stage_name: &str, prompt: &str) -> Result<String, BackendError> {
        if let Some(state) = self.state.get() {
            let snapshot = state.borrow().clone();
            self.seen
                .lock()
                .unwrap()
                .push((stage_name.to_string(), snapshot));
        }
        self.inner.invoke(stage_name, prompt).await
    }
}
