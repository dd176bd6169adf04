//! Scripted backend for tests and offline demos.

use crate::backend::base::{BackendError, GenerationBackend};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A deterministic backend with per-stage scripted outcomes.
///
/// Stages without a script answer with `"<stage> output"`. Every call is
/// recorded and can be inspected through [`MockBackend::calls`]; clones share
/// the same call log.
#[derive(Clone)]
pub struct MockBackend {
    available: bool,
    outcomes: HashMap<String, Result<String, BackendError>>,
    delay: Option<Duration>,
    calls: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockBackend {
    pub fn new(available: bool) -> Self {
        Self {
            available,
            outcomes: HashMap::new(),
            delay: None,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn success() -> Self {
        Self::new(true)
    }

    pub fn unavailable() -> Self {
        Self::new(false)
    }

    /// Script a successful response for one stage.
    pub fn with_response(mut self, stage: &str, text: &str) -> Self {
        self.outcomes
            .insert(stage.to_string(), Ok(text.to_string()));
        self
    }

    /// Script a failure for one stage.
    pub fn with_failure(mut self, stage: &str, message: &str) -> Self {
        self.outcomes.insert(
            stage.to_string(),
            Err(BackendError::Failure(message.to_string())),
        );
        self
    }

    /// Sleep this long inside every invocation.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// All `(stage_name, prompt)` pairs received so far, in call order.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|calls| calls.len()).unwrap_or(0)
    }
}

#[async_trait]
impl GenerationBackend for MockBackend {
    fn is_available(&self) -> bool {
        self.available
    }

    async fn invoke(&self, stage_name: &str, prompt: &str) -> Result<String, BackendError> {
        if !self.available {
            return Err(BackendError::NotAvailable(
                "Mock backend not available".to_string(),
            ));
        }

        if let Ok(mut calls) = self.calls.lock() {
            calls.push((stage_name.to_string(), prompt.to_string()));
        }

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match self.outcomes.get(stage_name) {
            Some(outcome) => outcome.clone(),
            None => Ok(format!("{stage_name} output")),
        }
    }
}
