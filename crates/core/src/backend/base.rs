//! Base backend trait and supporting types.

use async_trait::async_trait;
use thiserror::Error;

/// Failures surfaced by a generation backend.
///
/// The display text is exactly the carried message, so callers can show it
/// to users verbatim.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The backend never initialized (missing credentials, etc.).
    #[error("{0}")]
    NotAvailable(String),
    /// A single invocation failed: transport, authorization, or service side.
    #[error("{0}")]
    Failure(String),
}

impl BackendError {
    pub fn message(&self) -> &str {
        match self {
            Self::NotAvailable(message) | Self::Failure(message) => message,
        }
    }
}

/// One asynchronous text generation call per stage.
///
/// Implementations are stateless per call. The only process-wide state is
/// whether initialization succeeded, reported by `is_available`.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    fn is_available(&self) -> bool;

    /// Generate text for `stage_name` from the fully built `prompt`.
    async fn invoke(&self, stage_name: &str, prompt: &str) -> Result<String, BackendError>;
}
