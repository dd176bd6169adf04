//! Generation backend abstraction.
//!
//! This module provides the `GenerationBackend` trait (Adapter Pattern): the
//! boundary between the orchestrator and the external text generation
//! service, plus the concrete adapters.

pub mod adapters;
pub mod base;

pub use adapters::{GeminiBackend, MockBackend};
pub use base::{BackendError, GenerationBackend};
