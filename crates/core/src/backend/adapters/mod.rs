//! Generation backend adapter implementations.

mod gemini_adapter;
pub mod mock_backend;

pub use gemini_adapter::GeminiBackend;
pub use mock_backend::MockBackend;
