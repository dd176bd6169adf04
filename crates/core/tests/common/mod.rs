//! Common test utilities and helpers for integration tests.
//!
//! This module provides shared functionality across all integration tests:
//! - Test fixtures (catalogs, sample project directories)
//! - Custom assertions over run state and event streams
//! - Instrumented backends

pub mod assertions;
pub mod backends;
pub mod fixtures;

#[allow(unused_imports)]
pub use assertions::*;
#[allow(unused_imports)]
pub use backends::*;
#[allow(unused_imports)]
pub use fixtures::*;
