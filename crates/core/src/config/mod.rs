//! Configuration loading and management.
//!
//! This module provides functionality to load and parse all configuration files
//! from the `.agent-pipeline/` directory structure.

pub mod error;
pub mod loader;
pub mod models;

/// Name of the per-project configuration directory.
pub const PROJECT_DIR: &str = ".agent-pipeline";
