//! # ap-protocol
//!
//! Core protocol definitions and data models for agent-pipeline.
//!
//! This crate defines all shared data structures used for:
//! - The stage catalog and per-run stage records
//! - The run state published by the orchestrator
//! - Inter-process communication between the presentation layer and Core
//! - Global configuration from `config.toml`
//!
//! ## Modules
//!
//! - [`stage_models`]: Stage definitions, statuses and records
//! - [`run_models`]: The observable run state
//! - [`config_models`]: Global configuration from config.toml
//! - [`ipc`]: Operations and Events for Core-TUI communication
//!
//! All types derive `TS` so web front-ends can share the same read model.

pub mod config_models;
pub mod ipc;
pub mod run_models;
pub mod stage_models;

// Re-export all public types for convenience
pub use config_models::*;
pub use ipc::*;
pub use run_models::*;
pub use stage_models::*;
