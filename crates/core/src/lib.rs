//! # ap-core
//!
//! Core pipeline engine and stage management for agent-pipeline.
//!
//! This crate provides:
//! - The stage catalog and prompt construction
//! - Generation backend abstraction with Gemini and mock adapters
//! - The sequential pipeline execution engine
//! - Configuration loading from the `.agent-pipeline/` directory
//! - Project initialization from embedded templates
//!
//! ## Modules
//!
//! - [`catalog`]: Ordered stage catalog and prompt templates
//! - [`backend`]: Backend trait and adapter implementations
//! - [`engine`]: Pipeline execution engine
//! - [`state`]: Run state transitions
//! - [`config`]: Configuration loading and management
//! - [`init`]: `.agent-pipeline/` scaffolding

pub mod backend;
pub mod catalog;
pub mod config;
pub mod engine;
pub mod init;
pub mod state;
